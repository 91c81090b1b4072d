use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use hyper_util::rt::TokioIo;
use tracing::{debug, error, info};

use super::handler::RequestHandler;
use crate::settings::ServerSettings;

pub struct ServerListener {
    http_listener: TcpListener,
}

impl ServerListener {
    pub async fn new(settings: &ServerSettings) -> std::io::Result<Self> {
        Self::bind(&format!("{}:{}", settings.bind_address, settings.http_port)).await
    }

    /// 주소에 바인드합니다. 포트 0이면 임시 포트가 배정됩니다.
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let http_listener = TcpListener::bind(addr).await.map_err(|e| {
            error!(error = %e, addr = %addr, "HTTP 포트 바인딩 실패");
            e
        })?;

        info!(addr = %addr, "HTTP 리스너 시작");
        Ok(Self { http_listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.http_listener.local_addr()
    }

    pub async fn run(self, handler: Arc<RequestHandler>) -> std::io::Result<()> {
        loop {
            match self.http_listener.accept().await {
                Ok((stream, remote)) => {
                    debug!(remote = %remote, "연결 수락");
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        if let Err(err) = handler.handle_connection(io).await {
                            debug!(error = %err, "HTTP 연결 처리 실패");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "HTTP 연결 수락 실패");
                }
            }
        }
    }
}
