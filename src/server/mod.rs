//! 게이트웨이 서버 모듈
//!
//! 설정으로부터 미들웨어 체인과 핸들러를 조립하고 연결을 처리합니다.

mod handler;
mod listener;

pub use handler::RequestHandler;
pub use listener::ServerListener;

use std::sync::Arc;

use crate::middleware::rate_limit::FixedWindowStore;
use crate::middleware::MiddlewareManager;
use crate::settings::Settings;

pub struct GatewayServer {
    settings: Settings,
    handler: Arc<RequestHandler>,
}

impl GatewayServer {
    /// 설정으로부터 서버를 조립합니다.
    ///
    /// rate limit 저장소는 여기서 만들어 주입되므로 서버 인스턴스마다
    /// 독립된 카운터를 가집니다.
    pub fn new(settings: Settings) -> Self {
        let store = FixedWindowStore::new(settings.rate_limit.clone());
        let middleware =
            MiddlewareManager::new(&settings.security, &settings.rate_limit, store);
        let handler = Arc::new(RequestHandler::new(middleware));

        Self { settings, handler }
    }

    /// 설정된 주소에 바인드합니다.
    pub async fn bind(&self) -> std::io::Result<ServerListener> {
        ServerListener::new(&self.settings.server).await
    }

    /// 임의 주소에 바인드합니다 (테스트에서 임시 포트 사용).
    pub async fn bind_addr(&self, addr: &str) -> std::io::Result<ServerListener> {
        ServerListener::bind(addr).await
    }

    /// 리스너에서 연결을 받아 처리합니다. 정상적으로는 반환하지 않습니다.
    pub async fn serve(&self, listener: ServerListener) -> std::io::Result<()> {
        listener.run(self.handler.clone()).await
    }

    /// 바인드 후 바로 서빙을 시작합니다.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }
}
