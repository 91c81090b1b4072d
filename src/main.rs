use community_gateway::logging;
use community_gateway::server::GatewayServer;
use community_gateway::settings::Settings;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    // 파일 로깅일 때 guard는 프로세스 종료까지 유지
    let _guard = logging::init_logging(&settings.logging);

    info!(
        port = settings.server.http_port,
        rate_limit_enabled = settings.rate_limit.enabled,
        "게이트웨이 시작"
    );

    let server = GatewayServer::new(settings);
    if let Err(e) = server.run().await {
        error!(error = %e, "서버 실행 실패");
        std::process::exit(1);
    }
}
