//! Call Demo Service
//!
//! Headless stand-in for the demo call page: starts a video or audio call
//! against the provisioning backend, waits for the streamer to join and
//! hands the session to the RTC provider.

use std::sync::Arc;
use streamcall_api_sdk::{ApiClient, MemoryTokenStore, TokenStore};
use streamcall_core::{
    HealthStatus, ReadinessStatus, Result, ServiceRuntime, StreamcallError, StreamcallService,
};
use streamcall_rtc_sdk::HeadlessProvider;
use streamcall_session::SessionController;
use tracing::{info, warn};

mod config;
mod handlers;

use config::CallDemoConfig;
use handlers::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    streamcall_telemetry::init("call-demo").map_err(|e| StreamcallError::Config(e.to_string()))?;

    info!("Starting Call Demo Service");

    let config = CallDemoConfig::from_env()?;
    let service = Arc::new(CallDemoService::new(config)?);
    ServiceRuntime::run(service).await
}

pub struct CallDemoService {
    config: CallDemoConfig,
    state: Arc<AppState>,
    start_time: std::time::Instant,
}

impl CallDemoService {
    pub fn new(config: CallDemoConfig) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> = match &config.auth_token {
            Some(token) => Arc::new(MemoryTokenStore::with_token(token.clone())),
            None => {
                warn!("STREAMCALL_AUTH_TOKEN not set, call requests will fail until a token is stored");
                Arc::new(MemoryTokenStore::new())
            }
        };

        let client = ApiClient::new(&config.api_config(), tokens.clone())
            .map_err(|e| StreamcallError::Config(e.to_string()))?;

        let controller = Arc::new(SessionController::new(
            Arc::new(client),
            Arc::new(HeadlessProvider::new()),
            config.session_config(),
        ));

        let state = Arc::new(AppState::new(
            controller,
            tokens,
            config.app_id.clone(),
            config.default_opponent(),
        ));

        Ok(Self {
            config,
            state,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl StreamcallService for CallDemoService {
    fn service_id(&self) -> &'static str {
        "call-demo"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        self.state.readiness()
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Call Demo service");
        self.state.stop().await;
        Ok(())
    }

    async fn start(self: Arc<Self>) -> Result<()> {
        info!(
            bind = %self.config.http_bind,
            api_url = %self.config.api_url,
            poll_interval_ms = self.config.poll_interval_ms,
            "Starting Call Demo service"
        );

        let app = handlers::router(self.state.clone()).merge(handlers::health_router(self.clone()));
        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(auth_token: Option<&str>) -> CallDemoConfig {
        CallDemoConfig {
            api_url: "http://localhost:3000".to_string(),
            app_id: Some("123456".to_string()),
            auth_token: auth_token.map(str::to_string),
            poll_interval_ms: 1000,
            poll_max_attempts: None,
            request_timeout_secs: 5,
            branding_logo_url: "/icon.png".to_string(),
            demo_opponent_id: "2123".to_string(),
            http_bind: "127.0.0.1:0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_service_reports_health_and_readiness() {
        let service = CallDemoService::new(config(Some("tok"))).unwrap();

        let health = service.health().await;
        assert!(health.healthy);
        assert_eq!(health.service_id, "call-demo");

        assert!(service.ready().await.ready);
    }

    #[tokio::test]
    async fn test_service_not_ready_without_token() {
        let service = CallDemoService::new(config(None)).unwrap();
        let readiness = service.ready().await;
        assert!(!readiness.ready);
        assert!(readiness
            .dependencies
            .iter()
            .any(|d| d.name == "auth_token" && !d.available));
    }
}
