use std::sync::Arc;

use patio::{
    api::ApiClient,
    auth::{LoginOutcome, SessionManager},
    build_store,
    config::Config,
    monitor::{Monitor, MonitorExit},
    occupancy::{Dispatcher, LogDispatcher, NotifierConfig, OccupancyNotifier, WebhookDispatcher},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    let store = build_store(&config).expect("Failed to open token store");
    let api = ApiClient::from_config(&config);
    let mut session = SessionManager::new(store, api.clone());

    // 恢复会话，失败时尝试用环境变量中的凭证登录
    if session.restore().await.session().is_none() {
        let (Some(identifier), Some(secret)) = (config.identifier.clone(), config.secret.clone())
        else {
            tracing::error!("No valid session and no PATIO_IDENTIFIER/PATIO_SECRET configured");
            std::process::exit(1);
        };
        if let LoginOutcome::Failed(reason) = session.login(&identifier, &secret).await {
            tracing::error!("Login failed: {:?}", reason);
            std::process::exit(1);
        }
    }

    let dispatcher: Arc<dyn Dispatcher> = match &config.alert_webhook_url {
        Some(url) => {
            tracing::info!("Sending alerts to webhook {}", url);
            Arc::new(WebhookDispatcher::new(url.clone()))
        }
        None => Arc::new(LogDispatcher),
    };
    let notifier = OccupancyNotifier::new(
        dispatcher,
        NotifierConfig {
            high_threshold: config.high_occupancy_threshold,
        },
    );

    let mut monitor = Monitor::new(api, notifier);
    tracing::info!(
        "Monitoring {} every {}s",
        config.zones_url(),
        config.poll_interval().as_secs()
    );
    let exit = monitor
        .run(&mut session, config.poll_interval(), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    if exit == MonitorExit::SessionLost {
        tracing::error!("Session lost, log in again to resume monitoring");
        std::process::exit(1);
    }
}
