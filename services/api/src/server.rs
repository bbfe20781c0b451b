use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use leadgate::chat::ChatClient;
use leadgate::config::{AppConfig, AppEnvironment};
use leadgate::error::AppError;
use leadgate::leads::{
    ContactPolicy, ContactService, JsonFileStore, NotificationDispatcher, RecaptchaClient,
    ResendMailer,
};
use leadgate::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{AdminSessions, AppState};
use crate::routes::site_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let store = Arc::new(JsonFileStore::open(&config.store.path)?);
    let mailer = config
        .mail
        .api_key
        .as_deref()
        .map(|key| Arc::new(ResendMailer::new(key, config.mail.from_address.as_str())));
    let dispatcher = NotificationDispatcher::new(mailer, config.mail.operator_address.clone());
    let verifier = config
        .captcha
        .secret
        .as_deref()
        .map(|secret| Arc::new(RecaptchaClient::new(secret)));

    let service = Arc::new(ContactService::new(
        ContactPolicy {
            country_prefix: config.contact.country_prefix.clone(),
            email_domain: config.contact.email_domain.clone(),
        },
        store,
        dispatcher,
        verifier,
        config.captcha.score_threshold,
    ));

    let chat = config
        .chat
        .api_key
        .as_deref()
        .map(|key| Arc::new(ChatClient::new(key, config.chat.model.as_str())));

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        sessions: Arc::new(AdminSessions::default()),
        admin: config.admin.credentials.clone(),
        chat,
        secure_cookies: config.environment == AppEnvironment::Production,
    };

    let app = site_router(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, store = %config.store.path.display(), "lead capture service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
