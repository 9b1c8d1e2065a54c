//! clinic-billing service entrypoint
//!
//! Wires configuration, PostgreSQL adapters, the Asaas client and the
//! automation notifier into the HTTP router, then serves it.

use std::sync::Arc;

use axum::Router;
use http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clinic_billing::adapters::asaas::AsaasBillingAdapter;
use clinic_billing::adapters::auth::{JwtConfig, JwtSessionValidator};
use clinic_billing::adapters::http::{app_router, AuthState, SubscriptionAppState};
use clinic_billing::adapters::notifier::HttpAutomationNotifier;
use clinic_billing::adapters::postgres::{
    PostgresClinicDirectory, PostgresNotificationLog, PostgresSettingsReader,
    PostgresSubscriptionRepository,
};
use clinic_billing::application::AutomationForwarder;
use clinic_billing::config::{AppConfig, ServerConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        sandbox = config.billing.is_sandbox(),
        "Starting clinic-billing"
    );

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let clinics = Arc::new(PostgresClinicDirectory::new(pool.clone()));
    let notifier = HttpAutomationNotifier::new(config.notifier.timeout())?;
    let forwarder = AutomationForwarder::new(
        Arc::new(PostgresSettingsReader::new(pool.clone())),
        clinics.clone(),
        Arc::new(notifier),
        Arc::new(PostgresNotificationLog::new(pool.clone())),
    )
    .with_settings_key(config.notifier.settings_key.clone())
    .with_fallback_url(config.notifier.fallback_url.clone());

    let webhook_token = config.billing.webhook_token();
    if webhook_token.is_none() {
        tracing::warn!("No webhook token configured; Asaas webhooks are not authenticated");
    }

    let state = SubscriptionAppState {
        subscription_repository: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        billing_provider: Arc::new(AsaasBillingAdapter::new(config.billing.asaas())?),
        clinic_directory: clinics,
        forwarder: Arc::new(forwarder),
        webhook_token,
    };

    let auth: AuthState = Arc::new(JwtSessionValidator::new(
        JwtConfig::new(config.auth.jwt_secret.clone())
            .with_audience(config.auth.jwt_audience.clone()),
    ));

    let app = with_layers(app_router(state, auth), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "clinic-billing listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins
/// over the configured level.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn with_layers(app: Router, server: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    app.layer(cors_layer(server))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
