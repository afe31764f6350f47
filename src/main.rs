use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use storehub_api::database::manager::DatabaseManager;
use storehub_api::domains::verify::resolver_dns::ResolverDns;
use storehub_api::domains::DomainVerifier;
use storehub_api::handlers;
use storehub_api::middleware::auth::jwt_auth_middleware;
use storehub_api::middleware::cors::cors_middleware;
use storehub_api::middleware::tenant::resolve_tenant_middleware;
use storehub_api::state::AppState;
use storehub_api::tenant::PgTenantDirectory;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = storehub_api::config::config();
    tracing::info!(
        "Starting StoreHub API in {:?} mode for platform root {}",
        config.environment,
        config.platform.root_domain
    );

    let pool = DatabaseManager::pool()
        .await
        .unwrap_or_else(|e| panic!("failed to connect database: {}", e));

    let directory = Arc::new(PgTenantDirectory::new(pool.clone()));
    let verifier = Arc::new(DomainVerifier::new(
        Box::new(ResolverDns::new()),
        config.platform.clone(),
    ));
    let state = AppState::new(pool, directory, verifier);

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("STOREHUB_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("StoreHub API listening on http://{}", bind_addr);

    // ConnectInfo feeds the resolver's trusted-peer check for the
    // X-Original-Host override header
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}

fn app(state: AppState) -> Router {
    // Dashboard routes are reachable both directly (subdomain / custom
    // domain Hosts) and under a /:tenant path prefix on the platform root.
    let api = api_routes();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(handlers::public::auth::register))
        .route("/auth/login", post(handlers::public::auth::login))
        .merge(api.clone())
        .nest("/:tenant", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_tenant_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use handlers::dashboard::{domains, settings};

    let protected = Router::new()
        .route("/api/auth/whoami", get(handlers::whoami::whoami))
        .route("/api/settings", get(settings::get_settings))
        .route("/api/settings/subdomain", put(settings::update_subdomain))
        .route(
            "/api/settings/domain",
            post(domains::request_domain).delete(domains::clear_domain),
        )
        .route("/api/settings/domain/check", post(domains::check_domain))
        .route("/api/admin/tenants", get(handlers::admin::list_tenants))
        .layer(middleware::from_fn(jwt_auth_middleware));

    Router::new()
        .route("/api/store", get(handlers::store::store_info))
        .merge(protected)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "StoreHub API",
            "version": version,
            "description": "Multi-tenant storefront platform API",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public)",
                "store": "/api/store (public, tenant-scoped)",
                "settings": "/api/settings[/subdomain|/domain] (protected, tenant-scoped)",
                "whoami": "/api/auth/whoami (protected)",
                "admin": "/api/admin/tenants (protected, platform admin)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
