use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ketoan_api::cache;
use ketoan_api::config;
use ketoan_api::database::manager::DatabaseManager;
use ketoan_api::handlers;
use ketoan_api::middleware::{jwt_auth_middleware, tenant_scope_middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, REDIS_URL, JWT_SECRET
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ketoan_api=info,tower_http=info".into()),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting ketoan API in {:?} mode", config.environment);

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("ketoan API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Protected planes
        .merge(auth_routes())
        .merge(tenant_routes())
        .merge(data_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/google", post(auth::login_google))
        .route("/auth/refresh", post(auth::refresh))
}

fn auth_routes() -> Router {
    use axum::routing::{delete, put};
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/session/refresh", put(auth::refresh_session))
        .route("/api/auth/session", delete(auth::logout))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

fn tenant_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::tenant;

    Router::new()
        .route(
            "/api/tenants",
            get(tenant::tenant_list).post(tenant::tenant_create),
        )
        .route(
            "/api/tenants/:id",
            get(tenant::tenant_show)
                .patch(tenant::tenant_update)
                .delete(tenant::tenant_delete),
        )
        .route("/api/tenants/:id/restore", post(tenant::tenant_restore))
        .route("/api/tenants/:id/select", post(tenant::tenant_select))
        .route(
            "/api/tenants/:id/onboarding",
            get(tenant::onboarding_show).put(tenant::onboarding_complete),
        )
        .layer(middleware::from_fn(jwt_auth_middleware))
}

fn data_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::protected::data::{accounts, opening_balances, partners, products};

    Router::new()
        // Chart of accounts
        .route(
            "/api/data/accounts",
            get(accounts::account_list).post(accounts::account_create),
        )
        .route("/api/data/accounts/import", post(accounts::account_import))
        .route(
            "/api/data/accounts/:code",
            get(accounts::account_get)
                .patch(accounts::account_update)
                .delete(accounts::account_delete),
        )
        .route(
            "/api/data/accounts/:code/restore",
            post(accounts::account_restore),
        )
        // Opening balances
        .route(
            "/api/data/opening-balances",
            get(opening_balances::period_list).post(opening_balances::period_create),
        )
        .route("/api/data/opening-balances/:id", get(opening_balances::period_show))
        .route(
            "/api/data/opening-balances/:id/lock",
            post(opening_balances::period_lock),
        )
        .route(
            "/api/data/opening-balances/:id/lines",
            get(opening_balances::line_list).put(opening_balances::line_upsert),
        )
        .route(
            "/api/data/opening-balances/:id/lines/:code",
            delete(opening_balances::line_delete),
        )
        // Customers and suppliers
        .route(
            "/api/data/partners",
            get(partners::partner_list).post(partners::partner_create),
        )
        .route(
            "/api/data/partners/:id",
            get(partners::partner_get)
                .patch(partners::partner_update)
                .delete(partners::partner_delete),
        )
        .route("/api/data/partners/:id/restore", post(partners::partner_restore))
        // Products
        .route(
            "/api/data/products",
            get(products::product_list).post(products::product_create),
        )
        .route(
            "/api/data/products/:id",
            get(products::product_get)
                .patch(products::product_update)
                .delete(products::product_delete),
        )
        .route("/api/data/products/:id/restore", post(products::product_restore))
        // Tenant scope runs after authentication
        .layer(middleware::from_fn(tenant_scope_middleware))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "ketoan API",
            "version": version,
            "description": "Multi-tenant ERP backend for Vietnamese SMBs",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login, /auth/google, /auth/refresh (public - token acquisition)",
                "auth": "/api/auth/* (protected - session management)",
                "tenants": "/api/tenants[/:id] (protected - tenant management and onboarding)",
                "data": "/api/data/* (protected - tenant token required)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    let cache_status = match cache::redis::health_check().await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Cache health check failed: {}", e);
            "degraded"
        }
    };

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "cache": cache_status,
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
                    "database_error": e.to_string(),
                    "cache": cache_status,
                }
            })),
        ),
    }
}
