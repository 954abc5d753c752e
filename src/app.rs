/*
 * Responsibility
 * - tracing 初期化 → Config 読み込み → AccessGuard 生成 → Router 組み立て
 * - Middleware の適用 (access / CORS / http)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware;
use crate::services::auth::{build_access_guard, clock::SystemClock};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,mgmt_api_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting management API in {:?} mode on {} (base path {})",
        config.app_env,
        config.addr,
        config.management_base_path
    );

    let guard = build_access_guard(&config.auth, Arc::new(SystemClock))?;
    let state = AppState::new(Arc::new(guard));

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let management = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .nest(&config.management_base_path, management)
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use crate::services::auth::test_support::{ISSUER, bearer, guard, settings, valid_claims};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            management_base_path: "/api/v1/data".to_string(),
            http_request_timeout: Duration::from_secs(30),
            http_body_limit_bytes: 1024 * 1024,
            auth: settings(),
        };
        build_router(AppState::new(Arc::new(guard())), &config)
    }

    fn request(method: Method, path: &str, authorization: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn get_assets_with_read_scope_is_allowed() {
        let req = request(
            Method::GET,
            "/api/v1/data/assets",
            Some(bearer(valid_claims(&["tenant.assetRead"]))),
        );
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["path"], "/api/v1/data/assets");
        assert_eq!(body["subject"], "client-1");
        assert_eq!(body["scopes"], json!(["assetRead"]));
    }

    #[tokio::test]
    async fn post_assets_with_read_scope_is_forbidden() {
        let req = request(
            Method::POST,
            "/api/v1/data/assets",
            Some(bearer(valid_claims(&["tenant.assetRead"]))),
        );
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // missing scopes stay out of the body
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert!(!body.to_string().contains("assetWrite"));
    }

    #[tokio::test]
    async fn get_assets_without_header_is_unauthorized() {
        let resp = app()
            .oneshot(request(Method::GET, "/api/v1/data/assets", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn issued_after_expiration_is_unauthorized() {
        let now = chrono::Utc::now().timestamp();
        let token = bearer(json!({
            "iss": ISSUER,
            "sub": "client-1",
            "iat": now + 100,
            "exp": now + 50,
            "scope": ["tenant.assetRead"],
        }));

        let resp = app()
            .oneshot(request(Method::GET, "/api/v1/data/assets", Some(token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn options_without_header_passes() {
        let resp = app()
            .oneshot(request(Method::OPTIONS, "/api/v1/data/assets", None))
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let now = chrono::Utc::now().timestamp();
        let token = bearer(json!({
            "iss": ISSUER,
            "iat": now - 7200,
            "exp": now - 3600,
            "scope": ["tenant.assetRead"],
        }));

        let resp = app()
            .oneshot(request(Method::GET, "/api/v1/data/assets", Some(token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_needs_no_credentials() {
        let resp = app()
            .oneshot(request(Method::GET, "/health", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn full_scope_set_reaches_every_mapped_route() {
        let token = bearer(valid_claims(&[
            "t.contractNegotiationRead",
            "t.contractNegotiationWrite",
        ]));

        for method in [Method::GET, Method::POST] {
            let resp = app()
                .oneshot(request(
                    method,
                    "/api/v1/data/contractnegotiations",
                    Some(token.clone()),
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }
}
