/*
 * Responsibility
 * - 管理 API (data management) の URL 構造を定義
 * - ここで定義する route は scope table と 1:1 に対応させる
 * - 認証/認可は app.rs 側で access middleware を layer として掛ける
 */
use axum::{
    Router,
    routing::{MethodRouter, options},
};

use crate::state::AppState;

use crate::api::v1::handlers::management::{accepted, preflight};

// OPTIONS is registered on every route so non-CORS preflights get a 2xx
// instead of 405.
fn resource() -> MethodRouter<AppState> {
    options(preflight)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets", resource().get(accepted).post(accepted).delete(accepted))
        .route("/catalog", resource().get(accepted))
        .route("/contractagreements", resource().get(accepted))
        .route(
            "/contractdefinitions",
            resource().get(accepted).post(accepted).delete(accepted),
        )
        .route("/contractnegotiations", resource().get(accepted).post(accepted))
        .route(
            "/policydefinitions",
            resource().get(accepted).post(accepted).delete(accepted),
        )
        .route("/transferprocess", resource().get(accepted).post(accepted))
}
