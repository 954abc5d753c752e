/*
 * Responsibility
 * - 管理 API の各 route の受け口
 * - 実際の asset / contract などの処理は別コンポーネントが持つ。ここは
 *   認可を通過したリクエストの route と principal を返すだけ
 */
use axum::{
    Json,
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use crate::api::v1::extractors::PrincipalExtractor;

pub async fn accepted(
    method: Method,
    OriginalUri(uri): OriginalUri,
    PrincipalExtractor(principal): PrincipalExtractor,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "subject": principal.subject(),
            "scopes": principal.scopes(),
        })),
    )
}

pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
