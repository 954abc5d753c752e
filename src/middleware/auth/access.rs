//! Bearer 認証 + scope 認可 → Principal を extensions に入れる
//!
//! - OPTIONS (CORS preflight) は認証も認可もせずに通す
//! - 認証失敗は 401、scope 不足 / 未登録 route は 403
//! - Principal はこのリクエストの extensions にだけ載せる (共有 state には置かない)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::GuardOutcome;
use crate::state::AppState;

/// 管理 API の Router に access middleware を掛ける。
///
/// nest する前の Router に適用するので、middleware から見える path は
/// base path を除いた相対 path (`/assets` など) になる。
///
/// ```ignore
/// let management = api::v1::routes();
/// let management = middleware::auth::access::apply(management, state.clone());
/// app = app.nest(&config.management_base_path, management);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Body は Sync ではないので、await を跨いで借用するのは parts だけにする
    let (mut parts, body) = req.into_parts();

    let outcome = state
        .guard
        .check(&parts.method, parts.uri.path(), &parts.headers)
        .await;

    match outcome {
        GuardOutcome::Preflight => Ok(next.run(Request::from_parts(parts, body)).await),
        GuardOutcome::Authorized(principal) => {
            // middleware → extractor への受け渡し
            parts.extensions.insert(principal);
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        GuardOutcome::Unauthenticated(err) => {
            tracing::warn!(
                error = %err,
                method = %parts.method,
                path = %parts.uri.path(),
                "authentication failed"
            );
            Err(AppError::Unauthorized)
        }
        GuardOutcome::Forbidden(reason) => {
            // 欠けている scope はログにだけ出す
            tracing::warn!(
                reason = %reason,
                method = %parts.method,
                path = %parts.uri.path(),
                "authorization denied"
            );
            Err(AppError::Forbidden)
        }
    }
}
