/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 認証 + scope 認可, cors, http (request id / trace / limit / timeout)
 */
pub mod auth;
pub mod cors;
pub mod http;
