/*
 * Responsibility
 * - 管理 API 向け Bearer 認証 + scope 認可パイプライン
 * - binary (main.rs) と tests から使うためのモジュール公開
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
