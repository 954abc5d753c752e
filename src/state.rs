/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - 中身は読み取り専用 (AccessGuard は起動時に一度だけ組み立てる)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::auth::AccessGuard;

#[derive(Clone, Debug)]
pub struct AppState {
    pub guard: Arc<AccessGuard>,
}

impl AppState {
    pub fn new(guard: Arc<AccessGuard>) -> Self {
        Self { guard }
    }
}
