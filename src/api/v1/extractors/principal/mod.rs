/*!
 * Principal extractor
 *
 * Responsibility:
 * - access middleware が検証した Principal を handler に渡す
 * - 型 (Principal) は services::auth 側に置き、ここは axum の受け口だけ
 */

mod core;

pub use self::core::PrincipalExtractor;
