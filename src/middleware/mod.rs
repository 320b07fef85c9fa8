/*
 * Responsibility
 * - middlware の公開インターフェース (re-export)
 * - auth (bearer token / route gate), http (request-id / trace / limits / cors / security headers)
 * - audit (admin route を登録時に包む audit wrapper)
 */
pub mod audit;
pub mod auth;
pub mod http;
