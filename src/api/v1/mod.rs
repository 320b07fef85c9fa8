/*
 * Responsibility
 * - v1 の公開ポイント (router() / BindingError の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod registry;
mod routes;

pub use registry::BindingError;
pub use routes::router;
