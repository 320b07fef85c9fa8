pub mod access;
pub mod route_policy;

pub use route_policy::{RouteClass, RoutePolicy};
