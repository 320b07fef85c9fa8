use axum::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
    AdminOnly,
}

/// Static path-prefix classification, recomputed per request.
///
/// Paths are relative to the router the auth middleware is applied to
/// (`/api/v1` is already stripped).
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    public_prefixes: Vec<&'static str>,
    admin_prefixes: Vec<&'static str>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public_prefixes: vec!["/auth", "/health"],
            admin_prefixes: vec!["/admin"],
        }
    }
}

impl RoutePolicy {
    pub fn new(public_prefixes: Vec<&'static str>, admin_prefixes: Vec<&'static str>) -> Self {
        Self {
            public_prefixes,
            admin_prefixes,
        }
    }

    pub fn classify(&self, method: &Method, path: &str) -> RouteClass {
        // CORS preflight never carries credentials
        if method == Method::OPTIONS {
            return RouteClass::Public;
        }
        if self.public_prefixes.iter().any(|p| has_prefix(path, p)) {
            return RouteClass::Public;
        }
        if self.admin_prefixes.iter().any(|p| has_prefix(path, p)) {
            return RouteClass::AdminOnly;
        }
        RouteClass::Protected
    }
}

// "/admin" matches "/admin" and "/admin/..", not "/administrators".
fn has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
