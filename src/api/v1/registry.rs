/*
 * Responsibility
 * - /api/v1 の route 登録を一か所に集める typed builder
 * - 「Identity を注入する」宣言と handler の実際の引数 (extractor tuple) の整合性を起動時に検証する
 * - audited route は登録時に admin audit wrapper (middleware::audit) で包む
 *
 * 不整合は BindingError::ConfigurationMismatch として返し、route は登録されない。
 * (request 時に黙って失敗させない)
 */
use std::any::{TypeId, type_name};
use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{MethodFilter, on};
use axum::Router;
use tracing::{debug, error};

use crate::api::v1::extractors::CurrentIdentity;
use crate::middleware::audit;
use crate::middleware::auth::{RouteClass, RoutePolicy};
use crate::services::audit::{AdminAudit, AuditScope};
use crate::services::auth::Identity;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("configuration mismatch on {method} {route}: {reason}")]
    ConfigurationMismatch {
        method: Method,
        route: &'static str,
        reason: &'static str,
    },
}

/// A handler parameter type, so identity-shaped parameters can be told apart
/// from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamShape {
    id: TypeId,
    name: &'static str,
}

impl ParamShape {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn is_identity(&self) -> bool {
        self.id == TypeId::of::<CurrentIdentity>() || self.id == TypeId::of::<Identity>()
    }
}

/// Parameter shapes of a handler, read from the extractor tuple axum's
/// `Handler<T, S>` is implemented for: `((),)` for no arguments,
/// `(M, T1, .., Tn)` otherwise (`M` is axum's extraction marker).
pub trait HandlerParams {
    fn shapes() -> Vec<ParamShape>;
}

impl HandlerParams for ((),) {
    fn shapes() -> Vec<ParamShape> {
        Vec::new()
    }
}

macro_rules! impl_handler_params {
    ($($ty:ident),+) => {
        impl<M, $($ty: 'static,)+> HandlerParams for (M, $($ty,)+) {
            fn shapes() -> Vec<ParamShape> {
                vec![$(ParamShape::of::<$ty>(),)+]
            }
        }
    };
}

impl_handler_params!(T1);
impl_handler_params!(T1, T2);
impl_handler_params!(T1, T2, T3);
impl_handler_params!(T1, T2, T3, T4);
impl_handler_params!(T1, T2, T3, T4, T5);
impl_handler_params!(T1, T2, T3, T4, T5, T6);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15);
impl_handler_params!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16);

/// Declaration of a single route, handed to [`RouteRegistry::register`]
/// together with its handler.
///
/// ```ignore
/// RouteDecl::patch("/admin/users/{user_id}/role")
///     .inject_identity()
///     .audited()
/// ```
#[derive(Debug, Clone)]
pub struct RouteDecl {
    method: Method,
    path: &'static str,
    injects_identity: bool,
    audited: bool,
}

impl RouteDecl {
    pub fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            injects_identity: false,
            audited: false,
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &'static str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: &'static str) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: &'static str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Capability marker: the handler wants the verified identity injected.
    pub fn inject_identity(mut self) -> Self {
        self.injects_identity = true;
        self
    }

    /// Wrap the handler with the admin audit interceptor.
    pub fn audited(mut self) -> Self {
        self.audited = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    fn mismatch(&self, reason: &'static str) -> BindingError {
        BindingError::ConfigurationMismatch {
            method: self.method.clone(),
            route: self.path,
            reason,
        }
    }

    /// Checks the declaration against the handler's parameters and against how
    /// `policy` classifies its path.
    pub fn validate(&self, params: &[ParamShape], policy: &RoutePolicy) -> Result<(), BindingError> {
        let takes_identity = params.iter().any(ParamShape::is_identity);
        let class = policy.classify(&self.method, self.path);

        if self.injects_identity && !takes_identity {
            return Err(self.mismatch("identity injection requested but no identity parameter"));
        }
        if takes_identity && !self.injects_identity {
            return Err(self.mismatch("identity parameter without identity injection"));
        }
        if self.injects_identity && class == RouteClass::Public {
            return Err(self.mismatch("public routes carry no identity"));
        }
        if self.audited && class != RouteClass::AdminOnly {
            return Err(self.mismatch("only admin routes can be audited"));
        }
        Ok(())
    }
}

pub struct RouteRegistry {
    policy: Arc<RoutePolicy>,
    audit: AdminAudit,
    router: Router<AppState>,
    registered: Vec<(Method, &'static str)>,
}

impl RouteRegistry {
    pub fn new(policy: Arc<RoutePolicy>, audit: AdminAudit) -> Self {
        Self {
            policy,
            audit,
            router: Router::new(),
            registered: Vec::new(),
        }
    }

    pub fn register<H, T>(mut self, decl: RouteDecl, handler: H) -> Result<Self, BindingError>
    where
        H: Handler<T, AppState>,
        T: HandlerParams + 'static,
    {
        let params = T::shapes();
        if let Err(err) = decl.validate(&params, &self.policy) {
            error!(
                %err,
                params = ?params.iter().map(ParamShape::name).collect::<Vec<_>>(),
                "route registration refused"
            );
            return Err(err);
        }

        let filter = MethodFilter::try_from(decl.method.clone())
            .map_err(|_| decl.mismatch("unroutable method"))?;

        // axum panics on overlapping method routes; report it instead.
        if self
            .registered
            .iter()
            .any(|(m, p)| *m == decl.method && *p == decl.path)
        {
            return Err(decl.mismatch("route registered twice"));
        }

        let mut method_router = on(filter, handler);
        if decl.audited {
            method_router =
                audit::wrap(method_router, self.audit.clone(), AuditScope::admin(decl.path));
        }

        debug!(
            method = %decl.method,
            path = decl.path,
            identity = decl.injects_identity,
            audited = decl.audited,
            "route registered"
        );

        self.registered.push((decl.method.clone(), decl.path));
        self.router = self.router.route(decl.path, method_router);
        Ok(self)
    }

    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}
