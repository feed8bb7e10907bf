use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// 已登录管理员（中间件在鉴权后注入请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity(pub String);

// 需要鉴权的路径前缀，其余路径（访客领号、登录、文档）均公开
struct ProtectedPaths {
    prefix_paths: Vec<&'static str>,
}

impl ProtectedPaths {
    fn new() -> Self {
        Self {
            prefix_paths: vec!["/api/v1/admin"],
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        self.prefix_paths
            .iter()
            .any(|&prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            protected_paths: ProtectedPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    protected_paths: ProtectedPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求与公开路径
        if req.method() == Method::OPTIONS || !self.protected_paths.is_protected(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_owned);

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        match self.jwt_service.verify_access_token(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(AdminIdentity(claims.sub));
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_paths_are_protected() {
        let paths = ProtectedPaths::new();
        assert!(paths.is_protected("/api/v1/admin"));
        assert!(paths.is_protected("/api/v1/admin/events"));
        assert!(!paths.is_protected("/api/v1/administrators"));
        assert!(!paths.is_protected("/api/v1/visitor/demo-ABC123"));
        assert!(!paths.is_protected("/api/v1/auth/login"));
        assert!(!paths.is_protected("/swagger-ui/"));
    }
}
