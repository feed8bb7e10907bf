use actix_cors::Cors;

/// `allowed_origins` 为空时允许任意来源（本地开发），否则只允许列出的前端地址
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allowed_origin_fn(|_, _req_head| true)
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allow_any_header()
        // 访客号码保存在 Cookie 中，跨域请求需要携带凭据
        .supports_credentials()
        .max_age(3600)
}
