pub mod admin;
pub mod auth;
pub mod visitor;

pub use admin::admin_config;
pub use auth::auth_config;
pub use visitor::visitor_config;

use actix_web::web;

/// `/api/v1` 下的全部路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(visitor_config)
            .configure(auth_config)
            .configure(admin_config),
    );
}
