use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::visitor::get_event_number,
        handlers::visitor::get_default_number,
        handlers::auth::login,
        handlers::auth::register,
        handlers::admin::create_event,
        handlers::admin::list_entries,
        handlers::admin::draw_winner,
        handlers::admin::clear_entries,
    ),
    components(
        schemas(
            NumberRecord,
            AssignmentResponse,
            CreateEventRequest,
            EventConfigResponse,
            EntryListResponse,
            DrawResponse,
            ClearEntriesResponse,
            LoginRequest,
            RegisterRequest,
            AuthResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "visitor", description = "Visitor number assignment API"),
        (name = "admin", description = "Event, entries and draw API"),
        (name = "auth", description = "Admin authentication API"),
    ),
    info(
        title = "Raffle Backend API",
        version = "0.1.0",
        description = "Raffle ticketing REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_visitor_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/visitor/{event_id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/admin/events/{event_id}/draw"));
    }
}
