use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use crate::models::*;
use crate::services::{CookieAssignmentCache, EventService, VisitorService};
use crate::utils::{normalize_event_id, parse_range};

#[utoipa::path(
    get,
    path = "/visitor/{event_id}",
    tag = "visitor",
    params(
        ("event_id" = String, Path, description = "活动ID (URL 安全字符)"),
        VisitorQuery
    ),
    responses(
        (status = 200, description = "领取号码成功", body = AssignmentResponse),
        (status = 400, description = "活动ID非法"),
        (status = 409, description = "号码已全部分配 (RANGE_EXHAUSTED)"),
        (status = 503, description = "竞争失败或存储不可用 (ALLOCATION_FAILED / STORE_UNAVAILABLE)")
    )
)]
/// 访客领取号码：同一浏览器重复访问返回同一号码（Cookie 缓存），否则分配新号码
pub async fn get_event_number(
    visitor_service: web::Data<VisitorService>,
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<VisitorQuery>,
) -> Result<HttpResponse> {
    Ok(assign(&visitor_service, &event_service, &req, Some(path.as_str()), &query).await)
}

#[utoipa::path(
    get,
    path = "/visitor",
    tag = "visitor",
    params(VisitorQuery),
    responses(
        (status = 200, description = "为默认活动领取号码成功", body = AssignmentResponse),
        (status = 409, description = "号码已全部分配 (RANGE_EXHAUSTED)"),
        (status = 503, description = "竞争失败或存储不可用")
    )
)]
/// 未带活动ID的链接，使用默认活动 "default"
pub async fn get_default_number(
    visitor_service: web::Data<VisitorService>,
    event_service: web::Data<EventService>,
    req: HttpRequest,
    query: web::Query<VisitorQuery>,
) -> Result<HttpResponse> {
    Ok(assign(&visitor_service, &event_service, &req, None, &query).await)
}

async fn assign(
    visitor_service: &VisitorService,
    event_service: &EventService,
    req: &HttpRequest,
    event_id: Option<&str>,
    query: &VisitorQuery,
) -> HttpResponse {
    let event_id = match normalize_event_id(event_id) {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };
    let range = parse_range(query.range.as_deref(), event_service.default_range());

    let mut cache =
        CookieAssignmentCache::from_request(req).cross_site(event_service.cross_site_cookie());
    match visitor_service
        .get_my_number(&mut cache, &event_id, range)
        .await
    {
        Ok(assignment) => {
            let mut response = HttpResponse::Ok();
            for cookie in cache.cookies() {
                response.cookie(cookie);
            }
            response.json(ApiResponse::success(AssignmentResponse {
                event_id: assignment.event_id,
                number: assignment.number,
                range: assignment.range,
                reused: assignment.reused,
            }))
        }
        Err(e) => e.error_response(),
    }
}

/// 路由配置
pub fn visitor_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/visitor")
            .route("", web::get().to(get_default_number))
            .route("/{event_id}", web::get().to(get_event_number)),
    );
}
