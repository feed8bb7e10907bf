use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::middlewares::AdminIdentity;
use crate::models::*;
use crate::services::{DrawService, EventService};
use crate::utils::normalize_event_id;

#[utoipa::path(
    post,
    path = "/admin/events",
    tag = "admin",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动创建成功，返回活动ID与链接", body = EventConfigResponse),
        (status = 400, description = "项目名称或范围非法"),
        (status = 401, description = "未授权")
    )
)]
/// 创建活动配置：生成活动ID与可分享的访客链接（二维码由前端渲染）
pub async fn create_event(
    event_service: web::Data<EventService>,
    request: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    match event_service.create_event(&request) {
        Ok(event) => Ok(HttpResponse::Ok().json(ApiResponse::success(event))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/events/{event_id}/entries",
    tag = "admin",
    params(("event_id" = String, Path, description = "活动ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取参与记录成功", body = EntryListResponse),
        (status = 401, description = "未授权"),
        (status = 503, description = "存储不可用")
    )
)]
/// 获取活动的全部参与号码（按号码升序）
pub async fn list_entries(
    draw_service: web::Data<DrawService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let event_id = match normalize_event_id(Some(path.as_str())) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match draw_service.list_entries(&event_id).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(ApiResponse::success(EntryListResponse {
            event_id,
            total: entries.len(),
            entries,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/events/{event_id}/draw",
    tag = "admin",
    params(("event_id" = String, Path, description = "活动ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖完成；没有参与记录时 winner 为 null", body = DrawResponse),
        (status = 401, description = "未授权"),
        (status = 503, description = "存储不可用")
    )
)]
/// 从活动的参与号码中等概率抽取一名中奖者（可重复抽中）
pub async fn draw_winner(
    draw_service: web::Data<DrawService>,
    admin: web::ReqData<AdminIdentity>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let event_id = match normalize_event_id(Some(path.as_str())) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    log::info!("Admin {} requested a draw for event {event_id}", admin.0);
    match draw_service.draw_winner(&event_id).await {
        Ok((total_entries, winner)) => {
            let empty = winner.is_none();
            let response = ApiResponse::success(DrawResponse {
                event_id,
                total_entries,
                winner,
            });
            let response = if empty {
                response.with_message("No entries to draw from")
            } else {
                response
            };
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/events/{event_id}/entries",
    tag = "admin",
    params(("event_id" = String, Path, description = "活动ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "清空成功", body = ClearEntriesResponse),
        (status = 401, description = "未授权"),
        (status = 503, description = "存储不可用")
    )
)]
/// 清空活动的全部号码（不可恢复，确认提示由前端负责）
pub async fn clear_entries(
    draw_service: web::Data<DrawService>,
    admin: web::ReqData<AdminIdentity>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let event_id = match normalize_event_id(Some(path.as_str())) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    log::warn!("Admin {} is clearing all entries of event {event_id}", admin.0);
    match draw_service.clear_entries(&event_id).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(ClearEntriesResponse { event_id, deleted })
                .with_message("All entries cleared"),
        )),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/events", web::post().to(create_event))
            .route("/events/{event_id}/entries", web::get().to(list_entries))
            .route("/events/{event_id}/entries", web::delete().to(clear_entries))
            .route("/events/{event_id}/draw", web::post().to(draw_winner)),
    );
}
