use crate::config::RaffleConfig;
use crate::error::{AppError, AppResult};
use crate::models::{CreateEventRequest, EventConfigResponse};
use crate::utils::{campaign_link, generate_event_id};

/// 活动配置：生成活动ID与可分享链接。活动本身不在服务端持久化，由管理端保存。
#[derive(Clone)]
pub struct EventService {
    public_base_url: String,
    default_range: u32,
    max_range: u32,
    cross_site_cookie: bool,
}

impl EventService {
    pub fn new(config: &RaffleConfig) -> Self {
        Self {
            public_base_url: config.public_base_url.clone(),
            default_range: config.default_range,
            max_range: config.max_range,
            cross_site_cookie: config.cross_site_cookie,
        }
    }

    pub fn create_event(&self, request: &CreateEventRequest) -> AppResult<EventConfigResponse> {
        let range = request.range.unwrap_or(self.default_range);
        if range == 0 || range > self.max_range {
            return Err(AppError::ValidationError(format!(
                "Range must be within 1..={}",
                self.max_range
            )));
        }
        let event_id = generate_event_id(&request.project_name)?;
        let campaign_link = campaign_link(&self.public_base_url, &event_id, range);
        log::info!("Created event {event_id} with range {range}");
        Ok(EventConfigResponse {
            event_id,
            range,
            campaign_link,
        })
    }

    pub fn default_range(&self) -> u32 {
        self.default_range
    }

    /// 访客链接打开的前端是否与 API 跨站
    pub fn cross_site_cookie(&self) -> bool {
        self.cross_site_cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EventService {
        EventService::new(&RaffleConfig {
            public_base_url: "https://raffle.example.com".to_string(),
            ..RaffleConfig::default()
        })
    }

    #[test]
    fn test_create_event_builds_campaign_link() {
        let event = service()
            .create_event(&CreateEventRequest {
                project_name: "Spring Fair".to_string(),
                range: Some(200),
            })
            .unwrap();

        assert!(event.event_id.starts_with("spring-fair-"));
        assert_eq!(event.range, 200);
        assert_eq!(
            event.campaign_link,
            format!(
                "https://raffle.example.com/visitor/{}?range=200",
                event.event_id
            )
        );
    }

    #[test]
    fn test_create_event_defaults_range() {
        let event = service()
            .create_event(&CreateEventRequest {
                project_name: "demo".to_string(),
                range: None,
            })
            .unwrap();
        assert_eq!(event.range, 100);
    }

    #[test]
    fn test_create_event_rejects_bad_input() {
        let svc = service();
        assert!(
            svc.create_event(&CreateEventRequest {
                project_name: "   ".to_string(),
                range: Some(100),
            })
            .is_err()
        );
        assert!(
            svc.create_event(&CreateEventRequest {
                project_name: "demo".to_string(),
                range: Some(0),
            })
            .is_err()
        );
    }
}
