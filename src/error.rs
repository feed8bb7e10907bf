use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// 范围内所有号码均已分配，只有调整 range 才能继续
    #[error("All numbers in 1..={range} are already assigned for event {event_id}")]
    RangeExhausted { event_id: String, range: u32 },

    /// 竞争过于激烈，在尝试次数上限内未能分配号码（用户可刷新重试）
    #[error("Could not allocate a number for event {event_id} (range {range}) after {attempts} attempts")]
    AllocationFailed {
        event_id: String,
        range: u32,
        attempts: u32,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            // 条件插入冲突应由调用方自行处理；走到这里说明是非预期的重复写入
            StoreError::Conflict => AppError::Conflict("Record already exists".to_string()),
        }
    }
}

impl AppError {
    /// 对外暴露的错误码，前端据此区分展示方式
    pub fn code(&self) -> &'static str {
        match self {
            AppError::RangeExhausted { .. } => "RANGE_EXHAUSTED",
            AppError::AllocationFailed { .. } => "ALLOCATION_FAILED",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::RangeExhausted { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AllocationFailed { .. } | AppError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                "Invalid access token".to_string()
            }
            AppError::Conflict(msg) => {
                log::warn!("Conflict: {msg}");
                msg.clone()
            }
            AppError::RangeExhausted { event_id, range } => {
                log::warn!("Range exhausted for event {event_id} (range {range})");
                self.to_string()
            }
            AppError::AllocationFailed { .. } => {
                log::warn!("{self}");
                self.to_string()
            }
            AppError::StoreUnavailable(msg) => {
                log::error!("Store unavailable: {msg}");
                "Connection error, please retry".to_string()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_errors_are_distinguishable() {
        let exhausted = AppError::RangeExhausted {
            event_id: "demo-ABC123".to_string(),
            range: 3,
        };
        let failed = AppError::AllocationFailed {
            event_id: "demo-ABC123".to_string(),
            range: 3,
            attempts: 6,
        };
        let unavailable: AppError = StoreError::Unavailable("timeout".to_string()).into();

        assert_eq!(exhausted.code(), "RANGE_EXHAUSTED");
        assert_eq!(exhausted.status_code(), StatusCode::CONFLICT);
        assert_eq!(failed.code(), "ALLOCATION_FAILED");
        assert_eq!(failed.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.code(), "STORE_UNAVAILABLE");
        assert!(exhausted.to_string().contains("demo-ABC123"));
    }
}
