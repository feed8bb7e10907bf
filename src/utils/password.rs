use bcrypt::{hash, verify, DEFAULT_COST};
use crate::error::{AppError, AppResult};

/// 验证密码长度（演示登录，不做复杂度要求）
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 6 || password.len() > 128 {
        return Err(AppError::ValidationError(
            "Password must be between 6 and 128 characters".to_string(),
        ));
    }
    Ok(())
}

/// 对密码进行哈希
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "password";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong-password", &hashed).unwrap());
    }
}
