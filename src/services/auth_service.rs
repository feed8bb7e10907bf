use std::sync::Arc;

use crate::config::AdminUserConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::store::{StoreError, UserStore};
use crate::utils::{JwtService, hash_password, validate_password, verify_password};

/// 管理员登录（演示用途，不构成安全边界）
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_service: JwtService) -> Self {
        Self { users, jwt_service }
    }

    /// 启动时写入配置中的初始账号（已存在则跳过）
    pub async fn seed_users(&self, seeds: &[AdminUserConfig]) -> AppResult<usize> {
        let mut created = 0;
        for seed in seeds {
            let email = normalize_email(&seed.email)?;
            if self.users.find_by_email(&email).await?.is_some() {
                continue;
            }
            let password_hash = hash_password(&seed.password)?;
            match self.users.insert(&email, &password_hash).await {
                Ok(_) => created += 1,
                // 多实例同时启动时可能被其它实例抢先写入
                Err(StoreError::Conflict) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(created)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        log::info!("Admin {} logged in", user.email);
        self.issue_token(&user.email)
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;
        let user = match self.users.insert(&email, &password_hash).await {
            Ok(user) => user,
            Err(StoreError::Conflict) => {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        log::info!("Registered admin {}", user.email);
        self.issue_token(&user.email)
    }

    fn issue_token(&self, email: &str) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            email: email.to_string(),
            access_token: self.jwt_service.generate_access_token(email)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::ValidationError("Invalid email address".to_string())),
    }
}
