use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub raffle: RaffleConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域访问的前端地址，为空时不限制
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

/// 号码分配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// 顺序扫描：总是分配最小的未占用号码
    #[default]
    Sequential,
    /// 随机探测：在范围内随机抽取，尝试次数上限 2 × range
    RandomProbe,
}

impl std::str::FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random_probe" | "random-probe" | "random" => Ok(Self::RandomProbe),
            other => Err(format!("unknown allocation strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaffleConfig {
    #[serde(default)]
    pub strategy: AllocationStrategy,
    /// 顺序扫描策略的最大重试次数（随机探测固定为 2 × range）
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 链接中缺失或无法解析 range 时使用的默认值
    #[serde(default = "default_range")]
    pub default_range: u32,
    /// 单个活动允许的最大 range（限制顺序扫描的开销）
    #[serde(default = "default_max_range")]
    pub max_range: u32,
    /// 生成活动链接时使用的前端地址
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// 前端与 API 不在同一站点时开启：号码 Cookie 以 `SameSite=None; Secure` 下发
    #[serde(default)]
    pub cross_site_cookie: bool,
}

fn default_max_attempts() -> u32 {
    25
}

fn default_range() -> u32 {
    100
}

fn default_max_range() -> u32 {
    100_000
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::default(),
            max_attempts: default_max_attempts(),
            default_range: default_range(),
            max_range: default_max_range(),
            public_base_url: default_public_base_url(),
            cross_site_cookie: false,
        }
    }
}

/// 管理员账号（演示用途，非安全边界）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// 为 true 时管理员账号保存在数据库中，否则仅保存在进程内存
    #[serde(default)]
    pub persistent_users: bool,
    /// 启动时写入用户存储的初始账号
    #[serde(default)]
    pub users: Vec<AdminUserConfig>,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        cors_allowed_origins: Vec::new(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    raffle: RaffleConfig::default(),
                    admin: AdminConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("failed to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| format!("failed to parse config file: {e}"))?;
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = get_env("SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = p;
        }
        if let Some(v) = get_env("CORS_ALLOWED_ORIGINS") {
            self.server.cors_allowed_origins = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(v) = get_env("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(mc) = get_env("DB_MAX_CONNECTIONS").and_then(|v| v.parse().ok()) {
            self.database.max_connections = mc;
        }
        if let Some(v) = get_env("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(n) = get_env("JWT_ACCESS_EXPIRES_IN").and_then(|v| v.parse().ok()) {
            self.jwt.access_token_expires_in = n;
        }

        // Raffle
        if let Some(s) = get_env("RAFFLE_STRATEGY") {
            match s.parse() {
                Ok(strategy) => self.raffle.strategy = strategy,
                Err(e) => log::warn!("Ignoring RAFFLE_STRATEGY: {e}"),
            }
        }
        if let Some(n) = get_env("RAFFLE_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.raffle.max_attempts = n;
        }
        if let Some(n) = get_env("RAFFLE_DEFAULT_RANGE").and_then(|v| v.parse().ok()) {
            self.raffle.default_range = n;
        }
        if let Some(n) = get_env("RAFFLE_MAX_RANGE").and_then(|v| v.parse().ok()) {
            self.raffle.max_range = n;
        }
        if let Some(v) = get_env("RAFFLE_PUBLIC_BASE_URL") {
            self.raffle.public_base_url = v;
        }
        if let Some(b) = get_env("RAFFLE_CROSS_SITE_COOKIE").and_then(|v| v.parse().ok()) {
            self.raffle.cross_site_cookie = b;
        }

        // Admin
        if let Some(b) = get_env("ADMIN_PERSISTENT_USERS").and_then(|v| v.parse().ok()) {
            self.admin.persistent_users = b;
        }
        if let (Some(email), Some(password)) = (get_env("ADMIN_EMAIL"), get_env("ADMIN_PASSWORD"))
        {
            self.admin.users.push(AdminUserConfig { email, password });
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.raffle.max_attempts == 0 {
            return Err("raffle.max_attempts must be at least 1".into());
        }
        if self.raffle.default_range == 0 || self.raffle.default_range > self.raffle.max_range {
            return Err(format!(
                "raffle.default_range must be within 1..={}",
                self.raffle.max_range
            )
            .into());
        }
        Ok(())
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
