use actix_web::{App, HttpServer, middleware::Logger, web};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines
use std::sync::Arc;

use raffle_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    store::{MemoryUserStore, NumberStore, SeaOrmNumberStore, SeaOrmUserStore, UserStore},
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);

    // 存储
    let number_store: Arc<dyn NumberStore> = Arc::new(SeaOrmNumberStore::new(pool.clone()));
    let user_store: Arc<dyn UserStore> = if config.admin.persistent_users {
        Arc::new(SeaOrmUserStore::new(pool.clone()))
    } else {
        log::warn!("Admin accounts are kept in memory and will be lost on restart");
        Arc::new(MemoryUserStore::new())
    };

    // 创建服务
    let allocator = Arc::new(NumberAllocator::new(number_store.clone(), &config.raffle));
    let visitor_service = VisitorService::new(allocator.clone());
    let draw_service = DrawService::new(number_store.clone());
    let event_service = EventService::new(&config.raffle);
    let auth_service = AuthService::new(user_store, jwt_service.clone());

    match auth_service.seed_users(&config.admin.users).await {
        Ok(created) if created > 0 => log::info!("Seeded {created} admin account(s)"),
        Ok(_) => {}
        Err(e) => log::error!("Failed to seed admin accounts: {e}"),
    }

    log::info!(
        "Number allocation strategy: {:?} (max attempts {})",
        allocator.strategy(),
        config.raffle.max_attempts
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let cors_allowed_origins = config.server.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&cors_allowed_origins))
            .app_data(web::Data::new(visitor_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
