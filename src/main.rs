//! 估值数据后端服务
//!
//! 为前端估值计算器提供单一接口 GET /datos?ticker=<代码>
//! 数据来源：Yahoo Finance quoteSummary、行业页面抓取

mod config;     // 配置
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::middleware::permissive_cors;
use crate::services::sector_pe;
use crate::services::valuation_service::ValuationService;
use crate::services::yahoo::YahooClient;

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器，默认监听 0.0.0.0:8080
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let loaded = AppConfig::load();
    let config = loaded.config;

    // 初始化日志系统，RUST_LOG 优先，否则使用配置中的级别
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    for warning in &loaded.warnings {
        log::warn!("{}", warning);
    }
    log::info!("配置来源: {}", loaded.source);

    let service = web::Data::new(ValuationService::new(
        Arc::new(YahooClient::new(config.provider.clone())),
        sector_pe::from_config(&config.sector_pe)?,
    ));

    let bind_addr = config.bind_addr();
    log::info!("启动估值数据服务，监听 {}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 请求日志
            .wrap(permissive_cors())  // 允许任意来源跨域
            .app_data(service.clone())
            .configure(handlers::config)
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await?;
    Ok(())
}
