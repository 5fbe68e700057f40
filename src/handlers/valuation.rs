//! 估值数据接口处理器
//!
//! GET /datos?ticker=AAPL - 获取单只股票的估值记录

use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::DatosQuery;
use crate::services::valuation_service::ValuationService;

/// 获取估值数据
///
/// # 参数
/// - ticker: 股票代码（必填，大小写不敏感）
pub async fn get_datos(
    query: web::Query<DatosQuery>,
    service: web::Data<ValuationService>,
) -> Result<HttpResponse, AppError> {
    let ticker = query.normalized_ticker().ok_or(AppError::MissingTicker)?;

    match service.get_valuation(&ticker).await {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(e) => {
            log::error!("获取 {} 估值数据失败: {:#}", ticker, e);
            Err(AppError::Internal(e))
        }
    }
}

/// 配置估值路由
pub fn config(cfg: &mut web::ServiceConfig) {
    // 查询串无法解析时同样按缺少 ticker 处理
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        log::warn!("查询参数解析失败: {}", err);
        AppError::MissingTicker.into()
    });

    cfg.app_data(query_config)
        .route("/datos", web::get().to(get_datos));
}
