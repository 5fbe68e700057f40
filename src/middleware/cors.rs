//! 跨域中间件
//!
//! 前端计算器部署在其他域名下，允许任意来源的只读请求

use actix_cors::Cors;
use actix_web::http::Method;

/// 允许任意来源的 GET 请求
pub fn permissive_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::OPTIONS])
        .allow_any_header()
        .max_age(3600)
}
