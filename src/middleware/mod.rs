//! 中间件

mod cors;

pub use cors::permissive_cors;
