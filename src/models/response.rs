//! 错误响应模型
//!
//! 成功时直接返回扁平的估值记录，失败时统一返回 `{"error": "..."}`

use serde::{Deserialize, Serialize};

/// 错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
