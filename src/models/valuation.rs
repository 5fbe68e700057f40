//! 估值数据模型
//!
//! 前端估值计算器直接消费的扁平记录，字段名保持前端已有的命名

use serde::{Deserialize, Serialize};

/// 默认加权平均资本成本
pub const DEFAULT_WACC: f64 = 0.08;
/// 默认永续增长率
pub const DEFAULT_GROWTH: f64 = 0.02;

/// 估值记录
///
/// 上游缺失的字段序列化为 null；`deuda` 与 `eps` 的回退链以 0 结尾，因此总有值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub ticker: String,
    /// 价格
    pub precio: Option<f64>,
    /// 自由现金流
    pub fcf: Option<f64>,
    /// 总股本
    pub acciones: Option<f64>,
    /// 现金
    pub caja: Option<f64>,
    /// 总负债
    pub deuda: f64,
    /// 每股分红
    pub dividendo: Option<f64>,
    pub eps: f64,
    pub pe: Option<f64>,
    pub bvps: Option<f64>,
    pub roe: Option<f64>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
    pub ev: Option<f64>,
    /// 企业价值 / 自由现金流，保留两位小数
    #[serde(rename = "evToCfo")]
    pub ev_to_cfo: Option<f64>,
    /// 分析师目标价
    #[serde(rename = "precioObjetivo")]
    pub precio_objetivo: Option<f64>,
    pub sector: Option<String>,
    /// 行业平均市盈率
    #[serde(rename = "peSector")]
    pub pe_sector: Option<f64>,
    #[serde(rename = "evToEbitda")]
    pub ev_to_ebitda: Option<f64>,
    pub ebitda: Option<f64>,
    pub wacc: f64,
    pub g: f64,
}

/// `/datos` 查询参数
#[derive(Debug, Deserialize)]
pub struct DatosQuery {
    /// 股票代码（大小写不敏感）
    pub ticker: Option<String>,
}

impl DatosQuery {
    /// 规范化后的股票代码，缺失或为空时返回 None
    pub fn normalized_ticker(&self) -> Option<String> {
        self.ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
    }
}
