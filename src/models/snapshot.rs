//! 行情快照模型
//!
//! 数据源无关的原始字段，均为可选：上游缺失即为 None

use serde::{Deserialize, Serialize};

/// 最近一期现金流量表中用到的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    /// 经营活动现金流
    pub operating_cash_flow: Option<f64>,
    /// 资本支出（统一为正数，表示流出金额）
    pub capital_expenditure: Option<f64>,
}

/// 单只股票的上游数据快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    /// 实时价格
    pub current_price: Option<f64>,
    /// 常规交易时段最新价
    pub regular_market_price: Option<f64>,
    /// 数据源直接给出的自由现金流
    pub free_cash_flow: Option<f64>,
    /// 总股本
    pub shares_outstanding: Option<f64>,
    /// 现金总额
    pub total_cash: Option<f64>,
    /// 总负债
    pub total_debt: Option<f64>,
    /// 短期负债
    pub short_term_debt: Option<f64>,
    /// 长期负债
    pub long_term_debt: Option<f64>,
    /// 每股分红
    pub dividend_rate: Option<f64>,
    pub forward_eps: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub forward_pe: Option<f64>,
    pub trailing_pe: Option<f64>,
    /// 每股净资产
    pub book_value: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    /// 分析师平均目标价
    pub target_mean_price: Option<f64>,
    /// 所属行业
    pub sector: Option<String>,
    pub enterprise_to_ebitda: Option<f64>,
    pub ebitda: Option<f64>,
    /// 最近一期现金流量表（可能不存在）
    pub latest_cash_flow: Option<CashFlowRow>,
}
