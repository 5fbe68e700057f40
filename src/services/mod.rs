//! 业务逻辑服务模块
//!
//! 封装数据获取和处理逻辑。两个外部依赖（行情数据源、行业市盈率来源）
//! 以 trait 形式注入，便于测试时替换

pub mod sector_pe;          // 行业市盈率
pub mod valuation_service;  // 估值数据聚合
pub mod yahoo;              // Yahoo Finance 数据源

#[cfg(test)]
mod canned_http;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::TickerSnapshot;

/// 行情数据源
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 获取单只股票的快照（含最近一期现金流量表）
    async fn fetch_snapshot(&self, ticker: &str) -> Result<TickerSnapshot>;
}

/// 行业平均市盈率来源
///
/// 任何失败都视为“不可用”，返回 None，不向上传播
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SectorPeSource: Send + Sync {
    async fn sector_pe(&self, sector: &str) -> Option<f64>;
}
