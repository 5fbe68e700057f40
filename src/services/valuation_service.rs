//! 估值数据聚合服务
//!
//! 先取行情快照，再按行业查市盈率，最后按回退规则拼成扁平记录

use anyhow::Result;
use std::sync::Arc;

use super::{MarketDataProvider, SectorPeSource};
use crate::models::{TickerSnapshot, ValuationRecord, DEFAULT_GROWTH, DEFAULT_WACC};

/// 估值数据服务
pub struct ValuationService {
    provider: Arc<dyn MarketDataProvider>,
    sector_pe: Arc<dyn SectorPeSource>,
}

impl ValuationService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, sector_pe: Arc<dyn SectorPeSource>) -> Self {
        Self { provider, sector_pe }
    }

    /// 获取单只股票的估值记录
    ///
    /// `ticker` 需已规范化（去空白、大写）。数据源失败直接返回 Err，
    /// 行业市盈率失败只会得到 None
    pub async fn get_valuation(&self, ticker: &str) -> Result<ValuationRecord> {
        let snapshot = self.provider.fetch_snapshot(ticker).await?;

        let pe_sector = match snapshot.sector.as_deref() {
            Some(sector) => self.sector_pe.sector_pe(sector).await,
            None => None,
        };

        Ok(build_record(ticker, snapshot, pe_sector))
    }
}

/// 按回退规则组装记录
pub fn build_record(ticker: &str, snapshot: TickerSnapshot, pe_sector: Option<f64>) -> ValuationRecord {
    let fcf = free_cash_flow(&snapshot);

    ValuationRecord {
        ticker: ticker.to_uppercase(),
        precio: snapshot.current_price.or(snapshot.regular_market_price),
        fcf,
        acciones: snapshot.shares_outstanding,
        caja: snapshot.total_cash,
        deuda: total_debt(&snapshot),
        dividendo: snapshot.dividend_rate,
        eps: snapshot.forward_eps.or(snapshot.trailing_eps).unwrap_or(0.0),
        pe: snapshot.forward_pe.or(snapshot.trailing_pe),
        bvps: snapshot.book_value,
        roe: snapshot.return_on_equity,
        market_cap: snapshot.market_cap,
        ev: snapshot.enterprise_value,
        ev_to_cfo: ev_to_cfo(snapshot.enterprise_value, fcf),
        precio_objetivo: snapshot.target_mean_price,
        sector: snapshot.sector,
        pe_sector,
        ev_to_ebitda: snapshot.enterprise_to_ebitda,
        ebitda: snapshot.ebitda,
        wacc: DEFAULT_WACC,
        g: DEFAULT_GROWTH,
    }
}

/// 自由现金流：优先用数据源给出的值，否则用最近一期 经营现金流 - 资本支出
pub fn free_cash_flow(snapshot: &TickerSnapshot) -> Option<f64> {
    snapshot.free_cash_flow.or_else(|| {
        let row = snapshot.latest_cash_flow.as_ref()?;
        Some(row.operating_cash_flow? - row.capital_expenditure?)
    })
}

/// 总负债：优先用数据源给出的值，否则 短期 + 长期（缺失按 0）
pub fn total_debt(snapshot: &TickerSnapshot) -> f64 {
    snapshot.total_debt.unwrap_or_else(|| {
        snapshot.short_term_debt.unwrap_or(0.0) + snapshot.long_term_debt.unwrap_or(0.0)
    })
}

/// 企业价值 / 自由现金流，保留两位小数；任一缺失或现金流为 0 时为 None
pub fn ev_to_cfo(enterprise_value: Option<f64>, fcf: Option<f64>) -> Option<f64> {
    let ev = enterprise_value?;
    let fcf = fcf.filter(|f| *f != 0.0)?;
    let ratio = round2(ev / fcf);
    ratio.is_finite().then_some(ratio)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CashFlowRow;
    use crate::services::{MockMarketDataProvider, MockSectorPeSource};

    fn cash_flow(operating: Option<f64>, capex: Option<f64>) -> Option<CashFlowRow> {
        Some(CashFlowRow {
            operating_cash_flow: operating,
            capital_expenditure: capex,
        })
    }

    #[test]
    fn test_fcf_prefers_reported_value() {
        let snapshot = TickerSnapshot {
            free_cash_flow: Some(500.0),
            latest_cash_flow: cash_flow(Some(900.0), Some(100.0)),
            ..Default::default()
        };
        assert_eq!(free_cash_flow(&snapshot), Some(500.0));
    }

    #[test]
    fn test_fcf_from_cash_flow_statement() {
        let snapshot = TickerSnapshot {
            latest_cash_flow: cash_flow(Some(900.0), Some(150.0)),
            ..Default::default()
        };
        assert_eq!(free_cash_flow(&snapshot), Some(750.0));
    }

    #[test]
    fn test_fcf_needs_both_components() {
        let snapshot = TickerSnapshot {
            latest_cash_flow: cash_flow(Some(900.0), None),
            ..Default::default()
        };
        assert_eq!(free_cash_flow(&snapshot), None);

        let snapshot = TickerSnapshot {
            latest_cash_flow: cash_flow(None, Some(150.0)),
            ..Default::default()
        };
        assert_eq!(free_cash_flow(&snapshot), None);

        assert_eq!(free_cash_flow(&TickerSnapshot::default()), None);
    }

    #[test]
    fn test_total_debt() {
        let reported = TickerSnapshot {
            total_debt: Some(1_000.0),
            short_term_debt: Some(1.0),
            long_term_debt: Some(2.0),
            ..Default::default()
        };
        assert_eq!(total_debt(&reported), 1_000.0);

        let components = TickerSnapshot {
            short_term_debt: Some(250.0),
            long_term_debt: Some(750.0),
            ..Default::default()
        };
        assert_eq!(total_debt(&components), 1_000.0);

        let long_only = TickerSnapshot {
            long_term_debt: Some(750.0),
            ..Default::default()
        };
        assert_eq!(total_debt(&long_only), 750.0);

        assert_eq!(total_debt(&TickerSnapshot::default()), 0.0);
    }

    #[test]
    fn test_ev_to_cfo() {
        assert_eq!(ev_to_cfo(Some(1_000.0), Some(3.0)), Some(333.33));
        assert_eq!(ev_to_cfo(Some(2_000.0), Some(-300.0)), Some(-6.67));
        assert_eq!(ev_to_cfo(None, Some(3.0)), None);
        assert_eq!(ev_to_cfo(Some(1_000.0), None), None);
        assert_eq!(ev_to_cfo(Some(1_000.0), Some(0.0)), None);
        // 取整时乘 100 会溢出
        assert_eq!(ev_to_cfo(Some(1.0e307), Some(0.5)), None);
        assert_eq!(ev_to_cfo(Some(f64::MAX), Some(1.0e-10)), None);
    }

    #[test]
    fn test_build_record_fallbacks() {
        let snapshot = TickerSnapshot {
            regular_market_price: Some(101.5),
            trailing_eps: Some(4.2),
            trailing_pe: Some(24.1),
            enterprise_value: Some(10_000.0),
            latest_cash_flow: cash_flow(Some(1_200.0), Some(400.0)),
            ..Default::default()
        };

        let record = build_record("msft", snapshot, Some(28.0));
        assert_eq!(record.ticker, "MSFT");
        assert_eq!(record.precio, Some(101.5));
        assert_eq!(record.eps, 4.2);
        assert_eq!(record.pe, Some(24.1));
        assert_eq!(record.fcf, Some(800.0));
        assert_eq!(record.ev_to_cfo, Some(12.5));
        assert_eq!(record.pe_sector, Some(28.0));
        assert_eq!(record.wacc, 0.08);
        assert_eq!(record.g, 0.02);
    }

    #[test]
    fn test_build_record_prefers_primary_values() {
        let snapshot = TickerSnapshot {
            current_price: Some(102.0),
            regular_market_price: Some(101.5),
            forward_eps: Some(5.0),
            trailing_eps: Some(4.2),
            forward_pe: Some(20.4),
            trailing_pe: Some(24.1),
            ..Default::default()
        };

        let record = build_record("MSFT", snapshot, None);
        assert_eq!(record.precio, Some(102.0));
        assert_eq!(record.eps, 5.0);
        assert_eq!(record.pe, Some(20.4));
    }

    #[test]
    fn test_build_record_empty_snapshot() {
        let record = build_record("ZZZZ", TickerSnapshot::default(), None);
        assert_eq!(record.precio, None);
        assert_eq!(record.fcf, None);
        assert_eq!(record.eps, 0.0);
        assert_eq!(record.pe, None);
        assert_eq!(record.deuda, 0.0);
        assert_eq!(record.ev_to_cfo, None);
        assert_eq!(record.sector, None);
    }

    #[tokio::test]
    async fn test_get_valuation_looks_up_sector() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_fetch_snapshot().times(1).returning(|_| {
            Ok(TickerSnapshot {
                current_price: Some(50.0),
                sector: Some("Energy".to_string()),
                ..Default::default()
            })
        });

        let mut sector_pe = MockSectorPeSource::new();
        sector_pe
            .expect_sector_pe()
            .times(1)
            .returning(|sector| (sector == "Energy").then_some(11.5));

        let service = ValuationService::new(Arc::new(provider), Arc::new(sector_pe));
        let record = service.get_valuation("XOM").await.unwrap();

        assert_eq!(record.ticker, "XOM");
        assert_eq!(record.precio, Some(50.0));
        assert_eq!(record.sector.as_deref(), Some("Energy"));
        assert_eq!(record.pe_sector, Some(11.5));
    }

    #[tokio::test]
    async fn test_get_valuation_without_sector_skips_lookup() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_fetch_snapshot()
            .returning(|_| Ok(TickerSnapshot::default()));

        let mut sector_pe = MockSectorPeSource::new();
        sector_pe.expect_sector_pe().times(0);

        let service = ValuationService::new(Arc::new(provider), Arc::new(sector_pe));
        let record = service.get_valuation("ABC").await.unwrap();
        assert_eq!(record.pe_sector, None);
    }

    #[tokio::test]
    async fn test_get_valuation_propagates_provider_error() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_fetch_snapshot()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let mut sector_pe = MockSectorPeSource::new();
        sector_pe.expect_sector_pe().times(0);

        let service = ValuationService::new(Arc::new(provider), Arc::new(sector_pe));
        assert!(service.get_valuation("ABC").await.is_err());
    }
}
