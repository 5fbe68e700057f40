//! Yahoo Finance 行情数据源
//!
//! 对接 quoteSummary 接口: https://query1.finance.yahoo.com/v10/finance/quoteSummary/<ticker>
//! 该接口需要会话 Cookie 与 crumb，每次请求都会新建带 Cookie 的客户端重新获取

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::MarketDataProvider;
use crate::config::ProviderConfig;
use crate::models::{CashFlowRow, TickerSnapshot};

/// quoteSummary 需要的模块
const SUMMARY_MODULES: &str = "price,summaryDetail,financialData,defaultKeyStatistics,assetProfile,balanceSheetHistory,cashflowStatementHistory";

/// Yahoo Finance 客户端
pub struct YahooClient {
    config: ProviderConfig,
}

impl YahooClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    /// 新建带 Cookie 存储的客户端，只设置连接超时
    fn session_client(&self) -> Result<Client> {
        Client::builder()
            .cookie_store(true)
            .gzip(true)
            .user_agent(self.config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .build()
            .context("创建 HTTP 客户端失败")
    }

    /// 获取 crumb
    ///
    /// 先访问 cookie 地址拿到会话 Cookie（该地址通常返回 404，状态码忽略），
    /// 再用同一客户端请求 getcrumb
    async fn fetch_crumb(&self, client: &Client) -> Result<String> {
        log::debug!("请求会话 Cookie URL: {}", self.config.cookie_url);
        client
            .get(&self.config.cookie_url)
            .send()
            .await
            .context("获取 Yahoo 会话 Cookie 失败")?;

        let url = format!("{}/v1/test/getcrumb", self.config.base_url.trim_end_matches('/'));
        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取 crumb 失败: {}", response.status()));
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(anyhow!("crumb 内容无效"));
        }
        Ok(crumb)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_snapshot(&self, ticker: &str) -> Result<TickerSnapshot> {
        let client = self.session_client()?;
        let crumb = self.fetch_crumb(&client).await?;

        let url = build_summary_url(&self.config.base_url, ticker, &crumb)?;
        log::debug!("请求 quoteSummary URL: {}", url);

        let response = client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取 {} 行情数据失败: {}", ticker, response.status()));
        }

        let body: Value = response.json().await?;
        parse_quote_summary(&body, ticker)
    }
}

/// 构造 quoteSummary 请求地址，ticker 作为路径段编码
fn build_summary_url(base_url: &str, ticker: &str, crumb: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).with_context(|| format!("无效的数据源地址: {}", base_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("数据源地址不能作为路径前缀: {}", base_url))?
        .pop_if_empty()
        .extend(["v10", "finance", "quoteSummary", ticker]);
    url.query_pairs_mut()
        .append_pair("modules", SUMMARY_MODULES)
        .append_pair("crumb", crumb);
    Ok(url)
}

/// 解析 quoteSummary 响应
///
/// 接口级错误（error 字段、空结果）返回 Err；单个字段缺失或类型不符只得到 None
fn parse_quote_summary(body: &Value, ticker: &str) -> Result<TickerSnapshot> {
    let summary = &body["quoteSummary"];

    if let Some(err) = summary["error"].as_object() {
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("未知错误");
        return Err(anyhow!("quoteSummary 返回错误 ({}): {}", ticker, description));
    }

    let result = summary["result"]
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| anyhow!("股票代码 {} 没有返回数据", ticker))?;

    let financial = &result["financialData"];
    let price = &result["price"];
    let detail = &result["summaryDetail"];
    let stats = &result["defaultKeyStatistics"];

    let balance = &result["balanceSheetHistory"]["balanceSheetStatements"][0];
    let cash_flow = &result["cashflowStatementHistory"]["cashflowStatements"][0];

    let latest_cash_flow = cash_flow.is_object().then(|| CashFlowRow {
        operating_cash_flow: raw_number(&cash_flow["totalCashFromOperatingActivities"]),
        // 上游资本支出为负数
        capital_expenditure: raw_number(&cash_flow["capitalExpenditures"]).map(f64::abs),
    });

    Ok(TickerSnapshot {
        current_price: raw_number(&financial["currentPrice"]),
        regular_market_price: raw_number(&price["regularMarketPrice"]),
        free_cash_flow: raw_number(&financial["freeCashflow"]),
        shares_outstanding: raw_number(&stats["sharesOutstanding"]),
        total_cash: raw_number(&financial["totalCash"]),
        total_debt: raw_number(&financial["totalDebt"]),
        short_term_debt: raw_number(&balance["shortLongTermDebt"]),
        long_term_debt: raw_number(&balance["longTermDebt"]),
        dividend_rate: raw_number(&detail["dividendRate"]),
        forward_eps: raw_number(&stats["forwardEps"]),
        trailing_eps: raw_number(&stats["trailingEps"]),
        forward_pe: raw_number(&detail["forwardPE"]),
        trailing_pe: raw_number(&detail["trailingPE"]),
        book_value: raw_number(&stats["bookValue"]),
        return_on_equity: raw_number(&financial["returnOnEquity"]),
        market_cap: raw_number(&price["marketCap"]).or_else(|| raw_number(&detail["marketCap"])),
        enterprise_value: raw_number(&stats["enterpriseValue"]),
        target_mean_price: raw_number(&financial["targetMeanPrice"]),
        sector: result["assetProfile"]["sector"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        enterprise_to_ebitda: raw_number(&stats["enterpriseToEbitda"]),
        ebitda: raw_number(&financial["ebitda"]),
        latest_cash_flow,
    })
}

/// 读取数值字段：`{"raw": 1.0, "fmt": "1.00"}` 或裸数字，其余为 None
fn raw_number(value: &Value) -> Option<f64> {
    value
        .get("raw")
        .and_then(Value::as_f64)
        .or_else(|| value.as_f64())
        .filter(|n| n.is_finite())
}
