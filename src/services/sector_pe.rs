//! 行业平均市盈率
//!
//! 两种来源：抓取行业页面中的市盈率单元格（默认），或内置静态表。
//! 抓取过程中的网络、状态码、解析错误都只记日志并返回 None

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;

use super::SectorPeSource;
use crate::config::{SectorPeConfig, SectorPeSourceKind};

/// 根据配置选择行业市盈率来源
pub fn from_config(config: &SectorPeConfig) -> Result<Arc<dyn SectorPeSource>> {
    let source: Arc<dyn SectorPeSource> = match config.source {
        SectorPeSourceKind::Scrape => Arc::new(ScrapedSectorPe::new(config.clone())?),
        SectorPeSourceKind::Table => Arc::new(StaticSectorPe),
    };
    Ok(source)
}

/// 行业名称转 URL slug，如 "Consumer Cyclical" -> "consumer-cyclical"
pub fn sector_slug(sector: &str) -> String {
    let mut slug = String::with_capacity(sector.len());
    let mut pending_dash = false;

    for c in sector.chars().filter(|c| *c != '&') {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// 解析单元格文本，允许千分位逗号和结尾的 "x"
fn parse_pe_text(text: &str) -> Option<f64> {
    let cleaned = text.replace('\u{a0}', "").replace(',', "");
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_suffix(['x', 'X']).unwrap_or(cleaned).trim();

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 从页面中按选择器取第一个单元格并解析为市盈率
pub fn extract_pe(html: &str, cell_selector: &str) -> Option<f64> {
    let selector = match Selector::parse(cell_selector) {
        Ok(selector) => selector,
        Err(e) => {
            log::warn!("无效的单元格选择器 {}: {:?}", cell_selector, e);
            return None;
        }
    };

    let document = Html::parse_document(html);
    let cell = document.select(&selector).next()?;
    let text = cell.text().collect::<Vec<_>>().join("");

    parse_pe_text(&text)
}

/// 抓取行业页面
pub struct ScrapedSectorPe {
    config: SectorPeConfig,
    client: Client,
}

impl ScrapedSectorPe {
    /// 客户端只创建一次，超时与 User-Agent 取自配置
    pub fn new(config: SectorPeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("创建行业页面 HTTP 客户端失败")?;
        Ok(Self { config, client })
    }

    fn sector_url(&self, sector: &str) -> String {
        self.config.url_template.replace("{slug}", &sector_slug(sector))
    }

    async fn fetch_sector_pe(&self, sector: &str) -> Result<Option<f64>> {
        let url = self.sector_url(sector);
        log::debug!("请求行业页面 URL: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取行业页面失败: {}", response.status()));
        }

        let text = response.text().await?;
        Ok(extract_pe(&text, &self.config.cell_selector))
    }
}

#[async_trait]
impl SectorPeSource for ScrapedSectorPe {
    async fn sector_pe(&self, sector: &str) -> Option<f64> {
        match self.fetch_sector_pe(sector).await {
            Ok(Some(pe)) => Some(pe),
            Ok(None) => {
                log::warn!("行业 {} 页面中未找到可解析的市盈率", sector);
                None
            }
            Err(e) => {
                log::warn!("获取行业 {} 市盈率失败: {}", sector, e);
                None
            }
        }
    }
}

/// 内置行业市盈率表
pub struct StaticSectorPe;

/// 行业名称到平均市盈率的映射（大小写不敏感）
pub fn static_sector_pe(sector: &str) -> Option<f64> {
    match sector.trim().to_lowercase().as_str() {
        "technology" => Some(30.0),
        "communication services" => Some(22.0),
        "consumer cyclical" => Some(24.0),
        "consumer defensive" => Some(22.0),
        "healthcare" => Some(25.0),
        "financial services" => Some(15.0),
        "industrials" => Some(22.0),
        "energy" => Some(12.0),
        "utilities" => Some(18.0),
        "real estate" => Some(32.0),
        "basic materials" => Some(18.0),
        _ => None,
    }
}

#[async_trait]
impl SectorPeSource for StaticSectorPe {
    async fn sector_pe(&self, sector: &str) -> Option<f64> {
        static_sector_pe(sector)
    }
}
