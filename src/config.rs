//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，`PORT` 环境变量可覆盖监听端口

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 行情数据源配置（Yahoo Finance）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// quoteSummary / getcrumb 接口根地址
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// 用于获取会话 Cookie 的地址
    #[serde(default = "default_cookie_url")]
    pub cookie_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// 连接超时时间（秒），请求本身不设总超时
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 行业市盈率来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorPeSourceKind {
    /// 抓取行业页面
    Scrape,
    /// 内置静态表
    Table,
}

/// 行业市盈率配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorPeConfig {
    #[serde(default = "default_sector_source")]
    pub source: SectorPeSourceKind,
    /// 页面地址模板，`{slug}` 会被替换为行业 slug
    #[serde(default = "default_sector_url_template")]
    pub url_template: String,
    /// 市盈率所在单元格的选择器
    #[serde(default = "default_cell_selector")]
    pub cell_selector: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// 抓取超时时间（秒）
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 配置加载结果
pub struct LoadedConfig {
    pub config: AppConfig,
    /// 配置来源（文件路径或“默认配置”）
    pub source: String,
    /// 加载失败的配置文件说明
    pub warnings: Vec<String>,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sector_pe: SectorPeConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_provider_base_url() -> String { "https://query1.finance.yahoo.com".to_string() }
fn default_cookie_url() -> String { "https://fc.yahoo.com".to_string() }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}
fn default_connect_timeout() -> u64 { 10 }
fn default_sector_source() -> SectorPeSourceKind { SectorPeSourceKind::Scrape }
fn default_sector_url_template() -> String { "https://finance.yahoo.com/sectors/{slug}/".to_string() }
fn default_cell_selector() -> String { r#"td[data-field="peRatio"]"#.to_string() }
fn default_scrape_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            cookie_url: default_cookie_url(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for SectorPeConfig {
    fn default() -> Self {
        Self {
            source: default_sector_source(),
            url_template: default_sector_url_template(),
            cell_selector: default_cell_selector(),
            user_agent: default_user_agent(),
            timeout_secs: default_scrape_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 此时日志系统尚未初始化（日志级别来自配置本身），
    /// 来源和加载失败信息由调用方在初始化日志后输出
    pub fn load() -> LoadedConfig {
        let config_paths = [Path::new("config.json"), Path::new("config/config.json")];
        Self::load_from(&config_paths, env::var("PORT").ok().as_deref())
    }

    fn load_from(config_paths: &[&Path], port: Option<&str>) -> LoadedConfig {
        let mut source = "默认配置".to_string();
        let mut config = None;
        let mut warnings = Vec::new();

        for path in config_paths {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        source = path.display().to_string();
                        config = Some(loaded);
                        break;
                    }
                    Err(e) => {
                        warnings.push(format!("加载配置文件 {} 失败: {}", path.display(), e));
                    }
                }
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_env_overrides(port);
        LoadedConfig { config, source, warnings }
    }

    /// 应用环境变量覆盖（目前只有 PORT）
    fn apply_env_overrides(&mut self, port: Option<&str>) {
        if let Some(port) = port.and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
