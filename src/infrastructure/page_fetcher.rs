//! 页面抓取器 - 基础设施层
//!
//! 只暴露"给一个 URL，返回正文里的条目行"的能力，不做清洗和过滤

use crate::config::Config;
use crate::error::FetchError;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// 页面抓取能力
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面并返回原始条目行
    async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError>;
}

/// 基于 reqwest 的页面抓取器
///
/// 提取 `<main>` / `<article>` 区域内的 `<li>` 条目
pub struct HttpPageFetcher {
    client: reqwest::Client,
    politeness_delay: Duration,
}

impl HttpPageFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|source| FetchError::RequestFailed {
                url: String::new(),
                source,
            })?;

        Ok(Self {
            client,
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
        // 避免请求过快
        sleep(self.politeness_delay).await;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|source| FetchError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        let lines = extract_list_items(&html);
        debug!("{} 提取到 {} 个条目", url, lines.len());
        Ok(lines)
    }
}

fn list_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li>").expect("valid list item regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"))
}

/// 从 HTML 中提取正文区域的列表条目文本
pub fn extract_list_items(html: &str) -> Vec<String> {
    let content = content_region(html);
    list_item_regex()
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| decode_entities(&tag_regex().replace_all(m.as_str(), " ")))
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// 优先取 `<main>`，其次 `<article>`，都没有时返回整页
fn content_region(html: &str) -> &str {
    let lower = html.to_ascii_lowercase();
    for tag in ["main", "article"] {
        let open = format!("<{}", tag);
        if let Some(start) = lower.find(&open) {
            let close = format!("</{}>", tag);
            let end = lower[start..]
                .find(&close)
                .map_or(html.len(), |offset| start + offset);
            return &html[start..end];
        }
    }
    html
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{00A0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
