/// arXiv 检索 API 客户端
///
/// 封装所有与论文索引相关的 HTTP 调用
use crate::clients::atom;
use crate::config::Config;
use crate::error::SearchError;
use crate::models::Paper;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// arXiv 检索客户端
#[derive(Clone)]
pub struct ArxivClient {
    http: Client,
    base_url: String,
    sort_by: String,
    sort_order: String,
}

impl ArxivClient {
    /// 创建新的检索客户端
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let http = build_http_client(config)
            .map_err(|e| SearchError::request_failed(&config.arxiv_api_base, e))?;
        Ok(Self::with_http(http, config))
    }

    /// 复用已有的 HTTP 客户端
    pub fn with_http(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.arxiv_api_base.clone(),
            sort_by: config.sort_by.clone(),
            sort_order: config.sort_order.clone(),
        }
    }

    /// 检索论文
    ///
    /// # 参数
    /// - `query`: 原样透传的检索式
    /// - `limit`: 最多返回的结果数
    ///
    /// # 返回
    /// 返回按索引顺序排列的论文，最多 `limit` 条
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Paper>, SearchError> {
        debug!("检索 arXiv: query='{}', limit={}", query, limit);

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("search_query", query)])
            .query(&[("start", 0), ("max_results", limit)])
            .query(&[
                ("sortBy", self.sort_by.as_str()),
                ("sortOrder", self.sort_order.as_str()),
            ])
            .header(ACCEPT, "application/atom+xml, application/xml;q=0.9, text/xml;q=0.8")
            .send()
            .await
            .map_err(|e| SearchError::request_failed(&self.base_url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus {
                endpoint: self.base_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SearchError::request_failed(&self.base_url, e))?;

        let mut papers = atom::parse_feed(&body)?;
        papers.truncate(limit);

        debug!("arXiv 返回 {} 条结果", papers.len());
        Ok(papers)
    }
}

/// 按配置构建共享的 HTTP 客户端
pub fn build_http_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
}
