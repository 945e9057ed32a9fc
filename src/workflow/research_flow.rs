//! 检索处理流程 - 流程层
//!
//! 核心职责：定义"一次检索请求"的处理步骤
//!
//! 流程顺序：
//! 1. 检索 → 原始候选
//! 2. 打分筛选 → 3 到 6 篇
//! 3. 逐篇获取全文（可选）
//!
//! 只返回结构化结果，不拼接输出文本，也不读写会话缓存

use crate::clients::ArxivClient;
use crate::error::SearchError;
use crate::models::Paper;
use crate::services::{selector, ContentFetcher};
use tracing::info;

/// 筛选结果
#[derive(Debug, Clone)]
pub struct Selection {
    /// 检索返回的原始篇数
    pub total: usize,
    /// 筛选后的论文（带分数，按分数降序）
    pub selected: Vec<Paper>,
}

/// 检索处理流程
#[derive(Clone)]
pub struct ResearchFlow {
    client: ArxivClient,
    fetcher: ContentFetcher,
}

impl ResearchFlow {
    pub fn new(client: ArxivClient, fetcher: ContentFetcher) -> Self {
        Self { client, fetcher }
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// 只检索，不打分
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Paper>, SearchError> {
        info!("🔍 检索: '{}' (最多 {} 篇)", query, limit);
        let papers = self.client.search(query, limit).await?;
        info!("✓ 检索完成，找到 {} 篇", papers.len());
        Ok(papers)
    }

    /// 检索并筛选
    pub async fn search_and_select(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Selection, SearchError> {
        let papers = self.search(query, limit).await?;
        let total = papers.len();
        let selected = selector::select(papers, query);
        info!("📊 筛选出 {}/{} 篇相关论文", selected.len(), total);
        Ok(Selection { total, selected })
    }

    /// 逐篇获取全文，保持顺序
    pub async fn hydrate(&self, papers: Vec<Paper>) -> Vec<Paper> {
        let mut hydrated = Vec::with_capacity(papers.len());
        for (i, paper) in papers.iter().enumerate() {
            info!(
                "📄 [{}/{}] 获取全文: {}",
                i + 1,
                papers.len(),
                paper.short_id()
            );
            let paper = self.fetcher.fetch_content(paper).await;
            if let Some(Err(e)) = &paper.content {
                info!("⚠️ {} 获取失败: {}", paper.short_id(), e);
            }
            hydrated.push(paper);
        }
        hydrated
    }
}
