//! 会话缓存
//!
//! 保存最近一次检索选出的论文，供后续的下载命令引用。
//! 由调用方持有并传入，不是进程级全局变量；并发写入时后写者生效。

use crate::models::Paper;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 最近一次结果集
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    papers: Arc<RwLock<Vec<Paper>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换（不合并）
    pub async fn replace(&self, papers: Vec<Paper>) {
        let mut guard = self.papers.write().await;
        debug!("会话缓存更新: {} -> {} 篇", guard.len(), papers.len());
        *guard = papers;
    }

    /// 当前结果集的快照
    pub async fn snapshot(&self) -> Vec<Paper> {
        self.papers.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.papers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.papers.read().await.is_empty()
    }

    /// 当前结果集的短 ID，按缓存顺序
    pub async fn short_ids(&self) -> Vec<String> {
        self.papers
            .read()
            .await
            .iter()
            .map(|p| p.short_id().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str) -> Paper {
        Paper {
            id: format!("http://arxiv.org/abs/{}", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_overwrites() {
        tokio_test::block_on(async {
            let cache = SessionCache::new();
            assert!(cache.is_empty().await);

            cache.replace(vec![paper("a"), paper("b")]).await;
            assert_eq!(cache.short_ids().await, vec!["a", "b"]);

            cache.replace(vec![paper("c")]).await;
            assert_eq!(cache.len().await, 1);
            assert_eq!(cache.short_ids().await, vec!["c"]);
        });
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = SessionCache::new();
        let handle = cache.clone();

        handle.replace(vec![paper("x")]).await;
        assert_eq!(cache.snapshot().await.len(), 1);
    }
}
