use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// 一条检索结果
///
/// 缺失字段按以下规则补齐：
/// - `title` / `summary` 缺失时为空字符串
/// - `authors` / `categories` 缺失时为空列表
/// - `published` / `updated` / `pdf_url` 缺失时为 `None`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Paper {
    /// 来源分配的标识（形如 `http://arxiv.org/abs/2401.00001v1`）
    pub id: String,
    pub title: String,
    pub summary: String,
    /// 作者显示名，保持来源顺序
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// PDF 直链，缺失表示无法获取全文
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    pub categories: Vec<String>,
    /// 只有经过打分的论文才有
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    /// 全文获取结果，尚未获取时为 `None`
    #[serde(skip)]
    pub content: Option<Result<String, FetchError>>,
}

impl Paper {
    /// 短 ID：标识最后一个路径段，用于文件名和展示
    pub fn short_id(&self) -> &str {
        match self.id.rsplit('/').next() {
            Some(tail) if !tail.is_empty() => tail,
            _ => "unknown",
        }
    }

    /// 发布日期（只取日期部分）
    pub fn published_date(&self) -> Option<&str> {
        self.published.as_deref().map(|p| prefix_chars(p, 10))
    }

    /// 发布年份的原始前 4 个字符，不做解析
    pub fn published_year_str(&self) -> Option<&str> {
        self.published.as_deref().map(|p| prefix_chars(p, 4))
    }

    /// 是否已成功获取全文
    pub fn has_content(&self) -> bool {
        matches!(self.content, Some(Ok(_)))
    }

    /// 成功获取的全文
    pub fn content_text(&self) -> Option<&str> {
        match &self.content {
            Some(Ok(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_takes_last_segment() {
        let paper = Paper {
            id: "http://arxiv.org/abs/2401.01234v2".to_string(),
            ..Default::default()
        };
        assert_eq!(paper.short_id(), "2401.01234v2");

        let empty = Paper::default();
        assert_eq!(empty.short_id(), "unknown");
    }

    #[test]
    fn test_published_parts() {
        let paper = Paper {
            published: Some("2023-05-17T09:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(paper.published_date(), Some("2023-05-17"));
        assert_eq!(paper.published_year_str(), Some("2023"));

        let short = Paper {
            published: Some("20".to_string()),
            ..Default::default()
        };
        assert_eq!(short.published_year_str(), Some("20"));
        assert_eq!(Paper::default().published_date(), None);
    }

    #[test]
    fn test_content_state() {
        let mut paper = Paper::default();
        assert!(!paper.has_content());

        paper.content = Some(Err(FetchError::PdfUnavailable));
        assert!(!paper.has_content());
        assert_eq!(paper.content_text(), None);

        paper.content = Some(Ok("full text".to_string()));
        assert!(paper.has_content());
        assert_eq!(paper.content_text(), Some("full text"));
    }
}
