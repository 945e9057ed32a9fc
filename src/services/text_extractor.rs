//! PDF 文本提取
//!
//! 提取服务只需满足一个简单约定：给定本地 PDF 路径，按页返回文本

use crate::error::FetchError;
use std::path::Path;

/// 按页提取文本
pub trait TextExtractor: Send + Sync {
    /// 返回每一页的文本，顺序与页码一致
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, FetchError>;
}

/// 基于 lopdf 的文本提取
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, FetchError> {
        let doc = lopdf::Document::load(path).map_err(|e| FetchError::Extraction(e.to_string()))?;

        doc.get_pages()
            .keys()
            .map(|&page| {
                doc.extract_text(&[page])
                    .map_err(|e| FetchError::Extraction(format!("page {}: {}", page, e)))
            })
            .collect()
    }
}

/// 拼接各页文本，每页后追加一个空行
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push_str("\n\n");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages() {
        let pages = vec!["first".to_string(), "second".to_string()];
        assert_eq!(join_pages(&pages), "first\n\nsecond\n\n");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_lopdf_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = LopdfExtractor.extract_pages(&path).unwrap_err();
        assert!(matches!(err, FetchError::Extraction(_)));
        assert!(err.to_string().starts_with("Error"));
    }
}
