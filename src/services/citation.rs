//! 引用格式化 - 业务能力层
//!
//! 纯格式化函数，不产生副作用

use crate::models::Paper;

/// 摘要展示的最大字符数
pub const SUMMARY_PREVIEW_CHARS: usize = 300;

/// 作者列表：最多前 3 位，多于 3 位追加 "et al."
pub fn format_authors(authors: &[String]) -> String {
    let mut joined = authors
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > 3 {
        joined.push_str(", et al.");
    }
    joined
}

/// 论文摘要块
pub fn summarize(paper: &Paper) -> String {
    let mut out = format!("Title: {}\n", paper.title);
    out.push_str(&format!("Authors: {}\n", format_authors(&paper.authors)));
    out.push_str(&format!("ArXiv ID: {}\n", paper.short_id()));
    if let Some(url) = &paper.pdf_url {
        out.push_str(&format!("URL: {}\n", url));
    }
    if let Some(date) = paper.published_date() {
        out.push_str(&format!("Published: {}\n", date));
    }
    if !paper.categories.is_empty() {
        out.push_str(&format!("Categories: {}\n\n", paper.categories.join(", ")));
    }
    out.push_str(&format!(
        "Summary: {}...\n",
        take_chars(&paper.summary, SUMMARY_PREVIEW_CHARS)
    ));
    out
}

/// 单行引用：`{authors} ({year}). {title}. arXiv:{short_id}.`
pub fn cite(paper: &Paper) -> String {
    format!(
        "{} ({}). {}. arXiv:{}.",
        format_authors(&paper.authors),
        paper.published_year_str().unwrap_or("n.d."),
        paper.title,
        paper.short_id()
    )
}

/// 带编号的参考文献列表，空输入返回空字符串
pub fn cite_all(papers: &[Paper]) -> String {
    if papers.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n\n## References\n");
    for (i, paper) in papers.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, cite(paper)));
    }
    out
}

/// 按字符截取前 `n` 个字符
pub(crate) fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Paper {
        Paper {
            id: "http://arxiv.org/abs/2305.00042v2".to_string(),
            title: "Scaling Laws for Retrieval".to_string(),
            summary: "x".repeat(350),
            authors: vec![
                "A. One".to_string(),
                "B. Two".to_string(),
                "C. Three".to_string(),
                "D. Four".to_string(),
            ],
            published: Some("2023-05-01T10:00:00Z".to_string()),
            pdf_url: Some("http://arxiv.org/pdf/2305.00042v2".to_string()),
            categories: vec!["cs.IR".to_string(), "cs.CL".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_format_authors() {
        let two = vec!["A".to_string(), "B".to_string()];
        assert_eq!(format_authors(&two), "A, B");
        assert_eq!(format_authors(&sample().authors), "A. One, B. Two, C. Three, et al.");
        assert_eq!(format_authors(&[]), "");
    }

    #[test]
    fn test_cite() {
        assert_eq!(
            cite(&sample()),
            "A. One, B. Two, C. Three, et al. (2023). Scaling Laws for Retrieval. arXiv:2305.00042v2."
        );

        let undated = Paper {
            published: None,
            ..sample()
        };
        assert!(cite(&undated).contains("(n.d.)"));
    }

    #[test]
    fn test_cite_all() {
        assert_eq!(cite_all(&[]), "");

        let refs = cite_all(&[sample(), sample()]);
        assert!(refs.starts_with("\n\n## References\n1. A. One"));
        assert!(refs.contains("\n2. A. One"));
        assert!(refs.ends_with("arXiv:2305.00042v2.\n"));
    }

    #[test]
    fn test_summarize_layout() {
        let text = summarize(&sample());
        let expected_head = "Title: Scaling Laws for Retrieval\n\
Authors: A. One, B. Two, C. Three, et al.\n\
ArXiv ID: 2305.00042v2\n\
URL: http://arxiv.org/pdf/2305.00042v2\n\
Published: 2023-05-01\n\
Categories: cs.IR, cs.CL\n\n";
        assert!(text.starts_with(expected_head));
        assert!(text.ends_with(&format!("Summary: {}...\n", "x".repeat(300))));
    }

    #[test]
    fn test_summarize_skips_missing_fields() {
        let bare = Paper {
            id: "http://arxiv.org/abs/1".to_string(),
            title: "Bare".to_string(),
            summary: "short".to_string(),
            ..Default::default()
        };
        let text = summarize(&bare);
        assert!(!text.contains("URL:"));
        assert!(!text.contains("Published:"));
        assert!(!text.contains("Categories:"));
        assert!(text.ends_with("Summary: short...\n"));
    }
}
