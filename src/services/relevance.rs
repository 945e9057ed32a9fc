//! 相关度打分 - 业务能力层
//!
//! 纯函数：同样的论文、查询词和年份永远得到同样的分数

use crate::models::Paper;
use chrono::Datelike;
use phf::phf_set;

/// 打分前从查询中去掉的停用词
static STOP_WORDS: phf::Set<&'static str> = phf_set! {
    "and", "the", "in", "of", "a", "to", "for", "is", "on", "by",
};

/// 标题命中一个查询词的得分
pub const TITLE_MATCH_WEIGHT: f64 = 3.0;
/// 摘要命中一个查询词的得分
pub const SUMMARY_MATCH_WEIGHT: f64 = 1.0;
/// 没有可解析发布年份时的时效加分
pub const DEFAULT_RECENCY_BONUS: f64 = 0.5;
/// 时效加分的基准年份
pub const RECENCY_BASE_YEAR: i32 = 2010;

/// 从查询中提取查询词
///
/// 按空白切分、去掉停用词，并按小写去重（保持首次出现的顺序）
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split_whitespace() {
        let lower = term.to_lowercase();
        if STOP_WORDS.contains(lower.as_str()) || terms.contains(&lower) {
            continue;
        }
        terms.push(lower);
    }
    terms
}

/// 计算论文相对查询词的得分（使用当前年份）
pub fn score(paper: &Paper, terms: &[String]) -> f64 {
    score_with_year(paper, terms, chrono::Local::now().year())
}

/// 计算论文相对查询词的得分
///
/// # 参数
/// - `paper`: 待打分论文
/// - `terms`: 查询词（大小写不敏感的子串匹配）
/// - `current_year`: 计算时效加分用的当前年份
pub fn score_with_year(paper: &Paper, terms: &[String], current_year: i32) -> f64 {
    let title = paper.title.to_lowercase();
    let summary = paper.summary.to_lowercase();

    let mut total = 0.0;
    for term in terms {
        let term = term.to_lowercase();
        if title.contains(&term) {
            total += TITLE_MATCH_WEIGHT;
        }
        if summary.contains(&term) {
            total += SUMMARY_MATCH_WEIGHT;
        }
    }

    total + recency_bonus(paper.published.as_deref(), current_year)
}

/// 时效加分
///
/// 有可解析的 4 位年份时为 `clamp((year - 2010) / (current_year - 2010 + 1), 0.1, 1.0)`，
/// 否则为固定的 0.5
pub fn recency_bonus(published: Option<&str>, current_year: i32) -> f64 {
    match published.and_then(parse_year) {
        Some(year) => {
            let span = f64::from(current_year - RECENCY_BASE_YEAR + 1);
            (f64::from(year - RECENCY_BASE_YEAR) / span).clamp(0.1, 1.0)
        }
        None => DEFAULT_RECENCY_BONUS,
    }
}

fn parse_year(published: &str) -> Option<i32> {
    let head: String = published.chars().take(4).collect();
    if head.len() == 4 && head.chars().all(|c| c.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, summary: &str, published: Option<&str>) -> Paper {
        Paper {
            id: "http://arxiv.org/abs/0000.00000v1".to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            published: published.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_query_terms_strip_stop_words() {
        assert_eq!(
            query_terms("The theory of Graph neural networks and graph"),
            vec!["theory", "graph", "neural", "networks"]
        );
        assert!(query_terms("and the of").is_empty());
    }

    #[test]
    fn test_title_and_summary_weights() {
        let terms = query_terms("graph attention");
        let p = paper("Graph Attention Networks", "attention over graph nodes", None);

        // 标题 2 × 3.0 + 摘要 2 × 1.0 + 默认时效 0.5
        assert_eq!(score_with_year(&p, &terms, 2025), 8.5);
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let terms = vec!["NET".to_string()];
        let p = paper("ResNets revisited", "", None);
        assert_eq!(score_with_year(&p, &terms, 2025), 3.5);
    }

    #[test]
    fn test_missing_published_gets_default_bonus() {
        assert_eq!(recency_bonus(None, 2025), 0.5);
        assert_eq!(recency_bonus(Some("n.d."), 2025), 0.5);
        assert_eq!(recency_bonus(Some(""), 2025), 0.5);
    }

    #[test]
    fn test_recency_bonus_formula() {
        // (2020 - 2010) / (2025 - 2010 + 1) = 10 / 16
        assert_eq!(recency_bonus(Some("2020-03-01T00:00:00Z"), 2025), 10.0 / 16.0);
        // 早于基准年份时取下限
        assert_eq!(recency_bonus(Some("1999-01-01"), 2025), 0.1);
        assert_eq!(recency_bonus(Some("2010-01-01"), 2025), 0.1);
        // 当前年份不会超过上限
        let current = recency_bonus(Some("2025-06-01"), 2025);
        assert!(current <= 1.0 && current > 0.9);
    }

    #[test]
    fn test_score_is_deterministic() {
        let terms = query_terms("quantum error correction");
        let p = paper("Quantum codes", "error correction thresholds", Some("2018-01-01"));
        assert_eq!(score_with_year(&p, &terms, 2025), score_with_year(&p, &terms, 2025));
    }
}
