//! 结果筛选 - 业务能力层
//!
//! 按相关度排序，并把结果收敛到 3 到 6 篇

use crate::models::Paper;
use crate::services::relevance;
use std::cmp::Ordering;
use tracing::debug;

/// 视为"相关"的分数下限（严格大于）
pub const RELEVANCE_THRESHOLD: f64 = 1.0;
/// 最少返回篇数
pub const MIN_SELECTED: usize = 3;
/// 最多返回篇数
pub const MAX_SELECTED: usize = 6;

/// 打分并筛选论文（使用当前年份）
pub fn select(papers: Vec<Paper>, query: &str) -> Vec<Paper> {
    let terms = relevance::query_terms(query);
    rank_and_band(papers, |p| relevance::score(p, &terms))
}

/// 打分并筛选论文，年份固定
pub fn select_with_year(papers: Vec<Paper>, query: &str, current_year: i32) -> Vec<Paper> {
    let terms = relevance::query_terms(query);
    rank_and_band(papers, |p| relevance::score_with_year(p, &terms, current_year))
}

fn rank_and_band(mut papers: Vec<Paper>, scorer: impl Fn(&Paper) -> f64) -> Vec<Paper> {
    for paper in papers.iter_mut() {
        paper.relevance_score = Some(scorer(paper));
    }

    // sort_by 是稳定排序，同分保持输入顺序
    papers.sort_by(|a, b| {
        let (sa, sb) = (a.relevance_score.unwrap_or(0.0), b.relevance_score.unwrap_or(0.0));
        sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
    });

    let relevant = papers
        .iter()
        .take_while(|p| p.relevance_score.unwrap_or(0.0) > RELEVANCE_THRESHOLD)
        .count();

    let keep = if relevant < MIN_SELECTED {
        MIN_SELECTED.min(papers.len())
    } else {
        relevant.min(MAX_SELECTED)
    };

    debug!(
        "筛选结果: 共 {} 篇, 相关 {} 篇, 保留 {} 篇",
        papers.len(),
        relevant,
        keep
    );

    papers.truncate(keep);
    papers
}
