//! 下载意图解析 - 业务能力层
//!
//! 对外只暴露 `text -> Intent`，匹配策略（正则集合 + 关键词兜底）
//! 可以替换而不影响调用方。

use crate::models::Paper;
use regex::{Regex, RegexSet};

/// 下载意图的正则表达式
const DOWNLOAD_PATTERNS: &[&str] = &[
    r"download (?:all|the|these|those) (?:papers|articles|pdfs)",
    r"download (?:the )?papers?",
    r"can (?:you )?download",
    r"save (?:the|these|those) papers?",
    r"get (?:the|these|those) papers?",
    r"download paper \d+",
    r"download papers",
    r"download all",
    r"download arxiv",
    r"please download",
];

/// 正则都不命中时的关键词兜底
const DOWNLOAD_KEYWORDS: &[&str] = &["download", "save papers", "get papers", "papers to my computer"];

/// 单个范围最多展开的篇数
const MAX_RANGE_SPAN: usize = 1000;

/// 解析出的用户意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// 没有下载意图
    None,
    /// 下载请求
    Download(DownloadScope),
}

/// 下载范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadScope {
    /// 会话缓存中的全部论文
    All,
    /// 按 1 起始的序号引用
    Indices(Vec<usize>),
}

/// 下载意图解析器
pub struct IntentParser {
    patterns: RegexSet,
    single: Regex,
    range: Regex,
}

impl IntentParser {
    /// 创建解析器
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = RegexSet::new(DOWNLOAD_PATTERNS.iter().map(|p| format!("(?i){}", p)))?;
        let single = Regex::new(r"(?i)\bpaper\s+(\d+)")?;
        let range = Regex::new(r"(?i)\bpapers\s+(\d+)(?:\s*(?:-|to)\s*|\s+)(\d+)")?;
        Ok(Self {
            patterns,
            single,
            range,
        })
    }

    /// 解析一段文本
    pub fn parse(&self, text: &str) -> Intent {
        if !self.detect_download_intent(text) {
            return Intent::None;
        }

        let numbers = self.paper_numbers(text);
        if numbers.is_empty() {
            Intent::Download(DownloadScope::All)
        } else {
            Intent::Download(DownloadScope::Indices(numbers))
        }
    }

    /// 是否包含下载意图（大小写不敏感）
    pub fn detect_download_intent(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.patterns.is_match(&lower) || DOWNLOAD_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// 提取所有 "paper N" 和 "papers N-M" / "papers N to M" 引用（闭区间）
    ///
    /// 保持首次出现的顺序并去重
    pub fn paper_numbers(&self, text: &str) -> Vec<usize> {
        let mut numbers: Vec<usize> = Vec::new();
        let mut push = |n: usize| {
            if !numbers.contains(&n) {
                numbers.push(n);
            }
        };

        for cap in self.single.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                push(parse_index(m.as_str()));
            }
        }

        for cap in self.range.captures_iter(text) {
            let (Some(start), Some(end)) = (cap.get(1), cap.get(2)) else {
                continue;
            };
            let start = parse_index(start.as_str());
            if start == usize::MAX {
                push(start);
                continue;
            }
            let end = parse_index(end.as_str()).min(start.saturating_add(MAX_RANGE_SPAN));
            for n in start..=end {
                push(n);
            }
        }

        numbers
    }

    /// 把文本中的论文引用解析为会话缓存里的短 ID
    ///
    /// 没有任何数字引用时返回缓存中的全部论文；越界序号直接忽略
    pub fn resolve_download_targets(&self, text: &str, cache: &[Paper]) -> Vec<String> {
        let numbers = self.paper_numbers(text);
        if numbers.is_empty() {
            resolve_scope(&DownloadScope::All, cache)
        } else {
            resolve_scope(&DownloadScope::Indices(numbers), cache)
        }
    }
}

/// 捕获组只含数字，解析失败只可能是溢出，按越界序号处理
fn parse_index(digits: &str) -> usize {
    digits.parse().unwrap_or(usize::MAX)
}

/// 按下载范围从缓存中取出短 ID
pub fn resolve_scope(scope: &DownloadScope, cache: &[Paper]) -> Vec<String> {
    match scope {
        DownloadScope::All => cache.iter().map(|p| p.short_id().to_string()).collect(),
        DownloadScope::Indices(indices) => indices
            .iter()
            .filter(|&&n| n >= 1 && n <= cache.len())
            .map(|&n| cache[n - 1].short_id().to_string())
            .collect(),
    }
}
