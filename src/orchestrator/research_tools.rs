//! 研究工具 - 编排层
//!
//! 把检索、筛选、全文获取、引用和下载组合成对外的工具操作。
//!
//! 每个操作都只返回一个字符串：内部失败被转成带 "Error" 前缀的说明，
//! 不会向调用方抛出错误。成功的检索类操作会整体替换会话缓存。

use crate::clients::{build_http_client, ArxivClient};
use crate::config::Config;
use crate::error::{AppResult, SearchError};
use crate::models::Paper;
use crate::services::citation::{self, take_chars};
use crate::services::intent::{self, DownloadScope, Intent};
use crate::services::{ContentFetcher, IntentParser};
use crate::utils::logging;
use crate::workflow::{ResearchFlow, SessionCache};
use chrono::Datelike;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

/// 工具默认检索篇数
pub const DEFAULT_MAX_RESULTS: usize = 10;
/// 研究问题默认检索篇数
pub const DEFAULT_RESEARCH_RESULTS: usize = 15;
/// 学术研究默认起始年份
pub const DEFAULT_YEAR_FROM: i32 = 2010;

pub const SERVER_NAME: &str = "Socrates";
pub const SERVER_VERSION: &str = "3.0.0";
pub const SERVER_OWNER: &str = "Universitas AI";

const SEARCH_FOOTER: &str =
    "\nTo download any of these papers, simply ask me to 'download these papers' or 'download paper X'.";
const ASK_FOOTER: &str = "\nTo download these papers, simply ask me to 'download these papers'.";
const REPLY_FOOTER: &str = "\nTo download these papers, simply reply with 'download these papers'.";

/// 研究工具集合
pub struct ResearchTools {
    flow: ResearchFlow,
    session: SessionCache,
    intents: IntentParser,
    download_dir: PathBuf,
}

impl ResearchTools {
    /// 按配置创建，使用新的会话缓存
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = build_http_client(config)
            .map_err(|e| SearchError::request_failed(&config.arxiv_api_base, e))?;
        let client = ArxivClient::with_http(http.clone(), config);
        let fetcher = ContentFetcher::new(http, config.pdf_cache_dir.clone());
        Self::with_parts(
            ResearchFlow::new(client, fetcher),
            SessionCache::new(),
            config.download_dir.clone(),
        )
    }

    /// 由已构建的组件创建（会话缓存由调用方持有）
    pub fn with_parts(
        flow: ResearchFlow,
        session: SessionCache,
        download_dir: impl Into<PathBuf>,
    ) -> AppResult<Self> {
        let intents = IntentParser::new()?;
        Ok(Self {
            flow,
            session,
            intents,
            download_dir: download_dir.into(),
        })
    }

    pub fn session(&self) -> &SessionCache {
        &self.session
    }

    pub fn intents(&self) -> &IntentParser {
        &self.intents
    }

    // ========== 检索类操作 ==========

    /// 检索论文（不打分），结果按索引顺序写入会话缓存
    pub async fn search_papers(&self, query: &str, limit: usize) -> String {
        logging::log_tool_call("arxiv_search", query);
        self.try_search_papers(query, limit)
            .await
            .unwrap_or_else(|e| format!("Error searching ArXiv: {}", e))
    }

    async fn try_search_papers(&self, query: &str, limit: usize) -> AppResult<String> {
        let papers = self.flow.search(query, limit).await?;
        self.session.replace(papers.clone()).await;

        if papers.is_empty() {
            return Ok(format!("No papers found matching '{}'.", query));
        }

        let mut result = format!("Found {} papers matching '{}':\n\n", papers.len(), query);
        for (i, paper) in papers.iter().enumerate() {
            result.push_str(&format!("{}. {}\n", i + 1, paper.title));
            result.push_str(&format!(
                "   Authors: {}\n",
                citation::format_authors(&paper.authors)
            ));
            if let Some(url) = &paper.pdf_url {
                result.push_str(&format!("   URL: {}\n", url));
            }
            if let Some(date) = paper.published_date() {
                result.push_str(&format!("   Published: {}\n\n", date));
            }
        }

        result.push_str(&citation::cite_all(&papers));
        result.push_str(SEARCH_FOOTER);
        Ok(result)
    }

    /// 检索并按相关度筛选
    pub async fn analyze_papers(&self, query: &str, limit: usize) -> String {
        logging::log_tool_call("analyze_papers", query);
        self.try_analyze_papers(query, limit)
            .await
            .unwrap_or_else(|e| format!("Error analyzing papers: {}", e))
    }

    async fn try_analyze_papers(&self, query: &str, limit: usize) -> AppResult<String> {
        let selection = self.flow.search_and_select(query, limit).await?;
        if selection.total == 0 {
            return Ok(format!("No papers found matching '{}'.", query));
        }

        let relevant = selection.selected;
        self.session.replace(relevant.clone()).await;

        let mut result = format!("Analysis of papers matching '{}':\n\n", query);
        result.push_str(&format!(
            "Found {} relevant papers out of {} results.\n\n",
            relevant.len(),
            selection.total
        ));

        for (i, paper) in relevant.iter().enumerate() {
            result.push_str(&format!("--- Paper {} ---\n", i + 1));
            result.push_str(&citation::summarize(paper));
            result.push_str(&format!(
                "Relevance Score: {:.2}\n\n",
                paper.relevance_score.unwrap_or_default()
            ));
        }

        result.push_str(&citation::cite_all(&relevant));
        result.push_str(ASK_FOOTER);
        Ok(result)
    }

    /// 检索、筛选并读取全文
    pub async fn read_papers(&self, query: &str, limit: usize) -> String {
        logging::log_tool_call("read_papers", query);
        self.try_read_papers(query, limit)
            .await
            .unwrap_or_else(|e| format!("Error reading papers: {}", e))
    }

    async fn try_read_papers(&self, query: &str, limit: usize) -> AppResult<String> {
        let selection = self.flow.search_and_select(query, limit).await?;
        if selection.total == 0 {
            return Ok(format!("No papers found matching '{}'.", query));
        }

        let relevant = self.flow.hydrate(selection.selected).await;
        self.session.replace(relevant.clone()).await;

        let mut result = format!("Reading the most relevant papers for '{}':\n\n", query);
        result.push_str(&format!(
            "Selected {} papers out of {} results based on relevance.\n\n",
            relevant.len(),
            selection.total
        ));

        let mut read_count = 0;
        for (i, paper) in relevant.iter().enumerate() {
            result.push_str(&format!("--- Processing Paper {}: {} ---\n", i + 1, paper.title));

            if paper.pdf_url.is_none() {
                result.push_str("PDF URL not available for this paper.\n\n");
                continue;
            }

            result.push_str(&format!(
                "Downloading and reading paper (ArXiv ID: {})...\n",
                paper.short_id()
            ));
            match &paper.content {
                Some(Ok(text)) => {
                    read_count += 1;
                    result.push_str(&format!(
                        "Successfully read paper. Content length: {} characters\n",
                        text.chars().count()
                    ));
                    result.push_str(&format!(
                        "Content preview: {}...\n\n",
                        take_chars(text, 200)
                    ));
                }
                Some(Err(e)) => result.push_str(&format!("Error: {}\n\n", e)),
                None => result.push_str("Error: content was not fetched\n\n"),
            }
        }

        if read_count > 0 {
            result.push_str("Paper Reading Complete\n\n");
            result.push_str(&format!(
                "Successfully read {} papers on '{}'.\n",
                read_count, query
            ));
            result.push_str("You can now ask more specific questions about the paper contents.\n");
            result.push_str(&citation::cite_all(&relevant));
            result.push_str(REPLY_FOOTER);
        } else {
            result.push_str(
                "Could not read any papers. Please try a different query or check for errors above.",
            );
        }

        Ok(result)
    }

    /// 回答研究问题：去掉问号和感叹号作为检索式，读取全文并给出摘录
    pub async fn answer_research_question(&self, question: &str, limit: usize) -> String {
        logging::log_tool_call("research_question", question);
        self.try_answer_research_question(question, limit)
            .await
            .unwrap_or_else(|e| format!("Error researching question: {}", e))
    }

    async fn try_answer_research_question(&self, question: &str, limit: usize) -> AppResult<String> {
        let query = question_to_query(question);

        let selection = self.flow.search_and_select(&query, limit).await?;
        if selection.total == 0 {
            return Ok(format!(
                "No papers found relevant to your question: '{}'",
                question
            ));
        }

        let relevant = self.flow.hydrate(selection.selected).await;
        self.session.replace(relevant.clone()).await;

        let with_pdf: Vec<&Paper> = relevant.iter().filter(|p| p.pdf_url.is_some()).collect();

        let mut answer = format!("Research findings on: {}\n\n", question);
        answer.push_str(&format!(
            "I analyzed {} relevant papers from ArXiv to answer your question.\n\n",
            with_pdf.len()
        ));
        answer.push_str("Key papers on this topic:\n\n");

        for (i, paper) in with_pdf.iter().take(3).enumerate() {
            answer.push_str(&format!("{}. {}\n", i + 1, paper.title));
            if let Some(date) = paper.published_date() {
                answer.push_str(&format!("   Published: {}\n", date));
            }
            answer.push_str(&format!(
                "   Summary: {}...\n",
                take_chars(&paper.summary, 200)
            ));

            match paper.content_text() {
                Some(text) if !text.is_empty() => {
                    let excerpt = take_chars(text, 300).replace('\n', " ");
                    answer.push_str(&format!("   Excerpt: {}...\n\n", excerpt));
                }
                _ => answer.push('\n'),
            }
        }

        answer.push_str(&citation::cite_all(&relevant));
        answer.push_str(ASK_FOOTER);
        Ok(answer)
    }

    /// 学术研究：起始年份晚于默认值时在检索式后追加年份区间
    pub async fn academic_research(&self, question: &str, limit: usize, year_from: i32) -> String {
        logging::log_tool_call("academic_research", question);

        let mut query = question_to_query(question);
        if year_from > DEFAULT_YEAR_FROM {
            query.push_str(&format!(" {}-{}", year_from, chrono::Local::now().year()));
        }

        let findings = self.answer_research_question(&query, limit).await;

        let mut response = format!("# Academic Research on: {}\n\n", question);
        response.push_str(
            "I've conducted specialized academic research using ArXiv papers. Here are my findings:\n\n",
        );
        response.push_str(&findings);
        response
    }

    // ========== 下载类操作 ==========

    /// 下载会话缓存中的论文
    ///
    /// # 参数
    /// - `ids`: 短 ID 白名单，只能引用缓存中的论文
    /// - `all`: 是否下载缓存中的全部论文
    pub async fn download_selection(&self, ids: Option<&[String]>, all: bool) -> String {
        let cached = self.session.snapshot().await;
        let ids = ids.unwrap_or_default();

        if cached.is_empty() && ids.is_empty() {
            return "No papers have been searched or specified for download. Please search for papers first."
                .to_string();
        }

        let targets: Vec<Paper> = if all && !cached.is_empty() {
            cached
        } else if !ids.is_empty() {
            cached
                .into_iter()
                .filter(|p| ids.iter().any(|id| id == p.short_id()))
                .collect()
        } else {
            Vec::new()
        };

        if targets.is_empty() {
            info!("没有可下载的论文");
            return "No valid papers found to download.".to_string();
        }

        info!("📥 开始下载 {} 篇论文到 {}", targets.len(), self.download_dir.display());
        let report = self
            .flow
            .fetcher()
            .download_to_destination(&targets, &self.download_dir)
            .await;
        logging::log_batch_complete(report.succeeded.len(), report.failed_count, report.total());

        let mut result = format!(
            "Downloaded {} papers to {}:\n\n",
            report.succeeded.len(),
            self.download_dir.display()
        );
        for saved in &report.succeeded {
            result.push_str(&format!(
                "- {} (arXiv:{})\n  Saved to: {}\n",
                saved.title,
                saved.short_id,
                saved.path.display()
            ));
        }
        if report.failed_count > 0 {
            result.push_str(&format!(
                "\nFailed to download {} papers.",
                report.failed_count
            ));
        }
        result
    }

    /// 下载最近一次结果集中的全部论文
    pub async fn download_recent_papers(&self) -> String {
        logging::log_tool_call("download_recent_papers", "");
        self.download_selection(None, true).await
    }

    /// 解析用户消息中的下载请求并执行
    pub async fn parse_download_request(&self, message: &str) -> String {
        logging::log_tool_call("parse_download_request", message);

        match self.intents.parse(message) {
            Intent::None => "No download request detected. To download papers, ask me to 'download these papers' or similar."
                .to_string(),
            Intent::Download(DownloadScope::All) => self.download_selection(None, true).await,
            Intent::Download(scope) => {
                let cached = self.session.snapshot().await;
                if cached.is_empty() {
                    return "No papers have been searched yet. Please search for papers first."
                        .to_string();
                }
                let ids = intent::resolve_scope(&scope, &cached);
                self.download_selection(Some(&ids), false).await
            }
        }
    }

    /// 处理论文相关命令（目前只支持下载）
    pub async fn handle_paper_command(&self, command: &str) -> String {
        logging::log_tool_call("handle_paper_command", command);

        match self.intents.parse(command) {
            Intent::None => "Unknown paper command. For downloads, please say 'download these papers' or 'download paper X'."
                .to_string(),
            Intent::Download(DownloadScope::All) => self.download_selection(None, true).await,
            Intent::Download(scope) => {
                let cached = self.session.snapshot().await;
                let ids = intent::resolve_scope(&scope, &cached);
                self.download_selection(Some(&ids), false).await
            }
        }
    }

    // ========== 服务信息 ==========

    /// 服务说明，`query` 中包含 capabilities / connection 时给出对应信息
    pub fn server_info(&self, query: Option<&str>) -> String {
        let mut info = format!("{} Academic Research Assistant\n\n", SERVER_NAME);
        info.push_str(&format!("Version: {}\n", SERVER_VERSION));
        info.push_str(&format!("Owner: {}\n", SERVER_OWNER));
        info.push_str("Type: Model Context Protocol (MCP) Server\n\n");

        let query = query.map(str::to_lowercase).unwrap_or_default();
        if query.contains("capabilities") {
            info.push_str("Capabilities:\n");
            info.push_str("- Search arXiv for scientific papers\n");
            info.push_str("- Analyze and evaluate papers by relevance\n");
            info.push_str("- Extract and read full paper content\n");
            info.push_str("- Generate proper academic citations\n");
            info.push_str("- Answer research questions with citations\n");
            info.push_str("- Download papers for offline access\n");
        } else if query.contains("connection") {
            info.push_str("Connection Information:\n");
            info.push_str("- Compatible with any AI assistant that supports MCP\n");
            info.push_str("- Exchanges tool calls as line-delimited JSON over stdio\n");
            info.push_str("- Every tool returns plain text suitable for direct display\n");
        } else {
            info.push_str("Socrates is a specialized academic research assistant that helps you discover, analyze,\n");
            info.push_str("and understand scientific papers from arXiv. It can search for papers, evaluate their\n");
            info.push_str("relevance, extract their content, and provide answers to research questions with\n");
            info.push_str("automatic citations. It can also download papers for offline reading.\n\n");
            info.push_str("This server works with any AI that supports the Model Context Protocol (MCP).");
        }
        info
    }

    /// `socrates://info` 资源内容
    pub fn server_metadata(&self) -> Value {
        json!({
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Academic Research Assistant for finding, analyzing, and citing scientific papers",
            "owner": SERVER_OWNER,
            "capabilities": [
                "arxiv_search",
                "paper_analysis",
                "full_text_extraction",
                "citation_generation",
                "paper_download"
            ]
        })
    }
}

/// 问题转检索式：去掉 `?` 和 `!`
pub fn question_to_query(question: &str) -> String {
    question.replace(['?', '!'], "")
}
