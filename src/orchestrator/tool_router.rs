//! 工具路由 - 编排层
//!
//! 按工具名称把 JSON 参数解析成强类型参数，再分发到 `ResearchTools`。
//! 参数不合法时返回 "Error: ..." 字符串，和各工具的失败输出保持一致。

use crate::error::{AppError, AppResult};
use crate::orchestrator::research_tools::{
    ResearchTools, DEFAULT_MAX_RESULTS, DEFAULT_RESEARCH_RESULTS, DEFAULT_YEAR_FROM,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// 已注册的工具名称
pub const TOOL_NAMES: &[&str] = &[
    "arxiv_search",
    "analyze_papers",
    "read_papers",
    "research_question",
    "academic_research",
    "download_papers_to_user",
    "download_recent_papers",
    "parse_download_request",
    "handle_paper_command",
    "server_info",
];

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_research_results() -> usize {
    DEFAULT_RESEARCH_RESULTS
}

fn default_year_from() -> i32 {
    DEFAULT_YEAR_FROM
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct QuestionArgs {
    question: String,
    #[serde(default = "default_research_results")]
    max_results: usize,
    #[serde(default = "default_year_from")]
    year_from: i32,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadArgs {
    #[serde(default)]
    specific_ids: Option<Vec<String>>,
    #[serde(default)]
    download_all: bool,
}

#[derive(Debug, Deserialize)]
struct MessageArgs {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CommandArgs {
    command: String,
}

#[derive(Debug, Default, Deserialize)]
struct InfoArgs {
    #[serde(default)]
    query: Option<String>,
}

/// 工具路由
pub struct ToolRouter {
    tools: ResearchTools,
}

impl ToolRouter {
    pub fn new(tools: ResearchTools) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ResearchTools {
        &self.tools
    }

    pub fn tool_names() -> &'static [&'static str] {
        TOOL_NAMES
    }

    /// 调用工具，总是返回文本
    ///
    /// # 参数
    /// - `name`: 工具名称
    /// - `arguments`: JSON 对象形式的参数，`null` 视为空对象
    pub async fn call(&self, name: &str, arguments: &Value) -> String {
        match self.dispatch(name, arguments).await {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️ 工具 {} 调用失败: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> AppResult<String> {
        let text = match name {
            "arxiv_search" => {
                let args: QueryArgs = parse_args(arguments)?;
                self.tools.search_papers(&args.query, args.max_results).await
            }
            "analyze_papers" => {
                let args: QueryArgs = parse_args(arguments)?;
                self.tools.analyze_papers(&args.query, args.max_results).await
            }
            "read_papers" => {
                let args: QueryArgs = parse_args(arguments)?;
                self.tools.read_papers(&args.query, args.max_results).await
            }
            "research_question" => {
                let args: QuestionArgs = parse_args(arguments)?;
                self.tools
                    .answer_research_question(&args.question, args.max_results)
                    .await
            }
            "academic_research" => {
                let args: QuestionArgs = parse_args(arguments)?;
                self.tools
                    .academic_research(&args.question, args.max_results, args.year_from)
                    .await
            }
            "download_papers_to_user" => {
                let args: DownloadArgs = parse_args(arguments)?;
                self.tools
                    .download_selection(args.specific_ids.as_deref(), args.download_all)
                    .await
            }
            "download_recent_papers" => self.tools.download_recent_papers().await,
            "parse_download_request" => {
                let args: MessageArgs = parse_args(arguments)?;
                self.tools.parse_download_request(&args.message).await
            }
            "handle_paper_command" => {
                let args: CommandArgs = parse_args(arguments)?;
                self.tools.handle_paper_command(&args.command).await
            }
            "server_info" => {
                let args: InfoArgs = parse_args(arguments)?;
                self.tools.server_info(args.query.as_deref())
            }
            other => {
                return Err(AppError::invalid_arguments(format!(
                    "unknown tool '{}'",
                    other
                )))
            }
        };
        Ok(text)
    }
}

fn parse_args<T: DeserializeOwned>(arguments: &Value) -> AppResult<T> {
    let value = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments.clone()
    };
    serde_json::from_value(value).map_err(|e| AppError::invalid_arguments(e.to_string()))
}
