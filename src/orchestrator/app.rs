//! 应用主循环 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建目录、组装 ResearchTools 和 ToolRouter
//! 2. **请求循环**：从 stdin 逐行读取 JSON 请求，结果逐行写到 stdout
//! 3. **统计**：退出时输出处理的请求数
//!
//! ## 请求格式
//!
//! ```text
//! {"tool": "arxiv_search", "arguments": {"query": "graph neural networks"}}
//! {"tool": "list_tools"}
//! {"resource": "socrates://info"}
//! ```
//!
//! 日志只写 stderr，stdout 上每行都是一个 JSON 响应。

use crate::config::Config;
use crate::orchestrator::research_tools::ResearchTools;
use crate::orchestrator::tool_router::ToolRouter;
use crate::utils::logging;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// 服务信息资源地址
pub const INFO_RESOURCE: &str = "socrates://info";

/// 单行请求
#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    arguments: Value,
}

/// 应用主结构
pub struct App {
    router: ToolRouter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config
            .ensure_dirs()
            .context("创建缓存或下载目录失败")?;

        logging::log_startup(&config);

        let tools = ResearchTools::new(&config).context("初始化研究工具失败")?;
        Ok(Self::with_router(ToolRouter::new(tools)))
    }

    pub fn with_router(router: ToolRouter) -> Self {
        Self { router }
    }

    /// 在标准输入输出上运行
    pub async fn run(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// 处理请求流直到输入结束
    ///
    /// # 返回
    /// 输入结束时返回 Ok，读写失败时返回错误
    pub async fn serve<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        let mut handled = 0usize;

        info!("📡 等待请求（每行一个 JSON）...");
        while let Some(line) = lines.next_line().await.context("读取请求失败")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = self.handle_line(line).await;
            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            output
                .write_all(encoded.as_bytes())
                .await
                .context("写出响应失败")?;
            output.flush().await?;
            handled += 1;
        }

        info!("✓ 输入结束，共处理 {} 个请求", handled);
        Ok(())
    }

    /// 处理单行请求，总是返回一个 JSON 响应
    pub async fn handle_line(&self, line: &str) -> Value {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("⚠️ 无法解析请求: {}", e);
                return json!({ "error": format!("invalid request: {}", e) });
            }
        };

        match (request.tool, request.resource) {
            (Some(tool), _) if tool == "list_tools" => {
                json!({ "tools": ToolRouter::tool_names() })
            }
            (Some(tool), _) => {
                let result = self.router.call(&tool, &request.arguments).await;
                json!({ "tool": tool, "result": result })
            }
            (None, Some(resource)) if resource == INFO_RESOURCE => json!({
                "resource": resource,
                "contents": self.router.tools().server_metadata(),
            }),
            (None, Some(resource)) => {
                json!({ "error": format!("unknown resource '{}'", resource) })
            }
            (None, None) => json!({ "error": "request needs a 'tool' or 'resource' field" }),
        }
    }
}
