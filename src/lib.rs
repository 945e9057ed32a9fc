//! # Socrates
//!
//! 学术研究助手：检索 arXiv 论文、按相关度筛选、读取全文、生成引用并下载 PDF。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与外部服务通信
//! - `ArxivClient` - arXiv 检索接口，解析 Atom feed
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，都是无状态能力
//! - `relevance` / `selector` - 打分和筛选
//! - `citation` - 摘要和引用文本
//! - `intent` - 下载意图解析
//! - `ContentFetcher` - PDF 下载、缓存和文本提取
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次检索"的处理流程
//! - `ResearchFlow` - 检索 → 筛选 → 全文
//! - `SessionCache` - 最近一次结果集
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/research_tools` - 对外工具操作
//! - `orchestrator/tool_router` - 工具名称分发
//! - `orchestrator/app` - 请求循环
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::ArxivClient;
pub use config::Config;
pub use error::{AppError, AppResult, FetchError, SearchError};
pub use models::Paper;
pub use orchestrator::{App, ResearchTools, ToolRouter};
pub use services::{ContentFetcher, DownloadScope, Intent, IntentParser};
pub use workflow::{ResearchFlow, SessionCache};
