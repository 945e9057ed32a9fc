//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把流程层的结构化结果组织成对外的工具输出，并负责请求的接入。
//!
//! ## 模块划分
//!
//! ### `research_tools` - 研究工具
//! - 持有 ResearchFlow、SessionCache 和 IntentParser
//! - 每个工具操作返回纯文本，失败也转成文本
//! - 成功的检索操作整体替换会话缓存
//!
//! ### `tool_router` - 工具路由
//! - 工具名称到操作的映射
//! - JSON 参数解析和默认值
//!
//! ### `app` - 应用主循环
//! - 初始化目录和组件
//! - stdin / stdout 上的逐行 JSON 请求循环
//!
//! ## 层次关系
//!
//! ```text
//! app (请求循环)
//!     ↓
//! tool_router (名称 → 操作)
//!     ↓
//! research_tools (输出文本 + 会话缓存)
//!     ↓
//! workflow::ResearchFlow (检索 → 筛选 → 全文)
//!     ↓
//! services (能力层：relevance / selector / citation / intent / content_fetcher)
//!     ↓
//! clients (ArxivClient)
//! ```

pub mod app;
pub mod research_tools;
pub mod tool_router;

pub use app::App;
pub use research_tools::ResearchTools;
pub use tool_router::ToolRouter;
