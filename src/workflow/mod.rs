pub mod research_flow;
pub mod session_cache;

pub use research_flow::{ResearchFlow, Selection};
pub use session_cache::SessionCache;
