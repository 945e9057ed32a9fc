pub mod arxiv_client;
pub mod atom;

pub use arxiv_client::{build_http_client, ArxivClient};
