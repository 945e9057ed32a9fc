pub mod citation;
pub mod content_fetcher;
pub mod intent;
pub mod relevance;
pub mod selector;
pub mod text_extractor;

pub use content_fetcher::{ContentFetcher, DownloadReport, DownloadedPaper};
pub use intent::{DownloadScope, Intent, IntentParser};
pub use text_extractor::{LopdfExtractor, TextExtractor};
