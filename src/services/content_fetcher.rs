//! 全文获取服务 - 业务能力层
//!
//! 只负责"下载 PDF 并提取文本"能力：
//! - PDF 按短 ID 缓存在本地，命中缓存时不再请求网络
//! - 单篇失败以 `FetchError` 返回，由调用方决定如何展示
//! - 批量下载逐篇进行，一篇失败不影响其余

use crate::error::FetchError;
use crate::models::Paper;
use crate::services::text_extractor::{join_pages, LopdfExtractor, TextExtractor};
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// 文件名中标题部分的最大字符数
pub const MAX_TITLE_CHARS: usize = 100;

/// 文件名中不允许出现的字符
const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 成功下载的一篇论文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPaper {
    pub short_id: String,
    pub title: String,
    pub path: PathBuf,
}

/// 批量下载结果
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub succeeded: Vec<DownloadedPaper>,
    pub failed_count: usize,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed_count
    }
}

/// 全文获取服务
#[derive(Clone)]
pub struct ContentFetcher {
    http: Client,
    cache_dir: PathBuf,
    extractor: Arc<dyn TextExtractor>,
}

impl ContentFetcher {
    /// 使用 lopdf 提取文本
    pub fn new(http: Client, cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_extractor(http, cache_dir, Arc::new(LopdfExtractor))
    }

    /// 使用自定义的文本提取实现
    pub fn with_extractor(
        http: Client,
        cache_dir: impl Into<PathBuf>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            http,
            cache_dir: cache_dir.into(),
            extractor,
        }
    }

    /// PDF 缓存路径
    pub fn cached_pdf_path(&self, short_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.pdf", short_id))
    }

    /// 获取全文并返回带 `content` 的副本
    pub async fn fetch_content(&self, paper: &Paper) -> Paper {
        let mut hydrated = paper.clone();
        hydrated.content = Some(self.read_content(paper).await);
        hydrated
    }

    /// 获取全文
    ///
    /// # 返回
    /// 成功时返回拼接后的全文；没有 PDF 链接、下载失败、提取失败分别对应
    /// `PdfUnavailable` / `Download` / `Extraction`
    pub async fn read_content(&self, paper: &Paper) -> Result<String, FetchError> {
        let url = paper.pdf_url.as_deref().ok_or(FetchError::PdfUnavailable)?;
        let path = self.download_pdf(paper.short_id(), url).await?;
        self.extract_text(path).await
    }

    /// 下载 PDF 到缓存目录，已缓存时直接返回路径
    pub async fn download_pdf(&self, short_id: &str, url: &str) -> Result<PathBuf, FetchError> {
        let path = self.cached_pdf_path(short_id);
        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!("📦 命中缓存: {}", path.display());
            return Ok(path);
        }

        fs::create_dir_all(&self.cache_dir).await?;
        debug!("⬇️ 下载 PDF: {} -> {}", url, path.display());
        self.stream_to_file(url, &path).await?;
        Ok(path)
    }

    /// 批量下载到目标目录
    ///
    /// 没有 PDF 链接的论文直接计为失败，不发请求
    pub async fn download_to_destination(&self, papers: &[Paper], dest_dir: &Path) -> DownloadReport {
        let mut report = DownloadReport::default();

        if let Err(e) = fs::create_dir_all(dest_dir).await {
            warn!("无法创建下载目录 {}: {}", dest_dir.display(), e);
            report.failed_count = papers.len();
            return report;
        }

        for paper in papers {
            let Some(url) = paper.pdf_url.as_deref() else {
                warn!("⚠️ {} 没有 PDF 链接，跳过", paper.short_id());
                report.failed_count += 1;
                continue;
            };

            let path = dest_dir.join(safe_filename(paper));
            match self.stream_to_file(url, &path).await {
                Ok(()) => {
                    info!("✓ 已下载 {} -> {}", paper.short_id(), path.display());
                    report.succeeded.push(DownloadedPaper {
                        short_id: paper.short_id().to_string(),
                        title: paper.title.clone(),
                        path,
                    });
                }
                Err(e) => {
                    warn!("❌ 下载 {} 失败: {}", paper.short_id(), e);
                    report.failed_count += 1;
                }
            }
        }

        report
    }

    /// 流式写入临时文件，完成后改名，避免并发读到半个文件
    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let tmp = temp_path(dest);
        let result = self.write_stream(url, &tmp).await;
        match result {
            Ok(()) => {
                fs::rename(&tmp, dest).await?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp).await;
                Err(e)
            }
        }
    }

    async fn write_stream(&self, url: &str, tmp: &Path) -> Result<(), FetchError> {
        let resp = self.http.get(url).send().await?.error_for_status()?;

        let mut file = fs::File::create(tmp).await?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn extract_text(&self, path: PathBuf) -> Result<String, FetchError> {
        let extractor = Arc::clone(&self.extractor);
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&path))
            .await
            .map_err(|e| FetchError::Extraction(e.to_string()))??;
        Ok(join_pages(&pages))
    }
}

/// 下载文件名：`{short_id}_{去掉非法字符并截断到 100 字符的标题}.pdf`
pub fn safe_filename(paper: &Paper) -> String {
    let title: String = paper
        .title
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .take(MAX_TITLE_CHARS)
        .collect();
    format!("{}_{}.pdf", paper.short_id(), title)
}

fn temp_path(dest: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.{}.{}.part", name, std::process::id(), n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 把文件内容当作单页文本，并记录调用次数
    #[derive(Default)]
    struct FakeExtractor {
        calls: AtomicUsize,
    }

    impl TextExtractor for FakeExtractor {
        fn extract_pages(&self, path: &Path) -> Result<Vec<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let bytes = std::fs::read(path).map_err(|e| FetchError::Extraction(e.to_string()))?;
            if bytes.starts_with(b"%PDF") {
                Ok(vec![String::from_utf8_lossy(&bytes[4..]).to_string(), "page two".to_string()])
            } else {
                Err(FetchError::Extraction("not a pdf".to_string()))
            }
        }
    }

    fn paper(short_id: &str, title: &str, pdf_url: Option<String>) -> Paper {
        Paper {
            id: format!("http://arxiv.org/abs/{}", short_id),
            title: title.to_string(),
            pdf_url,
            ..Default::default()
        }
    }

    fn fetcher(cache_dir: &Path) -> ContentFetcher {
        ContentFetcher::with_extractor(
            Client::new(),
            cache_dir,
            Arc::new(FakeExtractor::default()),
        )
    }

    #[tokio::test]
    async fn test_missing_pdf_url_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let hydrated = fetcher(dir.path())
            .fetch_content(&paper("2401.00001v1", "No PDF", None))
            .await;

        assert_eq!(hydrated.content, Some(Err(FetchError::PdfUnavailable)));
    }

    #[tokio::test]
    async fn test_fetch_is_cached_and_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pdf/2401.00002v1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDFhello".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(dir.path());
        let p = paper(
            "2401.00002v1",
            "Cached",
            Some(format!("{}/pdf/2401.00002v1", server.uri())),
        );

        let first = fetcher.fetch_content(&p).await;
        let second = fetcher.fetch_content(&p).await;

        assert_eq!(first.content, Some(Ok("hello\n\npage two\n\n".to_string())));
        assert_eq!(first.content, second.content);
        assert!(fetcher.cached_pdf_path("2401.00002v1").exists());
        // 原论文不被修改
        assert!(p.content.is_none());
    }

    #[tokio::test]
    async fn test_download_failure_is_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher(dir.path());
        let p = paper("2401.00003v1", "Gone", Some(format!("{}/pdf/x", server.uri())));

        let hydrated = fetcher.fetch_content(&p).await;
        let err = hydrated.content.unwrap().unwrap_err();
        assert!(matches!(err, FetchError::Download(_)));
        assert!(err.to_string().starts_with("Error"));
        // 失败不留下缓存文件
        assert!(!fetcher.cached_pdf_path("2401.00003v1").exists());
    }

    #[tokio::test]
    async fn test_extraction_failure_is_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<html>".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let p = paper("2401.00004v1", "Html", Some(format!("{}/pdf/y", server.uri())));

        let result = fetcher(dir.path()).read_content(&p).await;
        assert_eq!(result, Err(FetchError::Extraction("not a pdf".to_string())));
    }

    #[test]
    fn test_safe_filename() {
        let p = paper(
            "2401.00005v1",
            "Attention: is it \"all\" you need? <yes|no> a/b\\c*",
            None,
        );
        assert_eq!(
            safe_filename(&p),
            "2401.00005v1_Attention is it all you need yesno abc.pdf"
        );

        let long = paper("2401.00006v1", &format!("{}?", "t".repeat(150)), None);
        let name = safe_filename(&long);
        let title_part = name
            .strip_prefix("2401.00006v1_")
            .and_then(|s| s.strip_suffix(".pdf"))
            .unwrap();
        assert_eq!(title_part.chars().count(), MAX_TITLE_CHARS);
        assert!(!name.contains('?'));
    }

    #[tokio::test]
    async fn test_download_to_destination_counts_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pdf/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDFok".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pdf/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let papers = vec![
            paper("2401.00007v1", "Good: one", Some(format!("{}/pdf/ok", server.uri()))),
            paper("2401.00008v1", "Broken", Some(format!("{}/pdf/broken", server.uri()))),
            paper("2401.00009v1", "No link", None),
        ];

        let report = fetcher(cache.path())
            .download_to_destination(&papers, dest.path())
            .await;

        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed_count, 2);
        assert_eq!(report.total(), 3);

        let saved = &report.succeeded[0];
        assert_eq!(saved.short_id, "2401.00007v1");
        assert_eq!(saved.path, dest.path().join("2401.00007v1_Good one.pdf"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"%PDFok");
    }
}
