use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// arXiv 检索 API 地址
    pub arxiv_api_base: String,
    /// 缓存根目录
    pub cache_dir: PathBuf,
    /// PDF 缓存目录（按短 ID 存放）
    pub pdf_cache_dir: PathBuf,
    /// 面向用户的下载目录
    pub download_dir: PathBuf,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 检索排序字段
    pub sort_by: String,
    /// 检索排序方向
    pub sort_order: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        let home = home_dir();
        let cache_dir = home.join("socrates_cache");
        Self {
            arxiv_api_base: "http://export.arxiv.org/api/query".to_string(),
            pdf_cache_dir: cache_dir.join("pdfs"),
            cache_dir,
            download_dir: home.join("Downloads").join("arxiv_papers"),
            request_timeout_secs: 30,
            user_agent: concat!("socrates/", env!("CARGO_PKG_VERSION")).to_string(),
            sort_by: "relevance".to_string(),
            sort_order: "descending".to_string(),
            verbose_logging: false,
        }
    }
}

/// 配置文件的原始内容
///
/// `pdf_cache_dir` 单独取出，未设置时跟随 `cache_dir`
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    pdf_cache_dir: Option<PathBuf>,
    #[serde(flatten)]
    rest: Config,
}

impl Config {
    /// 从环境变量覆盖默认配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，未出现的字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let file: ConfigFile =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;

        let mut config = file.rest;
        config.pdf_cache_dir = file
            .pdf_cache_dir
            .unwrap_or_else(|| config.cache_dir.join("pdfs"));
        Ok(config)
    }

    /// 加载配置：`SOCRATES_CONFIG` 指向的文件（如有），再叠加环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("SOCRATES_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let cache_dir = env_path("SOCRATES_CACHE_DIR").unwrap_or(self.cache_dir.clone());
        let pdf_cache_dir = env_path("SOCRATES_PDF_CACHE_DIR").unwrap_or_else(|| {
            if cache_dir != self.cache_dir {
                cache_dir.join("pdfs")
            } else {
                self.pdf_cache_dir.clone()
            }
        });

        Ok(Self {
            arxiv_api_base: std::env::var("ARXIV_API_BASE").unwrap_or(self.arxiv_api_base),
            cache_dir,
            pdf_cache_dir,
            download_dir: env_path("SOCRATES_DOWNLOAD_DIR").unwrap_or(self.download_dir),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            user_agent: self.user_agent,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }

    /// 创建缓存目录和下载目录
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.cache_dir, &self.pdf_cache_dir, &self.download_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn env_path(var_name: &str) -> Option<PathBuf> {
    std::env::var(var_name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_layout() {
        let config = Config::default();

        assert_eq!(config.arxiv_api_base, "http://export.arxiv.org/api/query");
        assert_eq!(config.pdf_cache_dir, config.cache_dir.join("pdfs"));
        assert!(config.download_dir.ends_with("Downloads/arxiv_papers"));
        assert_eq!(config.sort_by, "relevance");
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "cache_dir = \"/tmp/socrates-test\"\nrequest_timeout_secs = 5\nverbose_logging = true"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/socrates-test"));
        assert_eq!(config.pdf_cache_dir, PathBuf::from("/tmp/socrates-test/pdfs"));
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.verbose_logging);
        assert_eq!(config.sort_order, "descending");
    }

    #[test]
    fn test_from_file_ignores_key_name_in_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "# pdf_cache_dir 不设置时跟随 cache_dir\ncache_dir = \"/tmp/socrates-comment\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.pdf_cache_dir, PathBuf::from("/tmp/socrates-comment/pdfs"));
    }

    #[test]
    fn test_from_file_explicit_pdf_cache_dir() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "cache_dir = \"/tmp/socrates-a\"\npdf_cache_dir = \"/tmp/socrates-b\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/socrates-a"));
        assert_eq!(config.pdf_cache_dir, PathBuf::from("/tmp/socrates-b"));
    }

    #[test]
    fn test_from_file_reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = \"soon\"").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }
}
