use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 论文检索错误
    #[error("检索错误: {0}")]
    Search(#[from] SearchError),
    /// 工具调用参数错误
    #[error("参数错误: {0}")]
    InvalidArguments(String),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 论文索引不可用
///
/// 上游索引无法访问或返回了无法解析的数据
#[derive(Debug, Error)]
pub enum SearchError {
    /// 网络请求失败
    #[error("request to {endpoint} failed: {message}")]
    RequestFailed { endpoint: String, message: String },
    /// 索引返回非成功状态码
    #[error("{endpoint} returned HTTP {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应不是合法的 Atom feed
    #[error("malformed feed: {0}")]
    MalformedFeed(String),
}

/// 单篇论文全文获取失败
///
/// Display 文本保持 "Error" 前缀，直接作为用户可见的失败说明
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 论文没有 PDF 链接
    #[error("PDF URL not available")]
    PdfUnavailable,
    /// 下载失败
    #[error("Error downloading PDF: {0}")]
    Download(String),
    /// 文本提取失败
    #[error("Error extracting text from PDF: {0}")]
    Extraction(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::RequestFailed {
            endpoint: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::Error> for SearchError {
    fn from(err: quick_xml::Error) -> Self {
        SearchError::MalformedFeed(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Download(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Download(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidArguments(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建参数错误
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        AppError::InvalidArguments(message.into())
    }
}

impl SearchError {
    /// 创建检索请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: impl std::fmt::Display) -> Self {
        SearchError::RequestFailed {
            endpoint: endpoint.into(),
            message: source.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_keeps_error_prefix() {
        let download = FetchError::Download("connection reset".to_string());
        let extraction = FetchError::Extraction("no pages".to_string());

        assert_eq!(download.to_string(), "Error downloading PDF: connection reset");
        assert_eq!(
            extraction.to_string(),
            "Error extracting text from PDF: no pages"
        );
        assert_eq!(FetchError::PdfUnavailable.to_string(), "PDF URL not available");
    }

    #[test]
    fn test_search_error_wraps_into_app_error() {
        let err: AppError = SearchError::BadStatus {
            endpoint: "http://example.org/api/query".to_string(),
            status: 503,
        }
        .into();

        assert!(matches!(err, AppError::Search(_)));
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_third_party_errors_become_other() {
        let err: AppError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, AppError::Other(_)));

        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, AppError::Other(ref m) if m == "gone"));
    }
}
