use std::fmt;

/// 错误类型
///
/// "码不存在" 之类的可预期失败走 `Option`，这里只放调用方的编程错误和 I/O 失败。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracklinkError {
    InvalidBase62(String),
    NegativeInput(String),
    Overflow(String),
    Validation(String),
    UrlParse(String),
    FileOperation(String),
    Serialization(String),
    Config(String),
}

impl TracklinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TracklinkError::InvalidBase62(_) => "E001",
            TracklinkError::NegativeInput(_) => "E002",
            TracklinkError::Overflow(_) => "E003",
            TracklinkError::Validation(_) => "E004",
            TracklinkError::UrlParse(_) => "E005",
            TracklinkError::FileOperation(_) => "E006",
            TracklinkError::Serialization(_) => "E007",
            TracklinkError::Config(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TracklinkError::InvalidBase62(_) => "Invalid Base62 Input",
            TracklinkError::NegativeInput(_) => "Negative Input",
            TracklinkError::Overflow(_) => "Numeric Overflow",
            TracklinkError::Validation(_) => "Validation Error",
            TracklinkError::UrlParse(_) => "URL Parse Error",
            TracklinkError::FileOperation(_) => "File Operation Error",
            TracklinkError::Serialization(_) => "Serialization Error",
            TracklinkError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TracklinkError::InvalidBase62(msg)
            | TracklinkError::NegativeInput(msg)
            | TracklinkError::Overflow(msg)
            | TracklinkError::Validation(msg)
            | TracklinkError::UrlParse(msg)
            | TracklinkError::FileOperation(msg)
            | TracklinkError::Serialization(msg)
            | TracklinkError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 CLI 错误输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TracklinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TracklinkError {}

// 便捷的构造函数
impl TracklinkError {
    pub fn invalid_base62<T: Into<String>>(msg: T) -> Self {
        TracklinkError::InvalidBase62(msg.into())
    }

    pub fn negative_input<T: Into<String>>(msg: T) -> Self {
        TracklinkError::NegativeInput(msg.into())
    }

    pub fn overflow<T: Into<String>>(msg: T) -> Self {
        TracklinkError::Overflow(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TracklinkError::Validation(msg.into())
    }

    pub fn url_parse<T: Into<String>>(msg: T) -> Self {
        TracklinkError::UrlParse(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TracklinkError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TracklinkError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        TracklinkError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for TracklinkError {
    fn from(err: std::io::Error) -> Self {
        TracklinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TracklinkError {
    fn from(err: serde_json::Error) -> Self {
        TracklinkError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for TracklinkError {
    fn from(err: url::ParseError) -> Self {
        TracklinkError::UrlParse(err.to_string())
    }
}

impl From<toml::ser::Error> for TracklinkError {
    fn from(err: toml::ser::Error) -> Self {
        TracklinkError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for TracklinkError {
    fn from(err: config::ConfigError) -> Self {
        TracklinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TracklinkError>;
