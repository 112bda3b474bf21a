use thiserror::Error;

/// 应用程序错误类型
///
/// 注意：单个网格的网络失败不是错误，它是 `FetchOutcome` 里的一个值，
/// 不会用 `?` 向上传播。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 快照写入错误
    #[error("快照错误: {0}")]
    Sink(#[from] SinkError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 数值必须为正数
    #[error("{name} 必须大于 0，当前值: {value}")]
    NonPositive { name: &'static str, value: f64 },
    /// 数值超出可用范围（无穷大或无法转换为时长）
    #[error("{name} 超出可用范围，当前值: {value}")]
    OutOfRange { name: &'static str, value: f64 },
    /// 方框边长不是网格步长的整数倍
    #[error("方框边长 {box_size} 不是网格步长 {cell_delta} 的整数倍")]
    NotMultiple { box_size: f64, cell_delta: f64 },
    /// 未知的扫描区域
    #[error("未知的扫描区域: {0} (可选: world / western_usa / la_area)")]
    UnknownRegion(String),
    /// 代理地址无效
    #[error("代理地址无效 ({url}): {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务地址无效
    #[error("服务地址无效: {0}")]
    InvalidBaseUrl(String),
    /// HTTP 客户端创建失败
    #[error("HTTP 客户端创建失败: {0}")]
    ClientBuildFailed(#[source] reqwest::Error),
    /// 配置文件读取失败
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

/// 快照写入错误
#[derive(Debug, Error)]
pub enum SinkError {
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("JSON序列化失败: {0}")]
    SerializeFailed(#[source] serde_json::Error),
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建快照写入失败错误
    pub fn sink_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Sink(SinkError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建目录创建失败错误
    pub fn sink_create_dir_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Sink(SinkError::CreateDirFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建配置文件读取错误
    pub fn config_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Config(ConfigError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Sink(SinkError::SerializeFailed(err))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
