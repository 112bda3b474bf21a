use crate::error::{AppError, AppResult, ConfigError};
use crate::models::Bounds;
use serde::Deserialize;
use std::env::VarError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 浮点比较容差
const EPSILON: f64 = 1e-9;

/// 程序配置文件
///
/// 加载顺序：默认值 → `SWEEP_CONFIG` 指定的 TOML 文件 → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 方框边长（度）
    pub box_size: f64,
    /// 网格步长（度），方框边长必须是它的整数倍
    pub cell_delta: f64,
    /// 扫描区域：world / western_usa / la_area
    pub region: String,
    /// 远程服务地址
    pub service_base_url: String,
    /// HTTP 代理地址，为空时直连
    pub proxy_url: Option<String>,
    /// 单个请求超时（秒）
    pub request_timeout_secs: f64,
    /// 每个方框正常完成后的等待时间（秒）
    pub settle_delay_secs: f64,
    /// 快照文件的根目录
    pub tmp_base: PathBuf,
    /// 请求头 User-Agent
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            box_size: 5.0,
            // 大于 0.5 时返回的数据明显变少
            cell_delta: 0.5,
            region: "world".to_string(),
            service_base_url: "http://www.pokeradar.io".to_string(),
            proxy_url: None,
            request_timeout_secs: 5.0,
            settle_delay_secs: 2.0,
            tmp_base: std::env::temp_dir(),
            user_agent: "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US; rv:1.8.1.13) Gecko/20080311 Firefox/2.0.0.13".to_string(),
        }
    }
}

/// 请求方式
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// 直连服务
    Direct,
    /// 通过 HTTP 代理转发，请求行携带完整 URL
    Proxied { proxy_url: String },
}

impl Config {
    /// 加载配置并校验
    pub fn load() -> AppResult<Self> {
        let base = Self::from_config_path(std::env::var("SWEEP_CONFIG"))?;
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 按 `SWEEP_CONFIG` 的值选择基础配置：未设置时用默认值
    fn from_config_path(var: Result<String, VarError>) -> AppResult<Self> {
        match var {
            Ok(path) => Self::from_toml_file(Path::new(&path)),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(AppError::config_read_failed(
                raw.to_string_lossy(),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "SWEEP_CONFIG 不是合法的 Unicode 路径",
                ),
            )),
        }
    }

    /// 只用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                AppError::Config(ConfigError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: String::new(),
                source,
            })
        })
    }

    /// 用环境变量覆盖，无法解析的值保持原样
    pub fn with_env_overrides(self) -> Self {
        fn parsed<T: std::str::FromStr>(name: &str, current: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(current)
        }

        Self {
            box_size: parsed("BOX_SIZE", self.box_size),
            cell_delta: parsed("CELL_DELTA", self.cell_delta),
            region: std::env::var("SWEEP_REGION").unwrap_or(self.region),
            service_base_url: std::env::var("SERVICE_BASE_URL").unwrap_or(self.service_base_url),
            proxy_url: std::env::var("PROXY_URL").ok().or(self.proxy_url),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
            settle_delay_secs: parsed("SETTLE_DELAY_SECS", self.settle_delay_secs),
            tmp_base: std::env::var("TMP_BASE").map(PathBuf::from).unwrap_or(self.tmp_base),
            user_agent: std::env::var("USER_AGENT").unwrap_or(self.user_agent),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("box_size", self.box_size),
            ("cell_delta", self.cell_delta),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.settle_delay_secs.is_nan() || self.settle_delay_secs < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "settle_delay_secs",
                value: self.settle_delay_secs,
            });
        }
        for (name, value) in [("box_size", self.box_size), ("cell_delta", self.cell_delta)] {
            if !value.is_finite() {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        // 超时和等待时间必须能转换为 Duration
        for (name, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("settle_delay_secs", self.settle_delay_secs),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        let ratio = self.box_size / self.cell_delta;
        if ratio < 1.0 - EPSILON || (ratio - ratio.round()).abs() > EPSILON * ratio.max(1.0) {
            return Err(ConfigError::NotMultiple {
                box_size: self.box_size,
                cell_delta: self.cell_delta,
            });
        }

        if Bounds::from_region(&self.region, self.box_size).is_none() {
            return Err(ConfigError::UnknownRegion(self.region.clone()));
        }

        Ok(())
    }

    /// 当前区域对应的扫描范围
    pub fn bounds(&self) -> Result<Bounds, ConfigError> {
        Bounds::from_region(&self.region, self.box_size)
            .ok_or_else(|| ConfigError::UnknownRegion(self.region.clone()))
    }

    pub fn transport_mode(&self) -> TransportMode {
        match &self.proxy_url {
            Some(url) if !url.trim().is_empty() => TransportMode::Proxied {
                proxy_url: url.clone(),
            },
            _ => TransportMode::Direct,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.settle_delay_secs)
    }
}
