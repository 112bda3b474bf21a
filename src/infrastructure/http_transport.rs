//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 reqwest::Client，只暴露"带超时的 GET"能力

use crate::config::{Config, TransportMode};
use crate::error::ConfigError;
use crate::models::TransportFailure;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Proxy, Url};
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

/// HTTP 传输
///
/// 职责：
/// - 持有唯一的 Client（直连或代理）
/// - 暴露 get_text() 能力
/// - 把网络错误归类为 TransportFailure
/// - 不认识网格 / 方框
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    user_agent: String,
    mode: TransportMode,
}

impl HttpTransport {
    /// 按请求方式创建传输
    ///
    /// 代理模式下请求行携带完整 URL，由代理转发（标准 HTTP 代理）
    pub fn new(mode: TransportMode, user_agent: impl Into<String>) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let TransportMode::Proxied { proxy_url } = &mode {
            let proxy = Proxy::all(proxy_url.as_str()).map_err(|source| ConfigError::InvalidProxy {
                url: proxy_url.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(ConfigError::ClientBuildFailed)?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
            mode,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.transport_mode(), config.user_agent.clone())
    }

    pub fn mode(&self) -> &TransportMode {
        &self.mode
    }

    /// 发送 GET 请求并读取完整响应体
    ///
    /// 超时覆盖从建立连接到读完响应体的全过程，超时后请求被中止。
    /// 不检查 HTTP 状态码，非 2xx 的响应体同样返回给调用方。
    pub async fn get_text(&self, url: Url, timeout: Duration) -> Result<String, TransportFailure> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        response.text().await.map_err(|e| classify(&e))
    }
}

/// 把 reqwest 错误归类为网络层失败
pub fn classify(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        return TransportFailure::Timeout;
    }
    if is_connection_reset(err) {
        return TransportFailure::ConnectionReset;
    }
    TransportFailure::Other(err.to_string())
}

/// 沿着 source 链查找连接重置类的 io 错误
fn is_connection_reset(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        current = e.source();
    }
    false
}
