//! 网格请求服务 - 业务能力层
//!
//! 只负责"查询一个网格"能力，不关心方框和流程

use crate::config::Config;
use crate::error::ConfigError;
use crate::infrastructure::HttpTransport;
use crate::models::{Cell, FetchOutcome, Record};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// 远程服务的查询接口
const SUBMISSIONS_PATH: &str = "/api/v1/submissions";

/// 远程服务的响应体，只关心 data 字段
#[derive(Debug, Deserialize)]
struct SubmissionsPage {
    data: Vec<Record>,
}

/// 网格请求服务
///
/// 职责：
/// - 为单个网格构造查询 URL
/// - 发送一次带超时的请求，不重试
/// - 把响应归类为 FetchOutcome
/// - 每个网格恰好产生一个结果
#[derive(Clone)]
pub struct CellFetcher {
    transport: HttpTransport,
    base_url: Url,
    timeout: Duration,
}

impl CellFetcher {
    /// 创建新的网格请求服务
    pub fn new(transport: HttpTransport, base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            transport,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let transport = HttpTransport::from_config(config)?;
        Self::new(transport, &config.service_base_url, config.request_timeout())
    }

    /// 构造查询 URL
    ///
    /// 查询范围：lat 到 lat+delta，lng 到 lng+delta
    pub fn submissions_url(&self, cell: &Cell) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(SUBMISSIONS_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("minLatitude", &cell.lat.to_string())
            .append_pair("maxLatitude", &cell.max_lat().to_string())
            .append_pair("minLongitude", &cell.lng.to_string())
            .append_pair("maxLongitude", &cell.max_lng().to_string());
        url
    }

    /// 查询一个网格
    pub async fn fetch(&self, cell: Cell) -> FetchOutcome {
        let url = self.submissions_url(&cell);
        debug!("请求网格 {}: {}", cell, url);

        match self.transport.get_text(url, self.timeout).await {
            Ok(body) => {
                let outcome = parse_body(&body);
                if outcome.record_count() > 0 {
                    info!("网格 {} 找到 {} 只精灵", cell, outcome.record_count());
                }
                outcome
            }
            Err(failure) => FetchOutcome::TransportFailure(failure),
        }
    }
}

/// 解析响应体
///
/// 不是 JSON（例如查询范围过大时返回的重定向页面）、没有 data 字段、
/// data 不是数组：都视为"没有数据"，不是错误。
pub fn parse_body(body: &str) -> FetchOutcome {
    match serde_json::from_str::<SubmissionsPage>(body) {
        Ok(page) => FetchOutcome::from_records(page.data),
        Err(e) => {
            debug!("响应无法解析为 JSON，视为无数据: {}", e);
            FetchOutcome::EmptySuccess
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportMode;
    use serde_json::json;

    fn create_test_fetcher(base_url: &str) -> CellFetcher {
        let transport = HttpTransport::new(TransportMode::Direct, "test-agent").unwrap();
        CellFetcher::new(transport, base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_submissions_url() {
        let fetcher = create_test_fetcher("http://www.pokeradar.io");
        let cell = Cell {
            lat: 34.0,
            lng: -118.5,
            delta: 2.5,
        };
        assert_eq!(
            fetcher.submissions_url(&cell).as_str(),
            "http://www.pokeradar.io/api/v1/submissions?minLatitude=34&maxLatitude=36.5&minLongitude=-118.5&maxLongitude=-116"
        );
    }

    #[test]
    fn test_submissions_url_replaces_base_path() {
        let fetcher = create_test_fetcher("http://127.0.0.1:9000/ignored?x=1");
        let cell = Cell {
            lat: -90.0,
            lng: -180.0,
            delta: 0.5,
        };
        let url = fetcher.submissions_url(&cell);
        assert_eq!(url.path(), "/api/v1/submissions");
        assert_eq!(
            url.query(),
            Some("minLatitude=-90&maxLatitude=-89.5&minLongitude=-180&maxLongitude=-179.5")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let transport = HttpTransport::new(TransportMode::Direct, "test-agent").unwrap();
        assert!(matches!(
            CellFetcher::new(transport, "www.pokeradar.io", Duration::from_secs(5)),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_parse_body_records_passed_through() {
        let body = json!({
            "success": true,
            "data": [
                {"pokemonId": 16, "latitude": 34.1, "longitude": -118.2},
                {"pokemonId": 19, "extra": {"nested": [1, 2, 3]}}
            ]
        })
        .to_string();

        match parse_body(&body) {
            FetchOutcome::Success(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1]["extra"]["nested"], json!([1, 2, 3]));
            }
            other => panic!("应为 Success，实际: {:?}", other),
        }
    }

    #[test]
    fn test_parse_body_empty_variants() {
        for body in [
            "",
            "<html>302 Found</html>",
            r#"{"data": []}"#,
            r#"{"success": false}"#,
            r#"{"data": "nope"}"#,
            r#"{"data": null}"#,
        ] {
            assert_eq!(parse_body(body), FetchOutcome::EmptySuccess, "body: {}", body);
        }
    }
}
