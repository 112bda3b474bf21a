use poke_radar::services::CellFetcher;
use poke_radar::utils::logging;
use poke_radar::{
    App, BoxAggregator, Config, CoordinateBox, FinalizeReason, HttpTransport, TransportFailure,
    TransportMode,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA: &str = "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US; rv:1.8.1.13) Gecko/20080311 Firefox/2.0.0.13";

fn pokemons(n: usize, tag: &str) -> Value {
    let data: Vec<Value> = (0..n).map(|i| json!({ "cell": tag, "i": i })).collect();
    json!({ "success": true, "data": data })
}

/// 为一个网格挂载响应
async fn mount_cell(server: &MockServer, lat: &str, lng: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/v1/submissions"))
        .and(query_param("minLatitude", lat))
        .and(query_param("minLongitude", lng))
        .and(header("User-Agent", UA))
        .respond_with(response)
        .mount(server)
        .await;
}

/// 洛杉矶方框：边长 5，步长 2.5，共 4 个网格
fn la_config(server: &MockServer, tmp_base: &std::path::Path) -> Config {
    Config {
        box_size: 5.0,
        cell_delta: 2.5,
        region: "la_area".to_string(),
        service_base_url: server.uri(),
        request_timeout_secs: 0.5,
        settle_delay_secs: 0.0,
        tmp_base: tmp_base.to_path_buf(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_la_box_timeout_finalizes_with_seven() {
    logging::init();
    let server = MockServer::start().await;
    mount_cell(&server, "34", "-118.5", ResponseTemplate::new(200).set_body_json(pokemons(2, "a"))).await;
    mount_cell(&server, "34", "-116", ResponseTemplate::new(200).set_body_json(pokemons(0, "b"))).await;
    mount_cell(
        &server,
        "36.5",
        "-118.5",
        ResponseTemplate::new(200)
            .set_body_json(pokemons(5, "c"))
            .set_delay(Duration::from_millis(100)),
    )
    .await;
    mount_cell(
        &server,
        "36.5",
        "-116",
        ResponseTemplate::new(200)
            .set_body_json(pokemons(3, "d"))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let app = assert_ok!(App::initialize(la_config(&server, dir.path())));
    let report = app.run().await;

    assert_eq!(report.boxes, 1);
    assert_eq!(report.early_finalized, 1);
    assert_eq!(report.records.len(), 7);
    assert!(report.records.iter().all(|r| r["cell"] != "d"));

    let path = report.snapshot_path.expect("快照应写入成功");
    let saved: Vec<Value> = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(saved, report.records);
}

#[tokio::test]
async fn test_malformed_and_missing_bodies_count_as_empty() {
    logging::init();
    let server = MockServer::start().await;
    mount_cell(&server, "34", "-118.5", ResponseTemplate::new(200).set_body_json(pokemons(2, "a"))).await;
    mount_cell(
        &server,
        "34",
        "-116",
        ResponseTemplate::new(200).set_body_string("<html>search window too big</html>"),
    )
    .await;
    mount_cell(&server, "36.5", "-118.5", ResponseTemplate::new(200).set_body_json(pokemons(5, "c"))).await;
    // 第四个网格没有挂载，wiremock 返回空的 404

    let transport = HttpTransport::new(TransportMode::Direct, UA).unwrap();
    let fetcher = CellFetcher::new(transport, &server.uri(), Duration::from_secs(2)).unwrap();
    let aggregator = BoxAggregator::new(fetcher, 2.5, Duration::ZERO);

    let report = aggregator.run(&CoordinateBox::new(34.0, -118.5, 5.0)).await;

    assert_eq!(report.reason, FinalizeReason::Completed);
    assert_eq!(report.completed, 4);
    assert_eq!(report.expected, 4);

    let mut tags: Vec<String> = report
        .records
        .iter()
        .map(|r| r["cell"].as_str().unwrap_or_default().to_string())
        .collect();
    tags.sort();
    assert_eq!(tags, vec!["a", "a", "c", "c", "c", "c", "c"]);
}

#[tokio::test]
async fn test_connection_refused_finalizes_empty() {
    logging::init();
    let transport = HttpTransport::new(TransportMode::Direct, UA).unwrap();
    let fetcher = CellFetcher::new(transport, "http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let aggregator = BoxAggregator::new(fetcher, 2.5, Duration::from_secs(10));

    let report = aggregator.run(&CoordinateBox::new(34.0, -118.5, 5.0)).await;

    assert!(report.records.is_empty());
    assert!(matches!(
        report.reason,
        FinalizeReason::TransportFailure(TransportFailure::Other(_))
            | FinalizeReason::TransportFailure(TransportFailure::ConnectionReset)
    ));
}

#[tokio::test]
async fn test_proxied_requests_carry_absolute_url() {
    logging::init();
    // wiremock 充当 HTTP 代理，真实服务地址不可达
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemons(1, "p")))
        .mount(&proxy)
        .await;

    let mode = TransportMode::Proxied {
        proxy_url: proxy.uri(),
    };
    let transport = HttpTransport::new(mode, UA).unwrap();
    let fetcher =
        CellFetcher::new(transport, "http://www.pokeradar.invalid", Duration::from_secs(2)).unwrap();
    let aggregator = BoxAggregator::new(fetcher, 2.5, Duration::ZERO);

    let report = aggregator.run(&CoordinateBox::new(34.0, -118.5, 5.0)).await;

    assert_eq!(report.reason, FinalizeReason::Completed);
    assert_eq!(report.records.len(), 4);

    let received = proxy.received_requests().await.expect("代理应记录请求");
    assert_eq!(received.len(), 4);
    for request in &received {
        assert!(request
            .url
            .as_str()
            .starts_with("http://www.pokeradar.invalid/api/v1/submissions?minLatitude="));
        let agent = request
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok());
        assert_eq!(agent, Some(UA));
    }
}

#[tokio::test]
async fn test_snapshot_named_by_start_time() {
    logging::init();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/submissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemons(1, "x")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        settle_delay_secs: 1.2,
        ..la_config(&server, dir.path())
    };
    let app = assert_ok!(App::initialize(config));

    let before = chrono::Utc::now().timestamp();
    let report = app.run().await;
    let after = chrono::Utc::now().timestamp();

    assert_eq!(report.records.len(), 4);
    assert_eq!(report.early_finalized, 0);
    assert!(report.started_at >= before);
    assert!(report.started_at < after);

    let path = report.snapshot_path.unwrap();
    assert_eq!(
        path,
        dir.path()
            .join("pokeRadar")
            .join(format!("pokeRadar_{}.json", report.started_at))
    );
}

#[tokio::test]
async fn test_sink_failure_does_not_crash_run() {
    logging::init();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/submissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemons(1, "x")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"x").unwrap();

    let app = assert_ok!(App::initialize(la_config(&server, &blocker)));
    let report = app.run().await;

    assert_eq!(report.records.len(), 4);
    assert!(report.snapshot_path.is_none());
}

#[tokio::test]
#[ignore] // 需要访问真实服务：cargo test -- --ignored
async fn test_live_la_box() {
    logging::init();

    let config = Config {
        cell_delta: 2.5,
        region: "la_area".to_string(),
        ..Config::from_env()
    };
    let fetcher = CellFetcher::from_config(&config).expect("创建客户端失败");
    let aggregator = BoxAggregator::new(fetcher, config.cell_delta, config.settle_delay());

    let report = aggregator.run(&CoordinateBox::new(34.0, -118.5, 5.0)).await;
    println!("找到 {} 只精灵, 结束原因: {:?}", report.records.len(), report.reason);
    assert_eq!(report.expected, 4);
}
