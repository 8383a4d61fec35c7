//! Access log lines through discovery, across windows.

use std::io::Cursor;

use gateway_engine::discovery::{read_access_logs, Discovery, DiscoveryError, Endpoint};
use gateway_engine::flows::{FlowFilter, FlowFilterIndex};
use gateway_engine::urltree::{Method, UrlTreeConfig};

mod common;

const WINDOW_ONE: &str = r#"{"timestamp":1000,"duration":10,"status_code":200,"method":"GET","url":"cdn.io/assets/logo","consumer_tag":"web"}
{"timestamp":2000,"duration":30,"status_code":200,"method":"GET","url":"cdn.io/assets/style?v=3","consumer_tag":"web"}
{"timestamp":2500,"duration":1,"status_code":204,"method":"GET","url":"cdn.io/healthz","internal":true}
"#;

const WINDOW_TWO: &str = r#"{"timestamp":3000,"duration":20,"status_code":404,"method":"GET","url":"cdn.io/assets/font","consumer_tag":"web","interceptor":"edge-interceptor/1.4.0"}
"#;

fn converging(threshold: usize) -> UrlTreeConfig {
    UrlTreeConfig {
        assumed_path_params_enabled: true,
        max_split_threshold: threshold,
    }
}

#[test]
fn test_windows_converge_and_rekey() {
    let mut discovery = Discovery::new(&[], converging(2)).unwrap();

    let first = discovery.process(&read_access_logs(Cursor::new(WINDOW_ONE)).unwrap());
    assert_eq!(first.aggregated, 2);
    assert!(!first.converged);
    assert_eq!(discovery.aggregation().endpoints.len(), 2);

    let second = discovery.process(&read_access_logs(Cursor::new(WINDOW_TWO)).unwrap());
    assert!(second.converged);

    let aggregation = discovery.aggregation();
    assert_eq!(aggregation.endpoints.len(), 1);
    let assets = &aggregation.endpoints[&Endpoint::new("GET", "cdn.io/assets/{_param_1}")];
    assert_eq!(assets.count, 3);
    assert_eq!(assets.min_time, 1000);
    assert_eq!(assets.max_time, 3000);
    assert_eq!(assets.average_duration, 20.0);
    assert_eq!(aggregation.consumers["web"].len(), 1);
    assert_eq!(aggregation.interceptors.len(), 1);
}

#[test]
fn test_taking_aggregation_keeps_learned_patterns() {
    let mut discovery = Discovery::new(&[], converging(1)).unwrap();
    discovery.process(&[
        common::access_log("PUT", "cdn.io/files/a", 1, 5, 200),
        common::access_log("PUT", "cdn.io/files/b", 2, 5, 200),
    ]);

    let taken = discovery.take_aggregation();
    assert_eq!(taken.endpoints.len(), 1);
    assert!(discovery.aggregation().is_empty());

    discovery.process(&[common::access_log("PUT", "cdn.io/files/c", 3, 5, 200)]);
    assert!(discovery
        .aggregation()
        .endpoints
        .contains_key(&Endpoint::new("PUT", "cdn.io/files/{_param_1}")));
}

#[test]
fn test_bad_line_reports_its_number() {
    let input = format!("{}not json\n", WINDOW_TWO);
    match read_access_logs(Cursor::new(input)) {
        Err(DiscoveryError::Decode { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn test_flows_select_on_discovered_shapes() {
    let mut flows = FlowFilterIndex::new();
    flows
        .register(FlowFilter::new("assets-retry", "cdn.io/assets/{asset}").with_methods(["GET"]))
        .unwrap();
    flows.register(FlowFilter::new("cdn-audit", "cdn.io/*")).unwrap();

    let selected: Vec<&str> = flows
        .select(&Method::new("GET"), "cdn.io/assets/logo")
        .iter()
        .map(|filter| filter.flow.as_str())
        .collect();
    assert_eq!(selected, ["cdn-audit", "assets-retry"]);

    let selected: Vec<&str> = flows
        .select(&Method::new("POST"), "cdn.io/assets/logo")
        .iter()
        .map(|filter| filter.flow.as_str())
        .collect();
    assert_eq!(selected, ["cdn-audit"]);
}
