//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use gateway_engine::admin::AdminState;
use gateway_engine::config::{parse_config, GatewayConfig};
use gateway_engine::discovery::{AccessLog, Discovery};
use gateway_engine::obfuscation::PathObfuscator;
use gateway_engine::policy::PolicyStore;

#[allow(dead_code)]
pub const API_KEY: &str = "test-admin-key";

/// Policy file used across the integration tests.
#[allow(dead_code)]
pub const GATEWAY_TOML: &str = r#"
[urltree]
assumed_path_params_enabled = true
max_split_threshold = 2

[[endpoints]]
method = "GET"
url = "api.shop.io/items/{item_id}"

[[endpoints.remedies]]
name = "items-cache"
type = "caching"
options = { ttl_secs = 30 }

[[endpoints]]
method = "POST"
url = "api.shop.io/orders/*"

[[endpoints.remedies]]
name = "orders-limit"
type = "strategy_based_throttling"

[[endpoints.diagnoses]]
name = "orders-har"
type = "har_exporter"
enabled = false

[global]
diagnoses = [{ name = "all-har", type = "har_exporter" }]

[discovery]
window_secs = 5
known_endpoints = [{ method = "GET", url = "api.shop.io/items/{item_id}" }]

[obfuscation]
enabled = true
excluded_path_params = []

[admin]
enabled = true
api_key = "test-admin-key"
"#;

#[allow(dead_code)]
pub fn gateway_config() -> GatewayConfig {
    parse_config(GATEWAY_TOML).unwrap()
}

#[allow(dead_code)]
pub fn access_log(method: &str, url: &str, timestamp: i64, duration: u64, status_code: u16) -> AccessLog {
    AccessLog {
        timestamp,
        duration,
        status_code,
        method: method.to_string(),
        url: url.to_string(),
        consumer_tag: None,
        interceptor: None,
        request_id: None,
        internal: false,
    }
}

#[allow(dead_code)]
pub fn admin_state(config: &GatewayConfig) -> AdminState {
    let store = Arc::new(PolicyStore::from_config(config).unwrap());
    let discovery = Discovery::new(&config.discovery.known_endpoints, config.urltree).unwrap();
    AdminState::new(
        store,
        Arc::new(Mutex::new(discovery)),
        PathObfuscator::new(&config.obfuscation),
        &config.admin.api_key,
    )
}
