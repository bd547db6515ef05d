#![allow(dead_code)]

use std::time::Duration;

use consul_dial::{ConstantBackoff, ConsulConfig};
use httpmock::{Method::GET, Mock, MockServer};
use serde_json::json;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

/// Catalog response listing one instance per `(address, port)` pair.
pub fn catalog_body(service: &str, instances: &[(&str, u16)]) -> String {
    let nodes: Vec<_> = instances
        .iter()
        .enumerate()
        .map(|(i, (address, port))| {
            json!({
                "ID": format!("node-{i}-id"),
                "Node": format!("node-{i}"),
                "Address": "10.255.255.1",
                "Datacenter": "dc1",
                "ServiceID": format!("{service}-{i}"),
                "ServiceName": service,
                "ServiceAddress": address,
                "ServicePort": port,
                "ServiceTags": ["primary"],
            })
        })
        .collect();
    serde_json::Value::Array(nodes).to_string()
}

pub fn mock_catalog<'a>(server: &'a MockServer, service: &str, body: String) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/catalog/service/{service}"));
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

/// Catalog listing the given mock servers as the instances of `service`.
pub fn mock_catalog_of<'a>(
    agent: &'a MockServer,
    service: &str,
    instances: &[&MockServer],
) -> Mock<'a> {
    let pairs: Vec<(&str, u16)> = instances.iter().map(|s| ("127.0.0.1", s.port())).collect();
    mock_catalog(agent, service, catalog_body(service, &pairs))
}

pub fn mock_hello<'a>(server: &'a MockServer, status: u16) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path("/hello");
        then.status(status).body("hello world");
    })
}

/// Plugin config pointed at `agent`, with near-zero retry delays.
pub fn consul_config(agent: &MockServer, service: &str) -> ConsulConfig {
    ConsulConfig::new(format!("127.0.0.1:{}", agent.port()), service)
        .with_retrier(ConstantBackoff::new(3, Duration::from_millis(1)))
}
