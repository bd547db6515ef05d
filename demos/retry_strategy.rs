use std::time::Duration;

use consul_dial::{Client, ConstantBackoff, Consul, ConsulConfig, ExponentialBackoff};
use httpmock::{Method::GET, MockServer};
use serde_json::json;

fn register(agent: &MockServer, service: &str, instances: &[&MockServer]) {
    let nodes: Vec<_> = instances
        .iter()
        .enumerate()
        .map(|(i, s)| {
            json!({
                "Node": format!("node-{i}"),
                "Address": "127.0.0.1",
                "ServiceID": format!("{service}-{i}"),
                "ServiceName": service,
                "ServicePort": s.port(),
            })
        })
        .collect();
    agent.mock(|when, then| {
        when.method(GET).path(format!("/v1/catalog/service/{service}"));
        then.status(200).json_body(serde_json::Value::Array(nodes));
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. A local stand-in for the Consul agent and three instances of `web`,
    //    the first two of which are failing.
    let agent = MockServer::start();
    let down = MockServer::start();
    let overloaded = MockServer::start();
    let healthy = MockServer::start();
    register(&agent, "web", &[&down, &overloaded, &healthy]);
    down.mock(|when, then| {
        when.method(GET);
        then.status(503).body("maintenance");
    });
    overloaded.mock(|when, then| {
        when.method(GET);
        then.status(429).body("slow down");
    });
    healthy.mock(|when, then| {
        when.method(GET).path("/hello");
        then.status(200).body("hello world");
    });

    // 2. A custom strategy: ten attempts, 25ms apart.
    let config = ConsulConfig::new(agent.address().to_string(), "web")
        .with_retrier(ConstantBackoff::new(10, Duration::from_millis(25)));
    let client = Client::builder().plugin(Consul::new(config)?).build()?;

    let resp = client.execute(client.get("http://web/hello")).await?;
    println!("--- Constant backoff ---");
    println!("status: {}", resp.status());
    println!("body:   {}", resp.text().await?);
    println!();

    // 3. Exponential backoff with jitter. The plugin instance (and its cache) is shared
    //    by every request sent through the client.
    let config = ConsulConfig::new(agent.address().to_string(), "web").with_retrier(
        ExponentialBackoff {
            attempts: 5,
            base: Duration::from_millis(20),
            ..ExponentialBackoff::default()
        },
    );
    let consul = Consul::new(config)?;
    let client = Client::builder()
        .plugin(consul.clone())
        .timeout(Duration::from_secs(2))
        .build()?;

    println!("--- Exponential backoff ---");
    for i in 1..=3 {
        let resp = client.execute(client.get("http://web/hello")).await?;
        println!("request {i}: {}", resp.status());
    }
    println!("cached instances: {}", consul.cached_instances().await.len());

    Ok(())
}
