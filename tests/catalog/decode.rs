use consul_dial::{Catalog, ClientConfig, ConsulCatalog, LookupError, QueryOptions};
use httpmock::Method::GET;

use crate::common::setup_server;

async fn lookup(body: &'static str) -> Result<Vec<consul_dial::ServiceInstance>, LookupError> {
    let agent = setup_server();
    agent.mock(|when, then| {
        when.method(GET).path("/v1/catalog/service/web");
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    });
    let config = ClientConfig {
        address: format!("127.0.0.1:{}", agent.port()),
        ..ClientConfig::default()
    };
    ConsulCatalog::new(&config)
        .unwrap()
        .lookup_service("web", None, &QueryOptions::default())
        .await
}

#[tokio::test]
async fn node_address_is_used_when_service_address_is_empty() {
    let instances = lookup(
        r#"[{"Node":"n1","Address":"192.168.1.20","ServiceID":"web-a","ServiceName":"web",
             "ServiceAddress":"","ServicePort":8080,"ServiceTags":null}]"#,
    )
    .await
    .unwrap();

    assert_eq!(instances[0].address, "192.168.1.20");
    assert_eq!(instances[0].port, Some(8080));
    assert_eq!(instances[0].node, "n1");
    assert!(instances[0].tags.is_empty());
}

#[tokio::test]
async fn catalog_order_is_preserved() {
    let instances = lookup(
        r#"[{"Address":"10.0.0.3","ServicePort":1},
            {"Address":"10.0.0.1","ServicePort":2},
            {"Address":"10.0.0.2","ServicePort":3}]"#,
    )
    .await
    .unwrap();

    let addresses: Vec<_> = instances.iter().map(|i| i.address.as_str()).collect();
    assert_eq!(addresses, ["10.0.0.3", "10.0.0.1", "10.0.0.2"]);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let err = lookup(r#"{"not":"a list"}"#).await.unwrap_err();
    assert!(matches!(err, LookupError::Decode(_)));
}
