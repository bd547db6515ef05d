use consul_dial::{Catalog, ClientConfig, ConsulCatalog, LookupError, QueryOptions};
use httpmock::Method::GET;

use crate::common::{catalog_body, setup_server};

fn client_config(port: u16) -> ClientConfig {
    ClientConfig {
        address: format!("127.0.0.1:{port}"),
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn lookup_sends_tag_datacenter_and_token() {
    let agent = setup_server();
    let mock = agent.mock(|when, then| {
        when.method(GET)
            .path("/v1/catalog/service/billing")
            .query_param("tag", "v2")
            .query_param("dc", "eu-west")
            .header("x-consul-token", "s3cr3t");
        then.status(200)
            .header("content-type", "application/json")
            .body(catalog_body("billing", &[("10.1.0.4", 9000)]));
    });

    let mut config = client_config(agent.port());
    config.datacenter = Some("eu-west".into());
    config.token = Some("s3cr3t".into());
    let catalog = ConsulCatalog::new(&config).unwrap();

    let instances = catalog
        .lookup_service("billing", Some("v2"), &QueryOptions::default())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].address, "10.1.0.4");
    assert_eq!(instances[0].port, Some(9000));
    assert_eq!(instances[0].service_id, "billing-0");
}

#[tokio::test]
async fn query_options_override_client_defaults() {
    let agent = setup_server();
    let mock = agent.mock(|when, then| {
        when.method(GET)
            .path("/v1/catalog/service/billing")
            .query_param("dc", "us-east")
            .query_param("near", "_agent")
            .query_param("node-meta", "rack:r1")
            .query_param("filter", "ServiceMeta.version == \"2\"")
            .query_param_exists("stale")
            .header("x-consul-token", "per-query");
        then.status(200).body("[]");
    });

    let mut config = client_config(agent.port());
    config.datacenter = Some("eu-west".into());
    config.token = Some("client-level".into());
    let catalog = ConsulCatalog::new(&config).unwrap();

    let mut query = QueryOptions {
        datacenter: Some("us-east".into()),
        allow_stale: true,
        near: Some("_agent".into()),
        filter: Some("ServiceMeta.version == \"2\"".into()),
        token: Some("per-query".into()),
        ..QueryOptions::default()
    };
    query.node_meta.insert("rack".into(), "r1".into());

    let instances = catalog
        .lookup_service("billing", None, &query)
        .await
        .unwrap();

    mock.assert();
    assert!(instances.is_empty());
}

#[tokio::test]
async fn error_status_is_reported() {
    let agent = setup_server();
    agent.mock(|when, then| {
        when.method(GET).path("/v1/catalog/service/billing");
        then.status(403).body("Permission denied");
    });

    let catalog = ConsulCatalog::new(&client_config(agent.port())).unwrap();
    let err = catalog
        .lookup_service("billing", None, &QueryOptions::default())
        .await
        .unwrap_err();

    match err {
        LookupError::Status { status, url } => {
            assert_eq!(status, 403);
            assert!(url.ends_with("/v1/catalog/service/billing"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}
