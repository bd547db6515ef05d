use consul_dial::{Client, Consul};
use httpmock::Method::GET;

use crate::common::{consul_config, mock_catalog_of, mock_hello, setup_server};

#[tokio::test]
async fn request_is_routed_to_discovered_instance() {
    let agent = setup_server();
    let web = setup_server();
    let catalog = mock_catalog_of(&agent, "web", &[&web]);
    let hello = mock_hello(&web, 200);

    let consul = Consul::new(consul_config(&agent, "web")).unwrap();
    let client = Client::builder().plugin(consul).build().unwrap();

    let resp = client.execute(client.get("http://web/hello")).await.unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "hello world");
    catalog.assert_calls(1);
    hello.assert_calls(1);
}

#[tokio::test]
async fn path_and_query_survive_the_rewrite() {
    let agent = setup_server();
    let web = setup_server();
    mock_catalog_of(&agent, "orders", &[&web]);
    let search = web.mock(|when, then| {
        when.method(GET)
            .path("/v2/orders")
            .query_param("status", "open");
        then.status(200).body("[]");
    });

    let consul = Consul::new(consul_config(&agent, "orders")).unwrap();
    let client = Client::builder().plugin(consul).build().unwrap();

    let resp = client
        .execute(client.get("http://orders/v2/orders?status=open"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    search.assert();
}

#[tokio::test]
async fn first_attempt_always_targets_the_primary() {
    let agent = setup_server();
    let primary = setup_server();
    let secondary = setup_server();
    mock_catalog_of(&agent, "web", &[&primary, &secondary]);
    let first = mock_hello(&primary, 200);
    let second = mock_hello(&secondary, 200);

    let consul = Consul::new(consul_config(&agent, "web")).unwrap();
    let client = Client::builder().plugin(consul).build().unwrap();

    for _ in 0..3 {
        let resp = client.execute(client.get("http://web/hello")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    first.assert_calls(3);
    second.assert_calls(0);
}
