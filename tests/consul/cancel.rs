use std::time::{Duration, Instant};

use consul_dial::{CancellationToken, Client, Consul, ConsulError};
use httpmock::Method::GET;

use crate::common::{consul_config, mock_catalog_of, setup_server};

#[tokio::test]
async fn cancelled_token_prevents_any_lookup() {
    let agent = setup_server();
    let web = setup_server();
    let catalog = mock_catalog_of(&agent, "web", &[&web]);

    let consul = Consul::new(consul_config(&agent, "web")).unwrap();
    let client = Client::builder().plugin(consul).build().unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let request = client.get("http://web/hello").build().unwrap();
    let err = client.send_with_cancel(request, cancel).await.unwrap_err();

    assert!(matches!(err, ConsulError::Cancelled));
    catalog.assert_calls(0);
}

#[tokio::test]
async fn cancellation_interrupts_a_slow_attempt() {
    let agent = setup_server();
    let slow = setup_server();
    mock_catalog_of(&agent, "web", &[&slow]);
    let hang = slow.mock(|when, then| {
        when.method(GET).path("/hello");
        then.status(200).delay(Duration::from_secs(5));
    });

    let consul = Consul::new(consul_config(&agent, "web")).unwrap();
    let client = Client::builder().plugin(consul).build().unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let request = client.get("http://web/hello").build().unwrap();
    let err = client.send_with_cancel(request, cancel).await.unwrap_err();

    assert!(matches!(err, ConsulError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(hang.calls() <= 1);
}
