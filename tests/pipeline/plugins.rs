use consul_dial::{Client, ConsulError, Context, Plugin};
use futures::future::BoxFuture;
use httpmock::Method::GET;

use crate::common::setup_server;

struct Header(&'static str, &'static str);

impl Plugin for Header {
    fn before_dial<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), ConsulError>> {
        Box::pin(async move {
            ctx.request_mut()
                .headers_mut()
                .insert(self.0, reqwest::header::HeaderValue::from_static(self.1));
            Ok(())
        })
    }
}

struct Deny;

impl Plugin for Deny {
    fn before_dial<'a>(&'a self, _ctx: &'a mut Context) -> BoxFuture<'a, Result<(), ConsulError>> {
        Box::pin(async { Err(ConsulError::Config("denied".into())) })
    }
}

#[tokio::test]
async fn plugins_run_in_order_before_dialing() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/ping")
            .header("x-first", "1")
            .header("x-second", "2");
        then.status(204);
    });

    let client = Client::builder()
        .plugin(Header("x-first", "1"))
        .plugin(Header("x-second", "2"))
        .build()
        .unwrap();

    let resp = client
        .execute(client.get(format!("{}/ping", server.base_url())))
        .await
        .unwrap();

    assert_eq!(resp.status(), 204);
    mock.assert();
}

#[tokio::test]
async fn failing_plugin_aborts_and_skips_the_rest() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/ping");
        then.status(204);
    });

    let client = Client::builder()
        .plugin(Deny)
        .plugin(Header("x-never", "1"))
        .build()
        .unwrap();

    let err = client
        .execute(client.get(format!("{}/ping", server.base_url())))
        .await
        .unwrap_err();

    assert!(matches!(err, ConsulError::Config(msg) if msg == "denied"));
    mock.assert_calls(0);
}
