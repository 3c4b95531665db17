mod common;

use common::{client_with, Script, ScriptedTransport};
use serde_json::json;
use std::sync::Arc;
use zellowork_api::{ChannelQuery, Command, TransportError, ZelloError};

#[tokio::test]
async fn last_url_recorded_even_when_transport_fails() {
    let transport = Arc::new(ScriptedTransport::new().route(
        "user/get",
        Script::Fail(TransportError::connect("dns failure")),
    ));
    let client = client_with(transport, Some("s1"));

    let outcome = client.execute(Command::get("user/get").segment("max", 5)).await;

    assert!(!outcome.success);
    assert!(outcome.error.as_ref().is_some_and(ZelloError::is_transport));
    assert_eq!(
        client.last_url().as_deref(),
        Some("http://zello.test/user/get/max/5?sid=s1")
    );
}

#[tokio::test]
async fn command_without_session_never_reaches_transport() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = client_with(transport.clone(), None);

    let outcome = client.get_channels(&ChannelQuery::default()).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ZelloError::NotAuthenticated));
    assert!(transport.requests().is_empty());
    assert_eq!(client.last_url().as_deref(), Some("http://zello.test/channel/get"));
}

#[tokio::test]
async fn response_without_status_fields_is_clean_success() {
    let transport = Arc::new(
        ScriptedTransport::new().route("channel/get", Script::Json(json!({"channels": []}))),
    );
    let client = client_with(transport, Some("s"));
    let outcome = client.get_channels(&ChannelQuery::default()).await;
    assert!(outcome.success);
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn error_code_field_becomes_application_error() {
    let transport = Arc::new(
        ScriptedTransport::new().route("channel/get", Script::Json(json!({"error_code": "X"}))),
    );
    let client = client_with(transport, Some("s"));
    let outcome = client.get_channels(&ChannelQuery::default()).await;
    assert!(outcome.success);
    assert_eq!(outcome.error, Some(ZelloError::application("X", "")));
    assert_eq!(outcome.get_str("error_code"), Some("X"));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let transport = Arc::new(
        ScriptedTransport::new().route("channel/get", Script::Raw(200, "<html>maintenance</html>")),
    );
    let client = client_with(transport, Some("s"));
    let outcome = client.get_channels(&ChannelQuery::default()).await;
    assert!(!outcome.success);
    assert!(matches!(outcome.error, Some(ZelloError::MalformedResponse(_))));
}

#[tokio::test]
async fn get_channels_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::new().route(
        "channel/get",
        Script::Json(json!({
            "status": "OK",
            "code": "200",
            "channels": [{"name": "Ops", "count": 3, "shared": true}]
        })),
    ));
    let client = client_with(transport.clone(), Some("s"));
    let query = ChannelQuery::named("Ops");

    let first = client.get_channels(&query).await;
    let second = client.get_channels(&query).await;

    assert!(first.is_ok());
    assert_eq!(first.result, second.result);
    let urls = transport.urls();
    assert_eq!(urls[0], urls[1]);
    assert_eq!(urls[0], "http://zello.test/channel/get/name/Ops?sid=s");
}

#[tokio::test]
async fn resumed_session_is_attached() {
    let transport = Arc::new(
        ScriptedTransport::new().route("user/get", Script::Json(json!({"status": "OK", "users": []}))),
    );
    let client = client_with(transport.clone(), None);
    client.set_session_id(Some("from-storage".to_string()));
    assert!(client.execute(Command::get("user/get")).await.is_ok());
    assert_eq!(transport.urls(), vec!["http://zello.test/user/get?sid=from-storage"]);
}

#[tokio::test]
async fn cache_buster_adds_random_token() {
    let transport = Arc::new(
        ScriptedTransport::new().route("user/get", Script::Json(json!({"status": "OK"}))),
    );
    let mut config = zellowork_api::ZelloConfig::new("https://zello.test/", "k");
    config.cache_buster = true;
    config.session_id = Some("s".to_string());
    let client = zellowork_api::ZelloClient::with_transport(config, transport.clone()).unwrap();

    client.execute(Command::get("user/get")).await;
    client.execute(Command::get("user/get")).await;

    let urls = transport.urls();
    assert!(urls[0].starts_with("https://zello.test/user/get?rnd="));
    assert!(urls[0].ends_with("&sid=s"));
    assert_ne!(urls[0], urls[1]);
}

#[tokio::test]
async fn concurrent_commands_share_one_session() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("user/get", Script::Json(json!({"status": "OK"})))
            .with_delay(std::time::Duration::from_millis(10)),
    );
    let client = client_with(transport.clone(), Some("shared"));

    let calls = (0..8u32).map(|start| {
        let client = client.clone();
        async move {
            client
                .get_users(&zellowork_api::UserQuery::default().page(10, start + 1))
                .await
        }
    });
    let outcomes = futures::future::join_all(calls).await;

    assert!(outcomes.iter().all(|o| o.is_ok()));
    let urls = transport.urls();
    assert_eq!(urls.len(), 8);
    assert!(urls.iter().all(|u| u.ends_with("?sid=shared")));
    assert!(urls.contains(&client.last_url().unwrap()));
}

#[test]
fn blocking_caller_can_drive_the_client() {
    let transport = Arc::new(
        ScriptedTransport::new().route("channel/roleslist", Script::Json(json!({"status": "OK", "roles": []}))),
    );
    let client = client_with(transport, Some("s"));
    let outcome = tokio_test::block_on(client.get_channels_roles("Ops"));
    assert!(outcome.is_ok());
    assert!(outcome.get("roles").is_some());
}
