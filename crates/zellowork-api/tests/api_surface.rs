mod common;

use common::{client_with, Script, ScriptedTransport};
use serde_json::json;
use std::sync::Arc;
use zellowork_api::{
    ChannelQuery, HttpMethod, RoleSettings, UserAttributes, UserQuery, ZelloClient, ZelloError,
};

fn ok_server() -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::new().route("", Script::Json(json!({"status": "OK", "code": "200"}))))
}

fn client(transport: &Arc<ScriptedTransport>) -> ZelloClient {
    client_with(transport.clone(), Some("S"))
}

#[tokio::test]
async fn user_operations_hit_expected_endpoints() {
    let server = ok_server();
    let c = client(&server);

    assert!(c.get_users(&UserQuery::default()).await.is_ok());
    assert!(c.get_users(&UserQuery::gateways().page(10, 0)).await.is_ok());
    assert!(c.add_to_channel("Ops", &["alice", "bob"]).await.is_ok());
    assert!(c.add_to_channels(&["Ops", "Fleet"], &["alice"]).await.is_ok());
    assert!(c.remove_from_channel("Ops", &["bob"]).await.is_ok());
    assert!(c.remove_from_channels(&["Ops"], &["alice", "bob"]).await.is_ok());
    assert!(c
        .save_user(&UserAttributes::new("carol").with_plain_password("secret"))
        .await
        .is_ok());
    assert!(c.delete_users(&["carol"]).await.is_ok());

    let requests = server.requests();
    let calls: Vec<(HttpMethod, &str, Option<&str>)> = requests
        .iter()
        .map(|r| (r.method, r.url.as_str(), r.body.as_deref()))
        .collect();
    assert_eq!(
        calls,
        vec![
            (HttpMethod::Get, "http://zello.test/user/get?sid=S", None),
            (HttpMethod::Get, "http://zello.test/user/get/gateway/1/max/10?sid=S", None),
            (
                HttpMethod::Post,
                "http://zello.test/user/addto/Ops?sid=S",
                Some("login[]=alice&login[]=bob")
            ),
            (
                HttpMethod::Post,
                "http://zello.test/user/addtochannels?sid=S",
                Some("channels[]=Ops&channels[]=Fleet&users[]=alice")
            ),
            (
                HttpMethod::Post,
                "http://zello.test/user/removefrom/Ops?sid=S",
                Some("login[]=bob")
            ),
            (
                HttpMethod::Post,
                "http://zello.test/user/removefromchannels?sid=S",
                Some("channels[]=Ops&users[]=alice&users[]=bob")
            ),
            (
                HttpMethod::Post,
                "http://zello.test/user/save?sid=S",
                Some("name=carol&password=5ebe2294ecd0e0f08eab7690d2a6ee69")
            ),
            (
                HttpMethod::Post,
                "http://zello.test/user/delete?sid=S",
                Some("login[]=carol")
            ),
        ]
    );
}

#[tokio::test]
async fn channel_and_role_operations_hit_expected_endpoints() {
    let server = ok_server();
    let c = client(&server);

    assert!(c.get_channels(&ChannelQuery::default().page(20, 40)).await.is_ok());
    assert!(c.add_channel("Night Shift", false, false).await.is_ok());
    assert!(c.delete_channels(&["Night Shift"]).await.is_ok());
    assert!(c.get_channels_roles("Ops").await.is_ok());
    let settings = RoleSettings {
        allow_alerts: Some(true),
        ..Default::default()
    };
    assert!(c.save_channel_role("Ops", "drivers", &settings).await.is_ok());
    assert!(c.delete_channel_role("Ops", &["drivers", "old"]).await.is_ok());
    assert!(c.add_to_channel_role("Ops", "drivers", &["kate"]).await.is_ok());

    let urls = server.urls();
    assert_eq!(
        urls,
        vec![
            "http://zello.test/channel/get/max/20/start/40?sid=S",
            "http://zello.test/channel/add/name/Night+Shift/shared/false/invisible/false?sid=S",
            "http://zello.test/channel/delete?sid=S",
            "http://zello.test/channel/roleslist/name/Ops?sid=S",
            "http://zello.test/channel/saverole/channel/Ops/name/drivers?sid=S",
            "http://zello.test/channel/deleterole/channel/Ops?sid=S",
            "http://zello.test/channel/addtorole/channel/Ops/name/drivers?sid=S",
        ]
    );

    let bodies: Vec<Option<String>> = server.requests().into_iter().map(|r| r.body).collect();
    assert_eq!(bodies[2].as_deref(), Some("name[]=Night+Shift"));
    assert_eq!(
        bodies[4].as_deref(),
        Some("settings=%7B%22allow_alerts%22%3Atrue%7D")
    );
    assert_eq!(bodies[5].as_deref(), Some("roles[]=drivers&roles[]=old"));
    assert_eq!(bodies[6].as_deref(), Some("login[]=kate"));
}

#[tokio::test]
async fn invalid_arguments_fail_before_sending() {
    let server = ok_server();
    let c = client(&server);
    let nobody: [&str; 0] = [];

    let outcomes = vec![
        c.add_to_channel("Ops", &nobody).await,
        c.delete_channels(&nobody).await,
        c.save_user(&UserAttributes::default()).await,
        c.add_channel("", true, false).await,
        c.save_channel_role("Ops", "", &RoleSettings::default()).await,
    ];

    for outcome in outcomes {
        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(ZelloError::InvalidParameter(_))));
    }
    assert!(server.requests().is_empty());
}
