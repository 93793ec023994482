mod common;

use appform::adapters::GraphqlClient;
use appform::config::{ServiceSettings, Settings};
use appform::domain::{
    AppRecordPort, AppTypePort, CreateRecordPayload, FormError, FormShape, OwnerDirectoryPort,
    PageContext, UpdateRecordPayload,
};
use appform::workflow::{FormSession, SessionPorts};
use axum::http::StatusCode;
use common::StubGraphql;
use serde_json::{json, Map};
use std::sync::Arc;

fn client_for(server: &StubGraphql) -> GraphqlClient {
    GraphqlClient::new(&ServiceSettings {
        endpoint: server.endpoint(),
        timeout_seconds: 5,
        api_key_env: None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_app_types() {
    let server = StubGraphql::start(vec![(
        "getAppTypes",
        json!({"data": {"getAppTypes": {"list": [{"id": "game"}, {"id": "tool"}]}}}),
    )])
    .await;

    let types = client_for(&server).list_app_types(1, 100, true).await.unwrap();
    let ids: Vec<_> = types.into_iter().filter_map(|t| t.id).collect();
    assert_eq!(ids, vec!["game", "tool"]);

    let request = &server.requests_for("getAppTypes")[0];
    assert_eq!(
        request.body["variables"],
        json!({"pageNumber": 1, "limit": 100, "enabled": true})
    );
    assert!(request.body["query"].as_str().unwrap().contains("getAppTypes("));
    assert!(request.authorization.is_none());
}

#[tokio::test]
async fn test_bearer_token_from_environment() {
    std::env::set_var("APPFORM_TEST_GRAPHQL_TOKEN", "secret-token");
    let server = StubGraphql::start(vec![]).await;
    let client = GraphqlClient::new(&ServiceSettings {
        endpoint: server.endpoint(),
        timeout_seconds: 5,
        api_key_env: Some("APPFORM_TEST_GRAPHQL_TOKEN".to_string()),
    })
    .unwrap();

    client.search_owners("acme", 1, 20).await.unwrap();
    assert_eq!(
        server.requests()[0].authorization.as_deref(),
        Some("Bearer secret-token")
    );
}

#[tokio::test]
async fn test_get_app_type_reads_field_definitions() {
    let server = StubGraphql::start(vec![(
        "getAppType",
        json!({"data": {"getAppType": {
            "id": "game",
            "fieldDefinitions": [
                {"id": "customData.platform", "fields": [{"id": "customData.players"}, null]}
            ]
        }}}),
    )])
    .await;

    let schema = client_for(&server).get_app_type("game").await.unwrap();
    assert_eq!(schema.id.as_deref(), Some("game"));
    assert_eq!(schema.fields.len(), 1);
    assert_eq!(schema.fields[0].children.len(), 1);
    assert_eq!(server.requests()[0].body["variables"], json!({"id": "game"}));
}

#[tokio::test]
async fn test_missing_app_type_is_remote_error() {
    let server = StubGraphql::start(vec![]).await;
    let err = client_for(&server).get_app_type("nope").await.unwrap_err();
    assert!(matches!(err, FormError::Remote { .. }));
}

#[tokio::test]
async fn test_record_version_may_be_absent() {
    let server = StubGraphql::start(vec![]).await;
    let record = client_for(&server)
        .get_record_version("app-7", 2)
        .await
        .unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_errors_array_fails_the_call() {
    let server = StubGraphql::start(vec![(
        "getDevelopers",
        json!({"data": null, "errors": [{"message": "forbidden"}, {"message": "try later"}]}),
    )])
    .await;

    let err = client_for(&server)
        .search_owners("acme", 1, 20)
        .await
        .unwrap_err();
    match err {
        FormError::Remote { operation, message } => {
            assert_eq!(operation, "getDevelopers");
            assert_eq!(message, "forbidden; try later");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let server = StubGraphql::start_with_status(vec![], StatusCode::BAD_GATEWAY).await;
    let err = client_for(&server)
        .list_app_types(1, 100, true)
        .await
        .unwrap_err();
    assert!(matches!(err, FormError::Transport(ref m) if m.contains("502")));
}

#[tokio::test]
async fn test_response_without_data_is_decode_error() {
    let server = StubGraphql::start(vec![("getAppTypes", json!({"data": {}}))]).await;
    let err = client_for(&server)
        .list_app_types(1, 100, true)
        .await
        .unwrap_err();
    assert!(matches!(err, FormError::Decode(_)));
}

#[tokio::test]
async fn test_create_and_update() {
    let server = StubGraphql::start(vec![
        ("createApp", json!({"data": {"createApp": {"appId": "app-42"}}})),
        ("updateAppByVersion", json!({"data": {"updateAppByVersion": null}})),
    ])
    .await;
    let client = client_for(&server);

    let created = client
        .create_record(&CreateRecordPayload {
            app_type: "game".to_string(),
            name: Some(json!("X")),
            auto_approve: true,
            custom_data: Map::new(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "app-42");
    assert_eq!(
        server.requests_for("createApp")[0].body["variables"]["payload"],
        json!({"type": "game", "name": "X", "autoApprove": true, "customData": {}})
    );

    let accepted = client
        .update_record(
            "app-42",
            1,
            &UpdateRecordPayload {
                name: "X".to_string(),
                approval_required: false,
                custom_data: Map::new(),
            },
        )
        .await
        .unwrap();
    assert!(!accepted);
}

#[tokio::test]
async fn test_edit_session_over_graphql() {
    let server = StubGraphql::start(vec![
        (
            "getAppByVersion",
            json!({"data": {"getAppByVersion": {
                "type": "game",
                "name": "Space Race",
                "safeName": "space-race",
                "customData": {"platform": "pc"}
            }}}),
        ),
        (
            "getAppType",
            json!({"data": {"getAppType": {
                "id": "game",
                "fieldDefinitions": [
                    {"id": "name"},
                    {"id": "customData.platform", "options": [{"value": "pc", "label": "PC"}]}
                ]
            }}}),
        ),
        (
            "updateAppByVersion",
            json!({"data": {"updateAppByVersion": {"appId": "app-7"}}}),
        ),
    ])
    .await;

    let ports = SessionPorts::shared(Arc::new(client_for(&server)));
    let session = FormSession::open(PageContext::edit("app-7", 2), ports, &Settings::default())
        .await
        .unwrap();

    let fields = session.fields();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].path, "platform");
    assert_eq!(fields[0].default_value, Some(json!("pc")));
    assert_eq!(fields[0].options, vec![json!("pc")]);

    let outcome = session
        .submit(
            FormShape::edit_record("Space Race", "space-race"),
            json!({"platform": "console"}).as_object().cloned().unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.navigation.route(), "/app-list/list");

    let update = &server.requests_for("updateAppByVersion")[0].body["variables"];
    assert_eq!(update["appId"], "app-7");
    assert_eq!(update["version"], 2);
    assert_eq!(
        update["payload"],
        json!({
            "name": "Space Race",
            "approvalRequired": false,
            "customData": {"platform": "console", "safeName": "space-race"}
        })
    );
}
