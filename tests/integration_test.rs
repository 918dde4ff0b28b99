use ani_desktop::bridge::{Bridge, BridgeRequest};
use ani_desktop::config::AppConfig;
use ani_desktop::remote::{N8nClient, RemoteError, WorkflowApi};
use ani_desktop::settings::{Settings, SettingsPatch};
use ani_desktop::workflow::{ImportError, WorkflowImporter};
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_workflows(root: &Path, files: &[(&str, serde_json::Value)]) {
    let dir = root.join("workflows");
    std::fs::create_dir_all(&dir).unwrap();
    for (name, doc) in files {
        std::fs::write(dir.join(name), serde_json::to_string_pretty(doc).unwrap()).unwrap();
    }
}

#[tokio::test]
async fn test_client_sends_api_key_and_json_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/workflows"))
        .and(header("X-N8N-API-KEY", "secret"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1", "name": "Ingest"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = N8nClient::new(&format!("{}/", mock_server.uri()), "secret").unwrap();
    let listing = client.list_workflows().await.unwrap();
    assert_eq!(listing["data"][0]["name"], "Ingest");
}

#[tokio::test]
async fn test_client_surfaces_non_success_with_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/workflows"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let client = N8nClient::new(&mock_server.uri(), "wrong").unwrap();
    let err = client
        .create_workflow(&json!({"name": "A"}))
        .await
        .unwrap_err();

    match err {
        RemoteError::Http { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, json!({"raw": "Unauthorized"}));
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_update_targets_id_segment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/workflows/42"))
        .and(body_partial_json(json!({"name": "Nightly"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = N8nClient::new(&mock_server.uri(), "secret").unwrap();
    let resp = client
        .update_workflow(&json!(42), &json!({"name": "Nightly", "nodes": []}))
        .await
        .unwrap();
    // Empty body parses as an empty object.
    assert_eq!(resp, json!({}));
}

#[tokio::test]
async fn test_bridge_import_reconciles_against_server() {
    let mock_server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    write_workflows(
        tmp.path(),
        &[
            ("a.json", json!({"name": "A", "nodes": []})),
            ("b.json", json!({"name": "B", "nodes": []})),
            ("c.json", json!({"nodes": []})),
        ],
    );

    Mock::given(method("GET"))
        .and(path("/rest/workflows"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "A"}])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/workflows/1"))
        .and(body_partial_json(json!({"name": "A"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/workflows"))
        .and(body_partial_json(json!({"name": "B"})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/workflows"))
        .and(body_partial_json(json!({"name": "c"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "new-c"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let bridge = Bridge::new(&AppConfig::with_root(tmp.path()));
    let saved = bridge
        .handle(BridgeRequest::SettingsSave(SettingsPatch {
            base_url: Some(mock_server.uri()),
            api_key: Some("secret".into()),
        }))
        .await;
    assert!(saved.ok);

    let resp = bridge.handle(BridgeRequest::WorkflowsImport(None)).await;
    let v = serde_json::to_value(&resp).unwrap();

    assert_eq!(v["ok"], true);
    assert_eq!(
        v["results"],
        json!([
            {"file": "a.json", "action": "updated", "id": 1, "ok": true},
            {
                "file": "b.json",
                "action": "error",
                "ok": false,
                "message": "HTTP 500 Internal Server Error",
                "detail": {"message": "boom"}
            },
            {"file": "c.json", "action": "created", "id": "new-c", "ok": true}
        ])
    );
}

#[tokio::test]
async fn test_import_without_api_key_never_hits_network() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    write_workflows(tmp.path(), &[("a.json", json!({"name": "A"}))]);

    let importer = WorkflowImporter::new(tmp.path().join("workflows"));
    let err = importer
        .import(&Settings {
            base_url: mock_server.uri(),
            api_key: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::MissingApiKey));
}

#[tokio::test]
async fn test_import_with_missing_directory_never_hits_network() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let importer = WorkflowImporter::new(tmp.path().join("workflows"));
    let err = importer
        .import(&Settings {
            base_url: mock_server.uri(),
            api_key: "secret".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::DirectoryNotFound(_)));
}

#[tokio::test]
async fn test_failed_listing_aborts_import() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/workflows"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .mount(&mock_server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    write_workflows(tmp.path(), &[("a.json", json!({"name": "A"}))]);

    let importer = WorkflowImporter::new(tmp.path().join("workflows"));
    let err = importer
        .import(&Settings {
            base_url: mock_server.uri(),
            api_key: "secret".into(),
        })
        .await
        .unwrap_err();

    match err {
        ImportError::Remote(RemoteError::Http { status, .. }) => assert_eq!(status, 403),
        other => panic!("expected listing failure, got {:?}", other),
    }
}
