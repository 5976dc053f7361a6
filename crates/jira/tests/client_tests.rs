//! HTTP-level tests for the Jira and admin clients against a mock server.

use jira::{AdminClient, JiraClient, JiraError, UserCreate};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{basic_auth, bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jira_client(server: &MockServer) -> JiraClient {
    JiraClient::new(&server.uri(), "admin@example.com", "api-token").unwrap()
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_create_user_posts_email_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/user"))
        .and(basic_auth("admin@example.com", "api-token"))
        .and(body_json(json!({"emailAddress": "new@example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accountId": "acc-1",
            "accountType": "atlassian",
            "emailAddress": "new@example.com",
            "displayName": "new",
            "active": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = jira_client(&server)
        .create_user(&UserCreate::new("new@example.com"))
        .await
        .unwrap();

    assert_eq!(user.account_id, "acc-1");
    assert!(user.active);
}

#[tokio::test]
async fn test_get_user_expands_groups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/user"))
        .and(query_param("accountId", "acc-1"))
        .and(query_param("expand", "groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acc-1",
            "groups": {"size": 1, "items": [{"name": "developers"}]}
        })))
        .mount(&server)
        .await;

    let user = jira_client(&server)
        .get_user("acc-1", &["groups"])
        .await
        .unwrap();

    assert!(user.is_member_of("developers"));
}

#[tokio::test]
async fn test_get_user_not_found_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/user"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"errorMessages":["not found"]}"#),
        )
        .mount(&server)
        .await;

    let err = jira_client(&server)
        .get_user("missing", &[])
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.body().contains("not found"));
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = jira_client(&server)
        .get_user("acc-1", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, JiraError::Serialization(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_truncated_error_body_keeps_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Promise a longer body than is sent, then hang up
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 64\r\n\r\npartial")
            .await
            .unwrap();
    });

    let client = JiraClient::new(&format!("http://{addr}"), "admin@example.com", "api-token")
        .unwrap();
    let err = client.get_user("gone", &[]).await.unwrap_err();

    assert!(err.is_not_found(), "{err:?}");
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_create_group() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/group"))
        .and(body_json(json!({"name": "developers"})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"name": "developers", "groupId": "g-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let group = jira_client(&server).create_group("developers").await.unwrap();
    assert_eq!(group.name, "developers");
    assert_eq!(group.group_id.as_deref(), Some("g-1"));
}

#[tokio::test]
async fn test_bulk_groups_sends_paging_and_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/group/bulk"))
        .and(query_param("startAt", "0"))
        .and(query_param("maxResults", "1"))
        .and(query_param("groupName", "developers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 0,
            "maxResults": 1,
            "total": 1,
            "isLast": true,
            "values": [{"name": "developers", "groupId": "g-1"}]
        })))
        .mount(&server)
        .await;

    let page = jira_client(&server)
        .bulk_groups(&["developers"], 0, 1)
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.is_last);
    assert_eq!(page.values[0].name, "developers");
}

#[tokio::test]
async fn test_delete_group_bad_request() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/group"))
        .and(query_param("groupname", "site-admins"))
        .respond_with(ResponseTemplate::new(400).set_body_string("cannot delete"))
        .mount(&server)
        .await;

    let err = jira_client(&server)
        .delete_group("site-admins")
        .await
        .unwrap_err();

    assert!(err.is_bad_request());
    assert_eq!(err.body(), "cannot delete");
}

#[tokio::test]
async fn test_add_and_remove_group_member() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/group/user"))
        .and(query_param("groupname", "developers"))
        .and(body_json(json!({"accountId": "557058:abc"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "developers"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/group/user"))
        .and(query_param("groupname", "developers"))
        .and(query_param("accountId", "557058:abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = jira_client(&server);
    let group = client
        .add_user_to_group("developers", "557058:abc")
        .await
        .unwrap();
    assert_eq!(group.name, "developers");

    client
        .remove_user_from_group("developers", "557058:abc")
        .await
        .unwrap();
}

// =============================================================================
// Admin API
// =============================================================================

#[tokio::test]
async fn test_disable_user_uses_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/acc-1/manage/lifecycle/disable"))
        .and(bearer_token("admin-key"))
        .and(body_json(json!({"message": "offboarding"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let admin = AdminClient::with_base_url(&server.uri(), "admin-key").unwrap();
    admin.disable_user("acc-1", "offboarding").await.unwrap();
}

#[tokio::test]
async fn test_disable_user_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/acc-1/manage/lifecycle/disable"))
        .respond_with(ResponseTemplate::new(400).set_body_string("not a managed account"))
        .mount(&server)
        .await;

    let admin = AdminClient::with_base_url(&server.uri(), "admin-key").unwrap();
    let err = admin.disable_user("acc-1", "bye").await.unwrap_err();

    assert!(err.is_bad_request());
    assert_eq!(err.body(), "not a managed account");
}

#[tokio::test]
async fn test_disable_user_escapes_account_id_in_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/acc%2F1%3Fx/manage/lifecycle/disable"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let admin = AdminClient::with_base_url(&server.uri(), "admin-key").unwrap();
    admin.disable_user("acc/1?x", "bye").await.unwrap();
}
