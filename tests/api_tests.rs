//! HTTP client tests against a mock backend.

use mockito::{Matcher, Server};
use openstack_dashboard::config::Config;
use openstack_dashboard::logic::{ApiClient, ApiError};
use openstack_dashboard::model::{Section, Session};
use serde_json::json;

fn config_for(url: &str) -> Config {
    Config {
        api_url: url.to_string(),
        login_url: url.to_string(),
        ..Config::default()
    }
}

/// Shape of a real backend answer, including fields the client ignores.
fn backend_snapshot() -> serde_json::Value {
    json!({
        "instances": [{
            "id": "4f1c",
            "name": "web1",
            "status": "ACTIVE",
            "addresses": { "private": [{ "addr": "10.0.0.5", "version": 4 }] },
            "flavor": "m1.small",
            "created": "2024-05-01T08:00:00Z",
            "pricing": { "uptime_hours": 2.5, "hourly_rate": 10.0, "total_cost": 25.0 }
        }],
        "networks": [{
            "id": "n1", "name": "public", "status": "ACTIVE", "subnets": ["s1"],
            "shared": false, "router:external": true, "admin_state_up": true
        }],
        "volumes": [{
            "id": "v1", "name": "data", "size": 10, "status": "in-use",
            "created_at": "2024-05-01T08:00:00.000000", "volume_type": "__DEFAULT__",
            "bootable": "false", "attachments": [{ "server_id": "4f1c" }]
        }],
        "images": [{
            "id": "img1", "name": "cirros", "status": "active", "size": 21430272,
            "min_disk": 0, "min_ram": 0, "created_at": "2024-04-01T00:00:00Z",
            "updated_at": "2024-04-01T00:00:00Z"
        }],
        "keypairs": [{
            "name": "deploy", "fingerprint": "aa:bb:cc", "public_key": "ssh-ed25519 AAAA",
            "created_at": null
        }],
        "pricing_info": {
            "total_cost": 25.0,
            "currency": "INR",
            "rates": { "m1.tiny": 5.0, "m1.small": 10.0, "default": 15.0 }
        }
    })
}

#[tokio::test]
async fn test_login_returns_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/login")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "username": "admin", "password": "pw" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "token": "jwt-abc", "message": "Login successful" }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let token = client.login("admin", "pw").await.unwrap();

    assert_eq!(token, "jwt-abc");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_login_failure_is_an_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({ "error": "bad credentials" }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client.login("admin", "nope").await.unwrap_err();

    assert!(err.is_unauthorized());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_login_uses_login_url_not_api_url() {
    let mut api_server = Server::new_async().await;
    let mut login_server = Server::new_async().await;

    let wrong = api_server
        .mock("POST", "/api/login")
        .expect(0)
        .create_async()
        .await;
    let right = login_server
        .mock("POST", "/api/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "token": "t" }).to_string())
        .create_async()
        .await;

    let config = Config {
        api_url: api_server.url(),
        login_url: login_server.url(),
        ..Config::default()
    };
    let client = ApiClient::new(&config).unwrap();
    client.login("u", "p").await.unwrap();

    wrong.assert_async().await;
    right.assert_async().await;
}

#[tokio::test]
async fn test_fetch_resources_parses_backend_snapshot() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resources")
        .match_header("authorization", "Bearer jwt-abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(backend_snapshot().to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let snapshot = client
        .fetch_resources(&Session::with_token("jwt-abc"))
        .await
        .unwrap();

    assert_eq!(snapshot.instances[0].name, "web1");
    assert_eq!(snapshot.instances[0].pricing.total_cost, 25.0);
    assert!(snapshot.networks[0].external);
    assert!(!snapshot.volumes[0].bootable);
    assert_eq!(snapshot.images[0].size, Some(21430272));
    assert_eq!(snapshot.keypairs[0].created_at, None);
    assert_eq!(snapshot.pricing_info.currency.as_deref(), Some("INR"));

    let visible: Vec<_> = snapshot.pricing_info.visible_rates().collect();
    assert_eq!(visible, vec![("m1.small", 10.0), ("m1.tiny", 5.0)]);

    for section in Section::ALL {
        let expected = if section == Section::Pricing { 0 } else { 1 };
        assert_eq!(snapshot.cards(section).len(), expected, "{:?}", section);
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_resources_unauthorized() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/resources")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(json!({ "message": "Token is invalid!" }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .fetch_resources(&Session::with_token("expired"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Failed to fetch resources");
}

#[tokio::test]
async fn test_fetch_resources_server_error_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/resources")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({ "error": "keystone timed out" }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .fetch_resources(&Session::with_token("t"))
        .await
        .unwrap_err();

    match &err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message.as_deref(), Some("keystone timed out"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!err.is_unauthorized());
    assert_eq!(err.user_message(), "keystone timed out");
}

#[tokio::test]
async fn test_fetch_without_token_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resources")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .fetch_resources(&Session::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::MissingToken));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_generic_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/resources")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>proxy error</html>")
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(&server.url())).unwrap();
    let err = client
        .fetch_resources(&Session::with_token("t"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Http(_)));
    assert_eq!(err.user_message(), "Failed to fetch resources");
}
