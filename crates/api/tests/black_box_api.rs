use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use warden_api::app::services::AppServices;
use warden_auth::{AccessClaims, RoleName, TokenConfig, TokenIssuer};
use warden_core::{Permission, PermissionId};
use warden_infra::cache::CacheConfig;
use warden_infra::{AuthCache, MemoryCredentialStore, MokaAuthCache, TracingMailer};

const JWT_SECRET: &str = "black-box-test-secret";

struct TestServer {
    base_url: String,
    store: Arc<MemoryCredentialStore>,
    cache: Arc<MokaAuthCache>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Build the production router over an in-memory store and bind it to an
    /// ephemeral port. The store and cache handles stay available so tests
    /// can seed data and exercise eviction without extra endpoints.
    async fn spawn() -> Self {
        let store = Arc::new(MemoryCredentialStore::with_system_roles());
        let cache = Arc::new(MokaAuthCache::new(CacheConfig::default()));
        let issuer = Arc::new(TokenIssuer::new(TokenConfig::new(JWT_SECRET)));
        let services = AppServices::new(
            store.clone(),
            cache.clone(),
            issuer,
            Arc::new(TracingMailer),
        );

        let app = warden_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            cache,
            handle,
        }
    }

    /// Register through the API and confirm the email with the stored token.
    async fn register_confirmed_user(&self, client: &reqwest::Client, username: &str) {
        let res = client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "correct horse",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        use warden_infra::CredentialStore;
        let user = self
            .store
            .user_by_username(username)
            .await
            .unwrap()
            .unwrap();
        let token = user.email_verification_token.unwrap();

        let res = client
            .get(format!(
                "{}/api/auth/verify-email?user_id={}&token={}",
                self.base_url,
                user.id,
                urlencoding(&token)
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    async fn login(&self, client: &reqwest::Client, username: &str) -> serde_json::Value {
        let res = client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": "correct horse" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Percent-encode a token for use in a query string (base64 contains `+/=`).
fn urlencoding(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[tokio::test]
async fn protected_endpoints_require_authentication() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in [
        "/api/roles",
        "/api/permissions",
        "/api/menuitems",
        "/api/usermenu",
        "/api/userpermissions",
        "/api/userinfo/me",
    ] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }
}

#[tokio::test]
async fn registration_login_and_identity_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.register_confirmed_user(&client, "alice").await;
    let tokens = srv.login(&client, "alice").await;

    let res = client
        .get(format!("{}/api/userinfo/me", srv.base_url))
        .bearer_auth(tokens["access_token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["email_confirmed"], true);
    assert_eq!(body["roles"], json!(["Student"]));
}

#[tokio::test]
async fn login_fails_before_email_confirmation() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "correct horse",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "username": "bob", "password": "correct horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permission_guard_denies_then_allows_after_grant() {
    use warden_infra::CredentialStore;

    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.register_confirmed_user(&client, "alice").await;
    let tokens = srv.login(&client, "alice").await;
    let access = tokens["access_token"].as_str().unwrap();

    // No grant yet: valid identity, insufficient permission.
    let res = client
        .get(format!("{}/api/roles", srv.base_url))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Grant roles.view to the Student role behind the API's back.
    let student = srv
        .store
        .role_by_system_name("Student")
        .await
        .unwrap()
        .unwrap();
    let perm = srv
        .store
        .create_permission(Permission {
            id: PermissionId::from_i64(0),
            name: "View roles".to_string(),
            system_name: "roles.view".to_string(),
            description: String::new(),
            category: "roles".to_string(),
            action: "view".to_string(),
            resource: "roles".to_string(),
        })
        .await
        .unwrap();
    srv.store
        .add_permission_to_role(student.id, perm.id)
        .await
        .unwrap();

    let alice = srv.store.user_by_username("alice").await.unwrap().unwrap();
    // The denied request warmed the per-user cache; evict to see the grant.
    srv.cache.evict_user_permissions(alice.id);

    let res = client
        .get(format!("{}/api/roles", srv.base_url))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let roles: serde_json::Value = res.json().await.unwrap();
    assert!(roles.as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn forged_and_garbage_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Garbage bearer.
    let res = client
        .get(format!("{}/api/userinfo/me", srv.base_url))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Well-formed token signed with the wrong secret.
    let claims = AccessClaims {
        sub: "1".to_string(),
        name: "mallory".to_string(),
        email: "mallory@example.com".to_string(),
        roles: vec![RoleName::new("Administrator")],
        iss: "warden".to_string(),
        aud: "warden-clients".to_string(),
        iat: chrono::Utc::now().timestamp(),
        exp: chrono::Utc::now().timestamp() + 600,
    };
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"wrong-secret"),
    )
    .unwrap();

    let res = client
        .get(format!("{}/api/userinfo/me", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_rotates_and_old_token_dies() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.register_confirmed_user(&client, "alice").await;
    let tokens = srv.login(&client, "alice").await;
    let first_refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/auth/refresh-token", srv.base_url))
        .json(&json!({ "refresh_token": first_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rotated: serde_json::Value = res.json().await.unwrap();
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), first_refresh);

    // The first token was invalidated by the rotation.
    let res = client
        .post(format!("{}/api/auth/refresh-token", srv.base_url))
        .json(&json!({ "refresh_token": first_refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_menu_reflects_role_visibility() {
    use warden_core::{MenuItem, MenuItemId};
    use warden_infra::CredentialStore;

    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.register_confirmed_user(&client, "alice").await;

    let item = |name: &str, order: i32, required: &str| MenuItem {
        id: MenuItemId::from_i64(0),
        name: name.to_string(),
        display_name: name.to_string(),
        url: format!("/{name}"),
        icon: String::new(),
        parent_id: MenuItemId::TOP_LEVEL,
        display_order: order,
        is_visible: true,
        required_permission: required.to_string(),
    };
    srv.store.create_menu_item(item("home", 1, "")).await.unwrap();
    srv.store
        .create_menu_item(item("admin", 2, "admin.panel"))
        .await
        .unwrap();
    srv.store.create_menu_item(item("help", 3, "")).await.unwrap();

    let tokens = srv.login(&client, "alice").await;
    let res = client
        .get(format!("{}/api/usermenu", srv.base_url))
        .bearer_auth(tokens["access_token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let menu: serde_json::Value = res.json().await.unwrap();
    let names: Vec<&str> = menu
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    // "admin" needs a permission the Student role does not hold.
    assert_eq!(names, vec!["home", "help"]);
}
