use std::net::SocketAddr;

use configs::{AppConfig, AuthConfig, DatabaseConfig};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestApp {
    base_url: String,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let cfg = AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            ..DatabaseConfig::default()
        },
        auth: AuthConfig { jwt_secret: "test-secret".into(), token_ttl_minutes: 5 },
        ..AppConfig::default()
    };
    let app = server::startup::prepare(&cfg).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server::startup::serve(listener, app, async move {
        let _ = stopped.await;
    }));

    Ok(TestApp { base_url, stop, handle })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn e2e_login_cookie_authenticates_follow_up_requests() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.post(format!("{}/api/users/", app.base_url))
        .json(&json!({
            "email": "tester@example.com",
            "username": "tester",
            "password": "S3curePass!",
            "first_name": "Test",
            "last_name": "Er",
        }))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.post(format!("{}/api/users/token", app.base_url))
        .json(&json!({ "username": "TESTER@example.com", "password": "S3curePass!" }))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let set_cookie = res.headers().get("set-cookie").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(set_cookie.starts_with("auth_token="));
    assert!(set_cookie.contains("HttpOnly"));

    // the cookie jar now carries the token
    let res = c.get(format!("{}/api/users/me", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let me = res.json::<serde_json::Value>().await?;
    assert_eq!(me["username"], "tester");
    assert!(me.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn e2e_wrong_password_unauthorized() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let _ = c.post(format!("{}/api/users", app.base_url))
        .json(&json!({
            "email": "w@example.com",
            "username": "w",
            "password": "right-password",
            "first_name": "W",
            "last_name": "W",
        }))
        .send().await?;
    let res = c.post(format!("{}/api/users/token", app.base_url))
        .json(&json!({ "username": "w", "password": "wrong-password" }))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_protected_with_expired_token_unauthorized() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    use jsonwebtoken::{encode, EncodingKey, Header};
    #[derive(serde::Serialize)]
    struct Claims { sub: String, role: String, exp: usize, iat: usize }
    let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)?.as_secs() as usize;
    let claims = Claims {
        sub: uuid::Uuid::new_v4().to_string(),
        role: "admin".into(),
        exp: now.saturating_sub(600),
        iat: now.saturating_sub(1200),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret("test-secret".as_bytes()))?;

    let res = c.get(format!("{}/api/expenses", app.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<serde_json::Value>().await?;
    assert!(doc["paths"]["/api/expenses/"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_shutdown_signal_drains_and_returns() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let _ = app.stop.send(());
    let served = tokio::time::timeout(std::time::Duration::from_secs(5), app.handle).await??;
    assert!(served.is_ok());
    assert!(client().get(format!("{}/health", app.base_url)).send().await.is_err());
    Ok(())
}
