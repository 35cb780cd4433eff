//! Server integration tests.
//!
//! These drive the login challenge over real HTTP.

mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use common::{TestServer, location, session_cookie};

#[tokio::test]
async fn test_server_health_returns_version() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get("/health", None).send().await?;
    assert!(resp.status().is_success());

    let body: Value = resp.json().await?;
    assert_eq!(body["status"], "ok");
    assert!(body.get("version").is_some());

    Ok(())
}

#[tokio::test]
async fn test_login_challenge_round_trip() -> Result<()> {
    let server = TestServer::start().await?;

    // Anonymous visit is stashed and sent to the login page.
    let resp = server.get("/app/reports?year=2024", None).send().await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&resp).context("session cookie")?;
    let target = location(&resp).context("login redirect")?;
    let key = target
        .strip_prefix("/login?backlink=")
        .context("backlink")?
        .to_string();

    let resp = server.get(&target, Some(&cookie)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let challenge: Value = resp.json().await?;
    assert_eq!(challenge["backlink"], key.as_str());

    // Logging in redirects back to the original URL.
    let resp = server
        .post("/login", Some(&cookie))
        .form(&[("user", "alice"), ("backlink", key.as_str())])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let back = location(&resp).context("restore redirect")?;
    assert_eq!(
        back,
        format!("{}/app/reports?year=2024&_rid={key}", server.base_url())
    );

    // Following it replays the stashed request.
    let resp = server.client.get(&back).header("cookie", &cookie).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await?;
    assert_eq!(page["user"], "alice");
    assert_eq!(page["restored"], true);
    assert_eq!(page["parameters"]["year"], "2024");

    Ok(())
}

#[tokio::test]
async fn test_other_session_cannot_restore() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get("/app/reports", None).send().await?;
    let target = location(&resp).context("login redirect")?;
    let key = target.trim_start_matches("/login?backlink=").to_string();

    let resp = server
        .post("/login", None)
        .form(&[("user", "mallory"), ("backlink", key.as_str())])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/"));

    Ok(())
}

#[tokio::test]
async fn test_session_cookie_is_reused() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get("/login", None).send().await?;
    let cookie = session_cookie(&resp).context("session cookie")?;

    let resp = server.get("/login", Some(&cookie)).send().await?;
    assert!(session_cookie(&resp).is_none());

    Ok(())
}
