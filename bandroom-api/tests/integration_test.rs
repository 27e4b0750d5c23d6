/// Integration tests for the Bandroom API
///
/// These tests verify the full system works end-to-end:
/// - Login flow (cookie, redirect, fail view-model)
/// - Capability gate (member vs admin)
/// - User listing, soft deletion, edit validation
/// - Per-user rehearsal schedules
///
/// They require a PostgreSQL database; set DATABASE_URL to run them. Without
/// it every test returns early.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bandroom_shared::auth::password::verify_password;
use bandroom_shared::models::band::Band;
use bandroom_shared::models::user::{User, UserStatus};
use common::TestContext;
use tower::Service as _;
use uuid::Uuid;

/// Builds a GET request, optionally with a session cookie
fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Builds a form-encoded POST request, optionally with a session cookie
fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Reads a response body as JSON
async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A valid edit-form body for the given login
fn edit_form_body(login: &str) -> String {
    format!(
        "name=Edited+User&password=changedpw&password_confirm=changedpw\
         &login={}&email=edited-{}%40example.com&phone=555-0100",
        login, login
    )
}

#[tokio::test]
async fn test_health_check() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let response = ctx.app.clone().call(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_login_success_sets_cookie_and_redirects() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = format!("user={}&password={}", ctx.member.login, common::TEST_PASSWORD);
    let response = ctx
        .app
        .clone()
        .call(post_form("/login", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/home");

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_login_honors_next_parameter() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let body = format!("user={}&password={}", ctx.admin.login, common::TEST_PASSWORD);
    let response = ctx
        .app
        .clone()
        .call(post_form("/login?next=/users", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/users");

    // A next field in the form body works the same way
    let body = format!(
        "user={}&password={}&next=/users",
        ctx.admin.login,
        common::TEST_PASSWORD
    );
    let response = ctx
        .app
        .clone()
        .call(post_form("/login", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/users");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_login_failure_returns_fail_view_model() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    // Wrong password and unknown login must produce identical shapes
    let wrong_password = format!("user={}&password=wrong", ctx.member.login);
    let unknown_login = "user=nobody-here&password=whatever".to_string();

    for body in [wrong_password, unknown_login] {
        let response = ctx
            .app
            .clone()
            .call(post_form("/login", None, &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::SET_COOKIE));

        let json = body_json(response).await;
        assert_eq!(json["fail"], true);
        assert_eq!(json["form"]["name"], "login");
        assert_eq!(json["next"], "/home");
    }

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_login_form_view_model() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let response = ctx
        .app
        .clone()
        .call(get("/login?next=/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["fail"], false);
    assert_eq!(json["next"], "/users");
    assert_eq!(json["form"]["fields"][0]["name"], "user");
    assert_eq!(json["form"]["fields"][1]["name"], "password");

    // Password widget pulls in its stylesheet
    let css = json["requirements"]["css"].as_array().unwrap();
    assert!(css.iter().any(|a| a == "static/forms/password.css"));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    for uri in ["/home", "/users", "/users/00000000-0000-0000-0000-000000000000"] {
        let response = ctx.app.clone().call(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    // 401s carry the same JSON body shape as handler errors
    let response = ctx.app.clone().call(get("/home", None)).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");
    assert!(json["message"].is_string());

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_member_denied_on_edit_capability_routes() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.member);

    let response = ctx
        .app
        .clone()
        .call(get("/users", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Denials carry the same JSON body shape as handler errors, and never
    // name the missing capability
    let response = ctx
        .app
        .clone()
        .call(get("/users", Some(&cookie)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["error"], "forbidden");
    assert_eq!(json["message"], "Forbidden");

    // Denial must not depend on whether the target exists: a random id
    // gets the same 403, never a 404
    let missing = Uuid::new_v4();
    for uri in [
        format!("/users/{}/edit", missing),
        format!("/users/{}/delete", missing),
    ] {
        let response = ctx
            .app
            .clone()
            .call(get(&uri, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_member_can_view_profiles() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.member);
    let uri = format!("/users/{}", ctx.admin.id);

    let response = ctx.app.clone().call(get(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["login"], ctx.admin.login.as_str());
    // The password hash never leaves the server
    assert!(json["user"].get("password_hash").is_none());

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_list_users_excludes_inactive() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let deactivated =
        common::create_test_user(&ctx.db, bandroom_shared::models::user::UserRole::Member).await;
    User::deactivate(&ctx.db, deactivated.id).await.unwrap();

    let cookie = ctx.session_cookie(&ctx.admin);
    let response = ctx
        .app
        .clone()
        .call(get("/users", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let logins: Vec<&str> = json["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["login"].as_str().unwrap())
        .collect();

    assert!(logins.contains(&ctx.admin.login.as_str()));
    assert!(logins.contains(&ctx.member.login.as_str()));
    assert!(!logins.contains(&deactivated.login.as_str()));

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(deactivated.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await;
}

#[tokio::test]
async fn test_delete_user_is_soft_and_idempotent() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/delete", ctx.member.id);

    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    // The row survives with flipped status; the login stays reserved
    let member = User::find_by_id(&ctx.db, ctx.member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.status, UserStatus::Inactive);

    // Deleting again succeeds; no error, no state change
    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The deactivated user's existing session is now stale
    let stale_cookie = ctx.session_cookie(&ctx.member);
    let response = ctx
        .app
        .clone()
        .call(get("/home", Some(&stale_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And the deactivated user can no longer log in
    let body = format!("user={}&password={}", ctx.member.login, common::TEST_PASSWORD);
    let response = ctx
        .app
        .clone()
        .call(post_form("/login", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["fail"], true);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_delete_nonexistent_user_is_404() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/delete", Uuid::new_v4());

    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_edit_user_success_rewrites_fields() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/edit", ctx.member.id);
    let new_login = format!("edited-{}", Uuid::new_v4());

    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), &edit_form_body(&new_login)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    let member = User::find_by_id(&ctx.db, ctx.member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.login, new_login);
    assert_eq!(member.name.as_deref(), Some("Edited User"));
    assert_eq!(member.phone.as_deref(), Some("555-0100"));
    assert!(verify_password("changedpw", &member.password_hash).unwrap());

    // Omitting the optional phone leaves the stored number untouched
    let body = format!(
        "name=Edited+Again&password=changedpw&password_confirm=changedpw\
         &login={}&email=edited-{}%40example.com",
        new_login, new_login
    );
    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let member = User::find_by_id(&ctx.db, ctx.member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.name.as_deref(), Some("Edited Again"));
    assert_eq!(member.phone.as_deref(), Some("555-0100"));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_edit_user_duplicate_login_rejected() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/edit", ctx.member.id);

    // The admin's login is taken; editing the member onto it must fail
    let response = ctx
        .app
        .clone()
        .call(post_form(
            &uri,
            Some(&cookie),
            &edit_form_body(&ctx.admin.login),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let login_field = json["form"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "login")
        .unwrap();
    assert_eq!(login_field["error"], "User login already in use");

    // Nothing was written
    let member = User::find_by_id(&ctx.db, ctx.member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.login, ctx.member.login);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_edit_user_inactive_login_still_reserved() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let deactivated =
        common::create_test_user(&ctx.db, bandroom_shared::models::user::UserRole::Member).await;
    User::deactivate(&ctx.db, deactivated.id).await.unwrap();

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/edit", ctx.member.id);

    let response = ctx
        .app
        .clone()
        .call(post_form(
            &uri,
            Some(&cookie),
            &edit_form_body(&deactivated.login),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(deactivated.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await;
}

#[tokio::test]
async fn test_edit_user_validation_errors() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/edit", ctx.member.id);

    // Short password
    let body = format!(
        "name=X&password=abcd&password_confirm=abcd&login={}&email=x%40example.com",
        ctx.member.login
    );
    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let password_field = json["form"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "password")
        .unwrap();
    assert_eq!(password_field["error"], "Shorter than minimum length 5");

    // Missing required field and bad email are both reported at once
    let body = "password=changedpw&password_confirm=changedpw&login=&email=bad".to_string();
    let response = ctx
        .app
        .clone()
        .call(post_form(&uri, Some(&cookie), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let errors: Vec<&str> = json["form"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["error"].as_str())
        .collect();
    assert!(errors.len() >= 3, "got errors: {:?}", errors);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_edit_form_view_model() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.admin);
    let uri = format!("/users/{}/edit", ctx.member.id);

    let response = ctx.app.clone().call(get(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["form"]["name"], "user_edit");
    assert_eq!(json["form"]["buttons"][0], "send");

    // The checked-password widget needs its confirmation script
    let js = json["requirements"]["js"].as_array().unwrap();
    assert!(js.iter().any(|a| a == "static/forms/checked_password.js"));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_user_events_across_bands() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.member);
    let uri = format!("/users/{}/events", ctx.member.id);

    // No memberships yet: empty schedule
    let response = ctx.app.clone().call(get(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["events"].as_array().unwrap().len(), 0);

    // Two bands, one event each: the schedule is the union
    let band_a = common::create_test_band(&ctx.db, &[ctx.member.id]).await;
    let band_b = common::create_test_band(&ctx.db, &[ctx.member.id, ctx.admin.id]).await;
    common::create_test_event(&ctx.db, band_a.id, "Silver Rocket").await;
    common::create_test_event(&ctx.db, band_b.id, "Fuga").await;

    let response = ctx.app.clone().call(get(&uri, Some(&cookie))).await.unwrap();
    let json = body_json(response).await;
    let places: Vec<&str> = json["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["place"].as_str().unwrap())
        .collect();
    assert_eq!(places.len(), 2);
    assert!(places.contains(&"Silver Rocket"));
    assert!(places.contains(&"Fuga"));

    // The profile view carries the same schedule
    let profile_uri = format!("/users/{}", ctx.member.id);
    let response = ctx
        .app
        .clone()
        .call(get(&profile_uri, Some(&cookie)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["events"].as_array().unwrap().len(), 2);

    Band::delete(&ctx.db, band_a.id).await.unwrap();
    Band::delete(&ctx.db, band_b.id).await.unwrap();
    ctx.cleanup().await;
}

#[tokio::test]
async fn test_home_lists_user_bands() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let band = common::create_test_band(&ctx.db, &[ctx.member.id]).await;

    let cookie = ctx.session_cookie(&ctx.member);
    let response = ctx
        .app
        .clone()
        .call(get("/home", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["login"], ctx.member.login.as_str());
    let names: Vec<&str> = json["bands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&band.name.as_str()));

    // The admin is in no bands
    let cookie = ctx.session_cookie(&ctx.admin);
    let response = ctx
        .app
        .clone()
        .call(get("/home", Some(&cookie)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["bands"].as_array().unwrap().len(), 0);

    Band::delete(&ctx.db, band.id).await.unwrap();
    ctx.cleanup().await;
}

#[tokio::test]
async fn test_view_nonexistent_user_is_404() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let cookie = ctx.session_cookie(&ctx.member);
    let uri = format!("/users/{}", Uuid::new_v4());

    let response = ctx.app.clone().call(get(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}
