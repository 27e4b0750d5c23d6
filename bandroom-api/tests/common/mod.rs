/// Common test utilities for integration tests
///
/// Shared infrastructure for the integration tests:
/// - Test database setup and cleanup
/// - Test user creation (one admin, one member, both with a known password)
/// - Session cookie generation
/// - Band and event fixtures
///
/// Tests are skipped (return early) when DATABASE_URL is not set, so the
/// suite can run without a database at the cost of coverage.

use bandroom_api::app::{build_router, AppState};
use bandroom_api::config::Config;
use bandroom_shared::auth::password::hash_password;
use bandroom_shared::auth::session::{create_session_token, SessionClaims};
use bandroom_shared::models::band::{Band, CreateBand};
use bandroom_shared::models::event::{CreateEvent, Event};
use bandroom_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

/// Password every test user is created with
pub const TEST_PASSWORD: &str = "password";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub admin: User,
    pub member: User,
}

impl TestContext {
    /// Creates a new test context with fresh users
    ///
    /// Returns None when DATABASE_URL is not set; callers skip the test in
    /// that case.
    pub async fn new() -> Option<Self> {
        if std::env::var("DATABASE_URL").is_err() {
            return None;
        }

        if std::env::var("SESSION_SECRET").is_err() {
            std::env::set_var(
                "SESSION_SECRET",
                "integration-test-secret-at-least-32-bytes",
            );
        }

        let config = Config::from_env().expect("test configuration");

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("connect to test database");

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("run migrations");

        let admin = create_test_user(&db, UserRole::Admin).await;
        let member = create_test_user(&db, UserRole::Member).await;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Some(TestContext {
            db,
            app,
            config,
            admin,
            member,
        })
    }

    /// Returns a Cookie header value carrying a valid session for the user
    pub fn session_cookie(&self, user: &User) -> String {
        let claims = SessionClaims::new(user.id, user.login.clone());
        let token =
            create_session_token(&claims, &self.config.session.secret).expect("create token");
        format!("session={}", token)
    }

    /// Cleans up test data
    ///
    /// Removes the context's users; memberships cascade. Bands created by
    /// individual tests are deleted by those tests.
    pub async fn cleanup(&self) {
        sqlx::query("DELETE FROM users WHERE id = $1 OR id = $2")
            .bind(self.admin.id)
            .bind(self.member.id)
            .execute(&self.db)
            .await
            .expect("cleanup users");
    }
}

/// Creates a user with a unique login and the shared test password
pub async fn create_test_user(db: &PgPool, role: UserRole) -> User {
    let suffix = Uuid::new_v4();
    let password_hash = hash_password(TEST_PASSWORD).expect("hash test password");

    let user = User::create(
        db,
        CreateUser {
            login: format!("test-{}", suffix),
            password_hash,
            name: Some("Test User".to_string()),
            email: format!("test-{}@example.com", suffix),
            phone: None,
        },
    )
    .await
    .expect("create test user");

    if role == UserRole::Admin {
        User::set_role(db, user.id, UserRole::Admin)
            .await
            .expect("set role");
        return User::find_by_id(db, user.id)
            .await
            .expect("reload user")
            .expect("user exists");
    }

    user
}

/// Creates a band with the given members
pub async fn create_test_band(db: &PgPool, member_ids: &[Uuid]) -> Band {
    let band = Band::create(
        db,
        CreateBand {
            name: format!("Test Band {}", Uuid::new_v4()),
            description: "Integration test band".to_string(),
        },
    )
    .await
    .expect("create test band");

    for user_id in member_ids {
        Band::add_member(db, band.id, *user_id)
            .await
            .expect("add member");
    }

    band
}

/// Creates a rehearsal event for a band
pub async fn create_test_event(db: &PgPool, band_id: Uuid, place: &str) -> Event {
    Event::create(
        db,
        CreateEvent {
            band_id,
            time: chrono::Utc::now() + chrono::Duration::days(7),
            place: place.to_string(),
        },
    )
    .await
    .expect("create test event")
}
