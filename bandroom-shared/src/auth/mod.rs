/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`credentials`]: Login/password check against stored users
/// - [`session`]: Signed session tokens bound to a user's login
/// - [`middleware`]: Axum middleware that resolves the session cookie
/// - [`authorization`]: Route capability map and the access gate
///
/// # Security Notes
///
/// - Passwords are hashed with Argon2id (64 MB memory, 3 iterations)
/// - Session tokens are HS256-signed with configurable expiration
/// - Credential failures are uniform: callers cannot distinguish an unknown
///   login from a wrong password

pub mod authorization;
pub mod credentials;
pub mod middleware;
pub mod password;
pub mod session;
