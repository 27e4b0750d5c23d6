/// Route handlers for the API server
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `login`: Login form and credential submission
/// - `home`: Authenticated landing page (the user's bands)
/// - `users`: User management (list, view, edit, soft delete, events)

pub mod health;
pub mod home;
pub mod login;
pub mod users;
