pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, Identity, get_identity, require_identity};
pub use cors::create_cors;
