pub mod action_card_service;
pub mod auth_service;
pub mod content_service;
pub mod entitlement_service;
pub mod explore_service;
pub mod membership_service;
pub mod support_service;
pub mod user_service;

pub use action_card_service::*;
pub use auth_service::*;
pub use content_service::*;
pub use entitlement_service::*;
pub use explore_service::*;
pub use membership_service::*;
pub use support_service::*;
pub use user_service::*;
