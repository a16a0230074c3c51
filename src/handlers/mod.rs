pub mod action_card;
pub mod auth;
pub mod content;
pub mod creator;
pub mod explore;
pub mod membership;
pub mod payment;
pub mod support;
pub mod user;

pub use action_card::action_card_config;
pub use auth::auth_config;
pub use content::content_config;
pub use creator::creator_config;
pub use explore::explore_config;
pub use membership::membership_config;
pub use payment::payment_config;
pub use support::support_config;
pub use user::user_config;
