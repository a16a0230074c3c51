pub mod action_card;
pub mod common;
pub mod content;
pub mod explore;
pub mod membership;
pub mod pagination;
pub mod support;
pub mod user;

pub use action_card::*;
pub use common::*;
pub use content::*;
pub use explore::*;
pub use membership::*;
pub use pagination::*;
pub use support::*;
pub use user::*;
