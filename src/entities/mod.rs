pub mod action_cards;
pub mod gallery_items;
pub mod member_subscriptions;
pub mod membership_tiers;
pub mod posts;
pub mod support_transactions;
pub mod users;

pub use action_cards as action_card_entity;
pub use gallery_items as gallery_item_entity;
pub use member_subscriptions as member_subscription_entity;
pub use membership_tiers as membership_tier_entity;
pub use posts as post_entity;
pub use support_transactions as support_transaction_entity;
pub use users as user_entity;

pub use member_subscriptions::SubscriptionStatus;
pub use posts::Visibility;
pub use support_transactions::SupportStatus;
pub use users::UserRole;
