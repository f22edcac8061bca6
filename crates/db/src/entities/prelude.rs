//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::entries::Entity as Entries;
pub use super::entry_tags::Entity as EntryTags;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;
