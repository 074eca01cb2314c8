pub mod accounts;
pub mod apps;
pub mod users;
pub mod webhooks;

pub use accounts::Accounts;
pub use apps::Apps;
pub use users::Users;
pub use webhooks::{WebhookEvent, Webhooks};
