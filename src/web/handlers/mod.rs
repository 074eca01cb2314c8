pub mod accounts;
pub mod apps;
pub mod auth;
pub mod scopes;
pub mod users;
