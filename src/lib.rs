pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod repos;
pub mod schema;
pub mod scopes;
pub mod security;
pub mod services;
pub mod validation;
pub mod web;
