pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod serializers;
pub mod services;
pub mod state;
pub mod types;
pub mod viewset;
