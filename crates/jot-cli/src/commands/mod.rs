pub mod add;
pub mod auth;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod list;
pub mod server;
pub mod show;
pub mod state;
