pub mod admin;
pub mod auth;
pub mod flagged;
pub mod listing;
pub mod notification;
pub mod saved_search;

pub use auth::*;
