pub mod admin;
pub mod auth;
pub mod bootstrap_admin;
pub mod email;
pub mod listing;
pub mod moderation;
pub mod notification;
pub mod saved_search;
pub mod upload;
