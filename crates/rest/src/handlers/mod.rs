//! HTTP request handlers.

pub mod home;
pub mod tasks;
pub mod users;
