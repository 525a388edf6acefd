//! API handlers for the Quickshow auth service.

pub mod auth;
pub mod health;
pub mod root;
pub mod user;
