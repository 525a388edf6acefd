//! Authentication, verification, and federated sign-in handlers.

pub mod admin;
pub mod federated;
pub mod google;
pub mod login;
pub mod password;
pub mod principal;
pub mod register;
pub mod reset;
pub mod session;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;
pub mod utils;
pub mod verification;

#[cfg(test)]
mod tests;
