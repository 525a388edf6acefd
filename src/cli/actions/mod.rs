pub mod admin;
pub mod server;

use crate::cli::globals::GlobalArgs;
use secrecy::SecretString;

/// Actions the CLI can dispatch to.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        globals: GlobalArgs,
    },
    AdminBootstrap {
        dsn: String,
        globals: GlobalArgs,
        email: String,
        password: SecretString,
        full_name: String,
    },
}
