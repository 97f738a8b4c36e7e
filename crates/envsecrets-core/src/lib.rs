//! envsecrets-core - Shared functionality for the envsecrets tools
//!
//! The dotenv-style `KEY=VALUE` text format and the user-scoped
//! storage paths, shared by the library and the CLI.

pub mod dotenv;
pub mod paths;

pub use dotenv::EnvMap;
pub use paths::Paths;
