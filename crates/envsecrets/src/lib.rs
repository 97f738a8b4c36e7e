//! envsecrets - Keep secrets out of your project directory
//!
//! "The safest secret in a repository is the one that was never in it."
//!
//! API keys, connection strings, tokens - every project needs a few,
//! and they keep ending up in committed `.env` files. envsecrets moves
//! them to a user-scoped store outside the project. The project keeps
//! only a random identifier in its `.env`; the actual values live in
//! `~/.envsecrets/store/<id>/.secrets` and are injected into the
//! process environment on load.
//!
//! Plain-text storage with 0600 permissions. This is separation from
//! the repository, not encryption.
//!
//! ```no_run
//! use envsecrets::SecretStore;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut store = SecretStore::new(std::env::current_dir()?);
//! store.init()?;
//! store.set("API_KEY", "sk-...")?;
//! # Ok(())
//! # }
//! ```

pub mod ident;
pub mod store;

pub use ident::ID_KEY;
pub use store::{Environ, ProcessEnv, SecretStore, StoreError, StoreInfo};
