//! SecretStore - the secrets file and its environment mirror
//!
//! One dotenv-style `.secrets` file per project identifier, living
//! under the user-scoped base directory. Every operation re-parses the
//! file from disk, so edits made outside this process are always
//! observed; the cost is O(file size) per call, which is nothing at
//! the tens of entries these files hold. Mutations are full rewrites
//! through a temp file + rename, never appends, so a key can never end
//! up with stale duplicate lines and a failed write never truncates
//! the previous content.
//!
//! No locking: two writers racing on the same file are last-writer-
//! wins. Single-developer local tooling, not a database.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use envsecrets_core::dotenv::{self, EnvMap};
use envsecrets_core::Paths;

/// Name of the linking file inside the project directory.
pub const ENV_FILE_NAME: &str = ".env";
/// Name of the secrets file inside `<base>/<id>/`.
pub const SECRETS_FILE_NAME: &str = ".secrets";

/// Store-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store not initialized - call init() first")]
    NotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The process environment table, as a capability.
///
/// Production code binds this to the real `std::env` table via
/// [`ProcessEnv`]; tests substitute an isolated map so they never
/// mutate the test runner's environment.
pub trait Environ {
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// The real process environment.
pub struct ProcessEnv;

impl Environ for ProcessEnv {
    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove(&mut self, key: &str) {
        std::env::remove_var(key);
    }
}

/// Summary of a store's configuration, for `envsecrets info`.
#[derive(Debug, Serialize)]
pub struct StoreInfo {
    pub project_dir: PathBuf,
    pub env_file: PathBuf,
    pub env_file_exists: bool,
    pub id: Option<String>,
    pub base_dir: PathBuf,
    pub secrets_file: Option<PathBuf>,
    pub secrets_file_exists: bool,
    pub secrets_count: usize,
}

/// Manages the secrets for one project directory.
///
/// Uninitialized until [`init`](Self::init) runs; every other
/// operation except [`info`](Self::info) fails with
/// [`StoreError::NotInitialized`] before that.
pub struct SecretStore {
    /// Directory that contains (or will contain) the `.env` file
    project_dir: PathBuf,
    /// Path to the linking file
    env_file: PathBuf,
    /// User-scoped base directory holding all projects' stores
    base_dir: PathBuf,
    /// Project identifier, set by `init`
    id: Option<String>,
    /// Path to the secrets file, set by `init`
    secrets_path: Option<PathBuf>,
    /// Environment table the file contents are mirrored into
    environ: Box<dyn Environ>,
}

impl SecretStore {
    /// Create a store for a project directory, bound to the real
    /// process environment and the default base directory.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self::with_environ(project_dir, Paths::new().base, Box::new(ProcessEnv))
    }

    /// Create a store with an explicit base directory and environment
    /// table. This is the constructor tests use.
    pub fn with_environ(
        project_dir: impl Into<PathBuf>,
        base_dir: PathBuf,
        environ: Box<dyn Environ>,
    ) -> Self {
        let project_dir = project_dir.into();
        let env_file = project_dir.join(ENV_FILE_NAME);
        Self {
            project_dir,
            env_file,
            base_dir,
            id: None,
            secrets_path: None,
            environ,
        }
    }

    /// Initialize (or reconnect to) the secrets store for this project.
    ///
    /// Resolves the project identifier from the linking file (creating
    /// one if absent), ensures `<base>/<id>/.secrets` exists, and loads
    /// the contents into the environment. Idempotent: re-running on an
    /// initialized store re-resolves the same identifier and path.
    pub fn init(&mut self) -> Result<String> {
        let (id, created) = crate::ident::resolve(&self.env_file)?;
        if created {
            info!(%id, "generated new {}", crate::ident::ID_KEY);
        } else {
            info!(%id, "found existing {}", crate::ident::ID_KEY);
        }

        let store_dir = self.base_dir.join(&id);
        fs::create_dir_all(&store_dir)?;

        let secrets_path = store_dir.join(SECRETS_FILE_NAME);
        self.id = Some(id.clone());
        self.secrets_path = Some(secrets_path.clone());

        if !secrets_path.exists() {
            self.write_file(&EnvMap::new())?;
            info!(path = %secrets_path.display(), "created secrets file");
        }

        self.load()?;
        Ok(id)
    }

    /// Parse the secrets file and inject every entry into the
    /// environment, overwriting existing values. Entries absent from
    /// the file are not removed. Returns the parsed map.
    pub fn load(&mut self) -> Result<EnvMap> {
        let path = self.secrets_path()?;
        let secrets = dotenv::parse(&path)?;
        for (key, value) in secrets.iter() {
            self.environ.set(key, value);
        }
        if !secrets.is_empty() {
            info!(count = secrets.len(), "loaded secrets into environment");
        }
        Ok(secrets)
    }

    /// Create or update a secret, in the file and the environment.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.secrets_path()?;
        let mut secrets = dotenv::parse(&path)?;
        secrets.insert(key, value);
        self.write_file(&secrets)?;
        self.environ.set(key, value);
        info!(key, "set secret");
        Ok(())
    }

    /// Return the value of `key`, or `None` if it doesn't exist.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.secrets_path()?;
        Ok(dotenv::parse(&path)?.get(key).map(str::to_string))
    }

    /// Remove `key` from the file and the environment. Returns whether
    /// the key existed; an absent key is not an error and leaves the
    /// file untouched.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let path = self.secrets_path()?;
        let mut secrets = dotenv::parse(&path)?;
        if !secrets.remove(key) {
            return Ok(false);
        }
        self.write_file(&secrets)?;
        self.environ.remove(key);
        info!(key, "deleted secret");
        Ok(true)
    }

    /// Remove all secrets. Returns how many existed.
    pub fn clear(&mut self) -> Result<usize> {
        let path = self.secrets_path()?;
        let secrets = dotenv::parse(&path)?;
        let count = secrets.len();
        for (key, _) in secrets.iter() {
            self.environ.remove(key);
        }
        self.write_file(&EnvMap::new())?;
        info!(count, "cleared secrets");
        Ok(count)
    }

    /// Return all secrets (does not touch the environment).
    pub fn list(&self) -> Result<EnvMap> {
        let path = self.secrets_path()?;
        Ok(dotenv::parse(&path)?)
    }

    /// Summarize the current configuration. Unlike the other
    /// operations this works on an uninitialized store.
    pub fn info(&self) -> Result<StoreInfo> {
        let secrets_count = match &self.secrets_path {
            Some(path) => dotenv::parse(path)?.len(),
            None => 0,
        };
        Ok(StoreInfo {
            project_dir: self.project_dir.clone(),
            env_file: self.env_file.clone(),
            env_file_exists: self.env_file.exists(),
            id: self.id.clone(),
            base_dir: self.base_dir.clone(),
            secrets_file: self.secrets_path.clone(),
            secrets_file_exists: self
                .secrets_path
                .as_deref()
                .is_some_and(Path::exists),
            secrets_count,
        })
    }

    /// Path to the secrets file the store last resolved via `init`.
    pub fn secrets_file(&self) -> Option<&Path> {
        self.secrets_path.as_deref()
    }

    /// Project identifier resolved by `init`.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn secrets_path(&self) -> Result<PathBuf> {
        match &self.secrets_path {
            Some(path) => Ok(path.clone()),
            None => bail!(StoreError::NotInitialized),
        }
    }

    /// Rewrite the secrets file: header comments, blank line, then one
    /// `KEY=VALUE` line per entry in map order. Written to a sibling
    /// temp file and renamed into place, with permissions restricted
    /// to owner read/write on Unix before the rename.
    fn write_file(&self, secrets: &EnvMap) -> Result<()> {
        let path = self.secrets_path()?;

        let mut out = String::new();
        out.push_str("# envsecrets\n");
        out.push_str("# Do not share or commit this file to source control.\n");
        out.push_str(&format!("# Project: {}\n", self.project_dir.display()));
        if let Some(id) = &self.id {
            out.push_str(&format!("# ID: {}\n", id));
        }
        out.push('\n');
        for (key, value) in secrets.iter() {
            out.push_str(&format!("{}={}\n", key, dotenv::quote_if_needed(value)));
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, out)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
