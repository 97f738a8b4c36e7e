//! Standard paths used by envsecrets

use std::path::PathBuf;

/// User-scoped storage locations for secrets stores.
pub struct Paths {
    /// Base directory holding one subdirectory per project identifier
    /// (~/.envsecrets/store on Unix, %APPDATA%/EnvSecrets/Store on Windows)
    pub base: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        Self {
            base: base_dir(),
        }
    }

    /// Directory holding the secrets file for one project identifier
    pub fn store_dir(&self, id: &str) -> PathBuf {
        self.base.join(id)
    }
}

fn base_dir() -> PathBuf {
    if cfg!(windows) {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("EnvSecrets").join("Store");
        }
        return home()
            .join("AppData")
            .join("Roaming")
            .join("EnvSecrets")
            .join("Store");
    }

    // Unix and anything unrecognized
    home().join(".envsecrets").join("store")
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}
