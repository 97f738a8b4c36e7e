//! Project identifier resolution
//!
//! Each project directory is linked to its secrets store by a random
//! identifier kept under `ENV_SECRETS_ID` in the project's `.env`.
//! The identifier is generated once and read back ever after.

use std::path::Path;

use anyhow::Result;
use envsecrets_core::dotenv;
use uuid::Uuid;

/// Key in the linking file that holds the project identifier.
pub const ID_KEY: &str = "ENV_SECRETS_ID";

/// Read the project identifier from the linking file, generating and
/// persisting a new one if absent. Returns the identifier and whether
/// it was newly created. The linking file is only written in the
/// absent branch, and only the identifier line changes.
pub fn resolve(env_file: &Path) -> Result<(String, bool)> {
    let vars = dotenv::parse(env_file)?;

    if let Some(existing) = vars.get(ID_KEY) {
        return Ok((existing.to_string(), false));
    }

    let id = Uuid::new_v4().to_string();
    dotenv::upsert(env_file, ID_KEY, &id)?;
    Ok((id, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generates_canonical_uuid() {
        let dir = TempDir::new().unwrap();
        let env_file = dir.path().join(".env");

        let (id, created) = resolve(&env_file).unwrap();
        assert!(created);
        // Canonical lowercase hyphenated form
        assert_eq!(id.len(), 36);
        assert_eq!(id, id.to_lowercase());
        assert_eq!(id.matches('-').count(), 4);
        assert!(env_file.exists());
    }

    #[test]
    fn test_reuses_existing_id() {
        let dir = TempDir::new().unwrap();
        let env_file = dir.path().join(".env");

        let (first, created) = resolve(&env_file).unwrap();
        assert!(created);

        let (second, created) = resolve(&env_file).unwrap();
        assert!(!created);
        assert_eq!(first, second);

        // Exactly one identifier line
        let content = fs::read_to_string(&env_file).unwrap();
        assert_eq!(content.matches(ID_KEY).count(), 1);
    }

    #[test]
    fn test_preserves_existing_entries() {
        let dir = TempDir::new().unwrap();
        let env_file = dir.path().join(".env");
        fs::write(&env_file, "EXISTING_VAR=hello\n").unwrap();

        resolve(&env_file).unwrap();

        let content = fs::read_to_string(&env_file).unwrap();
        assert!(content.starts_with("EXISTING_VAR=hello\n"));
        assert!(content.contains("ENV_SECRETS_ID="));
    }
}
