//! envsecrets - Keep secrets out of your project directory
//!
//! The project's `.env` holds only a random ENV_SECRETS_ID; the actual
//! values live under the user's home directory and are injected into
//! the environment on load.
//!
//! Commands:
//! - init: Link the project to its secrets store
//! - set <KEY> [VALUE]: Store a secret (prompts if no value)
//! - get <KEY>: Retrieve a secret
//! - list: List secrets with masked values
//! - delete <KEY>: Delete a secret
//! - clear: Remove all secrets
//! - info: Show configuration details

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envsecrets::SecretStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envsecrets")]
#[command(about = "Manage secrets outside your project directory")]
#[command(version)]
#[command(after_help = r#"HOW IT WORKS:
    Your project's .env gets a single generated line:
    - ENV_SECRETS_ID=<random uuid>

    The actual values never touch the project directory:
    - Unix     ~/.envsecrets/store/<id>/.secrets
    - Windows  %APPDATA%\EnvSecrets\Store\<id>\.secrets

SECURITY:
    - Plain-text key=value storage, restricted to 0600 on Unix
    - Separation from the repository, not encryption
    - Never logged or sent anywhere"#)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Link this project to its secrets store
    Init,

    /// Store a secret (prompts securely if value not provided)
    Set {
        /// Secret key name (e.g., API_KEY, DATABASE_URL)
        key: String,
        /// Secret value (omit for secure hidden prompt)
        value: Option<String>,
    },

    /// Retrieve and print a secret value
    Get {
        /// Don't print trailing newline (useful for piping)
        #[arg(short = 'n')]
        no_newline: bool,
        /// Secret key name
        key: String,
    },

    /// List stored secrets (values masked)
    List {
        /// Output key names as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Delete a secret
    Delete {
        /// Secret key name to delete
        key: String,
    },

    /// Remove all secrets for this project
    Clear,

    /// Show configuration details
    Info {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let project_dir = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    let mut store = SecretStore::new(project_dir);
    store.init()?;

    match cli.command {
        Some(Commands::Init) => cmd_init(&store),
        Some(Commands::Set { key, value }) => cmd_set(&mut store, &key, value),
        Some(Commands::Get { no_newline, key }) => cmd_get(&store, &key, no_newline),
        Some(Commands::List { json }) => cmd_list(&store, json),
        Some(Commands::Delete { key }) => cmd_delete(&mut store, &key),
        Some(Commands::Clear) => cmd_clear(&mut store),
        Some(Commands::Info { json }) => cmd_info(&store, json),
        None => {
            // Default to listing secrets
            cmd_list(&store, false)
        }
    }
}

/// Report the identifier and secrets file the project is linked to
fn cmd_init(store: &SecretStore) -> Result<()> {
    // init already ran; just report the result
    println!(
        "Initialised with ENV_SECRETS_ID: {}",
        store.id().unwrap_or_default()
    );
    if let Some(path) = store.secrets_file() {
        println!("Secrets file: {}", path.display());
    }
    Ok(())
}

/// Store a secret
fn cmd_set(store: &mut SecretStore, key: &str, value: Option<String>) -> Result<()> {
    let secret_value = match value {
        Some(v) => v,
        None => rpassword::prompt_password("Enter secret value: ")
            .context("Failed to read secret value")?,
    };

    store.set(key, &secret_value)?;
    println!("Set secret: {}", key);
    Ok(())
}

/// Retrieve a secret
fn cmd_get(store: &SecretStore, key: &str, no_newline: bool) -> Result<()> {
    match store.get(key)? {
        Some(value) => {
            if no_newline {
                print!("{}", value);
            } else {
                println!("{}", value);
            }
            Ok(())
        }
        None => {
            eprintln!("Secret '{}' not found.", key);
            std::process::exit(1);
        }
    }
}

/// List all secrets with masked values
fn cmd_list(store: &SecretStore, json: bool) -> Result<()> {
    let secrets = store.list()?;

    if json {
        let keys: Vec<&str> = secrets.keys().collect();
        println!("{}", serde_json::to_string_pretty(&keys)?);
        return Ok(());
    }

    if secrets.is_empty() {
        println!("No secrets stored. Add one with: envsecrets set <KEY>");
        return Ok(());
    }

    for (key, value) in secrets.iter() {
        println!("  {} = {}", key, mask(value));
    }
    Ok(())
}

/// Mask a value for display: first three characters, then stars
fn mask(value: &str) -> String {
    if value.chars().count() > 3 {
        let head: String = value.chars().take(3).collect();
        format!("{}***", head)
    } else {
        "***".to_string()
    }
}

/// Delete a secret
fn cmd_delete(store: &mut SecretStore, key: &str) -> Result<()> {
    if store.delete(key)? {
        println!("Deleted secret: {}", key);
        Ok(())
    } else {
        eprintln!("Secret '{}' not found.", key);
        std::process::exit(1);
    }
}

/// Remove all secrets
fn cmd_clear(store: &mut SecretStore) -> Result<()> {
    let count = store.clear()?;
    println!("Cleared {} secret(s).", count);
    Ok(())
}

/// Show configuration details
fn cmd_info(store: &SecretStore, json: bool) -> Result<()> {
    let info = store.info()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("  Project directory : {}", info.project_dir.display());
    println!(
        "  .env file         : {}  (exists: {})",
        info.env_file.display(),
        info.env_file_exists
    );
    println!(
        "  ENV_SECRETS_ID    : {}",
        info.id.as_deref().unwrap_or("-")
    );
    println!("  Base directory    : {}", info.base_dir.display());
    println!(
        "  Secrets file      : {}  (exists: {})",
        info.secrets_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
        info.secrets_file_exists
    );
    println!("  Secrets count     : {}", info.secrets_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["envsecrets", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init)));

        let cli = Cli::try_parse_from(["envsecrets", "set", "API_KEY", "value"]).unwrap();
        if let Some(Commands::Set { key, value }) = cli.command {
            assert_eq!(key, "API_KEY");
            assert_eq!(value, Some("value".to_string()));
        } else {
            panic!("Expected Set command");
        }

        let cli = Cli::try_parse_from(["envsecrets", "set", "API_KEY"]).unwrap();
        if let Some(Commands::Set { key, value }) = cli.command {
            assert_eq!(key, "API_KEY");
            assert_eq!(value, None);
        } else {
            panic!("Expected Set command");
        }

        let cli = Cli::try_parse_from(["envsecrets", "get", "-n", "API_KEY"]).unwrap();
        if let Some(Commands::Get { key, no_newline }) = cli.command {
            assert_eq!(key, "API_KEY");
            assert!(no_newline);
        } else {
            panic!("Expected Get command");
        }
    }

    #[test]
    fn test_cli_project_flag() {
        let cli = Cli::try_parse_from(["envsecrets", "-p", "/tmp/proj", "list"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/proj")));

        // Global flag works after the subcommand too
        let cli =
            Cli::try_parse_from(["envsecrets", "info", "--project", "/tmp/proj"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/proj")));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("abcdef"), "abc***");
        assert_eq!(mask("ab"), "***");
        assert_eq!(mask("abc"), "***");
    }
}
