//! # CLI Interface
//!
//! Defines the command-line argument structure for `trie-store` using
//! `clap` derive. Codec subcommands (`pack`, `unpack`) need no database;
//! store subcommands (`get`, `put`, `delete`, `apply`) open one.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use trie_store::config::{StoreConfig, CONFIG_ENV_VAR};

/// Inspect and edit trie-store databases.
///
/// Keys and values are given and printed as hex. Nibble paths are given as
/// a string of hex digits, one digit per nibble.
#[derive(Parser, Debug)]
#[command(
    name = "trie-store",
    about = "Inspect and edit trie-store databases",
    version,
    propagate_version = true
)]
pub struct TrieStoreCli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, env = "TRIE_STORE_LOG_JSON")]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hex-prefix encode a nibble path.
    Pack(PackArgs),
    /// Decode a hex-prefix encoded key back to its nibble path.
    Unpack(UnpackArgs),
    /// Read the value stored under a key.
    Get(KeyArgs),
    /// Store a value under a key.
    Put(PutArgs),
    /// Remove a key.
    Delete(KeyArgs),
    /// Apply a JSON batch of puts and deletes as one transaction.
    Apply(ApplyArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `pack` subcommand.
#[derive(Args, Debug)]
pub struct PackArgs {
    /// Nibble path as hex digits, e.g. `0f1cb8`.
    pub nibbles: String,

    /// Append the terminator: the path ends in a value.
    #[arg(long, short = 't')]
    pub terminator: bool,
}

/// Arguments for the `unpack` subcommand.
#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Encoded key as hex, e.g. `200f1cb8`.
    pub encoded: String,
}

/// Where the database lives. Flags override the config file.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Path to a JSON store configuration file.
    #[arg(long, short = 'c', env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Database directory.
    #[arg(long, short = 'd', env = "TRIE_STORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Tree inside the database.
    #[arg(long)]
    pub tree: Option<String>,

    /// Clear the tree before running the command.
    #[arg(long)]
    pub reset: bool,
}

impl StoreArgs {
    /// Overlay the flags onto `base`.
    pub fn apply_to(&self, mut base: StoreConfig) -> StoreConfig {
        if let Some(dir) = &self.data_dir {
            base.data_dir = dir.clone();
        }
        if let Some(tree) = &self.tree {
            base.tree = tree.clone();
        }
        if self.reset {
            base.database_reset = true;
        }
        base
    }
}

/// Arguments for `get` and `delete`.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Key as hex.
    pub key: String,
}

/// Arguments for the `put` subcommand.
#[derive(Args, Debug)]
pub struct PutArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Key as hex.
    pub key: String,

    /// Value as hex.
    pub value: String,
}

/// Arguments for the `apply` subcommand.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// JSON batch file: `{"ops": [{"op": "put", "key": "..", "value": ".."}, ...]}`.
    pub batch: PathBuf,

    /// Stage the batch, report what would change, then roll back.
    #[arg(long)]
    pub dry_run: bool,

    /// Print store metrics in Prometheus text format when done.
    #[arg(long)]
    pub metrics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        TrieStoreCli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = TrieStoreCli::parse_from([
            "trie-store",
            "get",
            "--data-dir",
            "/tmp/state",
            "--tree",
            "accounts",
            "abcd",
        ]);
        let Commands::Get(args) = cli.command else {
            panic!("expected get");
        };
        let config = args.store.apply_to(StoreConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/state"));
        assert_eq!(config.tree, "accounts");
        assert!(!config.database_reset);
        assert_eq!(args.key, "abcd");
    }

    #[test]
    fn pack_accepts_terminator_flag() {
        let cli = TrieStoreCli::parse_from(["trie-store", "pack", "-t", "f1cb8"]);
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert!(args.terminator);
        assert_eq!(args.nibbles, "f1cb8");
    }
}
