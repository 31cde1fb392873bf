// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # trie-store Operator Tool
//!
//! Entry point for the `trie-store` binary. Parses CLI arguments,
//! initializes logging, and runs one subcommand:
//!
//! - `pack` / `unpack` - hex-prefix encode or decode a nibble path
//! - `get` / `put` / `delete` - single-key access to a database
//! - `apply`   - apply a JSON batch atomically (or dry-run it)
//! - `version` - print build version information

mod cli;
mod commands;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;

use trie_store::config::StoreConfig;
use trie_store::encoding::{pack_nibbles, unpack_to_nibbles, TERMINATOR};
use trie_store::storage::{KeyValueStore, SledStore, TrackingStore};

use cli::{Commands, StoreArgs, TrieStoreCli};
use commands::{decode_hex, parse_nibbles, render_nibbles, BatchFile};
use logging::LogFormat;
use metrics::StoreMetrics;

fn main() -> Result<()> {
    let cli = TrieStoreCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_json_flag(cli.log_json));

    match cli.command {
        Commands::Pack(args) => {
            let mut nibbles = parse_nibbles(&args.nibbles)?;
            if args.terminator {
                nibbles.push(TERMINATOR);
            }
            let packed = pack_nibbles(&nibbles)?;
            println!("{}", hex::encode(packed));
            Ok(())
        }
        Commands::Unpack(args) => {
            let encoded = decode_hex("encoded key", &args.encoded)?;
            let nibbles = unpack_to_nibbles(&encoded)?;
            println!("{}", render_nibbles(&nibbles));
            Ok(())
        }
        Commands::Get(args) => {
            let store = open_store(&args.store)?;
            let key = decode_hex("key", &args.key)?;
            match store.get(&key)? {
                Some(value) => println!("{}", hex::encode(value)),
                None => anyhow::bail!("key {} not found", args.key),
            }
            Ok(())
        }
        Commands::Put(args) => {
            let mut store = open_store(&args.store)?;
            let key = decode_hex("key", &args.key)?;
            let value = decode_hex("value", &args.value)?;
            store.put(&key, &value)?;
            store.close()?;
            tracing::info!(key = %args.key, bytes = value.len(), "value stored");
            Ok(())
        }
        Commands::Delete(args) => {
            let mut store = open_store(&args.store)?;
            let key = decode_hex("key", &args.key)?;
            store.delete(&key)?;
            store.close()?;
            tracing::info!(key = %args.key, "key deleted");
            Ok(())
        }
        Commands::Apply(args) => {
            let batch = BatchFile::load(&args.batch)?;
            let metrics = StoreMetrics::new().context("failed to create metrics registry")?;
            let mut store = TrackingStore::new(open_store(&args.store)?);

            let summary = commands::apply_batch(&mut store, &batch, args.dry_run, &metrics)?;
            store.close()?;

            println!(
                "{} {} puts, {} deletes",
                if summary.committed { "committed" } else { "dry run:" },
                summary.puts,
                summary.deletes
            );
            if args.metrics {
                print!("{}", metrics.encode().context("failed to encode metrics")?);
            }
            Ok(())
        }
        Commands::Version => {
            println!("trie-store {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Resolve config file + flags and open the sled store.
fn open_store(args: &StoreArgs) -> Result<SledStore> {
    let base = match &args.config {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::default(),
    };
    let config = args.apply_to(base);
    SledStore::from_config(&config)
        .with_context(|| format!("failed to open database at {}", config.data_dir.display()))
}
