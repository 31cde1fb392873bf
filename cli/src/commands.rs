//! Command helpers: nibble/hex parsing and batch application.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use trie_store::encoding::{nibbles_to_pretty_string, TERMINATOR};
use trie_store::storage::{KeyValueStore, TrackingStore};

use crate::metrics::StoreMetrics;

// ---------------------------------------------------------------------------
// Hex / Nibble Parsing
// ---------------------------------------------------------------------------

/// Parse `0f1cb8` into `[0, 15, 1, 12, 11, 8]`, one nibble per digit.
pub fn parse_nibbles(digits: &str) -> Result<Vec<u8>> {
    digits
        .chars()
        .enumerate()
        .map(|(i, c)| match c.to_digit(16) {
            Some(d) => Ok(d as u8),
            None => bail!("invalid nibble {c:?} at position {i}"),
        })
        .collect()
}

/// Render a nibble path as hex digits, with a trailing `T` for the
/// terminator, followed by the escaped form.
pub fn render_nibbles(nibbles: &[u8]) -> String {
    let digits: String = nibbles
        .iter()
        .map(|&n| match n {
            TERMINATOR => 'T',
            n => char::from_digit(u32::from(n), 16).unwrap_or('?'),
        })
        .collect();
    format!("{digits} {}", nibbles_to_pretty_string(nibbles))
}

/// Decode a hex argument, naming it in the error.
pub fn decode_hex(what: &str, s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim_start_matches("0x")).with_context(|| format!("{what} is not valid hex: {s:?}"))
}

// ---------------------------------------------------------------------------
// Batch Files
// ---------------------------------------------------------------------------

/// One mutation in a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BatchOp {
    Put { key: String, value: String },
    Delete { key: String },
}

/// `{"ops": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    pub ops: Vec<BatchOp>,
}

impl BatchFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read batch file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid batch file {}", path.display()))
    }
}

/// What `apply_batch` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    pub puts: usize,
    pub deletes: usize,
    pub committed: bool,
}

/// Stage every op of `batch` in one transaction, then commit (or roll back
/// for a dry run). Any bad op rolls the whole batch back.
pub fn apply_batch<S: KeyValueStore>(
    store: &mut TrackingStore<S>,
    batch: &BatchFile,
    dry_run: bool,
    metrics: &StoreMetrics,
) -> Result<ApplySummary> {
    store.start_track()?;

    if let Err(e) = stage_ops(store, &batch.ops) {
        store.rollback_track()?;
        metrics.rollbacks_total.inc();
        return Err(e);
    }

    let summary = ApplySummary {
        puts: store.pending_puts(),
        deletes: store.pending_deletes(),
        committed: !dry_run,
    };
    metrics.staged_puts_total.inc_by(summary.puts as u64);
    metrics.staged_deletes_total.inc_by(summary.deletes as u64);

    if dry_run {
        store.rollback_track()?;
        metrics.rollbacks_total.inc();
        tracing::info!(puts = summary.puts, deletes = summary.deletes, "dry run rolled back");
    } else {
        store.commit_track().context("commit failed")?;
        metrics.commits_total.inc();
        tracing::info!(puts = summary.puts, deletes = summary.deletes, "batch committed");
    }
    Ok(summary)
}

fn stage_ops<S: KeyValueStore>(store: &mut TrackingStore<S>, ops: &[BatchOp]) -> Result<()> {
    for (i, op) in ops.iter().enumerate() {
        match op {
            BatchOp::Put { key, value } => {
                let key = decode_hex(&format!("ops[{i}].key"), key)?;
                let value = decode_hex(&format!("ops[{i}].value"), value)?;
                store.put(&key, &value)?;
            }
            BatchOp::Delete { key } => {
                let key = decode_hex(&format!("ops[{i}].key"), key)?;
                store.delete(&key)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trie_store::storage::MemoryStore;

    fn batch(json: &str) -> BatchFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_nibbles_accepts_hex_digits() {
        assert_eq!(parse_nibbles("0f1cB8").unwrap(), vec![0, 15, 1, 12, 11, 8]);
        assert!(parse_nibbles("").unwrap().is_empty());
        assert!(parse_nibbles("0g").is_err());
    }

    #[test]
    fn render_marks_terminator() {
        assert_eq!(render_nibbles(&[0, 15, TERMINATOR]), "0fT \\x00\\x0f\\x10");
    }

    #[test]
    fn decode_hex_tolerates_prefix() {
        assert_eq!(decode_hex("key", "0xdead").unwrap(), vec![0xde, 0xad]);
        assert!(decode_hex("key", "xyz").is_err());
    }

    #[test]
    fn batch_ops_deserialize() {
        let file = batch(
            r#"{"ops": [{"op": "put", "key": "01", "value": "ff"}, {"op": "delete", "key": "02"}]}"#,
        );
        assert_eq!(
            file.ops,
            vec![
                BatchOp::Put {
                    key: "01".to_string(),
                    value: "ff".to_string()
                },
                BatchOp::Delete {
                    key: "02".to_string()
                },
            ]
        );
    }

    #[test]
    fn apply_commits_batch() {
        let mut backing = MemoryStore::new();
        backing.put(&[0x02], &[0x00]).unwrap();
        let mut store = TrackingStore::new(backing.clone());
        let metrics = StoreMetrics::new().unwrap();

        let file = batch(
            r#"{"ops": [{"op": "put", "key": "01", "value": "ff"}, {"op": "delete", "key": "02"}]}"#,
        );
        let summary = apply_batch(&mut store, &file, false, &metrics).unwrap();

        assert_eq!(
            summary,
            ApplySummary {
                puts: 1,
                deletes: 1,
                committed: true
            }
        );
        assert_eq!(backing.get(&[0x01]).unwrap(), Some(vec![0xff]));
        assert!(backing.get(&[0x02]).unwrap().is_none());
        assert_eq!(metrics.commits_total.get(), 1);
    }

    #[test]
    fn dry_run_rolls_back() {
        let backing = MemoryStore::new();
        let mut store = TrackingStore::new(backing.clone());
        let metrics = StoreMetrics::new().unwrap();

        let file = batch(r#"{"ops": [{"op": "put", "key": "01", "value": "ff"}]}"#);
        let summary = apply_batch(&mut store, &file, true, &metrics).unwrap();

        assert!(!summary.committed);
        assert!(backing.is_empty());
        assert!(!store.is_tracking());
        assert_eq!(metrics.rollbacks_total.get(), 1);
    }

    #[test]
    fn bad_op_rolls_back_whole_batch() {
        let backing = MemoryStore::new();
        let mut store = TrackingStore::new(backing.clone());
        let metrics = StoreMetrics::new().unwrap();

        let file = batch(
            r#"{"ops": [{"op": "put", "key": "01", "value": "ff"}, {"op": "put", "key": "zz", "value": "00"}]}"#,
        );
        let err = apply_batch(&mut store, &file, false, &metrics).unwrap_err();

        assert!(err.to_string().contains("ops[1].key"));
        assert!(backing.is_empty());
        assert!(!store.is_tracking());
        assert_eq!(metrics.commits_total.get(), 0);
    }
}
