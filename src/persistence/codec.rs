//! On-disk encodings of a [`State`].
//!
//! `Json` is the self-describing format, readable by hand. `Compact` stores a
//! flat pre-order list of entries, bincode-encoded and zstd-compressed, behind a
//! magic tag and a MetroHash64 checksum of the compressed payload.

use std::hash::Hasher;

use bincode::{Decode, Encode};
use clap::ValueEnum;
use derive_more::Display;
use hashlink::LinkedHashMap;
use metrohash::MetroHash64;
use serde::Deserialize;
use snafu::prelude::*;

use crate::persistence::error::{
    CompressionSnafu, DecodeSnafu, EncodeSnafu, JsonSnafu, MalformedStateSnafu, SnapshotError,
};
use crate::persistence::record::{NodeRecord, State};

const COMPACT_MAGIC: &[u8; 4] = b"TFS1";
const CHECKSUM_LEN: usize = 8;
const HEADER_LEN: usize = COMPACT_MAGIC.len() + CHECKSUM_LEN;

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
pub enum SnapshotFormat {
    #[default]
    #[display("json")]
    Json,
    #[display("compact")]
    Compact,
}

impl SnapshotFormat {
    /// Detects the encoding of previously written snapshot bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(COMPACT_MAGIC) {
            SnapshotFormat::Compact
        } else {
            SnapshotFormat::Json
        }
    }
}

#[derive(Debug, Encode, Decode)]
struct CompactState {
    current_directory: String,
    entries: Vec<CompactEntry>,
}

/// One node of the flat encoding. `parent` indexes an earlier entry; only the
/// first entry, the root, has none.
#[derive(Debug, Encode, Decode)]
struct CompactEntry {
    parent: Option<u32>,
    name: String,
    is_directory: bool,
    content: String,
}

pub fn encode(
    state: &State,
    format: SnapshotFormat,
    compression_level: i32,
) -> Result<Vec<u8>, SnapshotError> {
    match format {
        SnapshotFormat::Json => serde_json::to_vec_pretty(state).context(JsonSnafu),
        SnapshotFormat::Compact => encode_compact(state, compression_level),
    }
}

pub fn decode(bytes: &[u8]) -> Result<State, SnapshotError> {
    match SnapshotFormat::detect(bytes) {
        SnapshotFormat::Json => decode_json(bytes),
        SnapshotFormat::Compact => decode_compact(bytes),
    }
}

/// Every tree level nests two JSON objects, so the reader runs without
/// serde_json's depth limit and grows its stack on demand instead.
fn decode_json(bytes: &[u8]) -> Result<State, SnapshotError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();

    let state =
        State::deserialize(serde_stacker::Deserializer::new(&mut deserializer)).context(JsonSnafu)?;
    deserializer.end().context(JsonSnafu)?;
    Ok(state)
}

fn checksum(payload: &[u8]) -> u64 {
    let mut hasher = MetroHash64::default();
    hasher.write(payload);
    hasher.finish()
}

fn encode_compact(state: &State, compression_level: i32) -> Result<Vec<u8>, SnapshotError> {
    let compact = CompactState {
        current_directory: state.current_directory.clone(),
        entries: flatten(&state.file_system_structure),
    };

    let encoded =
        bincode::encode_to_vec(compact, bincode::config::standard()).context(EncodeSnafu)?;
    let compressed = zstd::encode_all(encoded.as_slice(), compression_level)
        .context(CompressionSnafu)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(COMPACT_MAGIC);
    bytes.extend_from_slice(&checksum(&compressed).to_le_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

fn decode_compact(bytes: &[u8]) -> Result<State, SnapshotError> {
    ensure!(
        bytes.len() >= HEADER_LEN,
        MalformedStateSnafu {
            reason: "compact snapshot is truncated",
        }
    );
    let (header, compressed) = bytes.split_at(HEADER_LEN);
    let mut stored = [0u8; CHECKSUM_LEN];
    stored.copy_from_slice(&header[COMPACT_MAGIC.len()..]);
    ensure!(
        u64::from_le_bytes(stored) == checksum(compressed),
        MalformedStateSnafu {
            reason: "compact snapshot checksum mismatch",
        }
    );

    let encoded = zstd::decode_all(compressed).context(CompressionSnafu)?;
    let (compact, _): (CompactState, usize) =
        bincode::decode_from_slice(&encoded, bincode::config::standard()).context(DecodeSnafu)?;

    Ok(State {
        current_directory: compact.current_directory,
        file_system_structure: unflatten(compact.entries)?,
    })
}

/// Lists the record tree in pre-order, children kept in insertion order.
fn flatten(root: &NodeRecord) -> Vec<CompactEntry> {
    let mut entries = Vec::new();
    let mut stack = vec![(root, None)];

    while let Some((record, parent)) = stack.pop() {
        let index = entries.len() as u32;
        entries.push(CompactEntry {
            parent,
            name: record.name.clone(),
            is_directory: record.is_directory,
            content: record.content.clone(),
        });

        if let Some(children) = record.children.as_ref() {
            for child in children.values().rev() {
                stack.push((child, Some(index)));
            }
        }
    }

    entries
}

/// Rebuilds the nested record from flat entries, deepest entries first.
fn unflatten(entries: Vec<CompactEntry>) -> Result<NodeRecord, SnapshotError> {
    ensure!(
        entries.first().is_some_and(|root| root.parent.is_none()),
        MalformedStateSnafu {
            reason: "compact snapshot has no root entry",
        }
    );

    let mut child_indices: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    for (index, entry) in entries.iter().enumerate().skip(1) {
        let parent = entry.parent.map(|p| p as usize);
        match parent {
            Some(parent) if parent < index => child_indices[parent].push(index),
            _ => {
                return MalformedStateSnafu {
                    reason: format!("entry '{}' has an invalid parent", entry.name),
                }
                .fail();
            }
        }
    }

    let mut records: Vec<Option<NodeRecord>> = entries
        .into_iter()
        .map(|entry| {
            Some(NodeRecord {
                name: entry.name,
                is_directory: entry.is_directory,
                content: entry.content,
                children: entry.is_directory.then(LinkedHashMap::new),
            })
        })
        .collect();

    for index in (0..records.len()).rev() {
        let mut children = LinkedHashMap::new();
        for &child in &child_indices[index] {
            if let Some(record) = records[child].take() {
                children.insert(record.name.clone(), record);
            }
        }
        if let Some(record) = records[index].as_mut() {
            if !children.is_empty() {
                record.children = Some(children);
            }
        }
    }

    records
        .first_mut()
        .and_then(Option::take)
        .context(MalformedStateSnafu {
            reason: "compact snapshot has no root entry",
        })
}
