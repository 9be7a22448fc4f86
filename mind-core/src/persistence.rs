//! State file codec.
//!
//! A state is written as a fixed 32-byte header followed by a bincode payload:
//!
//! ```text
//! offset  size  field
//!      0     4  magic "MIND"
//!      4     4  format_version (u32 LE)
//!      8     4  embedding_dim (u32 LE)
//!     12     4  max_memory_slots (u32 LE)
//!     16     4  slot_count (u32 LE)
//!     20     8  payload_len (u64 LE)
//!     28     4  checksum, CRC-32 of the payload (u32 LE)
//!     32     *  payload: bincode(StateImage)
//! ```
//!
//! Saves go to a temporary file in the destination directory which is then
//! renamed over the target, so a reader never sees a half-written file.
//! Loads decode and validate the whole image before anything is handed back;
//! a rejected file never touches the live state.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::MindConfig;
use crate::decay::MERCY_FLOOR;
use crate::error::{MindError, Result};
use crate::slot::Slot;
use crate::types::SlotId;

/// File magic.
pub const MAGIC: [u8; 4] = *b"MIND";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Encoded header size in bytes.
pub const HEADER_LEN: usize = 32;

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 (ISO 3309 / ITU-T V.42), reflected polynomial.
fn crc32(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (POLY & mask);
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FileHeader {
    magic: [u8; 4],
    format_version: u32,
    embedding_dim: u32,
    max_memory_slots: u32,
    slot_count: u32,
    payload_len: u64,
    checksum: u32,
}

/// Everything a state needs to resume: counters, clock, and slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StateImage<'a> {
    pub cumulative_age: f64,
    pub total_updates: u64,
    pub total_reinforcements: u64,
    pub next_slot_id: u64,
    pub last_touched: Option<SlotId>,
    pub slots: Cow<'a, [Slot]>,
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

/// Write `image` to `path` atomically.
pub(crate) fn save(path: &Path, image: &StateImage<'_>, config: &MindConfig) -> Result<()> {
    let start = Instant::now();

    let payload = bincode::serialize(image).map_err(|e| MindError::Serialization(e.to_string()))?;
    let header = FileHeader {
        magic: MAGIC,
        format_version: FORMAT_VERSION,
        embedding_dim: narrow(config.memory.embedding_dim, "embedding_dim")?,
        max_memory_slots: narrow(config.memory.max_memory_slots, "max_memory_slots")?,
        slot_count: narrow(image.slots.len(), "slot_count")?,
        payload_len: payload.len() as u64,
        checksum: crc32(&payload),
    };
    let header_bytes =
        bincode::serialize(&header).map_err(|e| MindError::Serialization(e.to_string()))?;
    debug_assert_eq!(header_bytes.len(), HEADER_LEN);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&header_bytes)?;
    tmp.write_all(&payload)?;
    tmp.flush()?;
    if config.persistence.sync_on_save {
        tmp.as_file().sync_all()?;
    }
    tmp.persist(path).map_err(|e| MindError::Io(e.error))?;

    info!(
        path = %path.display(),
        slots = image.slots.len(),
        bytes = HEADER_LEN + payload.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "State saved"
    );
    Ok(())
}

/// Read and fully validate the image stored at `path`.
pub(crate) fn load(path: &Path, config: &MindConfig) -> Result<StateImage<'static>> {
    let start = Instant::now();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MindError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let image = decode(&bytes, config).inspect_err(|e| {
        warn!(path = %path.display(), error = %e, "Rejected state file");
    })?;

    info!(
        path = %path.display(),
        slots = image.slots.len(),
        bytes = bytes.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "State loaded"
    );
    Ok(image)
}

fn decode(bytes: &[u8], config: &MindConfig) -> Result<StateImage<'static>> {
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!("file is {} bytes, shorter than the header", bytes.len())));
    }
    let (head, payload) = bytes.split_at(HEADER_LEN);
    let header: FileHeader =
        bincode::deserialize(head).map_err(|e| corrupt(format!("header: {e}")))?;

    if header.magic != MAGIC {
        return Err(corrupt(format!("bad magic {:?}", header.magic)));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {}",
            header.format_version
        )));
    }
    let memory = &config.memory;
    if header.embedding_dim as usize != memory.embedding_dim {
        return Err(corrupt(format!(
            "embedding_dim {} does not match configured {}",
            header.embedding_dim, memory.embedding_dim
        )));
    }
    if header.slot_count as usize > memory.max_memory_slots {
        return Err(corrupt(format!(
            "{} slots exceed capacity {}",
            header.slot_count, memory.max_memory_slots
        )));
    }
    if header.payload_len != payload.len() as u64 {
        return Err(corrupt(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            header.payload_len
        )));
    }
    if config.persistence.checksum_enabled {
        let actual = crc32(payload);
        if actual != header.checksum {
            return Err(corrupt(format!(
                "checksum mismatch: expected {:08x}, got {actual:08x}",
                header.checksum
            )));
        }
    }
    if header.max_memory_slots as usize != memory.max_memory_slots {
        warn!(
            saved = header.max_memory_slots,
            configured = memory.max_memory_slots,
            "Loading state saved under a different capacity"
        );
    }

    let image: StateImage<'static> =
        bincode::deserialize(payload).map_err(|e| corrupt(format!("payload: {e}")))?;
    if image.slots.len() != header.slot_count as usize {
        return Err(corrupt(format!(
            "payload holds {} slots, header says {}",
            image.slots.len(),
            header.slot_count
        )));
    }
    validate_image(&image, memory.embedding_dim)?;
    Ok(image)
}

fn validate_image(image: &StateImage<'_>, dim: usize) -> Result<()> {
    if !(image.cumulative_age.is_finite() && image.cumulative_age >= 0.0) {
        return Err(corrupt("cumulative_age out of range"));
    }
    if image.total_reinforcements > image.total_updates {
        return Err(corrupt("more reinforcements than updates"));
    }

    let mut seen = HashSet::with_capacity(image.slots.len());
    for slot in image.slots.iter() {
        if slot.id.0 >= image.next_slot_id {
            return Err(corrupt(format!("{} was never allocated", slot.id)));
        }
        if !seen.insert(slot.id) {
            return Err(corrupt(format!("{} is stored twice", slot.id)));
        }
        if slot.vector.len() != dim {
            return Err(corrupt(format!("{} has {} components", slot.id, slot.vector.len())));
        }
        if slot.vector.iter().any(|x| !x.is_finite()) {
            return Err(corrupt(format!("{} has a non-finite component", slot.id)));
        }
        let p = &slot.profile;
        let in_range = (MERCY_FLOOR..=1.0).contains(&p.plasticity)
            && p.stability.is_finite()
            && p.stability >= 0.0
            && p.age.is_finite()
            && p.age >= 0.0
            && (0.0..1.0).contains(&p.maturity)
            && p.velocity.is_finite()
            && p.velocity <= 0.0
            && (0.0..=p.age).contains(&p.last_reinforcement_age)
            && p.time_since_reinforcement.is_finite()
            && p.time_since_reinforcement >= 0.0;
        if !in_range {
            return Err(corrupt(format!("{} has an out-of-range profile", slot.id)));
        }
        // Creation is an observation, so reinforcements always trail it.
        if p.total_reinforcements >= p.observations {
            return Err(corrupt(format!(
                "{} has {} reinforcements over {} observations",
                slot.id, p.total_reinforcements, p.observations
            )));
        }
        if !(slot.touched_at.is_finite()
            && slot.touched_at >= 0.0
            && slot.touched_at <= image.cumulative_age)
        {
            return Err(corrupt(format!("{} was touched after the state clock", slot.id)));
        }
    }

    if let Some(id) = image.last_touched {
        if !image.slots.iter().any(|s| s.id == id) {
            return Err(corrupt(format!("last touched {id} is not stored")));
        }
    }
    Ok(())
}

fn narrow(value: usize, field: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| MindError::Serialization(format!("{field} {value} does not fit in u32")))
}

fn corrupt(reason: impl Into<String>) -> MindError {
    MindError::Corrupt(reason.into())
}
