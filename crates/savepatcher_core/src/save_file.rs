use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::checksum::{format_hex, md5_digest};
use crate::error::{CoreError, CoreErrorCode};
use crate::layout::{
    ACTIVE_FLAG, ACTIVE_SLOTS, CATALOGUE, HEADER_MAGIC, MAGIC, PROFILE_FIELDS, PROFILE_LEVEL,
    PROFILE_NAME, PROFILE_SECONDS_PLAYED, SAVE_FILE_SIZE, SAVE_HEADER, SAVE_HEADER_CHECKSUM,
    STEAM_ID, profile_field,
};
use crate::section::Section;

/// Which copy of the save image an accessor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buffer {
    Original,
    #[default]
    Patched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    Loaded,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub name: String,
    pub level: u32,
    pub seconds_played: u32,
    pub time_played: String,
    pub active_slot: usize,
    pub steam_id: u64,
    pub checksum: String,
    pub checksum_valid: bool,
}

/// A loaded save image plus the working copy that collects edits.
///
/// `original` is never written after construction. Mutations go to
/// `patched` through the section catalogue, so both buffers always keep
/// `SAVE_FILE_SIZE` bytes.
#[derive(Debug, Clone)]
pub struct SaveFile {
    original: Vec<u8>,
    patched: Vec<u8>,
    active_slot: usize,
}

impl SaveFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("could not open file '{}': {e}", path.display()),
            )
        })?;
        Self::with_label(bytes, &path.display().to_string())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CoreError> {
        Self::with_label(bytes, "input data")
    }

    fn with_label(bytes: Vec<u8>, label: &str) -> Result<Self, CoreError> {
        validate_data(&bytes, label)?;
        let active_slot = active_slot_index(&bytes)?;
        debug!("loaded {label}: {} bytes, active slot {active_slot}", bytes.len());

        let patched = bytes.clone();
        Ok(Self {
            original: bytes,
            patched,
            active_slot,
        })
    }

    pub fn data(&self, view: Buffer) -> &[u8] {
        match view {
            Buffer::Original => &self.original,
            Buffer::Patched => &self.patched,
        }
    }

    pub fn state(&self) -> SaveState {
        if self.patched == self.original {
            SaveState::Loaded
        } else {
            SaveState::Modified
        }
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn checksum(&self) -> String {
        self.checksum_in(Buffer::Patched)
    }

    pub fn checksum_in(&self, view: Buffer) -> String {
        format_hex(SAVE_HEADER_CHECKSUM.bytes_from(self.data(view)))
    }

    /// Whether the stored checksum matches the MD5 of the save header.
    pub fn checksum_is_valid(&self) -> bool {
        self.checksum_is_valid_in(Buffer::Patched)
    }

    pub fn checksum_is_valid_in(&self, view: Buffer) -> bool {
        let data = self.data(view);
        SAVE_HEADER_CHECKSUM.bytes_from(data) == md5_digest(SAVE_HEADER.bytes_from(data))
    }

    pub fn name(&self) -> String {
        self.name_in(Buffer::Patched)
    }

    pub fn name_in(&self, view: Buffer) -> String {
        self.profile(PROFILE_NAME).chars_from(self.data(view))
    }

    pub fn level(&self) -> u32 {
        self.level_in(Buffer::Patched)
    }

    pub fn level_in(&self, view: Buffer) -> u32 {
        self.profile(PROFILE_LEVEL).cast_integer(self.data(view))
    }

    pub fn seconds_played_in(&self, view: Buffer) -> u32 {
        self.profile(PROFILE_SECONDS_PLAYED)
            .cast_integer(self.data(view))
    }

    pub fn time_played(&self) -> String {
        self.time_played_in(Buffer::Patched)
    }

    pub fn time_played_in(&self, view: Buffer) -> String {
        format_time_played(self.seconds_played_in(view))
    }

    pub fn steam_id(&self) -> u64 {
        self.steam_id_in(Buffer::Patched)
    }

    pub fn steam_id_in(&self, view: Buffer) -> u64 {
        STEAM_ID.cast_integer(self.data(view))
    }

    pub fn summary(&self) -> SaveSummary {
        self.summary_in(Buffer::Patched)
    }

    pub fn summary_in(&self, view: Buffer) -> SaveSummary {
        let seconds_played = self.seconds_played_in(view);
        SaveSummary {
            name: self.name_in(view),
            level: self.level_in(view),
            seconds_played,
            time_played: format_time_played(seconds_played),
            active_slot: self.active_slot,
            steam_id: self.steam_id_in(view),
            checksum: self.checksum_in(view),
            checksum_valid: self.checksum_is_valid_in(view),
        }
    }

    /// Recompute the save header checksum into the working copy.
    ///
    /// Must run after every other mutation: any later write inside the
    /// save header invalidates it again. Fails with `AlreadyCorrect` when
    /// the stored checksum already matches.
    pub fn recalculate_checksum(&mut self) -> Result<String, CoreError> {
        let digest = md5_digest(SAVE_HEADER.bytes_from(&self.patched));
        let digest_hex = format_hex(&digest);
        if self.checksum() == digest_hex {
            return Err(CoreError::new(
                CoreErrorCode::AlreadyCorrect,
                "save header checksum is already correct",
            ));
        }

        SAVE_HEADER_CHECKSUM.replace(&mut self.patched, &digest);
        info!("save header checksum set to {digest_hex}");
        Ok(digest_hex)
    }

    pub fn replace_steam_id(&mut self, new_id: u64) -> Result<(), CoreError> {
        let current = self.steam_id();
        if current == new_id {
            return Err(CoreError::new(
                CoreErrorCode::AlreadyCorrect,
                format!("steam id is already {new_id}"),
            ));
        }

        STEAM_ID.write_integer(&mut self.patched, new_id);
        info!("steam id changed from {current} to {new_id}");
        Ok(())
    }

    /// Catalogue and active-slot profile sections whose bytes differ
    /// between the original and the working copy.
    pub fn changed_sections(&self) -> Vec<Section> {
        CATALOGUE
            .iter()
            .copied()
            .chain(PROFILE_FIELDS.iter().map(|&field| self.profile(field)))
            .filter(|section| {
                section.bytes_from(&self.original) != section.bytes_from(&self.patched)
            })
            .collect()
    }

    pub fn to_bytes_modified(&self) -> Result<&[u8], CoreError> {
        validate_data(&self.patched, "generated data")?;
        Ok(&self.patched)
    }

    /// Validate the working copy, then write it to `path` in one piece.
    ///
    /// The bytes go to a temporary file next to `path` that replaces it
    /// only once fully written, so `path` is never left truncated. Nothing
    /// is created when validation fails.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = self.to_bytes_modified()?;

        let io_error = |e: std::io::Error| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("could not write file '{}': {e}", path.display()),
            )
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
        file.write_all(bytes).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(path).map_err(|e| io_error(e.error))?;

        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn profile(&self, field: Section) -> Section {
        profile_field(field, self.active_slot)
    }
}

/// Reject anything that is not a full-size image starting with `MAGIC`.
pub fn validate_data(data: &[u8], label: &str) -> Result<(), CoreError> {
    if data.len() != SAVE_FILE_SIZE {
        debug!(
            "{label} rejected: {} bytes, expected {SAVE_FILE_SIZE}",
            data.len()
        );
        return Err(not_a_save(label));
    }
    let magic = HEADER_MAGIC.chars_from(data);
    if magic != MAGIC {
        debug!("{label} rejected: magic {magic:?}, expected {MAGIC:?}");
        return Err(not_a_save(label));
    }
    Ok(())
}

fn not_a_save(label: &str) -> CoreError {
    CoreError::new(
        CoreErrorCode::Format,
        format!("{label} is not a valid Elden Ring save file"),
    )
}

/// Index of the first slot flagged as in use. `data` must already have
/// passed `validate_data`.
pub fn active_slot_index(data: &[u8]) -> Result<usize, CoreError> {
    ACTIVE_SLOTS
        .bytes_from(data)
        .iter()
        .position(|&flag| flag == ACTIVE_FLAG)
        .ok_or_else(|| CoreError::new(CoreErrorCode::NotFound, "could not find active slot index"))
}

/// `HH:MM:SS`; hours keep counting past a day.
pub fn format_time_played(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
