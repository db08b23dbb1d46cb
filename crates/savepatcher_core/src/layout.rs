//! Fixed section catalogue of an `ER0000.sl2` save image.

use crate::section::{Section, TextEncoding};

pub const SAVE_FILE_SIZE: usize = 0x1BA_03D0;
pub const MAGIC: &str = "BND";
pub const SLOT_COUNT: usize = 10;
/// Distance between two consecutive slot profile records.
pub const PROFILE_STRIDE: usize = 0x24C;
/// Flag value marking a slot as in use.
pub const ACTIVE_FLAG: u8 = 1;

pub const HEADER_MAGIC: Section = Section::text("header magic", 0x0, 3, TextEncoding::Ascii);
pub const SAVE_HEADER_CHECKSUM: Section = Section::bytes("save header checksum", 0x190_03A0, 16);
/// Region covered by `SAVE_HEADER_CHECKSUM`.
pub const SAVE_HEADER: Section = Section::bytes("save header", 0x190_03B0, 0x6_0000);
pub const STEAM_ID: Section = Section::integer("steam id", 0x190_03B4, 8);
pub const ACTIVE_SLOTS: Section = Section::bytes("active slots", 0x190_1D04, SLOT_COUNT);

// Profile fields of slot 0; other slots follow at `PROFILE_STRIDE` intervals.
pub const PROFILE_NAME: Section = Section::text("name", 0x190_1D0E, 32, TextEncoding::Utf16Le);
pub const PROFILE_LEVEL: Section = Section::integer("level", 0x190_1D30, 4);
pub const PROFILE_SECONDS_PLAYED: Section = Section::integer("seconds played", 0x190_1D34, 4);

pub const PROFILE_FIELDS: &[Section] = &[PROFILE_NAME, PROFILE_LEVEL, PROFILE_SECONDS_PLAYED];

/// Single-field sections, in file order. `SAVE_HEADER` is a region that
/// overlaps several of these and is not listed.
pub const CATALOGUE: &[Section] = &[HEADER_MAGIC, SAVE_HEADER_CHECKSUM, STEAM_ID, ACTIVE_SLOTS];

/// `field` relocated into the profile record of `slot`.
pub fn profile_field(field: Section, slot: usize) -> Section {
    assert!(
        slot < SLOT_COUNT,
        "slot {slot} out of range, expected 0..{}",
        SLOT_COUNT - 1
    );
    field.shifted(slot * PROFILE_STRIDE)
}

const _: () = {
    assert!(SAVE_HEADER.fits(SAVE_FILE_SIZE));
    assert!(SAVE_HEADER_CHECKSUM.end() <= SAVE_HEADER.offset);

    let mut i = 0;
    while i < CATALOGUE.len() {
        assert!(CATALOGUE[i].fits(SAVE_FILE_SIZE));
        i += 1;
    }

    let last_slot = (SLOT_COUNT - 1) * PROFILE_STRIDE;
    let mut j = 0;
    while j < PROFILE_FIELDS.len() {
        assert!(PROFILE_FIELDS[j].shifted(last_slot).fits(SAVE_FILE_SIZE));
        j += 1;
    }
};
