use savepatcher_core::layout::{
    ACTIVE_SLOTS, CATALOGUE, HEADER_MAGIC, PROFILE_FIELDS, PROFILE_NAME, PROFILE_STRIDE,
    SAVE_FILE_SIZE, SAVE_HEADER, SAVE_HEADER_CHECKSUM, SLOT_COUNT, STEAM_ID, profile_field,
};
use savepatcher_core::section::{Section, SectionKind, TextEncoding};

const WORD: Section = Section::integer("word", 2, 4);
const WIDE: Section = Section::integer("wide", 8, 8);
const LABEL: Section = Section::text("label", 0, 6, TextEncoding::Ascii);

#[test]
fn bytes_from_returns_exact_range() {
    let buffer: Vec<u8> = (0u8..16).collect();
    let section = Section::bytes("middle", 4, 3);
    assert_eq!(section.bytes_from(&buffer), &[4, 5, 6]);
    assert_eq!(section.range(), 4..7);
    assert_eq!(section.end(), 7);
}

#[test]
fn cast_integer_reads_little_endian() {
    let mut buffer = vec![0u8; 16];
    buffer[2..6].copy_from_slice(&[0x78, 0x56, 0x34, 0x12]);
    assert_eq!(WORD.cast_integer::<u32>(&buffer), 0x1234_5678);
}

#[test]
fn write_then_cast_reproduces_value() {
    let mut buffer = vec![0xAAu8; 16];
    for value in [0u64, 1, 1000, 2000, 76_561_198_000_000_000, u64::MAX] {
        WIDE.write_integer(&mut buffer, value);
        assert_eq!(WIDE.cast_integer::<u64>(&buffer), value);
    }
    assert_eq!(&buffer[..8], &[0xAA; 8]);
}

#[test]
fn replace_only_touches_its_range() {
    let mut buffer = vec![0u8; 16];
    WORD.replace(&mut buffer, &[1, 2, 3, 4]);
    assert_eq!(buffer[..2], [0, 0]);
    assert_eq!(buffer[2..6], [1, 2, 3, 4]);
    assert!(buffer[6..].iter().all(|&b| b == 0));
}

#[test]
fn chars_from_trims_nul_padding() {
    let mut buffer = vec![0u8; 16];
    buffer[..3].copy_from_slice(b"BND");
    assert_eq!(LABEL.chars_from(&buffer), "BND");
}

#[test]
fn chars_from_decodes_utf16_names() {
    let name = Section::text("name", 0, 8, TextEncoding::Utf16Le);
    let mut buffer = vec![0u8; 8];
    for (i, unit) in "Mél".encode_utf16().enumerate() {
        buffer[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    assert_eq!(name.chars_from(&buffer), "Mél");
}

#[test]
#[should_panic(expected = "out of bounds")]
fn bytes_from_panics_past_end_of_buffer() {
    let buffer = vec![0u8; 4];
    WORD.bytes_from(&buffer);
}

#[test]
#[should_panic(expected = "must be 4 bytes")]
fn replace_rejects_wrong_length() {
    let mut buffer = vec![0u8; 16];
    WORD.replace(&mut buffer, &[1, 2, 3]);
}

#[test]
#[should_panic(expected = "cannot use it as a 8-byte integer")]
fn cast_integer_rejects_width_mismatch() {
    let buffer = vec![0u8; 16];
    let _: u64 = WORD.cast_integer(&buffer);
}

#[test]
fn shifted_keeps_name_and_width() {
    let moved = PROFILE_NAME.shifted(PROFILE_STRIDE);
    assert_eq!(moved.name, PROFILE_NAME.name);
    assert_eq!(moved.len, PROFILE_NAME.len);
    assert_eq!(moved.offset, PROFILE_NAME.offset + PROFILE_STRIDE);
    assert_eq!(profile_field(PROFILE_NAME, 1), moved);
}

#[test]
#[should_panic(expected = "slot 10 out of range")]
fn profile_field_rejects_unknown_slot() {
    profile_field(PROFILE_NAME, SLOT_COUNT);
}

#[test]
fn catalogue_fits_inside_save_image() {
    for section in CATALOGUE {
        assert!(section.fits(SAVE_FILE_SIZE), "{} does not fit", section.name);
    }
    for field in PROFILE_FIELDS {
        for slot in 0..SLOT_COUNT {
            assert!(profile_field(*field, slot).fits(SAVE_FILE_SIZE));
        }
    }
}

#[test]
fn catalogue_kinds_match_accessors() {
    assert_eq!(HEADER_MAGIC.kind, SectionKind::Text(TextEncoding::Ascii));
    assert_eq!(STEAM_ID.kind, SectionKind::Integer);
    assert_eq!(STEAM_ID.len, 8);
    assert_eq!(SAVE_HEADER_CHECKSUM.len, 16);
    assert_eq!(ACTIVE_SLOTS.len, SLOT_COUNT);
}

#[test]
fn identity_and_slot_flags_live_inside_checksummed_region() {
    let header = SAVE_HEADER.range();
    assert!(header.contains(&STEAM_ID.offset));
    assert!(header.contains(&(STEAM_ID.end() - 1)));
    assert!(header.contains(&ACTIVE_SLOTS.offset));
    assert!(!header.contains(&SAVE_HEADER_CHECKSUM.offset));
}
