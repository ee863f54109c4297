//! End-to-end import scenarios: a synthetic byte stream standing in for a
//! real stack file, run through the public `StackImporter` API and
//! checked against the files it writes.

use std::io::Cursor;

use stackimport::config::Config;
use stackimport::import::StackImporter;

fn block(type_tag: &[u8; 4], id: i32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&((payload.len() + 12) as u32).to_be_bytes());
    out.extend_from_slice(type_tag);
    out.extend_from_slice(&id.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn tail() -> Vec<u8> {
    block(b"TAIL", -1, &[])
}

fn stak_payload(font_table_id: i32, style_table_id: i32, list_block_id: i32) -> Vec<u8> {
    let mut bytes = vec![0u8; 1600];
    bytes[32..36].copy_from_slice(&1i32.to_be_bytes()); // card_count
    bytes[36..40].copy_from_slice(&500i32.to_be_bytes()); // first_card_id
    bytes[40..44].copy_from_slice(&list_block_id.to_be_bytes());
    bytes[420..424].copy_from_slice(&font_table_id.to_be_bytes());
    bytes[424..428].copy_from_slice(&style_table_id.to_be_bytes());
    bytes
}

fn ftbl_payload(font_id: i16, name: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; 12];
    bytes[6..8].copy_from_slice(&1i16.to_be_bytes());
    bytes.extend_from_slice(&font_id.to_be_bytes());
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes
}

fn stbl_payload(style_id: i16, font_id: i16, flags: i16, size: i16) -> Vec<u8> {
    let mut bytes = vec![0u8; 14];
    bytes[4..8].copy_from_slice(&1i32.to_be_bytes());
    let mut rec = vec![0u8; 24];
    rec[0..2].copy_from_slice(&style_id.to_be_bytes());
    rec[10..12].copy_from_slice(&font_id.to_be_bytes());
    rec[12..14].copy_from_slice(&flags.to_be_bytes());
    rec[14..16].copy_from_slice(&size.to_be_bytes());
    bytes.extend_from_slice(&rec);
    bytes
}

fn part_bytes(id: i16, flags_and_type: u16, name: &str) -> Vec<u8> {
    let mut rec = vec![0u8; 30];
    rec[2..4].copy_from_slice(&id.to_be_bytes());
    rec[4..6].copy_from_slice(&flags_and_type.to_be_bytes());
    rec.extend_from_slice(name.as_bytes());
    rec.push(0); // name NUL
    rec.push(0); // script NUL (empty)
    if rec.len() % 2 != 0 {
        rec.push(0);
    }
    let len = rec.len() as i16;
    rec[0..2].copy_from_slice(&len.to_be_bytes());
    rec
}

fn bkgd_payload(parts: &[Vec<u8>], name: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; 8];
    bytes.extend_from_slice(&0i16.to_be_bytes()); // flags
    bytes.extend(vec![0u8; 14]); // fill
    bytes.extend_from_slice(&(parts.len() as i16).to_be_bytes());
    bytes.extend(vec![0u8; 6]);
    bytes.extend_from_slice(&0i16.to_be_bytes()); // num_contents
    bytes.extend(vec![0u8; 4]);
    for p in parts {
        bytes.extend_from_slice(p);
    }
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    bytes.push(0); // empty script
    bytes
}

fn card_payload(owner: i32, content_part_id: i16, text: &str, name: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; 8];
    bytes.extend_from_slice(&0i16.to_be_bytes()); // flags
    bytes.extend(vec![0u8; 14]); // fill
    bytes.extend_from_slice(&owner.to_be_bytes());
    bytes.extend_from_slice(&0i16.to_be_bytes()); // num_parts
    bytes.extend(vec![0u8; 6]);
    bytes.extend_from_slice(&1i16.to_be_bytes()); // num_contents
    bytes.extend(vec![0u8; 4]);

    let body_len = 1 + text.len(); // leading byte the decoder drops on render
    bytes.extend_from_slice(&(-content_part_id).to_be_bytes());
    bytes.extend_from_slice(&(body_len as u16).to_be_bytes());
    bytes.push(0);
    bytes.extend_from_slice(text.as_bytes());
    if body_len % 2 != 0 {
        bytes.push(0);
    }

    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    bytes.push(0); // empty script
    bytes
}

fn list_payload(stride: i16, page_table_ids: &[i32]) -> Vec<u8> {
    let mut bytes = vec![0u8; 4];
    bytes.extend_from_slice(&(page_table_ids.len() as i32).to_be_bytes());
    bytes.extend(vec![0u8; 8]);
    bytes.extend_from_slice(&stride.to_be_bytes());
    bytes.extend(vec![0u8; 16]);
    for id in page_table_ids {
        bytes.extend(vec![0u8; 2]);
        bytes.extend_from_slice(&id.to_be_bytes());
    }
    bytes
}

fn page_payload(stride: usize, entries: &[(i32, u8)]) -> Vec<u8> {
    let mut bytes = vec![0u8; 12];
    for (card_id, flags) in entries {
        let mut rec = vec![0u8; stride];
        rec[0..4].copy_from_slice(&card_id.to_be_bytes());
        rec[4] = *flags;
        bytes.extend_from_slice(&rec);
    }
    bytes.extend(vec![0u8; stride]); // zero card_id terminator
    bytes
}

fn build_stack_file() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(block(b"STAK", -1, &stak_payload(1, 1, 900)));
    bytes.extend(block(b"FTBL", 1, &ftbl_payload(5, "Geneva")));
    bytes.extend(block(b"STBL", 1, &stbl_payload(7, 5, 0x0300, 12)));
    let button = part_bytes(42, 1 << 8, "OK");
    bytes.extend(block(b"BKGD", 100, &bkgd_payload(&[button], "Home")));
    bytes.extend(block(b"CARD", 500, &card_payload(100, 42, "Hello", "MyCard")));
    bytes.extend(block(b"LIST", 900, &list_payload(12, &[950])));
    bytes.extend(block(b"PAGE", 950, &page_payload(12, &[(500, 0x10)])));
    bytes.extend(tail());
    bytes
}

#[test]
fn imports_fonts_styles_background_and_card() {
    let dir = std::env::temp_dir().join(format!("stackimport-e2e-{}", std::process::id()));
    let importer = StackImporter::new(Config::default());
    let warnings = importer.import(Cursor::new(build_stack_file()), &dir).unwrap();
    assert_eq!(warnings, 0);

    let project = std::fs::read_to_string(dir.join("project.xml")).unwrap();
    assert!(project.contains("Geneva"));
    assert!(project.contains("PAT_1.pbm"));

    let stylesheet = std::fs::read_to_string(dir.join("stylesheet_1.css")).unwrap();
    assert!(stylesheet.contains(".style7"));
    assert!(stylesheet.contains("font-weight: bold;"));

    let background = std::fs::read_to_string(dir.join("background_100.xml")).unwrap();
    assert!(background.contains("Home"));
    assert!(background.contains("kind=\"button\""));
    assert!(background.contains("OK"));

    let card = std::fs::read_to_string(dir.join("card_500.xml")).unwrap();
    assert!(card.contains("MyCard"));
    assert!(card.contains("Hello"));
    assert!(card.contains("marked><true"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn dump_raw_blocks_writes_sidecar_files() {
    let dir = std::env::temp_dir().join(format!("stackimport-e2e-raw-{}", std::process::id()));
    let config = Config { dump_raw_blocks: true, ..Config::default() };
    let importer = StackImporter::new(config);
    importer.import(Cursor::new(build_stack_file()), &dir).unwrap();

    assert!(dir.join("STAK_-1.data").exists());
    assert!(dir.join("CARD_500.data").exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_list_block_referenced_by_stak_is_fatal() {
    let dir = std::env::temp_dir().join(format!("stackimport-e2e-nolist-{}", std::process::id()));
    let mut bytes = Vec::new();
    bytes.extend(block(b"STAK", -1, &stak_payload(1, 1, 900)));
    bytes.extend(block(b"FTBL", 1, &ftbl_payload(5, "Geneva")));
    bytes.extend(block(b"STBL", 1, &stbl_payload(7, 5, 0x0300, 12)));
    bytes.extend(tail());

    let importer = StackImporter::new(Config::default());
    assert!(importer.import(Cursor::new(bytes), &dir).is_err());
    assert!(!dir.join("project.xml").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_ftbl_block_referenced_by_stak_is_fatal() {
    let dir = std::env::temp_dir().join(format!("stackimport-e2e-noftbl-{}", std::process::id()));
    let mut bytes = Vec::new();
    bytes.extend(block(b"STAK", -1, &stak_payload(1, 1, 900)));
    bytes.extend(tail());

    let importer = StackImporter::new(Config::default());
    assert!(importer.import(Cursor::new(bytes), &dir).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
