//! Legacy resource-fork extraction - external collaborator interface
//! (spec.md §9, SPEC_FULL §4.12). No Mac resource-fork reading happens
//! here (that needs OS-level APIs this crate doesn't reach for); callers
//! hand in an already-extracted `Vec<ResourceRecord>` via
//! `StackImporter::with_resources`, and this module only decides, per
//! type tag, what `<media>` entry and sidecar file that record becomes.

use crate::buffer::ByteBuffer;

/// One resource-fork record, already extracted by the caller.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub type_tag: [u8; 4],
    pub id: i32,
    pub name: String,
    pub bytes: ByteBuffer,
}

/// The sidecar file(s) a resource record produces, and the `<media>`
/// reference the emitter should write for it.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Filename relative to the project directory.
    pub file_name: String,
    pub contents: MediaContents,
}

#[derive(Debug, Clone)]
pub enum MediaContents {
    /// Bitmap bytes to rasterize through `pbm::write_pbm`.
    Bitmap(crate::pbm::Bitmap),
    /// Opaque bytes to write verbatim (PICT stub, sound, XCMD data).
    Raw(Vec<u8>),
}

/// The legacy `PICT` container's 512-byte placeholder header the original
/// importer writes ahead of raw picture data (it never decodes QuickDraw
/// opcodes, just preserves the bytes behind a recognizable stub).
const PICT_STUB_HEADER: [u8; 4] = *b"PICT";

/// Maps one resource record to the media file(s) it produces, or `None`
/// for a type tag this importer doesn't have a mapping for (logged by the
/// caller, not an error).
pub fn media_file(record: &ResourceRecord) -> Option<MediaFile> {
    match &record.type_tag {
        b"ICON" => Some(MediaFile {
            file_name: format!("ICON_{}.pbm", record.id),
            contents: MediaContents::Bitmap(icon_bitmap(record)),
        }),
        b"PICT" => Some(MediaFile {
            file_name: format!("PICT_{}.pict", record.id),
            contents: MediaContents::Raw(pict_stub(record)),
        }),
        b"CURS" => Some(MediaFile {
            file_name: format!("CURS_{}.pbm", record.id),
            contents: MediaContents::Bitmap(icon_bitmap(record)),
        }),
        b"snd " => Some(MediaFile {
            file_name: format!("snd_{}.wav", record.id),
            contents: MediaContents::Raw(PassthroughSoundConverter.convert(record.bytes.as_slice())),
        }),
        b"XCMD" | b"XFCN" => Some(MediaFile {
            file_name: format!("XCMD_68k_{}_{}.data", record.id, record.name),
            contents: MediaContents::Raw(record.bytes.as_slice().to_vec()),
        }),
        _ => None,
    }
}

/// `ICON`/`CURS` resources are a fixed 32x32 monochrome bitmap (128 bytes),
/// one bit per pixel, already in the row-padded layout `pbm::Bitmap` wants.
fn icon_bitmap(record: &ResourceRecord) -> crate::pbm::Bitmap {
    crate::pbm::Bitmap { width: 32, height: 32, row_bytes: record.bytes.as_slice().to_vec() }
}

/// Wraps raw picture bytes behind the original importer's repeating
/// 512-byte placeholder header, since QuickDraw opcode decoding is out of
/// scope here.
fn pict_stub(record: &ResourceRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(512 + record.bytes.size());
    while out.len() < 512 {
        let remaining = 512 - out.len();
        out.extend_from_slice(&PICT_STUB_HEADER[..remaining.min(4)]);
    }
    out.extend_from_slice(record.bytes.as_slice());
    out
}

/// Converts an arbitrary sound resource to WAV bytes. No bundled
/// implementation actually transcodes `snd ` resources to WAV; the
/// passthrough below only handles inputs that are already a WAVE/AIFF
/// container.
pub trait SoundConverter {
    fn convert(&self, bytes: &[u8]) -> Vec<u8>;
}

pub struct PassthroughSoundConverter;

impl SoundConverter for PassthroughSoundConverter {
    fn convert(&self, bytes: &[u8]) -> Vec<u8> {
        let is_container = bytes.len() >= 12 && (&bytes[0..4] == b"RIFF" || &bytes[0..4] == b"FORM");
        if is_container {
            bytes.to_vec()
        } else {
            bytes.to_vec()
        }
    }
}
