//! `BKGD` / `CARD` - layer header, parts, and contents.

use std::collections::{HashMap, HashSet};

use crate::buffer::ByteBuffer;
use crate::error::{BlockRef, Error, Result};
use crate::schema::enums::{AddColorKind, ButtonStyle, FieldStyle, TextAlign};
use crate::schema::flags::{ButtonFlags, FieldFlags, LayerFlags, MoreFlags};

pub const BKGD: [u8; 4] = *b"BKGD";
pub const CARD: [u8; 4] = *b"CARD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Button,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

/// The button/field-specific low-byte flags, pre-split so the emitter
/// doesn't need to know which kind it's looking at.
#[derive(Debug, Clone, Copy)]
pub enum PartLowFlags {
    Button(ButtonFlags),
    Field(FieldFlags),
}

#[derive(Debug, Clone)]
pub struct Part {
    pub id: i16,
    pub kind: PartKind,
    pub visible: bool,
    pub low_flags: PartLowFlags,
    pub rect: Rect,
    pub more_flags: MoreFlags,
    pub title_width: i16,
    pub icon_id: i16,
    pub text_align: TextAlign,
    pub text_font_id: i16,
    pub text_size: i16,
    pub text_style_flags: i16,
    pub text_height: i16,
    pub name: String,
    pub script: String,
}

impl Part {
    pub fn style_code(&self) -> u8 {
        self.more_flags.style()
    }

    pub fn button_style(&self) -> Option<ButtonStyle> {
        matches!(self.kind, PartKind::Button)
            .then(|| ButtonStyle::try_from(self.style_code()).ok())
            .flatten()
    }

    pub fn field_style(&self) -> Option<FieldStyle> {
        matches!(self.kind, PartKind::Field)
            .then(|| FieldStyle::try_from(self.style_code()).ok())
            .flatten()
    }

    pub fn family(&self) -> u8 {
        self.more_flags.family()
    }

    pub fn auto_highlight(&self) -> bool {
        matches!(self.kind, PartKind::Button) && self.more_flags.auto_highlight(self.family())
    }

    /// Field parts with `icon_id > 0` repurpose (icon_id, title_width) as a
    /// first/last selected-line range; popup buttons repurpose `icon_id`
    /// alone as a single selected line.
    pub fn selected_lines(&self) -> Vec<i16> {
        match self.kind {
            PartKind::Field if self.icon_id > 0 => {
                let last = if self.title_width <= 0 { self.icon_id } else { self.title_width };
                (self.icon_id..=last).collect()
            }
            PartKind::Button if self.button_style() == Some(ButtonStyle::Popup) && self.icon_id != 0 => {
                vec![self.icon_id]
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Content {
    Unstyled { text: Vec<u8> },
    Styled { runs: Vec<StyleRun>, text: Vec<u8> },
}

impl Content {
    pub fn text(&self) -> &[u8] {
        match self {
            Self::Unstyled { text } | Self::Styled { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StyleRun {
    pub start_offset: i16,
    pub style_id: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLayer {
    Card,
    Background,
}

#[derive(Debug, Clone)]
pub struct ContentEntry {
    pub layer: ContentLayer,
    pub part_id: i16,
    pub content: Content,
    /// True when this is a background-button content on a card whose text
    /// is the per-card "shared highlight is false" override sentinel.
    pub is_highlight_override: bool,
}

#[derive(Debug, Clone)]
pub enum AddColorRecord {
    Button { id: i16, bevel: i16, rgb: (u16, u16, u16) },
    Field { id: i16, bevel: i16, rgb: (u16, u16, u16) },
    Rectangle { rect: Rect, bevel: i16, rgb: (u16, u16, u16) },
    Picture { rect: Rect, transparent: bool, name: String, is_file: bool },
}

#[derive(Debug, Clone)]
pub struct AddColorEntry {
    pub hidden: bool,
    pub record: AddColorRecord,
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub id: i32,
    pub is_card: bool,
    pub bitmap_id: i32,
    pub flags: LayerFlags,
    pub owner: Option<i32>,
    pub marked: bool,
    pub parts: Vec<Part>,
    pub contents: Vec<ContentEntry>,
    pub name: String,
    pub script: String,
    pub add_colors: Vec<AddColorEntry>,
}

fn read_cstr(data: &ByteBuffer, offs: usize) -> Result<(String, usize)> {
    let (bytes, next) = data.c_string_at(offs);
    Ok((crate::transcode::decode(bytes), next))
}

/// Decodes a single `BKGD`/`CARD` layer. `card_flags` is the byte carried
/// alongside the card id in its `PAGE` entry (bit 4 = marked); ignored for
/// backgrounds. `button_ids` receives every button part id on a background
/// decode, for the caller to register against the owning background id.
/// `background_buttons` is consulted only for cards, to test whether a
/// content targeting a background part is actually a button owned by the
/// card's background (spec.md §4.7's highlight-override sentinel).
pub fn decode(
    block: BlockRef,
    data: &ByteBuffer,
    is_card: bool,
    card_flags: u8,
    add_color_data: Option<&ByteBuffer>,
    background_buttons: Option<&ButtonIdsPerBackground>,
) -> Result<(Layer, Vec<i16>)> {
    let mut offs = 0usize;
    let _filler = data.be_i32(offs)?;
    offs += 4;
    let bitmap_id = data.be_i32(offs)?;
    offs += 4;
    let flags = LayerFlags::from_bits_retain(data.be_u16(offs)? as u16);
    offs += 2;
    offs += 14; // undocumented fill (spec.md §9 open question)

    let mut owner = None;
    let mut marked = false;
    if is_card {
        owner = Some(data.be_i32(offs)?);
        offs += 4;
        marked = card_flags & (1 << 4) != 0;
    }

    let num_parts = data.be_i16(offs)?.max(0) as usize;
    offs += 2;
    offs += 6; // unknown filler
    let num_contents = data.be_i16(offs)?.max(0) as usize;
    offs += 2;
    offs += 4; // unknown filler

    let mut parts = Vec::with_capacity(num_parts);
    let mut button_ids = Vec::new();
    for _ in 0..num_parts {
        let part_start = offs;
        let part_length = data.be_i16(offs)? as usize;
        let id = data.be_i16(offs + 2)?;
        let flags_and_type = data.be_u16(offs + 4)? as i16;
        let part_type = (flags_and_type as u16) >> 8;
        let kind = if part_type == 1 { PartKind::Button } else { PartKind::Field };
        let visible = flags_and_type & (1 << 7) == 0;
        let low_byte = (flags_and_type & 0xff) as u8;
        let low_flags = match kind {
            PartKind::Button => PartLowFlags::Button(ButtonFlags::from_bits_retain(low_byte)),
            PartKind::Field => PartLowFlags::Field(FieldFlags::from_bits_retain(low_byte)),
        };
        let rect = Rect {
            top: data.be_i16(offs + 6)?,
            left: data.be_i16(offs + 8)?,
            bottom: data.be_i16(offs + 10)?,
            right: data.be_i16(offs + 12)?,
        };
        let more_flags = MoreFlags::from_bits_retain(data.be_u16(offs + 14)? as u16);
        let title_width = data.be_i16(offs + 16)?;
        let icon_id = data.be_i16(offs + 18)?;
        let text_align = TextAlign::from_field(data.be_i16(offs + 20)?);
        let text_font_id = data.be_i16(offs + 22)?;
        let text_size = data.be_i16(offs + 24)?;
        let text_style_flags = data.be_i16(offs + 26)?;
        let text_height = data.be_i16(offs + 28)?;

        let (name, after_name) = read_cstr(data, offs + 30)?;
        let (script, _after_script) = read_cstr(data, after_name)?;

        if kind == PartKind::Button && !is_card {
            button_ids.push(id);
        }

        parts.push(Part {
            id,
            kind,
            visible,
            low_flags,
            rect,
            more_flags,
            title_width,
            icon_id,
            text_align,
            text_font_id,
            text_size,
            text_style_flags,
            text_height,
            name,
            script,
        });

        offs = part_start + part_length;
        if offs % 2 != 0 {
            offs += 1;
        }
    }

    let mut contents = Vec::with_capacity(num_contents);
    for _ in 0..num_contents {
        let signed_part_id = data.be_i16(offs)?;
        let part_length = data.be_u16(offs + 2)? as usize;
        let (layer_kind, part_id) = if signed_part_id < 0 {
            (ContentLayer::Card, -signed_part_id)
        } else {
            (ContentLayer::Background, signed_part_id)
        };

        let body_start = offs + 4;
        let first_word = data.be_u16(body_start)?;
        let (styles_bytes, text_bytes) = if first_word > 32767 {
            let styles_length = (first_word - 32768) as usize;
            let styles = data.slice(body_start + 2, styles_length.saturating_sub(2))?;
            let text = data.slice(body_start + styles_length, part_length - styles_length)?;
            (Some(styles), text)
        } else {
            (None, data.slice(body_start, part_length)?)
        };

        let is_highlight_override = is_card
            && layer_kind == ContentLayer::Background
            && text_bytes == [0u8, b'1'].as_slice()
            && owner.is_some_and(|bg_id| background_buttons.is_some_and(|b| b.contains(bg_id, part_id)));

        // The on-disk text buffer's first byte is never rendered; the
        // original walks it starting at offset 1.
        let mut text = text_bytes.get(1..).unwrap_or(&[]).to_vec();
        text.push(0);

        let content = match styles_bytes {
            None => Content::Unstyled { text },
            Some(style_bytes) => {
                let mut runs = Vec::with_capacity(style_bytes.len() / 4);
                let mut p = 0usize;
                while p + 4 <= style_bytes.len() {
                    let start_offset = i16::from_be_bytes([style_bytes[p], style_bytes[p + 1]]);
                    let style_id = i16::from_be_bytes([style_bytes[p + 2], style_bytes[p + 3]]);
                    runs.push(StyleRun { start_offset, style_id });
                    p += 4;
                }
                Content::Styled { runs, text }
            }
        };

        contents.push(ContentEntry { layer: layer_kind, part_id, content, is_highlight_override });

        offs += 4 + part_length;
        if part_length % 2 != 0 {
            offs += 1;
        }
    }

    let (name, after_name) = read_cstr(data, offs)?;
    let (script, _) = read_cstr(data, after_name)?;

    let add_colors = match add_color_data {
        Some(buf) => decode_add_color(block, buf)?,
        None => Vec::new(),
    };

    Ok((
        Layer {
            id: block.id,
            is_card,
            bitmap_id,
            flags,
            owner,
            marked,
            parts,
            contents,
            name,
            script,
            add_colors,
        },
        button_ids,
    ))
}

fn decode_add_color(block: BlockRef, data: &ByteBuffer) -> Result<Vec<AddColorEntry>> {
    let mut out = Vec::new();
    let mut offs = 0usize;
    let len = data.size();
    while offs < len {
        let raw_type = data.byte_at(offs)?;
        let hidden = raw_type & 0x80 != 0;
        let type_byte = raw_type & 0x7f;
        offs += 1;

        let kind = match AddColorKind::try_from(type_byte) {
            Ok(k) => k,
            Err(_) => return Err(Error::UnknownType { block, type_byte }),
        };

        let record = match kind {
            AddColorKind::Button | AddColorKind::Field => {
                let id = data.be_i16(offs)?;
                let bevel = data.be_i16(offs + 2)?;
                let r = data.be_u16(offs + 4)?;
                let g = data.be_u16(offs + 6)?;
                let b = data.be_u16(offs + 8)?;
                offs += 10;
                if kind == AddColorKind::Button {
                    AddColorRecord::Button { id, bevel, rgb: (r, g, b) }
                } else {
                    AddColorRecord::Field { id, bevel, rgb: (r, g, b) }
                }
            }
            AddColorKind::Rectangle => {
                let top = data.be_i16(offs)?;
                let left = data.be_i16(offs + 2)?;
                let bottom = data.be_i16(offs + 4)?;
                let right = data.be_i16(offs + 6)?;
                let bevel = data.be_i16(offs + 8)?;
                let r = data.be_u16(offs + 10)?;
                let g = data.be_u16(offs + 12)?;
                let b = data.be_u16(offs + 14)?;
                offs += 16;
                AddColorRecord::Rectangle { rect: Rect { top, left, bottom, right }, bevel, rgb: (r, g, b) }
            }
            AddColorKind::PictureResource | AddColorKind::PictureFile => {
                let top = data.be_i16(offs)?;
                let left = data.be_i16(offs + 2)?;
                let bottom = data.be_i16(offs + 4)?;
                let right = data.be_i16(offs + 6)?;
                offs += 8;
                let transparent = data.byte_at(offs)? != 0;
                offs += 1;
                let name_len = data.byte_at(offs)? as usize;
                offs += 1;
                let name_bytes = data.slice(offs, name_len)?;
                let name = crate::transcode::decode(name_bytes);
                offs += name_len;
                offs += 1; // filler byte
                AddColorRecord::Picture {
                    rect: Rect { top, left, bottom, right },
                    transparent,
                    name,
                    is_file: kind == AddColorKind::PictureFile,
                }
            }
        };

        out.push(AddColorEntry { hidden, record });
    }
    Ok(out)
}

/// Per-background set of button part ids, populated while decoding
/// backgrounds and consulted while decoding cards.
#[derive(Debug, Default)]
pub struct ButtonIdsPerBackground {
    map: HashMap<i32, HashSet<i16>>,
}

impl ButtonIdsPerBackground {
    pub fn insert(&mut self, background_id: i32, ids: Vec<i16>) {
        self.map.insert(background_id, ids.into_iter().collect());
    }

    pub fn contains(&self, background_id: i32, part_id: i16) -> bool {
        self.map.get(&background_id).is_some_and(|s| s.contains(&part_id))
    }
}
