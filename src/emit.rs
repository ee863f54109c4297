//! Textual (XML + CSS + PBM) emission. Mirrors the legacy importer's split
//! between the root project document (stack-wide metadata: name, user
//! level, access flags, version history, fonts, patterns) and the stack
//! document proper (card count, the card/list block ids, the protection
//! flags that apply to editing the stack file itself, card size, script).

use std::fmt::Write as _;

use crate::decode::font::FontTable;
use crate::decode::layer::{
    AddColorRecord, ButtonIdsPerBackground, Content, ContentLayer, Layer, Part, PartKind,
};
use crate::decode::stack::Stack;
use crate::decode::style::StyleTable;
use crate::error::BlockRef;
use crate::transcode::{xml_escape_attr, xml_escape_body};

fn attr(name: &str, value: impl std::fmt::Display) -> String {
    format!(" {name}=\"{}\"", xml_escape_attr(&value.to_string()))
}

/// Renders `project.xml`'s body (without the XML prologue/DOCTYPE, which
/// the resolver writes once per file).
pub fn project_xml(
    stack: &Stack,
    fonts: &FontTable,
    styles: &StyleTable,
    ftbl_block: BlockRef,
    stbl_block: BlockRef,
    bmap_comments: &[String],
    media: &[(String, String)],
    emit_comments: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<project name=\"stack\">");
    let _ = writeln!(out, "  <userLevel>{}</userLevel>", stack.user_level);
    let _ = writeln!(out, "  <privateAccess><{}/></privateAccess>", bool_tag(stack.flags.bits() & (1 << 13) != 0));
    let _ = writeln!(out, "  <cantPeek><{}/></cantPeek>", bool_tag(stack.flags.bits() & (1 << 10) != 0));
    let _ = writeln!(out, "  <createdByVersion>HyperCard {}</createdByVersion>", stack.created_by_version.format());
    let _ = writeln!(out, "  <lastCompactedVersion>HyperCard {}</lastCompactedVersion>", stack.last_compacted_version.format());
    let _ = writeln!(out, "  <lastEditedVersion>HyperCard {}</lastEditedVersion>", stack.last_edited_version.format());
    let _ = writeln!(out, "  <firstEditedVersion>HyperCard {}</firstEditedVersion>", stack.first_edited_version.format());
    let _ = writeln!(out, "  <fontTableID>{}</fontTableID>", stack.font_table_id);
    let _ = writeln!(out, "  <styleTableID>{}</styleTableID>", stack.style_table_id);

    if emit_comments {
        let _ = writeln!(out, "  <!-- {ftbl_block} ({} fonts) -->", fonts.names.len());
    }
    for (id, name) in sorted_fonts(fonts) {
        let _ = writeln!(out, "  <font><id>{id}</id><name>{}</name></font>", xml_escape_body(&name));
    }

    if emit_comments {
        let _ = writeln!(out, "  <!-- {stbl_block} ({} styles) -->", styles.styles.len());
    }
    let _ = writeln!(out, "  <stylesheet>stylesheet_{}.css</stylesheet>", stack.style_table_id);

    for (n, pattern) in stack.patterns.iter().enumerate() {
        let n = n + 1; // patterns are numbered 1..=40, spec.md §6
        let _ = writeln!(out, "  <media id=\"PAT_{n}\" type=\"pattern\" src=\"PAT_{n}.pbm\"/>");
        let _ = pattern; // rasterized separately by the resolver via pbm::pattern_bitmap
    }

    if emit_comments {
        for comment in bmap_comments {
            let _ = writeln!(out, "  {comment}");
        }
    }
    for (id, src) in media {
        let _ = writeln!(out, "  <media id=\"{id}\" src=\"{src}\"/>");
    }

    let _ = writeln!(out, "  <stack src=\"stack_-1.xml\"/>");
    let _ = writeln!(out, "</project>");
    out
}

/// The `<!-- 'BMAP' #id (K bytes) -->` decorative comment emitted for
/// every bitmap block the resolver processes.
pub fn bmap_comment(block: BlockRef, byte_len: usize) -> String {
    format!("<!-- {block} ({byte_len} bytes) -->")
}

fn sorted_fonts(fonts: &FontTable) -> Vec<(i16, String)> {
    let mut v: Vec<_> = fonts.names.iter().map(|(id, n)| (*id, n.clone())).collect();
    v.sort_by_key(|(id, _)| *id);
    v
}

fn bool_tag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Renders `stack_-1.xml`'s body.
pub fn stack_xml(stack: &Stack, stack_block: BlockRef) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<stack>");
    let _ = writeln!(out, "  <id>{}</id>", stack_block.id);
    let _ = writeln!(out, "  <cardCount>{}</cardCount>", stack.card_count);
    let _ = writeln!(out, "  <cardID>{}</cardID>", stack.first_card_id);
    let _ = writeln!(out, "  <listID>{}</listID>", stack.list_block_id);
    let _ = writeln!(out, "  <cantModify><{}/></cantModify>", bool_tag(stack.flags.bits() & (1 << 15) != 0));
    let _ = writeln!(out, "  <cantDelete><{}/></cantDelete>", bool_tag(stack.flags.bits() & (1 << 14) != 0));
    let _ = writeln!(out, "  <cantAbort><{}/></cantAbort>", bool_tag(stack.flags.bits() & (1 << 11) != 0));
    let _ = writeln!(out, "  <cardSize><width>{}</width><height>{}</height></cardSize>", stack.card_width, stack.card_height);
    let _ = writeln!(out, "  <script>{}</script>", xml_escape_body(&stack.script));
    let _ = writeln!(out, "</stack>");
    out
}

/// Renders a `background_<id>.xml`/`card_<id>.xml` body.
pub fn layer_xml(layer: &Layer, fonts: &FontTable, button_ids: &ButtonIdsPerBackground, owner_id: Option<i32>) -> String {
    let mut out = String::new();
    let tag = if layer.is_card { "card" } else { "background" };
    out.push_str(&format!("<{tag}{}", attr("id", layer.id)));
    if let Some(owner) = owner_id {
        out.push_str(&attr("background", owner));
    }
    out.push_str(">\n");
    let _ = writeln!(out, "  <name>{}</name>", xml_escape_body(&layer.name));
    let _ = writeln!(out, "  <showPicture><{}/></showPicture>", bool_tag(layer.flags.show_picture()));
    let _ = writeln!(out, "  <cantDelete><{}/></cantDelete>", bool_tag(layer.flags.contains(crate::schema::flags::LayerFlags::CANT_DELETE)));
    let _ = writeln!(out, "  <dontSearch><{}/></dontSearch>", bool_tag(layer.flags.contains(crate::schema::flags::LayerFlags::DONT_SEARCH)));
    if layer.is_card {
        let _ = writeln!(out, "  <marked><{}/></marked>", bool_tag(layer.marked));
    }
    if let Some(bmap) = Some(layer.bitmap_id).filter(|id| *id != 0) {
        let _ = writeln!(out, "  <bitmap id=\"BMAP_{bmap}\" src=\"BMAP_{bmap}.pbm\"/>");
    }
    let _ = writeln!(out, "  <script>{}</script>", xml_escape_body(&layer.script));

    for part in &layer.parts {
        part_xml(&mut out, part, fonts);
    }

    for entry in &layer.contents {
        if entry.is_highlight_override {
            let owner = owner_id.unwrap_or(layer.id);
            let _ = writeln!(
                out,
                "  <content part=\"{}\" layer=\"{}\"><highlight><true/></highlight></content>",
                entry.part_id,
                if entry.layer == ContentLayer::Card { "card" } else { "background" },
            );
            let _ = (owner, button_ids); // the override is keyed by background id at resolve time
            continue;
        }
        content_xml(&mut out, entry.part_id, entry.layer, &entry.content);
    }

    for ac in &layer.add_colors {
        addcolor_xml(&mut out, ac);
    }

    let _ = writeln!(out, "</{tag}>");
    out
}

fn part_xml(out: &mut String, part: &Part, fonts: &FontTable) {
    let kind = if part.kind == PartKind::Button { "button" } else { "field" };
    out.push_str(&format!("  <part kind=\"{kind}\"{}", attr("id", part.id)));
    out.push_str(">\n");
    let _ = writeln!(out, "    <name>{}</name>", xml_escape_body(&part.name));
    let _ = writeln!(out, "    <visible><{}/></visible>", bool_tag(part.visible));
    let _ = writeln!(
        out,
        "    <rect><left>{}</left><top>{}</top><right>{}</right><bottom>{}</bottom></rect>",
        part.rect.left, part.rect.top, part.rect.right, part.rect.bottom
    );
    let style_name = match part.kind {
        PartKind::Button => part.button_style().map(|s| format!("{s:?}")),
        PartKind::Field => part.field_style().map(|s| format!("{s:?}")),
    };
    if let Some(name) = style_name {
        let _ = writeln!(out, "    <style>{name}</style>");
    }
    let _ = writeln!(out, "    <family>{}</family>", part.family());
    if part.kind == PartKind::Button {
        let _ = writeln!(out, "    <autoHighlight><{}/></autoHighlight>", bool_tag(part.auto_highlight()));
    }
    let _ = writeln!(out, "    <textAlign>{}</textAlign>", part.text_align.as_str());
    if part.text_font_id != 0 {
        let _ = writeln!(
            out,
            "    <textFont id=\"{}\">{}</textFont>",
            part.text_font_id,
            xml_escape_body(fonts.name(part.text_font_id))
        );
    }
    let _ = writeln!(out, "    <textSize>{}</textSize>", part.text_size);
    let _ = writeln!(out, "    <textHeight>{}</textHeight>", part.text_height);
    let selected = part.selected_lines();
    if !selected.is_empty() {
        let lines: Vec<String> = selected.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "    <selectedLines>{}</selectedLines>", lines.join(","));
    }
    let _ = writeln!(out, "    <script>{}</script>", xml_escape_body(&part.script));
    out.push_str("  </part>\n");
}

/// Renders one content entry's text, wrapping style runs in `<span
/// class="styleN">` (and group-style runs additionally in `<a href="#"
/// class="group">`), matching the original's render loop starting at the
/// first text offset.
fn content_xml(out: &mut String, part_id: i16, layer: ContentLayer, content: &Content) {
    let layer_attr = if layer == ContentLayer::Card { "card" } else { "background" };
    let _ = write!(out, "  <content part=\"{part_id}\" layer=\"{layer_attr}\">");
    match content {
        Content::Unstyled { text } => {
            out.push_str(&xml_escape_body(&crate::transcode::decode(trim_nul(text))));
        }
        Content::Styled { runs, text } => {
            let body = trim_nul(text);
            for (i, run) in runs.iter().enumerate() {
                let start = run.start_offset.max(0) as usize;
                let end = runs
                    .get(i + 1)
                    .map(|next| next.start_offset.max(0) as usize)
                    .unwrap_or(body.len());
                let slice = body.get(start.min(body.len())..end.min(body.len())).unwrap_or(&[]);
                let _ = write!(out, "<span class=\"style{}\">", run.style_id);
                out.push_str(&xml_escape_body(&crate::transcode::decode(slice)));
                out.push_str("</span>");
            }
        }
    }
    out.push_str("</content>\n");
}

fn trim_nul(text: &[u8]) -> &[u8] {
    match text.last() {
        Some(0) => &text[..text.len() - 1],
        _ => text,
    }
}

fn addcolor_xml(out: &mut String, entry: &crate::decode::layer::AddColorEntry) {
    let hidden = attr("hidden", entry.hidden);
    match &entry.record {
        AddColorRecord::Button { id, bevel, rgb } => {
            let _ = writeln!(out, "  <addColor kind=\"button\"{}{}{}/>", attr("id", id), hidden, rgb_attrs(*rgb, *bevel));
        }
        AddColorRecord::Field { id, bevel, rgb } => {
            let _ = writeln!(out, "  <addColor kind=\"field\"{}{}{}/>", attr("id", id), hidden, rgb_attrs(*rgb, *bevel));
        }
        AddColorRecord::Rectangle { rect, bevel, rgb } => {
            let _ = writeln!(
                out,
                "  <addColor kind=\"rectangle\"{}{} left=\"{}\" top=\"{}\" right=\"{}\" bottom=\"{}\"/>",
                hidden,
                rgb_attrs(*rgb, *bevel),
                rect.left,
                rect.top,
                rect.right,
                rect.bottom
            );
        }
        AddColorRecord::Picture { rect, transparent, name, is_file } => {
            let _ = writeln!(
                out,
                "  <addColor kind=\"picture\"{}{}{} left=\"{}\" top=\"{}\" right=\"{}\" bottom=\"{}\"/>",
                hidden,
                attr("name", name),
                attr("isFile", is_file),
                rect.left,
                rect.top,
                rect.right,
                rect.bottom
            );
            let _ = transparent;
        }
    }
}

fn rgb_attrs((r, g, b): (u16, u16, u16), bevel: i16) -> String {
    format!("{}{}{}{}", attr("bevel", bevel), attr("r", r), attr("g", g), attr("b", b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::stack::NumVersion;
    use crate::schema::flags::StackFlags;

    fn sample_stack() -> Stack {
        Stack {
            card_count: 3,
            first_card_id: 10,
            list_block_id: 20,
            user_level: 5,
            flags: StackFlags::CANT_DELETE,
            created_by_version: NumVersion::from_be_bytes([0x02, 0x20, 0x80, 0x01]),
            last_compacted_version: NumVersion::from_be_bytes([0x02, 0x20, 0x80, 0x01]),
            last_edited_version: NumVersion::from_be_bytes([0x02, 0x20, 0x80, 0x01]),
            first_edited_version: NumVersion::from_be_bytes([0x02, 0x20, 0x80, 0x01]),
            font_table_id: 1,
            style_table_id: 1,
            card_width: 512,
            card_height: 342,
            patterns: vec![[0u8; 8]; 40],
            script: "on openStack\nend openStack".into(),
        }
    }

    #[test]
    fn project_xml_includes_version_and_pattern_media() {
        let fonts = FontTable::default();
        let styles = StyleTable::default();
        let xml = project_xml(
            &sample_stack(),
            &fonts,
            &styles,
            BlockRef::new(*b"FTBL", 1),
            BlockRef::new(*b"STBL", 1),
            &[],
            &[],
            true,
        );
        assert!(xml.contains("HyperCard 2.2v1"));
        assert!(xml.contains("PAT_1.pbm"));
        assert!(xml.contains("PAT_40.pbm"));
        assert!(xml.contains("<!-- 'FTBL' #1"));
    }

    #[test]
    fn stack_xml_reports_protection_flags() {
        let xml = stack_xml(&sample_stack(), BlockRef::new(*b"STAK", -1));
        assert!(xml.contains("<cantDelete><true/></cantDelete>"));
        assert!(xml.contains("<cantModify><false/></cantModify>"));
        assert!(xml.contains("<cardID>10</cardID>"));
    }

    #[test]
    fn content_xml_escapes_body_text() {
        let mut out = String::new();
        content_xml(&mut out, 1, ContentLayer::Card, &Content::Unstyled { text: b"a<b\0".to_vec() });
        assert!(out.contains("a&lt;b"));
    }
}
