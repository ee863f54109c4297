//! Resolver/orchestrator: ties the block index and per-block decoders
//! together into the on-disk project directory. Mirrors the legacy
//! importer's single `LoadFile` pass: block scan, then `STAK`/`FTBL`/
//! `STBL` up front, then one pass over every block handling `BMAP`/`BKGD`
//! inline, and only then `LIST`/`PAGE`/`CARD` (since the page stride is
//! only known once `LIST`'s header is read).

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::block::BlockIndex;
use crate::config::Config;
use crate::decode::font;
use crate::decode::layer::{self, ButtonIdsPerBackground};
use crate::decode::list;
use crate::decode::stack::{self, STACK_ID};
use crate::decode::style;
use crate::emit;
use crate::error::{BlockRef, Error, Result};
use crate::pbm;
use crate::progress::Progress;
use crate::resource::{self, ResourceRecord};
use crate::woba::{BitmapDecoder, WobaDecoder};

pub struct StackImporter {
    config: Config,
    resources: Vec<ResourceRecord>,
}

impl StackImporter {
    pub fn new(config: Config) -> Self {
        Self { config, resources: Vec::new() }
    }

    /// Attaches already-extracted legacy resource-fork records (spec.md
    /// §9, SPEC_FULL §4.12); this crate never reads a Mac resource fork
    /// itself.
    pub fn with_resources(mut self, resources: Vec<ResourceRecord>) -> Self {
        self.resources = resources;
        self
    }

    /// Imports `reader`'s block stream into `<out_dir>`, which must not
    /// already exist as a non-directory. Returns the number of warnings
    /// emitted (non-fatal decode issues, matching spec.md §7's "warn, keep
    /// going" policy for non-critical cross-references).
    pub fn import(&self, reader: impl Read, out_dir: &Path) -> Result<usize> {
        let mut progress = Progress::new(self.config.quiet_status, self.config.quiet_progress);
        let mut warnings = 0usize;

        let (index, block_count) = BlockIndex::build(reader)?;
        progress.status(format!("Found {block_count} blocks in file."));
        progress.set_max(block_count + self.resources.len());
        progress.announce();

        fs::create_dir_all(out_dir)?;

        let stak_data = index
            .get(&stack::STAK, STACK_ID)
            .ok_or_else(|| Error::MissingBlock { from: BlockRef::new(stack::STAK, STACK_ID), wanted: stack::STAK, wanted_id: STACK_ID })?;
        let stack = stack::decode(stak_data)?;
        progress.advance();

        let stack_block = BlockRef::new(stack::STAK, STACK_ID);
        let ftbl_block = BlockRef::new(font::FTBL, stack.font_table_id);
        let fonts = match index.get(&font::FTBL, stack.font_table_id) {
            Some(data) => font::decode(data)?,
            None => {
                return Err(Error::MissingBlock { from: stack_block, wanted: font::FTBL, wanted_id: stack.font_table_id });
            }
        };
        progress.advance();

        let stbl_block = BlockRef::new(style::STBL, stack.style_table_id);
        let styles = match index.get(&style::STBL, stack.style_table_id) {
            Some(data) => style::decode(data, &fonts)?,
            None => {
                return Err(Error::MissingBlock { from: stack_block, wanted: style::STBL, wanted_id: stack.style_table_id });
            }
        };
        progress.advance();

        fs::write(out_dir.join(format!("stylesheet_{}.css", stack.style_table_id)), style::stylesheet(&styles))?;
        for (n, pattern) in stack.patterns.iter().enumerate() {
            let n = n + 1; // patterns are numbered 1..=40, spec.md §6
            let mut file = fs::File::create(out_dir.join(format!("PAT_{n}.pbm")))?;
            pbm::write_pbm(&mut file, &pbm::pattern_bitmap(pattern))?;
        }

        let mut bmap_comments = Vec::new();
        let mut button_ids = ButtonIdsPerBackground::default();

        for (key, data) in index.iter_all() {
            match &key.type_tag {
                b"BMAP" => {
                    let block = BlockRef::new(key.type_tag, key.id);
                    if self.config.decode_graphics {
                        match WobaDecoder.decode(block, data) {
                            Ok(bitmap) => {
                                let mut file = fs::File::create(out_dir.join(format!("BMAP_{}.pbm", key.id)))?;
                                pbm::write_pbm(&mut file, &bitmap)?;
                            }
                            Err(_) => {
                                warnings += 1;
                                data.to_file(&out_dir.join(format!("BMAP_{}.raw", key.id)))?;
                            }
                        }
                    } else {
                        data.to_file(&out_dir.join(format!("BMAP_{}.raw", key.id)))?;
                    }
                    if self.config.emit_comments {
                        bmap_comments.push(emit::bmap_comment(block, data.size()));
                    }
                    progress.advance();
                }
                b"BKGD" => {
                    let block = BlockRef::new(key.type_tag, key.id);
                    let (layer, bg_button_ids) = layer::decode(block, data, false, 0, None, None)?;
                    button_ids.insert(key.id, bg_button_ids);
                    let xml = emit::layer_xml(&layer, &fonts, &button_ids, None);
                    fs::write(out_dir.join(format!("background_{}.xml", key.id)), xml)?;
                    progress.advance();
                }
                b"CARD" | b"LIST" | b"PAGE" => {}
                tag if *tag == stack::STAK || *tag == font::FTBL || *tag == style::STBL => {}
                other => {
                    warnings += 1;
                    progress.status(format!("Warning: unhandled block type '{}'", String::from_utf8_lossy(other)));
                }
            }
        }

        let mut card_count = 0usize;
        if let Some(list_data) = index.get(&list::LIST, stack.list_block_id) {
            let list_block = BlockRef::new(list::LIST, stack.list_block_id);
            let (header, list_warnings) = list::decode_list(list_block, list_data)?;
            warnings += list_warnings.len();
            for w in &list_warnings {
                progress.status(format!("Warning: {w}"));
            }

            for page_id in &header.page_table_ids {
                let Some(page_data) = index.get(&list::PAGE, *page_id) else {
                    warnings += 1;
                    progress.status(format!("Warning: PAGE #{page_id} referenced by LIST but not found."));
                    continue;
                };
                let page_block = BlockRef::new(list::PAGE, *page_id);
                let (entries, page_warnings) = list::decode_page(page_block, page_data, header.card_block_stride)?;
                warnings += page_warnings.len();
                for w in &page_warnings {
                    progress.status(format!("Warning: {w}"));
                }

                for entry in entries {
                    let Some(card_data) = index.get(&crate::decode::layer::CARD, entry.card_id) else {
                        warnings += 1;
                        progress.status(format!("Warning: CARD #{} referenced by PAGE but not found.", entry.card_id));
                        continue;
                    };
                    let card_block = BlockRef::new(crate::decode::layer::CARD, entry.card_id);
                    let (card, _) = layer::decode(card_block, card_data, true, entry.card_flags, None, Some(&button_ids))?;
                    let owner = card.owner;
                    let xml = emit::layer_xml(&card, &fonts, &button_ids, owner);
                    fs::write(out_dir.join(format!("card_{}.xml", entry.card_id)), xml)?;
                    card_count += 1;
                    progress.advance();
                }
            }
        } else {
            return Err(Error::MissingBlock { from: stack_block, wanted: list::LIST, wanted_id: stack.list_block_id });
        }
        let _ = card_count;

        let mut media = Vec::new();
        for record in &self.resources {
            match resource::media_file(record) {
                Some(media_file) => {
                    let path = out_dir.join(&media_file.file_name);
                    match media_file.contents {
                        resource::MediaContents::Bitmap(bitmap) => {
                            let mut file = fs::File::create(&path)?;
                            pbm::write_pbm(&mut file, &bitmap)?;
                        }
                        resource::MediaContents::Raw(bytes) => fs::write(&path, bytes)?,
                    }
                    media.push((format!("{}_{}", String::from_utf8_lossy(&record.type_tag).trim(), record.id), media_file.file_name));
                }
                None => {
                    warnings += 1;
                    progress.status(format!(
                        "Warning: no media mapping for resource type '{}'",
                        String::from_utf8_lossy(&record.type_tag)
                    ));
                }
            }
            progress.advance();
        }

        let project_xml = emit::project_xml(&stack, &fonts, &styles, ftbl_block, stbl_block, &bmap_comments, &media, self.config.emit_comments);
        fs::write(out_dir.join("project.xml"), project_xml)?;

        let stack_xml = emit::stack_xml(&stack, stack_block);
        fs::write(out_dir.join("stack_-1.xml"), stack_xml)?;

        if self.config.dump_raw_blocks {
            for (key, data) in index.iter_all() {
                let tag = String::from_utf8_lossy(&key.type_tag).trim().to_string();
                data.to_file(&out_dir.join(format!("{tag}_{}.data", key.id)))?;
            }
        }

        Ok(warnings)
    }
}
