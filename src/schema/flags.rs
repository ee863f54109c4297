//! Named bitset types for the flag words that the legacy format overloads
//! with context-dependent meaning (button vs. field, stack vs. layer).

use bitflags::bitflags;

bitflags! {
    /// The stack block's 16-bit flags word at offset 64.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StackFlags: u16 {
        const CANT_MODIFY     = 1 << 15;
        const CANT_DELETE     = 1 << 14;
        const PRIVATE_ACCESS  = 1 << 13;
        const CANT_ABORT      = 1 << 11;
        const CANT_PEEK       = 1 << 10;
    }
}

bitflags! {
    /// A `BKGD`/`CARD` layer's 16-bit flags word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerFlags: u16 {
        const CANT_DELETE  = 1 << 14;
        /// Set means "do not show picture", inverted from the emitted
        /// `showPicture` field.
        const HIDE_PICTURE = 1 << 13;
        const DONT_SEARCH  = 1 << 11;
    }
}

impl LayerFlags {
    pub fn show_picture(self) -> bool {
        !self.contains(Self::HIDE_PICTURE)
    }
}

bitflags! {
    /// A part's `flags_and_type` word. The low byte is shared across both
    /// part kinds; the high byte (`part_type = flags_and_type >> 8`)
    /// selects button (1) vs. field (anything else).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PartFlags: u16 {
        /// Bit 7 in-file; emitted inverted as `visible`.
        const HIDDEN = 1 << 7;
    }
}

bitflags! {
    /// Button-specific bits of a part's low flag byte. Bit 0 (`enabled`)
    /// is emitted inverted; the remaining bits are reserved in every
    /// known stack and are preserved only for round-trip fidelity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ButtonFlags: u8 {
        const DISABLED   = 1 << 0;
        const RESERVED_1 = 1 << 1;
        const RESERVED_2 = 1 << 2;
        const RESERVED_3 = 1 << 3;
        const RESERVED_4 = 1 << 4;
        const RESERVED_5 = 1 << 5;
    }
}

impl ButtonFlags {
    pub fn enabled(self) -> bool {
        !self.contains(Self::DISABLED)
    }
}

bitflags! {
    /// Field-specific bits of a part's low flag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u8 {
        const LOCK_TEXT         = 1 << 0;
        const AUTO_TAB          = 1 << 1;
        const FIXED_LINE_HEIGHT = 1 << 2;
        const SHARED_TEXT       = 1 << 3;
        const DONT_SEARCH       = 1 << 4;
        const DONT_WRAP         = 1 << 5;
    }
}

impl FieldFlags {
    pub fn fixed_line_height(self) -> bool {
        // Inverted in-file, same as the original importer.
        !self.contains(Self::FIXED_LINE_HEIGHT)
    }
}

bitflags! {
    /// A part's `more_flags` word: low nibble is `style`, high nibble of
    /// the upper byte is `family`; the remaining bits carry button/field
    /// presentation flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MoreFlags: u16 {
        const SHOW_NAME         = 1 << 15; // button: showName, field: autoSelect
        const AUTO_SELECT       = 1 << 15;
        const HIGHLIGHT         = 1 << 14; // button: highlight/autoHighlight, field: showLines
        const SHOW_LINES        = 1 << 14;
        const WIDE_MARGINS      = 1 << 13; // button: wideMargins, field: autoHighlight
        const AUTO_HIGHLIGHT    = 1 << 13;
        const SHARED_HIGHLIGHT  = 1 << 12; // button: sharedHighlight (inverted), field: multipleLines
        const MULTIPLE_LINES    = 1 << 12;
    }
}

impl MoreFlags {
    /// Low nibble of the low byte.
    pub fn style(self) -> u8 {
        (self.bits() & 0x0f) as u8
    }

    /// Low nibble of the high byte.
    pub fn family(self) -> u8 {
        ((self.bits() >> 8) & 0x0f) as u8
    }

    /// `auto_highlight` is true if the wide-margins/auto-highlight bit is
    /// set OR the button has a nonzero family (icon family), per the layer
    /// decoder's special case.
    pub fn auto_highlight(self, family: u8) -> bool {
        self.contains(Self::AUTO_HIGHLIGHT) || family != 0
    }

    pub fn shared_highlight(self) -> bool {
        !self.contains(Self::SHARED_HIGHLIGHT)
    }
}

bitflags! {
    /// A style record's flags word; bit layout 15..8 maps to the eight
    /// named style booleans.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StyleFlags: u16 {
        const GROUP     = 1 << 15;
        const EXTEND    = 1 << 14;
        const CONDENSE  = 1 << 13;
        const SHADOW    = 1 << 12;
        const OUTLINE   = 1 << 11;
        const UNDERLINE = 1 << 10;
        const ITALIC    = 1 << 9;
        const BOLD      = 1 << 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_hide_picture_bit_is_inverted_for_show_picture() {
        let shown = LayerFlags::empty();
        assert!(shown.show_picture());
        let hidden = LayerFlags::HIDE_PICTURE;
        assert!(!hidden.show_picture());
    }

    #[test]
    fn button_enabled_is_inverted_disabled_bit() {
        assert!(ButtonFlags::empty().enabled());
        assert!(!ButtonFlags::DISABLED.enabled());
    }

    #[test]
    fn more_flags_splits_style_and_family_nibbles() {
        let mf = MoreFlags::from_bits_retain(0x0502);
        assert_eq!(mf.style(), 0x2);
        assert_eq!(mf.family(), 0x5);
    }

    #[test]
    fn more_flags_auto_highlight_checks_bit_13_or_family() {
        assert!(!MoreFlags::empty().auto_highlight(0));
        assert!(MoreFlags::AUTO_HIGHLIGHT.auto_highlight(0));
        assert!(MoreFlags::empty().auto_highlight(3));
    }

    #[test]
    fn more_flags_shared_highlight_is_inverted_bit_12() {
        assert!(MoreFlags::empty().shared_highlight());
        assert!(!MoreFlags::SHARED_HIGHLIGHT.shared_highlight());
    }

    #[test]
    fn style_flags_decode_named_booleans() {
        let f = StyleFlags::BOLD | StyleFlags::ITALIC;
        assert!(f.contains(StyleFlags::BOLD));
        assert!(f.contains(StyleFlags::ITALIC));
        assert!(!f.contains(StyleFlags::UNDERLINE));
    }
}
