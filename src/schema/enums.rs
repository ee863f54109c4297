use num_enum::TryFromPrimitive;

/// Visual presentation of a button part. Codes are the subset of the
/// legacy style enumeration that applies to buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ButtonStyle {
    Transparent = 0,
    Opaque = 1,
    Rectangle = 2,
    RoundRect = 3,
    Shadow = 4,
    CheckBox = 5,
    RadioButton = 6,
    Standard = 8,
    Default = 9,
    Oval = 10,
    Popup = 11,
}

/// Visual presentation of a field part. Codes are the subset of the legacy
/// style enumeration that applies to fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum FieldStyle {
    Transparent = 0,
    Opaque = 1,
    Rectangle = 2,
    Shadow = 4,
    Scrolling = 7,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    ForceLeft,
}

impl TextAlign {
    pub fn from_field(value: i16) -> Self {
        match value {
            0 => Self::Left,
            1 => Self::Center,
            -1 => Self::Right,
            -2 => Self::ForceLeft,
            _ => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::ForceLeft => "forceLeft",
        }
    }
}

/// The stage byte of a `NumVersion` record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum VersionStage {
    Development = 0x20,
    Alpha = 0x40,
    Beta = 0x60,
    Final = 0x80,
}

impl VersionStage {
    pub fn letter(self) -> char {
        match self {
            Self::Development => 'd',
            Self::Alpha => 'a',
            Self::Beta => 'b',
            Self::Final => 'v',
        }
    }

    /// The original defaults any unrecognized stage byte to `'v'`.
    pub fn letter_for_byte(byte: u8) -> char {
        Self::try_from(byte).map(Self::letter).unwrap_or('v')
    }
}

/// The type byte of an AddColor record (high bit is the `hidden` flag,
/// low 7 bits select the shape below).
#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum AddColorKind {
    Button = 1,
    Field = 2,
    Rectangle = 3,
    PictureResource = 4,
    PictureFile = 5,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_stage_defaults_to_v_for_unknown_bytes() {
        assert_eq!(VersionStage::letter_for_byte(0x20), 'd');
        assert_eq!(VersionStage::letter_for_byte(0x40), 'a');
        assert_eq!(VersionStage::letter_for_byte(0x60), 'b');
        assert_eq!(VersionStage::letter_for_byte(0x80), 'v');
        assert_eq!(VersionStage::letter_for_byte(0x00), 'v');
        assert_eq!(VersionStage::letter_for_byte(0xff), 'v');
    }

    #[test]
    fn text_align_maps_known_codes() {
        assert_eq!(TextAlign::from_field(0).as_str(), "left");
        assert_eq!(TextAlign::from_field(1).as_str(), "center");
        assert_eq!(TextAlign::from_field(-1).as_str(), "right");
        assert_eq!(TextAlign::from_field(-2).as_str(), "forceLeft");
    }
}
