use std::sync::Arc;

use bitflags::bitflags;
use webvt_escape::{Color, Hyperlink, StdColor};

pub type HyperlinkRef = Arc<Hyperlink>;

/// Visual effects for blinking text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellBlink {
    #[default]
    None,
    Slow,
    Fast,
}

/// Supported underline variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellUnderline {
    #[default]
    None,
    Single,
    Double,
    Curl,
    Dotted,
    Dashed,
}

bitflags! {
    /// Structural flags on a grid cell, independent of its visual
    /// attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellFlags: u8 {
        /// First column of a two-column character.
        const WIDE_CHAR        = 1;
        /// Second column of a two-column character.
        const WIDE_CHAR_SPACER = 1 << 1;
        /// The line was soft-wrapped after this cell.
        const WRAPLINE         = 1 << 2;
    }
}

/// Per-cell visual attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAttributes {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: CellUnderline,
    pub blink: CellBlink,
    pub reverse: bool,
    pub hidden: bool,
    pub strike: bool,
    pub foreground: Color,
    pub background: Color,
    pub underline_color: Option<Color>,
    pub hyperlink: Option<HyperlinkRef>,
}

impl Default for CellAttributes {
    fn default() -> Self {
        Self {
            bold: false,
            dim: false,
            italic: false,
            underline: CellUnderline::None,
            blink: CellBlink::None,
            reverse: false,
            hidden: false,
            strike: false,
            foreground: Color::Std(StdColor::Foreground),
            background: Color::Std(StdColor::Background),
            underline_color: None,
            hyperlink: None,
        }
    }
}

impl CellAttributes {
    pub fn set_hyperlink(&mut self, hyperlink: Option<Hyperlink>) {
        self.hyperlink = hyperlink.map(Arc::new);
    }
}

/// A single cell in the terminal grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// Zero-width code points attached to this cell (combining marks,
    /// variation selectors).
    pub zerowidth: Vec<char>,
    pub flags: CellFlags,
    pub attributes: CellAttributes,
}

impl Cell {
    pub fn blank(attributes: &CellAttributes) -> Self {
        Self {
            ch: ' ',
            zerowidth: Vec::new(),
            flags: CellFlags::empty(),
            attributes: attributes.clone(),
        }
    }

    pub fn with_char(ch: char, attributes: &CellAttributes) -> Self {
        Self {
            ch,
            zerowidth: Vec::new(),
            flags: CellFlags::empty(),
            attributes: attributes.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' ' && self.zerowidth.is_empty()
    }
}
