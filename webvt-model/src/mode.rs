//! Bitflags describing the active terminal modes.

use bitflags::bitflags;

bitflags! {
    /// Public and private terminal modes active on the model.
    ///
    /// These flags mirror the xterm/DEC modes the escape layer can
    /// toggle (cursor visibility, origin mode, insert mode, alternate
    /// screen, mouse reporting bookkeeping, etc.).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TermMode: u32 {
        const NONE               = 0;
        const SHOW_CURSOR        = 1;
        const APP_CURSOR         = 1 << 1;
        const APP_KEYPAD         = 1 << 2;
        const MOUSE_REPORT_CLICK = 1 << 3;
        const BRACKETED_PASTE    = 1 << 4;
        const SGR_MOUSE          = 1 << 5;
        const MOUSE_MOTION       = 1 << 6;
        const LINE_WRAP          = 1 << 7;
        const REVERSE_WRAP       = 1 << 8;
        const ORIGIN             = 1 << 9;
        const INSERT             = 1 << 10;
        const FOCUS_IN_OUT       = 1 << 11;
        const ALT_SCREEN         = 1 << 12;
        const MOUSE_DRAG         = 1 << 13;
        const UTF8_MOUSE         = 1 << 14;
        const URXVT_MOUSE        = 1 << 15;
        const MOUSE_X10          = 1 << 16;
        const MOUSE_HIGHLIGHT    = 1 << 17;
        const REVERSE_VIDEO      = 1 << 18;
        const BLINKING_CURSOR    = 1 << 19;
        const COLUMN_132         = 1 << 20;
        /// Convenience mask for all mouse reporting modes.
        const MOUSE_MODE = Self::MOUSE_REPORT_CLICK.bits()
            | Self::MOUSE_MOTION.bits()
            | Self::MOUSE_DRAG.bits()
            | Self::MOUSE_X10.bits()
            | Self::MOUSE_HIGHLIGHT.bits();
        /// Mask that matches any mode.
        const ANY = u32::MAX;
    }
}

impl Default for TermMode {
    fn default() -> Self {
        Self::SHOW_CURSOR | Self::LINE_WRAP
    }
}
