use bitflags::bitflags;

/// Wrapper for the ANSI modes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Known ANSI mode.
    Named(NamedMode),
    /// Unidentified public mode.
    Unknown(u16),
}

impl Mode {
    pub(crate) fn from_raw(mode: u16) -> Self {
        match mode {
            4 => Self::Named(NamedMode::Insert),
            20 => Self::Named(NamedMode::AutomaticNewline),
            _ => Self::Unknown(mode),
        }
    }

    /// Get the raw value of the mode.
    pub fn raw(self) -> u16 {
        match self {
            Self::Named(named) => named as u16,
            Self::Unknown(mode) => mode,
        }
    }
}

impl From<NamedMode> for Mode {
    fn from(value: NamedMode) -> Self {
        Self::Named(value)
    }
}

/// ANSI modes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NamedMode {
    /// IRM Insert Mode.
    Insert = 4,
    /// LNM, carries a bitmask sub-parameter selecting CR-on-LF and
    /// LF-on-CR emulation bits.
    AutomaticNewline = 20,
}

/// Wrapper for the private DEC modes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrivateMode {
    /// Known private mode.
    Named(NamedPrivateMode),
    /// Unknown private mode.
    Unknown(u16),
}

impl PrivateMode {
    pub(crate) fn from_raw(mode: u16) -> Self {
        match mode {
            1 => Self::Named(NamedPrivateMode::CursorKeys),
            3 => Self::Named(NamedPrivateMode::ColumnMode),
            5 => Self::Named(NamedPrivateMode::ReverseVideo),
            6 => Self::Named(NamedPrivateMode::Origin),
            7 => Self::Named(NamedPrivateMode::LineWrap),
            9 => Self::Named(NamedPrivateMode::ReportMouseClicksX10),
            12 => Self::Named(NamedPrivateMode::BlinkingCursor),
            25 => Self::Named(NamedPrivateMode::ShowCursor),
            45 => Self::Named(NamedPrivateMode::ReverseWrap),
            47 => Self::Named(NamedPrivateMode::AlternateScreen),
            1000 => Self::Named(NamedPrivateMode::ReportMouseClicks),
            1001 => Self::Named(NamedPrivateMode::ReportMouseHighlight),
            1002 => Self::Named(NamedPrivateMode::ReportCellMouseMotion),
            1003 => Self::Named(NamedPrivateMode::ReportAllMouseMotion),
            1004 => Self::Named(NamedPrivateMode::ReportFocusInOut),
            1005 => Self::Named(NamedPrivateMode::Utf8Mouse),
            1006 => Self::Named(NamedPrivateMode::SgrMouse),
            1015 => Self::Named(NamedPrivateMode::UrxvtMouse),
            1047 => Self::Named(NamedPrivateMode::AlternateScreenBuffer),
            1048 => Self::Named(NamedPrivateMode::SaveRestoreCursor),
            1049 => {
                Self::Named(NamedPrivateMode::SwapScreenAndSetRestoreCursor)
            },
            2004 => Self::Named(NamedPrivateMode::BracketedPaste),
            _ => Self::Unknown(mode),
        }
    }

    /// Get the raw value of the mode.
    pub fn raw(self) -> u16 {
        match self {
            Self::Named(named) => named as u16,
            Self::Unknown(mode) => mode,
        }
    }
}

impl From<NamedPrivateMode> for PrivateMode {
    fn from(value: NamedPrivateMode) -> Self {
        Self::Named(value)
    }
}

/// Private DEC modes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NamedPrivateMode {
    /// DECCKM application cursor keys.
    CursorKeys = 1,
    /// DECCOLM, select 80 or 132 columns per page.
    ColumnMode = 3,
    /// DECSCNM reverse video.
    ReverseVideo = 5,
    /// DECOM origin mode, cursor addressing relative to the scroll
    /// region.
    Origin = 6,
    /// DECAWM forward wraparound.
    LineWrap = 7,
    /// X10 mouse click reporting.
    ReportMouseClicksX10 = 9,
    BlinkingCursor = 12,
    /// DECTCEM cursor visibility.
    ShowCursor = 25,
    /// Reverse wraparound, backspace wraps to the previous line.
    ReverseWrap = 45,
    AlternateScreen = 47,
    ReportMouseClicks = 1000,
    ReportMouseHighlight = 1001,
    ReportCellMouseMotion = 1002,
    ReportAllMouseMotion = 1003,
    ReportFocusInOut = 1004,
    Utf8Mouse = 1005,
    SgrMouse = 1006,
    UrxvtMouse = 1015,
    AlternateScreenBuffer = 1047,
    /// Save (set) or restore (reset) the cursor, without switching
    /// screens.
    SaveRestoreCursor = 1048,
    SwapScreenAndSetRestoreCursor = 1049,
    BracketedPaste = 2004,
}

bitflags! {
    /// The ANSI mode 20 bitmask selecting which direction gets newline
    /// translation. Set with `CSI 20;Ps h`; `CSI 20 l` clears both
    /// bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AutomaticNewline: u16 {
        /// A received LF/VT/FF also performs a carriage return.
        const ON_OUTPUT = 1;
        /// The Enter key transmits CR LF.
        const ON_INPUT = 2;
    }
}

/// Mode for clearing line.
///
/// Relative to cursor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LineClearMode {
    /// Clear right of cursor.
    Right,
    /// Clear left of cursor.
    Left,
    /// Clear entire line.
    All,
}

/// Mode for clearing terminal.
///
/// Relative to cursor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ClearMode {
    /// Clear below cursor.
    Below,
    /// Clear above cursor.
    Above,
    /// Clear entire terminal.
    All,
    /// Clear 'saved' lines (scrollback).
    Saved,
}

/// Mode for clearing tab stops.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TabClearMode {
    /// Clear stop under cursor.
    Current,
    /// Clear all stops.
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_for_named_modes() {
        for raw in [1, 3, 5, 6, 7, 9, 25, 45, 47, 1000, 1003, 1048, 1049, 2004]
        {
            assert_eq!(PrivateMode::from_raw(raw).raw(), raw);
        }
        assert_eq!(Mode::from_raw(4).raw(), 4);
        assert_eq!(Mode::from_raw(20).raw(), 20);
    }

    #[test]
    fn unknown_modes_keep_their_raw_value() {
        assert_eq!(PrivateMode::from_raw(4242), PrivateMode::Unknown(4242));
        assert_eq!(Mode::from_raw(5), Mode::Unknown(5));
    }
}
