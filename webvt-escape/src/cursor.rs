/// Terminal cursor configuration, set with DECSCUSR.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CursorStyle {
    pub shape: CursorShape,
    pub blinking: bool,
}

/// Terminal cursor shape.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum CursorShape {
    /// Cursor is a block like `▒`.
    #[default]
    Block,
    /// Cursor is an underscore like `_`.
    Underline,
    /// Cursor is a vertical bar `⎸`.
    Beam,
}
