//! Reference terminal model for the webvt parser stack.
//!
//! [`TermModel`] consumes the semantic events produced by
//! [`webvt_escape::Parser`] and keeps a plain in-memory screen: a cell
//! grid, cursor, modes, tab stops, decoded sixel images and the answer
//! bytes a host would write back to the application. It documents the
//! intended semantics of every event and doubles as the fixture for
//! end-to-end tests.
//!
//! The [`segment`] module carries the grapheme-cluster segmenter used
//! for column accounting when whole strings are inserted.

pub mod cell;
pub mod mode;
pub mod segment;
mod term;

pub use cell::{
    Cell, CellAttributes, CellBlink, CellFlags, CellUnderline, HyperlinkRef,
};
pub use mode::TermMode;
pub use segment::{Segment, cluster_width, display_width, segments};
pub use term::{PlacedImage, ShellState, TermModel};
