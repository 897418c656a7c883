//! Semantic layer over the `webvt-vte` byte state machine.
//!
//! [`Parser`] consumes raw terminal output in arbitrary chunks and
//! reports interpreted events (cursor motion, attributes, modes, OSC
//! payloads, sixel images, shell integration marks) to an [`Actor`].

mod actor;
mod attributes;
mod charset;
mod color;
mod control;
mod csi;
mod cursor;
mod dcs;
mod esc;
mod mode;
mod osc;
mod parser;

pub use actor::{
    Actor, AutoPaging, BreakKind, CommandGroup, Hyperlink, PrettyIndent,
    TitleKind,
};
pub use attributes::Attr;
pub use charset::{Charset, CharsetIndex};
pub use color::{Color, Rgb, StdColor};
pub use cursor::{CursorShape, CursorStyle};
pub use mode::{
    AutomaticNewline, ClearMode, LineClearMode, Mode, NamedMode,
    NamedPrivateMode, PrivateMode, TabClearMode,
};
pub use parser::Parser;
