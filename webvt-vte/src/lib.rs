//! Streaming tokenizer for the DEC/ECMA-48 control sequence protocol.
//!
//! This crate contains no terminal semantics.  It walks a byte stream,
//! tracks the escape sequence state machine and reports what it finds
//! (printable characters, C0/C1 controls, CSI/ESC dispatches, OSC and
//! DCS strings) to a [`VtActor`].  Interpretation of those events lives
//! one layer up, in `webvt-escape`.

mod actor;
mod parser;
mod states;
mod transitions;
mod utf8;

pub use actor::VtActor;
pub use parser::{CsiParam, Parser};
pub use states::{Action, State};
