//! The state transition function of the escape sequence machine.
//!
//! This is the DEC STD-070 / "vtparse" table expressed as one
//! exhaustive `match` per state instead of a packed lookup array, with
//! two deliberate departures:
//!
//! * `:` and the private markers `<=>?` are accepted in the CSI
//!   parameter position instead of diverting to `CsiIgnore`, so that
//!   sub-parameter forms such as `CSI 4:3 m` survive to dispatch.
//! * Bytes at or above 0xA0 enter the UTF-8 pseudo-state rather than
//!   printing as Latin-1.

use crate::states::{Action, State};

/// Transitions that apply from every state ("anywhere" in the classic
/// table): CAN/SUB abort, ESC restarts, and raw C1 controls act as if
/// spelled with their 7-bit escape forms.
fn transit_anywhere(byte: u8) -> Option<(State, Action)> {
    match byte {
        0x18 | 0x1A => Some((State::Ground, Action::Execute)),
        0x1B => Some((State::Escape, Action::Nop)),
        0x80..=0x8F | 0x91..=0x97 | 0x99 | 0x9A => {
            Some((State::Ground, Action::Execute))
        }
        0x90 => Some((State::DcsEntry, Action::Nop)),
        0x98 | 0x9E | 0x9F => Some((State::SosPmApcString, Action::Nop)),
        0x9B => Some((State::CsiEntry, Action::Nop)),
        0x9C => Some((State::Ground, Action::Nop)),
        0x9D => Some((State::OscString, Action::Nop)),
        _ => None,
    }
}

/// Compute the successor state and transition action for `byte`
/// arriving in `state`.
pub(crate) fn transit(state: State, byte: u8) -> (State, Action) {
    if let Some(transition) = transit_anywhere(byte) {
        // String-accumulating states swallow most controls themselves;
        // only the terminators above may interrupt them, which is
        // exactly what transit_anywhere encodes.
        return transition;
    }

    match state {
        State::Ground => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => (State::Ground, Action::Execute),
            0x20..=0x7F => (State::Ground, Action::Print),
            _ => (State::Utf8Sequence, Action::Utf8),
        },

        State::Escape => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => (State::Escape, Action::Execute),
            0x20..=0x2F => (State::EscapeIntermediate, Action::Collect),
            0x50 => (State::DcsEntry, Action::Nop),
            0x58 | 0x5E | 0x5F => (State::SosPmApcString, Action::Nop),
            0x5B => (State::CsiEntry, Action::Nop),
            0x5D => (State::OscString, Action::Nop),
            0x30..=0x7E => (State::Ground, Action::EscDispatch),
            _ => (State::Escape, Action::Ignore),
        },

        State::EscapeIntermediate => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => {
                (State::EscapeIntermediate, Action::Execute)
            }
            0x20..=0x2F => (State::EscapeIntermediate, Action::Collect),
            0x30..=0x7E => (State::Ground, Action::EscDispatch),
            _ => (State::EscapeIntermediate, Action::Ignore),
        },

        State::CsiEntry => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => (State::CsiEntry, Action::Execute),
            0x20..=0x2F => (State::CsiIntermediate, Action::Collect),
            0x30..=0x3B => (State::CsiParam, Action::Param),
            0x3C..=0x3F => (State::CsiParam, Action::Collect),
            0x40..=0x7E => (State::Ground, Action::CsiDispatch),
            _ => (State::CsiEntry, Action::Ignore),
        },

        State::CsiParam => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => (State::CsiParam, Action::Execute),
            0x20..=0x2F => (State::CsiIntermediate, Action::Collect),
            0x30..=0x3F => (State::CsiParam, Action::Param),
            0x40..=0x7E => (State::Ground, Action::CsiDispatch),
            _ => (State::CsiParam, Action::Ignore),
        },

        State::CsiIntermediate => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => {
                (State::CsiIntermediate, Action::Execute)
            }
            0x20..=0x2F => (State::CsiIntermediate, Action::Collect),
            0x30..=0x3F => (State::CsiIgnore, Action::Nop),
            0x40..=0x7E => (State::Ground, Action::CsiDispatch),
            _ => (State::CsiIntermediate, Action::Ignore),
        },

        State::CsiIgnore => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => (State::CsiIgnore, Action::Execute),
            0x40..=0x7E => (State::Ground, Action::Nop),
            _ => (State::CsiIgnore, Action::Ignore),
        },

        State::DcsEntry => match byte {
            0x20..=0x2F => (State::DcsIntermediate, Action::Collect),
            0x30..=0x3B => (State::DcsParam, Action::Param),
            0x3C..=0x3F => (State::DcsParam, Action::Collect),
            0x40..=0x7E => (State::DcsPassthrough, Action::Nop),
            _ => (State::DcsEntry, Action::Ignore),
        },

        State::DcsParam => match byte {
            0x20..=0x2F => (State::DcsIntermediate, Action::Collect),
            0x30..=0x3B => (State::DcsParam, Action::Param),
            0x3C..=0x3F => (State::DcsIgnore, Action::Nop),
            0x40..=0x7E => (State::DcsPassthrough, Action::Nop),
            _ => (State::DcsParam, Action::Ignore),
        },

        State::DcsIntermediate => match byte {
            0x20..=0x2F => (State::DcsIntermediate, Action::Collect),
            0x30..=0x3F => (State::DcsIgnore, Action::Nop),
            0x40..=0x7E => (State::DcsPassthrough, Action::Nop),
            _ => (State::DcsIntermediate, Action::Ignore),
        },

        State::DcsPassthrough => match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F | 0x20..=0x7E => {
                (State::DcsPassthrough, Action::Put)
            }
            _ => (State::DcsPassthrough, Action::Ignore),
        },

        State::DcsIgnore => (State::DcsIgnore, Action::Ignore),

        State::SosPmApcString => (State::SosPmApcString, Action::Ignore),

        State::OscString => match byte {
            // BEL is the xterm-style terminator; NUL is accepted as a
            // terminator as well rather than being embedded.
            0x00 | 0x07 => (State::Ground, Action::Nop),
            0x01..=0x17 | 0x19 | 0x1C..=0x1F => (State::OscString, Action::Ignore),
            0x20..=0x7F => (State::OscString, Action::OscPut),
            _ => (State::Utf8Sequence, Action::Utf8),
        },

        // Bytes arriving in Utf8Sequence never consult this table; the
        // parser feeds them straight to the UTF-8 decoder.
        State::Utf8Sequence => (State::Utf8Sequence, Action::Utf8),
    }
}

/// Action performed when `state` is entered.
pub(crate) fn entry_action(state: State) -> Action {
    match state {
        State::Escape | State::CsiEntry | State::DcsEntry => Action::Clear,
        State::OscString => Action::OscStart,
        State::DcsPassthrough => Action::Hook,
        _ => Action::Nop,
    }
}

/// Action performed when `state` is left.
pub(crate) fn exit_action(state: State) -> Action {
    match state {
        State::OscString => Action::OscEnd,
        State::DcsPassthrough => Action::Unhook,
        _ => Action::Nop,
    }
}
