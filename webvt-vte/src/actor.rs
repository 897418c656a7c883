use crate::parser::CsiParam;

/// Receiver for the events the state machine produces.
///
/// One method per dispatch kind; implementations interpret the events,
/// the parser only reports them. All methods have empty defaults so an
/// actor can subscribe to the subset it cares about.
pub trait VtActor {
    /// A printable character, decoded from UTF-8 where applicable.
    fn print(&mut self, _c: char) {}

    /// A C0 or C1 control executed immediately, even mid-sequence.
    fn execute(&mut self, _byte: u8) {}

    /// A device control string has begun.
    ///
    /// `byte` is the DCS final byte selecting the sub-protocol (`q`
    /// for sixel). Payload bytes follow via [`VtActor::put`] until
    /// [`VtActor::unhook`].
    fn hook(
        &mut self,
        _params: &[i64],
        _intermediates: &[u8],
        _ignored_excess_intermediates: bool,
        _byte: u8,
    ) {
    }

    /// One byte of DCS payload.
    fn put(&mut self, _byte: u8) {}

    /// The device control string ended (ST or an aborting control).
    fn unhook(&mut self) {}

    /// A completed operating system command, split at `;`.
    fn osc_dispatch(&mut self, _params: &[&[u8]]) {}

    /// A completed control sequence.
    ///
    /// `params` preserves separator and private-marker bytes as
    /// [`CsiParam::P`] entries so the consumer can distinguish `;`
    /// from `:` and recognize DEC private prefixes.
    fn csi_dispatch(
        &mut self,
        _params: &[CsiParam],
        _parameters_truncated: bool,
        _byte: u8,
    ) {
    }

    /// A completed escape sequence that is not CSI/OSC/DCS.
    fn esc_dispatch(
        &mut self,
        _intermediates: &[u8],
        _ignored_excess_intermediates: bool,
        _byte: u8,
    ) {
    }

    /// Polled after every consumed byte by
    /// [`Parser::advance_until_terminated`](crate::Parser::advance_until_terminated).
    /// Returning `true` stops the parser so the caller can buffer the
    /// unconsumed remainder.
    fn terminated(&self) -> bool {
        false
    }
}
