//! Explicit state and action enumerations for the escape sequence
//! state machine.
//!
//! The classic DEC parser description encodes these as small integers;
//! using enums lets the compiler check the transition function for
//! exhaustiveness.

/// Parser states.
///
/// Exactly one state is active at any time.  `Utf8Sequence` is a
/// pseudo-state entered while a multibyte UTF-8 scalar is in flight;
/// the state that was active before it is restored once the scalar
/// completes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Plain text and C0/C1 controls.
    #[default]
    Ground,
    /// Seen ESC.
    Escape,
    /// Seen ESC plus one or more 0x20-0x2F intermediates.
    EscapeIntermediate,
    /// Seen CSI (ESC `[` or 0x9B), no parameter bytes yet.
    CsiEntry,
    /// Scanning CSI parameter bytes.
    CsiParam,
    /// Seen a CSI intermediate after parameters.
    CsiIntermediate,
    /// Malformed CSI; consume until the final byte without dispatching.
    CsiIgnore,
    /// Accumulating an OSC string (ESC `]` or 0x9D).
    OscString,
    /// Seen DCS (ESC `P` or 0x90), no parameter bytes yet.
    DcsEntry,
    /// Scanning DCS parameter bytes.
    DcsParam,
    /// Seen a DCS intermediate after parameters.
    DcsIntermediate,
    /// Forwarding the DCS data string to the actor.
    DcsPassthrough,
    /// Malformed DCS; consume until the string terminator.
    DcsIgnore,
    /// SOS/PM/APC string: structurally parsed, payload discarded.
    SosPmApcString,
    /// Mid-way through a multibyte UTF-8 scalar.
    Utf8Sequence,
}

/// Actions attached to state transitions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No side effect.
    #[default]
    Nop,
    /// Byte consumed without effect.
    Ignore,
    /// Emit a printable character.
    Print,
    /// Execute a C0/C1 control immediately.
    Execute,
    /// Reset parameter/intermediate/OSC accumulators.
    Clear,
    /// Record an intermediate or private-marker byte.
    Collect,
    /// Record a parameter byte (digit, `:`, `;` or `<`-`?`).
    Param,
    /// Dispatch a completed escape sequence.
    EscDispatch,
    /// Dispatch a completed control sequence.
    CsiDispatch,
    /// Begin a device control string; the byte is the DCS final byte.
    Hook,
    /// Forward one byte of DCS payload.
    Put,
    /// End the device control string.
    Unhook,
    /// Begin accumulating an OSC string.
    OscStart,
    /// Append to the OSC string.
    OscPut,
    /// Dispatch the completed OSC string.
    OscEnd,
    /// Route the byte into the UTF-8 decoder.
    Utf8,
}
