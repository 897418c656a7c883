use crate::states::{Action, State};
use crate::transitions;
use utf8parse::Receiver;

/// Outcome of feeding one byte to the streaming UTF-8 decoder.
pub(crate) enum StepResult {
    /// Mid-sequence; more bytes are required.
    Pending,
    /// A scalar value completed (malformed input decodes as U+FFFD).
    Completed(char),
    /// The decoded value is a single-byte control that must be treated
    /// as a state transition in the state that was interrupted.
    Control {
        byte: u8,
        from: State,
        next: State,
        action: Action,
    },
}

#[derive(Default)]
struct Decoder {
    inner: Option<char>,
}

impl Decoder {
    fn take(self) -> Option<char> {
        self.inner
    }
}

impl Receiver for Decoder {
    fn codepoint(&mut self, c: char) {
        self.inner.replace(c);
    }

    fn invalid_sequence(&mut self) {
        self.codepoint(char::REPLACEMENT_CHARACTER);
    }
}

/// Streaming UTF-8 decoder that remembers which parser state it
/// interrupted, so a multibyte scalar split across `advance` calls
/// resumes in the right place.
#[derive(Default)]
pub(crate) struct Utf8Parser {
    resume_state: State,
    inner: utf8parse::Parser,
}

impl Utf8Parser {
    /// The state the machine was in before the UTF-8 sequence began.
    pub(crate) fn resume_state(&self) -> State {
        self.resume_state
    }

    pub(crate) fn set_resume_state(&mut self, state: State) {
        self.resume_state = state;
    }

    /// Feed one byte and classify the result.
    ///
    /// C1 controls arrive either as raw 8-bit bytes or encoded as
    /// two-byte UTF-8. The raw form is caught by the transition table;
    /// the encoded form decodes to a scalar below 0x100 here, and if
    /// that value would move the machine (`ESC \u{9c}` terminating an
    /// OSC string, say) the caller must apply the transition instead of
    /// treating it as text.
    pub(crate) fn step(&mut self, byte: u8) -> StepResult {
        let mut decoder = Decoder::default();
        self.inner.advance(&mut decoder, byte);
        let Some(c) = decoder.take() else {
            return StepResult::Pending;
        };

        if (c as u32) <= 0xFF {
            let byte = c as u8;
            let from = self.resume_state;
            let (next, action) = transitions::transit(from, byte);

            if action == Action::Execute
                || (next != from && next != State::Utf8Sequence)
            {
                return StepResult::Control {
                    byte,
                    from,
                    next,
                    action,
                };
            }
        }

        StepResult::Completed(c)
    }
}
