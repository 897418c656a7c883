use crate::actor::VtActor;
use crate::states::{Action, State};
use crate::transitions;
use crate::utf8::{StepResult, Utf8Parser};

const MAX_INTERMEDIATES: usize = 2;
const MAX_OSC_PARAMS: usize = 32;
const MAX_PARAMS: usize = 256;

/// Hard cap on accumulated OSC payload. A stream that never terminates
/// its string cannot grow memory without bound; bytes past the cap are
/// dropped and the sequence still dispatches with the truncated
/// payload.
const MAX_OSC_BYTES: usize = 1024 * 1024;

/// One parameter token of a CSI or DCS sequence.
///
/// A sequence like `CSI 3 ; 4 m` is reported as
/// `[Integer(3), P(b';'), Integer(4)]`: the separator and any
/// private-marker bytes (`<=>?`) are kept as [`CsiParam::P`] tokens in
/// positional order. That way the consumer can tell `CSI 4:3 m` from
/// `CSI 4;3 m`, and `CSI ? 1 h` arrives as `[P(b'?'), Integer(1)]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CsiParam {
    Integer(i64),
    P(u8),
}

impl CsiParam {
    /// The numeric value, if this token is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CsiParam::Integer(value) => Some(*value),
            CsiParam::P(_) => None,
        }
    }
}

impl Default for CsiParam {
    fn default() -> Self {
        Self::Integer(0)
    }
}

#[derive(Debug, Default)]
struct Params {
    items: Vec<CsiParam>,
    current: Option<i64>,
    full: bool,
}

impl Params {
    fn get(&self) -> &[CsiParam] {
        &self.items
    }

    /// Flatten the token list to plain integers, substituting 0 for
    /// omitted positions. Used for DCS parameters, which never carry
    /// sub-parameters.
    fn get_integers(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.items.len());
        let mut pending = true;
        for param in &self.items {
            match param {
                CsiParam::Integer(value) => {
                    out.push(*value);
                    pending = false;
                }
                CsiParam::P(b';') | CsiParam::P(b':') => {
                    if pending {
                        out.push(0);
                    }
                    pending = true;
                }
                CsiParam::P(_) => {}
            }
        }
        if pending && !self.items.is_empty() {
            out.push(0);
        }
        out
    }

    fn push(&mut self, param: CsiParam) {
        if self.items.len() >= MAX_PARAMS {
            self.full = true;
            return;
        }
        self.items.push(param);
    }

    fn accumulate_digit(&mut self, digit: i64) {
        let value = self.current.take().unwrap_or(0);
        self.current = Some(value.saturating_mul(10).saturating_add(digit));
    }

    fn finish(&mut self) {
        if let Some(value) = self.current.take() {
            self.push(CsiParam::Integer(value));
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.current = None;
        self.full = false;
    }
}

#[derive(Debug, Default)]
struct OscState {
    buffer: Vec<u8>,
    // Byte offsets in `buffer` where a `;` separator fell.
    param_ends: Vec<usize>,
    has_data: bool,
}

impl OscState {
    fn put_byte(&mut self, byte: u8) {
        self.has_data = true;
        // Once the separator budget is spent, further `;` bytes are
        // ordinary data so long payloads keep their tail intact.
        if byte == b';' && self.param_ends.len() + 1 < MAX_OSC_PARAMS {
            self.param_ends.push(self.buffer.len());
            return;
        }
        self.put_data(byte);
    }

    fn put_char(&mut self, c: char) {
        self.has_data = true;
        let mut tmp = [0u8; 4];
        for &byte in c.encode_utf8(&mut tmp).as_bytes() {
            self.put_data(byte);
        }
    }

    fn put_data(&mut self, byte: u8) {
        if self.buffer.len() < MAX_OSC_BYTES {
            self.buffer.push(byte);
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.param_ends.clear();
        self.has_data = false;
    }
}

#[derive(Debug, Default)]
struct Intermediates {
    items: [u8; MAX_INTERMEDIATES],
    len: usize,
    ignored_excess: bool,
}

impl Intermediates {
    fn get(&self) -> &[u8] {
        &self.items[..self.len]
    }

    fn collect(&mut self, byte: u8) {
        if self.len < MAX_INTERMEDIATES {
            self.items[self.len] = byte;
            self.len += 1;
        } else {
            self.ignored_excess = true;
        }
    }

    fn clear(&mut self) {
        self.len = 0;
        self.ignored_excess = false;
    }
}

/// The escape sequence state machine.
///
/// Feed it bytes with [`Parser::advance`]; it reports what it finds to
/// a [`VtActor`]. The parser carries all in-flight sequence state, so
/// input may be split at any byte boundary (including inside a UTF-8
/// scalar or an escape sequence) across calls without changing the
/// event stream.
#[derive(Default)]
pub struct Parser {
    state: State,
    intermediates: Intermediates,
    params: Params,
    osc: OscState,
    utf8: Utf8Parser,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process every byte of `bytes`.
    pub fn advance<A: VtActor>(&mut self, bytes: &[u8], actor: &mut A) {
        for &byte in bytes {
            self.step(byte, actor);
        }
    }

    /// Process bytes until the actor reports itself terminated, then
    /// stop. Returns the number of bytes consumed; the caller owns the
    /// unconsumed remainder and decides when to feed it back in.
    ///
    /// The termination poll runs after every byte, so an actor that
    /// pauses (synchronized updates, output pacing) stops the stream
    /// at exactly the byte that triggered it.
    pub fn advance_until_terminated<A: VtActor>(
        &mut self,
        bytes: &[u8],
        actor: &mut A,
    ) -> usize {
        for (idx, &byte) in bytes.iter().enumerate() {
            self.step(byte, actor);
            if actor.terminated() {
                return idx + 1;
            }
        }
        bytes.len()
    }

    fn step<A: VtActor>(&mut self, byte: u8, actor: &mut A) {
        if self.state == State::Utf8Sequence {
            self.step_utf8(byte, actor);
            return;
        }

        let (next, action) = transitions::transit(self.state, byte);

        if next == self.state {
            self.perform(action, byte, actor);
            return;
        }

        if next == State::Utf8Sequence {
            // The interrupted state is restored once the scalar
            // completes; its exit action must not run.
            self.utf8.set_resume_state(self.state);
            self.state = State::Utf8Sequence;
            self.step_utf8(byte, actor);
            return;
        }

        self.perform(transitions::exit_action(self.state), 0, actor);
        self.perform(action, byte, actor);
        self.perform(transitions::entry_action(next), byte, actor);
        self.state = next;
    }

    fn step_utf8<A: VtActor>(&mut self, byte: u8, actor: &mut A) {
        match self.utf8.step(byte) {
            StepResult::Pending => {}
            StepResult::Completed(c) => {
                match self.utf8.resume_state() {
                    State::OscString => self.osc.put_char(c),
                    _ => actor.print(c),
                }
                self.state = self.utf8.resume_state();
            }
            StepResult::Control {
                byte,
                from,
                next,
                action,
            } => {
                // A C1 control reached us encoded as UTF-8; apply the
                // transition it would have caused as a raw byte.
                if next != from {
                    self.perform(transitions::exit_action(from), 0, actor);
                }
                self.perform(action, byte, actor);
                if next != from {
                    self.perform(transitions::entry_action(next), byte, actor);
                }
                self.state = next;
            }
        }
    }

    fn perform<A: VtActor>(&mut self, action: Action, byte: u8, actor: &mut A) {
        use Action::*;

        match action {
            Print => actor.print(byte as char),
            Execute => actor.execute(byte),
            Put => actor.put(byte),
            CsiDispatch => self.csi_dispatch(actor, byte),
            EscDispatch => self.esc_dispatch(actor, byte),
            Param => self.param_byte(byte),
            Clear => self.clear(),
            Collect => self.intermediates.collect(byte),
            Hook => self.hook(actor, byte),
            Unhook => actor.unhook(),
            OscStart => self.osc.clear(),
            OscPut => self.osc.put_byte(byte),
            OscEnd => self.osc_dispatch(actor),
            Utf8 => self.step_utf8(byte, actor),
            Nop | Ignore => {}
        }
    }

    /// Move private-marker bytes that were collected as intermediates
    /// into the parameter list. `?` in `CSI ? 1 h` is technically an
    /// intermediate-range byte arriving before the parameters; the
    /// consumer wants to see it first in positional order.
    fn promote_intermediates_to_params(&mut self) {
        if self.intermediates.len > 0 {
            for &byte in self.intermediates.get() {
                if self.params.full {
                    break;
                }
                self.params.push(CsiParam::P(byte));
            }
            self.intermediates.len = 0;
        }
    }

    fn param_byte(&mut self, byte: u8) {
        if self.params.full {
            return;
        }

        self.promote_intermediates_to_params();

        if byte.is_ascii_digit() {
            self.params.accumulate_digit(i64::from(byte - b'0'));
        } else {
            self.params.finish();
            self.params.push(CsiParam::P(byte));
        }
    }

    fn hook<A: VtActor>(&mut self, actor: &mut A, byte: u8) {
        self.params.finish();
        actor.hook(
            &self.params.get_integers(),
            self.intermediates.get(),
            self.intermediates.ignored_excess,
            byte,
        );
    }

    fn csi_dispatch<A: VtActor>(&mut self, actor: &mut A, byte: u8) {
        self.params.finish();
        self.promote_intermediates_to_params();
        actor.csi_dispatch(
            self.params.get(),
            self.params.full || self.intermediates.ignored_excess,
            byte,
        );
    }

    fn esc_dispatch<A: VtActor>(&mut self, actor: &mut A, byte: u8) {
        actor.esc_dispatch(
            self.intermediates.get(),
            self.intermediates.ignored_excess,
            byte,
        );
    }

    fn osc_dispatch<A: VtActor>(&mut self, actor: &mut A) {
        if !self.osc.has_data {
            actor.osc_dispatch(&[]);
            return;
        }

        let mut params: Vec<&[u8]> =
            Vec::with_capacity(self.osc.param_ends.len() + 1);
        let mut rest: &[u8] = &self.osc.buffer;
        let mut offset = 0;

        for &end in &self.osc.param_ends {
            let (head, tail) = rest.split_at(end - offset);
            params.push(head);
            rest = tail;
            offset = end;
        }
        params.push(rest);

        actor.osc_dispatch(&params);
    }

    fn clear(&mut self) {
        self.intermediates.clear();
        self.params.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Print(char),
        Execute(u8),
        Hook {
            params: Vec<i64>,
            intermediates: Vec<u8>,
            ignored_excess_intermediates: bool,
            byte: u8,
        },
        Put(u8),
        Unhook,
        EscDispatch {
            intermediates: Vec<u8>,
            ignored_excess_intermediates: bool,
            byte: u8,
        },
        CsiDispatch {
            params: Vec<CsiParam>,
            parameters_truncated: bool,
            byte: u8,
        },
        OscDispatch(Vec<Vec<u8>>),
    }

    #[derive(Default)]
    struct CollectingActor {
        events: Vec<Event>,
    }

    impl VtActor for CollectingActor {
        fn print(&mut self, c: char) {
            self.events.push(Event::Print(c));
        }

        fn execute(&mut self, byte: u8) {
            self.events.push(Event::Execute(byte));
        }

        fn hook(
            &mut self,
            params: &[i64],
            intermediates: &[u8],
            ignored_excess_intermediates: bool,
            byte: u8,
        ) {
            self.events.push(Event::Hook {
                params: params.to_vec(),
                intermediates: intermediates.to_vec(),
                ignored_excess_intermediates,
                byte,
            });
        }

        fn put(&mut self, byte: u8) {
            self.events.push(Event::Put(byte));
        }

        fn unhook(&mut self) {
            self.events.push(Event::Unhook);
        }

        fn esc_dispatch(
            &mut self,
            intermediates: &[u8],
            ignored_excess_intermediates: bool,
            byte: u8,
        ) {
            self.events.push(Event::EscDispatch {
                intermediates: intermediates.to_vec(),
                ignored_excess_intermediates,
                byte,
            });
        }

        fn csi_dispatch(
            &mut self,
            params: &[CsiParam],
            parameters_truncated: bool,
            byte: u8,
        ) {
            self.events.push(Event::CsiDispatch {
                params: params.to_vec(),
                parameters_truncated,
                byte,
            });
        }

        fn osc_dispatch(&mut self, params: &[&[u8]]) {
            self.events.push(Event::OscDispatch(
                params.iter().map(|p| p.to_vec()).collect(),
            ));
        }
    }

    fn parse(bytes: &[u8]) -> Vec<Event> {
        let mut parser = Parser::new();
        let mut actor = CollectingActor::default();
        parser.advance(bytes, &mut actor);
        actor.events
    }

    #[test]
    fn parses_printable_ascii() {
        assert_eq!(
            parse(b"test\x07\x1b[32mmy\x1b[0mparser"),
            vec![
                Event::Print('t'),
                Event::Print('e'),
                Event::Print('s'),
                Event::Print('t'),
                Event::Execute(0x07),
                Event::CsiDispatch {
                    params: vec![CsiParam::Integer(32)],
                    parameters_truncated: false,
                    byte: b'm'
                },
                Event::Print('m'),
                Event::Print('y'),
                Event::CsiDispatch {
                    params: vec![CsiParam::Integer(0)],
                    parameters_truncated: false,
                    byte: b'm'
                },
                Event::Print('p'),
                Event::Print('a'),
                Event::Print('r'),
                Event::Print('s'),
                Event::Print('e'),
                Event::Print('r'),
            ]
        );
    }

    #[test]
    fn print_utf8() {
        assert_eq!(parse("\u{af}".as_bytes()), vec![Event::Print('\u{af}')]);
    }

    #[test]
    fn print_utf8_split_across_calls() {
        let mut parser = Parser::new();
        let mut actor = CollectingActor::default();
        let bytes = "é".as_bytes();
        parser.advance(&bytes[..1], &mut actor);
        assert!(actor.events.is_empty());
        parser.advance(&bytes[1..], &mut actor);
        assert_eq!(actor.events, vec![Event::Print('é')]);
    }

    #[test]
    fn invalid_utf8_prints_replacement() {
        assert_eq!(
            parse(b"\xffx"),
            vec![Event::Print('\u{fffd}'), Event::Print('x')]
        );
    }

    #[test]
    fn osc_with_c1_st() {
        assert_eq!(
            parse(b"\x1b]0;there\x9c"),
            vec![Event::OscDispatch(vec![b"0".to_vec(), b"there".to_vec()])]
        );
    }

    #[test]
    fn osc_with_bel_st() {
        assert_eq!(
            parse(b"\x1b]0;hello\x07"),
            vec![Event::OscDispatch(vec![b"0".to_vec(), b"hello".to_vec()])]
        );
    }

    #[test]
    fn osc_with_no_params() {
        assert_eq!(parse(b"\x1b]\x07"), vec![Event::OscDispatch(vec![])]);
    }

    #[test]
    fn osc_with_esc_sequence_st() {
        // `ESC \` is the long form of ST, but the ESC alone already
        // leaves the OSC state; the `\` then dispatches as a plain
        // escape sequence.
        assert_eq!(
            parse(b"\x1b]woot\x1b\\"),
            vec![
                Event::OscDispatch(vec![b"woot".to_vec()]),
                Event::EscDispatch {
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'\\'
                }
            ]
        );
    }

    #[test]
    fn osc_excess_separators_stay_in_last_param() {
        let fields: Vec<String> =
            (0..MAX_OSC_PARAMS + 2).map(|i| i.to_string()).collect();
        let input = format!("\x1b]{}\x07", fields.join(";"));
        let events = parse(input.as_bytes());

        let Event::OscDispatch(params) = &events[0] else {
            panic!("expected OscDispatch, got {:?}", events[0]);
        };
        assert_eq!(params.len(), MAX_OSC_PARAMS);
        // The split budget is exhausted; the tail keeps its literal
        // semicolons.
        assert_eq!(
            params[MAX_OSC_PARAMS - 1],
            fields[MAX_OSC_PARAMS - 1..].join(";").into_bytes()
        );
    }

    #[test]
    fn osc_utf8_payload() {
        assert_eq!(
            parse("\x1b]\u{af}\x07".as_bytes()),
            vec![Event::OscDispatch(vec!["\u{af}".as_bytes().to_vec()])]
        );
    }

    #[test]
    fn osc_c1_introducer_encoded_as_utf8() {
        assert_eq!(
            parse("\u{9d}777;preexec\u{9c}".as_bytes()),
            vec![Event::OscDispatch(vec![
                b"777".to_vec(),
                b"preexec".to_vec(),
            ])]
        );
    }

    #[test]
    fn utf8_encoded_c1_control_executes() {
        assert_eq!(parse("\u{8d}".as_bytes()), vec![Event::Execute(0x8d)]);
    }

    #[test]
    fn decset_private_marker_promoted() {
        assert_eq!(
            parse(b"\x1b[?1l"),
            vec![Event::CsiDispatch {
                params: vec![CsiParam::P(b'?'), CsiParam::Integer(1)],
                parameters_truncated: false,
                byte: b'l',
            }]
        );
    }

    #[test]
    fn colon_subparameters() {
        assert_eq!(
            parse(b"\x1b[4:3m"),
            vec![Event::CsiDispatch {
                params: vec![
                    CsiParam::Integer(4),
                    CsiParam::P(b':'),
                    CsiParam::Integer(3)
                ],
                parameters_truncated: false,
                byte: b'm'
            }]
        );
    }

    #[test]
    fn colon_rgb() {
        assert_eq!(
            parse(b"\x1b[38:2::128:64:192m"),
            vec![Event::CsiDispatch {
                params: vec![
                    CsiParam::Integer(38),
                    CsiParam::P(b':'),
                    CsiParam::Integer(2),
                    CsiParam::P(b':'),
                    CsiParam::P(b':'),
                    CsiParam::Integer(128),
                    CsiParam::P(b':'),
                    CsiParam::Integer(64),
                    CsiParam::P(b':'),
                    CsiParam::Integer(192),
                ],
                parameters_truncated: false,
                byte: b'm'
            }]
        );
    }

    #[test]
    fn csi_omitted_param() {
        assert_eq!(
            parse(b"\x1b[;1m"),
            vec![Event::CsiDispatch {
                params: vec![CsiParam::P(b';'), CsiParam::Integer(1)],
                parameters_truncated: false,
                byte: b'm'
            }]
        );
    }

    #[test]
    fn csi_intermediates() {
        assert_eq!(
            parse(b"\x1b[1 !p"),
            vec![Event::CsiDispatch {
                params: vec![
                    CsiParam::Integer(1),
                    CsiParam::P(b' '),
                    CsiParam::P(b'!')
                ],
                parameters_truncated: false,
                byte: b'p'
            }]
        );
        assert_eq!(
            // The third intermediate is over budget and dropped.
            parse(b"\x1b[1 !#p"),
            vec![Event::CsiDispatch {
                params: vec![
                    CsiParam::Integer(1),
                    CsiParam::P(b' '),
                    CsiParam::P(b'!')
                ],
                parameters_truncated: true,
                byte: b'p'
            }]
        );
    }

    #[test]
    fn csi_too_many_params() {
        let mut input = "\x1b[0".to_string();
        let mut params = vec![CsiParam::Integer(0)];
        for n in 1..=127 {
            input.push_str(&format!(";{n}"));
            params.push(CsiParam::P(b';'));
            params.push(CsiParam::Integer(n));
        }
        // One more field than fits; its separator lands on the last
        // slot and its digits are dropped.
        input.push_str(";128p");
        params.push(CsiParam::P(b';'));

        assert_eq!(
            parse(input.as_bytes()),
            vec![Event::CsiDispatch {
                params,
                parameters_truncated: true,
                byte: b'p'
            }]
        );
    }

    #[test]
    fn execute_mid_csi() {
        assert_eq!(
            parse(b"\x1b[2\x08;3H"),
            vec![
                Event::Execute(0x08),
                Event::CsiDispatch {
                    params: vec![
                        CsiParam::Integer(2),
                        CsiParam::P(b';'),
                        CsiParam::Integer(3)
                    ],
                    parameters_truncated: false,
                    byte: b'H'
                }
            ]
        );
    }

    #[test]
    fn can_aborts_csi() {
        assert_eq!(
            parse(b"\x1b[3\x18mx"),
            vec![Event::Execute(0x18), Event::Print('m'), Event::Print('x')]
        );
    }

    #[test]
    fn dcs_hook_put_unhook() {
        assert_eq!(
            parse(b"\x1bPqhello\x1b\\"),
            vec![
                Event::Hook {
                    params: vec![],
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'q',
                },
                Event::Put(b'h'),
                Event::Put(b'e'),
                Event::Put(b'l'),
                Event::Put(b'l'),
                Event::Put(b'o'),
                Event::Unhook,
                Event::EscDispatch {
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'\\',
                }
            ]
        );
    }

    #[test]
    fn dcs_with_params() {
        assert_eq!(
            parse(b"\x1bP0;1;8q\x1b\\"),
            vec![
                Event::Hook {
                    params: vec![0, 1, 8],
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'q',
                },
                Event::Unhook,
                Event::EscDispatch {
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'\\',
                }
            ]
        );
    }

    #[test]
    fn dcs_omitted_param() {
        assert_eq!(
            parse(b"\x1bP;1q\x1b\\"),
            vec![
                Event::Hook {
                    params: vec![0, 1],
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'q',
                },
                Event::Unhook,
                Event::EscDispatch {
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'\\',
                }
            ]
        );
    }

    #[test]
    fn sos_pm_apc_payload_discarded() {
        assert_eq!(
            parse(b"\x1b_hidden\x1b\\x"),
            vec![
                Event::EscDispatch {
                    intermediates: vec![],
                    ignored_excess_intermediates: false,
                    byte: b'\\',
                },
                Event::Print('x'),
            ]
        );
    }

    struct PausingActor {
        inner: CollectingActor,
        paused: bool,
    }

    impl VtActor for PausingActor {
        fn print(&mut self, c: char) {
            self.inner.print(c);
        }

        fn execute(&mut self, byte: u8) {
            if byte == b'\n' {
                self.paused = true;
            }
            self.inner.execute(byte);
        }

        fn terminated(&self) -> bool {
            self.paused
        }
    }

    #[test]
    fn advance_until_terminated_stops_at_trigger_byte() {
        let mut parser = Parser::new();
        let mut actor = PausingActor {
            inner: CollectingActor::default(),
            paused: false,
        };

        let input = b"ab\ncd";
        let consumed = parser.advance_until_terminated(input, &mut actor);
        assert_eq!(consumed, 3);
        assert_eq!(
            actor.inner.events,
            vec![Event::Print('a'), Event::Print('b'), Event::Execute(b'\n')]
        );

        // The caller resumes with the remainder once unpaused.
        actor.paused = false;
        let consumed = parser.advance_until_terminated(&input[consumed..], &mut actor);
        assert_eq!(consumed, 2);
        assert_eq!(
            actor.inner.events[3..],
            [Event::Print('c'), Event::Print('d')]
        );
    }
}
