use std::collections::HashMap;

use webvt_vte::{CsiParam, VtActor};

use crate::dcs::DcsHandler;
use crate::{Actor, control, csi, esc, osc};

/// Streaming escape sequence interpreter.
///
/// Feed raw bytes with [`advance`](Self::advance) in chunks of any
/// size; sequences split across chunk boundaries are carried over. The
/// parser owns the cross-chunk bookkeeping (deferred carriage returns,
/// saved private modes, an active device control string) so the actor
/// only sees whole semantic events.
#[derive(Default)]
pub struct Parser {
    vt: webvt_vte::Parser,
    state: ParseState,
    pending: Vec<u8>,
}

/// Interpreter state that survives between dispatches.
#[derive(Default)]
pub(crate) struct ParseState {
    /// Last printed character, for `CSI Ps b` (REP).
    pub last_preceding_char: Option<char>,
    /// A carriage return was seen and is held back in case the next
    /// byte is a newline, so `\r\n` can be reported as one unit.
    pub seen_cr: bool,
    /// `CSI 11 u` was seen; the end-of-error-output event fires on the
    /// next sequence unless that sequence is `CSI 12 u`.
    pub errout_end_pending: bool,
    /// The actor asked to pause before a newline; parsing stops and
    /// the rest of the chunk is buffered.
    pub paused: bool,
    /// Private mode values stashed by `CSI ? Pm s`.
    saved_private_modes: Option<HashMap<u16, bool>>,
    /// In-flight DCS payload consumer.
    dcs: Option<DcsHandler>,
}

impl ParseState {
    pub(crate) fn flush_deferred_cr<A: Actor>(&mut self, actor: &mut A) {
        if std::mem::take(&mut self.seen_cr) {
            actor.carriage_return();
        }
    }

    pub(crate) fn flush_error_output_end<A: Actor>(
        &mut self,
        actor: &mut A,
    ) {
        if std::mem::take(&mut self.errout_end_pending) {
            actor.end_error_output();
        }
    }

    pub(crate) fn save_private_mode(&mut self, raw: u16, value: bool) {
        self.saved_private_modes
            .get_or_insert_with(HashMap::new)
            .insert(raw, value);
    }

    /// `None` until the first save; a saved map treats missing entries
    /// as reset.
    pub(crate) fn saved_private_mode(&self, raw: u16) -> Option<bool> {
        self.saved_private_modes
            .as_ref()
            .map(|saved| saved.get(&raw).copied().unwrap_or(false))
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a previous [`advance`](Self::advance) call paused with
    /// input left over.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Interpret `input`, relaying semantic events to `actor`.
    ///
    /// Input buffered by an earlier pause is replayed first; call with
    /// an empty slice to resume after the actor stops reporting
    /// [`pause_needed`](Actor::pause_needed).
    pub fn advance<A: Actor>(&mut self, input: &[u8], actor: &mut A) {
        let buffered = std::mem::take(&mut self.pending);
        if buffered.is_empty() {
            self.advance_bytes(input, actor);
        } else {
            let mut bytes = buffered;
            bytes.extend_from_slice(input);
            self.advance_bytes(&bytes, actor);
        }
    }

    fn advance_bytes<A: Actor>(&mut self, bytes: &[u8], actor: &mut A) {
        let mut performer = Performer { actor, state: &mut self.state };
        let consumed = self.vt.advance_until_terminated(bytes, &mut performer);

        if std::mem::take(&mut self.state.paused) {
            // The trigger byte is a newline that produced no event; it
            // replays on resume, when the pause predicate is polled
            // again.
            self.pending.extend_from_slice(&bytes[consumed - 1..]);
        }
    }
}

/// Adapter between the byte-level state machine events and the
/// semantic dispatch modules.
struct Performer<'a, A: Actor> {
    actor: &'a mut A,
    state: &'a mut ParseState,
}

impl<A: Actor> VtActor for Performer<'_, A> {
    fn print(&mut self, c: char) {
        self.state.flush_deferred_cr(self.actor);
        self.state.last_preceding_char = Some(c);
        self.actor.print(c);
    }

    fn execute(&mut self, byte: u8) {
        control::perform(byte, self.actor, self.state);
    }

    fn hook(
        &mut self,
        params: &[i64],
        intermediates: &[u8],
        _ignored_excess_intermediates: bool,
        byte: u8,
    ) {
        self.state.flush_deferred_cr(self.actor);
        self.state.flush_error_output_end(self.actor);
        self.state.dcs =
            Some(DcsHandler::hook(params, intermediates, byte));
    }

    fn put(&mut self, byte: u8) {
        if let Some(dcs) = &mut self.state.dcs {
            dcs.put(byte);
        }
    }

    fn unhook(&mut self) {
        if let Some(dcs) = self.state.dcs.take() {
            dcs.unhook(self.actor);
        }
    }

    fn osc_dispatch(&mut self, params: &[&[u8]]) {
        self.state.flush_deferred_cr(self.actor);
        self.state.flush_error_output_end(self.actor);
        osc::perform(self.actor, params);
    }

    fn csi_dispatch(
        &mut self,
        params: &[CsiParam],
        parameters_truncated: bool,
        byte: u8,
    ) {
        self.state.flush_deferred_cr(self.actor);
        // The errout-end flush happens inside, where `CSI 12 u` can
        // still cancel it.
        csi::perform(
            self.actor,
            self.state,
            params,
            parameters_truncated,
            byte,
        );
    }

    fn esc_dispatch(
        &mut self,
        intermediates: &[u8],
        _ignored_excess_intermediates: bool,
        byte: u8,
    ) {
        self.state.flush_deferred_cr(self.actor);
        self.state.flush_error_output_end(self.actor);
        esc::perform(self.actor, intermediates, byte);
    }

    fn terminated(&self) -> bool {
        self.state.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{CommandGroup, Hyperlink, TitleKind};
    use crate::attributes::Attr;
    use crate::charset::{Charset, CharsetIndex};
    use crate::cursor::{CursorShape, CursorStyle};
    use crate::mode::{AutomaticNewline, NamedPrivateMode, PrivateMode};

    #[derive(Debug, PartialEq)]
    enum Event {
        Print(char),
        CarriageReturn,
        CarriageReturnLinefeed,
        Linefeed,
        SetTitle(String, TitleKind),
        SetHyperlink(Option<Hyperlink>),
        ReportDynamicColor(usize),
        SetAutomaticNewline(AutomaticNewline),
        SetPrivateMode(PrivateMode),
        UnsetPrivateMode(PrivateMode),
        Attribute(Attr),
        SetCursorStyle(Option<CursorStyle>),
        ConfigureCharset(Charset, CharsetIndex),
        SoftReset,
        StartErrorOutput,
        EndErrorOutput,
        StartPrompt(bool),
        StartInput(u16),
        StartCommandGroup(CommandGroup, Option<String>),
        SixelGraphic(usize, usize),
        RequestStatusString(Vec<u8>),
    }

    #[derive(Default)]
    struct RecordingActor {
        events: Vec<Event>,
        pause: bool,
        mode_47: bool,
    }

    impl Actor for RecordingActor {
        fn print(&mut self, c: char) {
            self.events.push(Event::Print(c));
        }

        fn pause_needed(&mut self) -> bool {
            self.pause
        }

        fn carriage_return(&mut self) {
            self.events.push(Event::CarriageReturn);
        }

        fn carriage_return_linefeed(&mut self) {
            self.events.push(Event::CarriageReturnLinefeed);
        }

        fn linefeed(&mut self) {
            self.events.push(Event::Linefeed);
        }

        fn set_window_title(&mut self, title: &str, kind: TitleKind) {
            self.events.push(Event::SetTitle(title.to_owned(), kind));
        }

        fn set_hyperlink(&mut self, link: Option<Hyperlink>) {
            self.events.push(Event::SetHyperlink(link));
        }

        fn report_dynamic_color(&mut self, code: usize) {
            self.events.push(Event::ReportDynamicColor(code));
        }

        fn set_automatic_newline(&mut self, mask: AutomaticNewline) {
            self.events.push(Event::SetAutomaticNewline(mask));
        }

        fn set_private_mode(&mut self, mode: PrivateMode) {
            self.events.push(Event::SetPrivateMode(mode));
        }

        fn unset_private_mode(&mut self, mode: PrivateMode) {
            self.events.push(Event::UnsetPrivateMode(mode));
        }

        fn private_mode(&mut self, mode: PrivateMode) -> bool {
            mode.raw() == 47 && self.mode_47
        }

        fn terminal_attribute(&mut self, attr: Attr) {
            self.events.push(Event::Attribute(attr));
        }

        fn set_cursor_style(&mut self, style: Option<CursorStyle>) {
            self.events.push(Event::SetCursorStyle(style));
        }

        fn configure_charset(
            &mut self,
            charset: Charset,
            index: CharsetIndex,
        ) {
            self.events.push(Event::ConfigureCharset(charset, index));
        }

        fn soft_reset(&mut self) {
            self.events.push(Event::SoftReset);
        }

        fn start_error_output(&mut self) {
            self.events.push(Event::StartErrorOutput);
        }

        fn end_error_output(&mut self) {
            self.events.push(Event::EndErrorOutput);
        }

        fn start_prompt(&mut self, continuation: bool) {
            self.events.push(Event::StartPrompt(continuation));
        }

        fn start_input(&mut self, submode: u16) {
            self.events.push(Event::StartInput(submode));
        }

        fn start_command_group(
            &mut self,
            op: CommandGroup,
            key: Option<&str>,
        ) {
            self.events
                .push(Event::StartCommandGroup(op, key.map(str::to_owned)));
        }

        fn sixel_graphic(&mut self, image: webvt_sixel::SixelDecoder) {
            self.events
                .push(Event::SixelGraphic(image.width(), image.height()));
        }

        fn request_status_string(&mut self, payload: &[u8]) {
            self.events.push(Event::RequestStatusString(payload.to_vec()));
        }
    }

    fn parse(input: &[u8]) -> Vec<Event> {
        let mut parser = Parser::new();
        let mut actor = RecordingActor::default();
        parser.advance(input, &mut actor);
        actor.events
    }

    #[test]
    fn crlf_is_reported_as_one_unit() {
        assert_eq!(
            parse(b"a\r\nb"),
            vec![
                Event::Print('a'),
                Event::CarriageReturnLinefeed,
                Event::Print('b'),
            ]
        );
    }

    #[test]
    fn crlf_merges_across_chunk_boundaries() {
        let mut parser = Parser::new();
        let mut actor = RecordingActor::default();
        parser.advance(b"a\r", &mut actor);
        assert_eq!(actor.events, vec![Event::Print('a')]);
        parser.advance(b"\nb", &mut actor);
        assert_eq!(
            actor.events,
            vec![
                Event::Print('a'),
                Event::CarriageReturnLinefeed,
                Event::Print('b'),
            ]
        );
    }

    #[test]
    fn bare_cr_is_flushed_before_other_events() {
        assert_eq!(
            parse(b"a\rb"),
            vec![
                Event::Print('a'),
                Event::CarriageReturn,
                Event::Print('b'),
            ]
        );
        assert_eq!(
            parse(b"\r\r\n"),
            vec![Event::CarriageReturn, Event::CarriageReturnLinefeed]
        );
    }

    #[test]
    fn repeat_with_an_absurd_count_is_capped() {
        let events = parse(b"A\x1b[2000000000b");
        assert_eq!(events.len(), 1 + 65_535);
        assert!(events.iter().all(|event| *event == Event::Print('A')));
    }

    #[test]
    fn pause_buffers_the_newline_and_replays_it() {
        let mut parser = Parser::new();
        let mut actor = RecordingActor { pause: true, ..Default::default() };

        parser.advance(b"x\nyz", &mut actor);
        assert_eq!(actor.events, vec![Event::Print('x')]);
        assert!(parser.has_pending());

        // Still paused: nothing more comes out.
        parser.advance(b"", &mut actor);
        assert_eq!(actor.events, vec![Event::Print('x')]);

        actor.pause = false;
        parser.advance(b"", &mut actor);
        assert_eq!(
            actor.events,
            vec![
                Event::Print('x'),
                Event::Linefeed,
                Event::Print('y'),
                Event::Print('z'),
            ]
        );
        assert!(!parser.has_pending());
    }

    #[test]
    fn repeat_preceding_character() {
        assert_eq!(
            parse(b"ab\x1b[3b"),
            vec![
                Event::Print('a'),
                Event::Print('b'),
                Event::Print('b'),
                Event::Print('b'),
                Event::Print('b'),
            ]
        );
    }

    #[test]
    fn window_title() {
        assert_eq!(
            parse(b"\x1b]2;hello;world\x1b\\"),
            vec![Event::SetTitle("hello;world".into(), TitleKind::Window)]
        );
    }

    #[test]
    fn hyperlink_with_semicolons_in_uri() {
        assert_eq!(
            parse(b"\x1b]8;id=readme;https://example.com/a;b\x07"),
            vec![Event::SetHyperlink(Some(Hyperlink {
                id: Some("readme".into()),
                uri: "https://example.com/a;b".into(),
            }))]
        );
        assert_eq!(
            parse(b"\x1b]8;;\x07"),
            vec![Event::SetHyperlink(None)]
        );
    }

    #[test]
    fn dynamic_color_query() {
        assert_eq!(
            parse(b"\x1b]10;?\x07"),
            vec![Event::ReportDynamicColor(10)]
        );
    }

    #[test]
    fn automatic_newline_mode() {
        assert_eq!(
            parse(b"\x1b[20h"),
            vec![Event::SetAutomaticNewline(AutomaticNewline::all())]
        );
        assert_eq!(
            parse(b"\x1b[20;1h"),
            vec![Event::SetAutomaticNewline(AutomaticNewline::ON_OUTPUT)]
        );
        assert_eq!(
            parse(b"\x1b[20l"),
            vec![Event::SetAutomaticNewline(AutomaticNewline::empty())]
        );
    }

    #[test]
    fn sgr_colon_subparameters() {
        assert_eq!(
            parse(b"\x1b[4:3m"),
            vec![Event::Attribute(Attr::Undercurl)]
        );
    }

    #[test]
    fn soft_reset_and_cursor_style() {
        assert_eq!(parse(b"\x1b[!p"), vec![Event::SoftReset]);
        assert_eq!(
            parse(b"\x1b[4 q"),
            vec![Event::SetCursorStyle(Some(CursorStyle {
                shape: CursorShape::Underline,
                blinking: false,
            }))]
        );
    }

    #[test]
    fn charset_designation() {
        assert_eq!(
            parse(b"\x1b(0"),
            vec![Event::ConfigureCharset(
                Charset::DecLineDrawing,
                CharsetIndex::G0
            )]
        );
    }

    #[test]
    fn error_output_end_is_cancelled_by_restart() {
        // End then immediate restart collapses to nothing.
        assert_eq!(parse(b"\x1b[11u\x1b[12u"), vec![]);
        // End followed by anything else becomes effective.
        assert_eq!(
            parse(b"\x1b[11u\x1b[0m"),
            vec![Event::EndErrorOutput, Event::Attribute(Attr::Reset)]
        );
        assert_eq!(parse(b"\x1b[12u"), vec![Event::StartErrorOutput]);
    }

    #[test]
    fn prompt_and_command_group_marks() {
        assert_eq!(
            parse(b"\x1b[14u\x1b[15;2u"),
            vec![Event::StartPrompt(false), Event::StartInput(2)]
        );
        assert_eq!(
            parse(b"\x1b[19u"),
            vec![Event::StartCommandGroup(CommandGroup::Sibling, None)]
        );
        assert_eq!(
            parse(b"\x1b]133;A\x07"),
            vec![Event::StartPrompt(false)]
        );
        assert_eq!(
            parse(b"\x1b]120;key\x07"),
            vec![Event::StartCommandGroup(
                CommandGroup::Child,
                Some("key".into())
            )]
        );
    }

    #[test]
    fn save_and_restore_private_modes() {
        let mut parser = Parser::new();
        let mut actor = RecordingActor { mode_47: true, ..Default::default() };

        // Restoring before anything was saved is a no-op.
        parser.advance(b"\x1b[?47r", &mut actor);
        assert_eq!(actor.events, vec![]);

        parser.advance(b"\x1b[?47;2004s\x1b[?47;2004r", &mut actor);
        assert_eq!(
            actor.events,
            vec![
                Event::SetPrivateMode(PrivateMode::Named(
                    NamedPrivateMode::AlternateScreen
                )),
                Event::UnsetPrivateMode(PrivateMode::Named(
                    NamedPrivateMode::BracketedPaste
                )),
            ]
        );
    }

    #[test]
    fn sixel_device_control_string() {
        // Two columns, every bit set in the first band.
        assert_eq!(
            parse(b"\x1bPq#1~~\x1b\\"),
            vec![Event::SixelGraphic(2, 6)]
        );
    }

    #[test]
    fn status_string_request() {
        assert_eq!(
            parse(b"\x1bP$q\"p\x1b\\"),
            vec![Event::RequestStatusString(b"\"p".to_vec())]
        );
    }
}
