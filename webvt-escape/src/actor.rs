//! High-level escape sequence consumer interface.
//!
//! The [`Parser`](crate::Parser) translates the raw byte stream into semantic
//! events and relays them to an [`Actor`] implementation.  Downstream crates
//! can implement this trait to mutate their terminal model, update UI state or
//! collect metrics without re-implementing the escape sequence finite state
//! machine.

use webvt_sixel::SixelDecoder;

use crate::{
    attributes::Attr,
    charset::{Charset, CharsetIndex},
    color::Rgb,
    cursor::CursorStyle,
    mode::{
        AutomaticNewline, ClearMode, LineClearMode, Mode, PrivateMode,
        TabClearMode,
    },
};

/// Which title slot an OSC title sequence addresses.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TitleKind {
    /// OSC 0, both icon label and window title.
    IconAndWindow,
    /// OSC 1, icon label only.
    Icon,
    /// OSC 2, window title only.
    Window,
    /// OSC 30, per-buffer name.
    Buffer,
}

/// Relationship of a newly opened command group to the current one.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CommandGroup {
    /// Close the current group and open a sibling.
    Sibling,
    /// Open a nested group.
    Child,
    /// Exit the current group without opening a new one.
    Exit,
}

/// Pretty-printing linebreak kinds.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BreakKind {
    Fill,
    Linear,
    Miser,
    Required,
}

/// Pretty-printing indentation adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrettyIndent {
    /// Delta relative to the current position.
    Relative(i64),
    /// Delta relative to the block start.
    BlockRelative(i64),
    /// Literal indentation string.
    Literal(String),
}

/// Temporary auto-paging requests carried by the `u` sub-protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AutoPaging {
    /// Enable paging until the current command finishes.
    Temporary,
    /// Mark the current output position as the temporary boundary.
    MarkOutput,
}

/// An OSC 8 hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// Identifier for the given hyperlink, from the `id=` parameter.
    pub id: Option<String>,
    /// Resource identifier of the hyperlink.
    pub uri: String,
}

/// Trait implemented by consumers of the escape sequence parser.
///
/// All methods have a default empty implementation so that downstream crates
/// only need to override the variants they actually care about.  The parser
/// will invoke these callbacks synchronously while it walks through the input
/// byte stream.
pub trait Actor {
    /// Emits a printable Unicode scalar value.
    fn print(&mut self, _: char) {}

    /// Asked before every newline-class control; returning `true`
    /// suspends parsing. The unconsumed input, starting with the
    /// newline itself, is buffered and replayed on the next
    /// [`Parser::advance`](crate::Parser::advance) call.
    fn pause_needed(&mut self) -> bool {
        false
    }

    fn put_tab(&mut self, _count: u16) {}

    fn backspace(&mut self) {}

    fn bell(&mut self) {}

    fn substitute(&mut self) {}

    fn linefeed(&mut self) {}

    fn carriage_return(&mut self) {}

    /// A `\r\n` pair observed as a unit. The model may treat it as a
    /// single line-start operation (or, inside a pretty-print group, as
    /// a forced linebreak); the default is the two component events.
    fn carriage_return_linefeed(&mut self) {
        self.carriage_return();
        self.linefeed();
    }

    /// NEL, a linefeed that always returns to column 0.
    fn next_line(&mut self) {}

    fn set_active_charset(&mut self, _: CharsetIndex) {}

    fn configure_charset(&mut self, _: Charset, _: CharsetIndex) {}

    /// SS2/SS3, map only the next printed character through the given
    /// G-set.
    fn single_shift(&mut self, _: CharsetIndex) {}

    fn set_horizontal_tab(&mut self) {}

    fn reverse_index(&mut self) {}

    /// DA1 (`None`), DA2 (`Some('>')`) or DA3 (`Some('=')`).
    fn identify_terminal(&mut self, _intermediate: Option<char>) {}

    /// RIS, full reset.
    fn reset_state(&mut self) {}

    /// DECSTR, soft reset: modes and attributes only, the screen
    /// contents survive.
    fn soft_reset(&mut self) {}

    fn save_cursor_position(&mut self) {}

    fn restore_cursor_position(&mut self) {}

    fn screen_alignment_display(&mut self) {}

    fn set_keypad_application_mode(&mut self) {}

    fn unset_keypad_application_mode(&mut self) {}

    // --- CSI cursor and erase operations ---

    fn insert_blank(&mut self, _count: usize) {}

    fn move_up(&mut self, _rows: usize) {}

    fn move_down(&mut self, _rows: usize) {}

    fn move_forward(&mut self, _cols: usize) {}

    fn move_backward(&mut self, _cols: usize) {}

    fn move_down_and_cr(&mut self, _rows: usize) {}

    fn move_up_and_cr(&mut self, _rows: usize) {}

    fn goto(&mut self, _line: i32, _col: usize) {}

    fn goto_line(&mut self, _line: i32) {}

    fn goto_col(&mut self, _col: usize) {}

    fn move_forward_tabs(&mut self, _count: u16) {}

    fn move_backward_tabs(&mut self, _count: u16) {}

    fn clear_screen(&mut self, _mode: ClearMode) {}

    fn clear_line(&mut self, _mode: LineClearMode) {}

    fn clear_tabs(&mut self, _mode: TabClearMode) {}

    fn insert_blank_lines(&mut self, _count: usize) {}

    fn delete_lines(&mut self, _count: usize) {}

    fn delete_chars(&mut self, _count: usize) {}

    fn erase_chars(&mut self, _count: usize) {}

    fn scroll_up(&mut self, _count: usize) {}

    fn scroll_down(&mut self, _count: usize) {}

    fn set_scrolling_region(&mut self, _top: usize, _bottom: Option<usize>) {}

    // --- modes, attributes, reports ---

    fn set_mode(&mut self, _mode: Mode) {}

    fn unset_mode(&mut self, _mode: Mode) {}

    fn set_private_mode(&mut self, _mode: PrivateMode) {}

    fn unset_private_mode(&mut self, _mode: PrivateMode) {}

    /// Current value of a private mode, polled when the host saves
    /// private modes with `CSI ? ... s`.
    fn private_mode(&mut self, _mode: PrivateMode) -> bool {
        false
    }

    /// ANSI mode 20; an empty mask disables the emulation entirely.
    fn set_automatic_newline(&mut self, _mask: AutomaticNewline) {}

    fn terminal_attribute(&mut self, _attr: Attr) {}

    fn set_cursor_style(&mut self, _style: Option<CursorStyle>) {}

    /// DSR; `arg` selects the report, `private` marks the `?` form.
    fn device_status(&mut self, _arg: usize, _private: bool) {}

    /// `CSI ? Pi;Pa S`, a query for sixel/ReGIS graphics geometry.
    fn graphics_attribute_request(&mut self, _item: u16) {}

    /// DECREQTPARM.
    fn request_terminal_parameters(&mut self, _arg: u16) {}

    // --- window manipulation (XTWINOPS) ---

    fn deiconify_window(&mut self) {}

    fn iconify_window(&mut self) {}

    fn resize_window(&mut self, _lines: usize, _cols: usize) {}

    fn text_area_size_pixels(&mut self) {}

    fn text_area_size_chars(&mut self) {}

    fn push_title(&mut self) {}

    fn pop_title(&mut self) {}

    // --- shell integration (`u` sub-protocol and OSC 133) ---

    fn start_error_output(&mut self) {}

    fn end_error_output(&mut self) {}

    /// Begin a prompt region; `continuation` marks the multi-line
    /// continuation variant.
    fn start_prompt(&mut self, _continuation: bool) {}

    /// End the prompt region. With `hide_value` the accumulated prompt
    /// text is frozen into a non-selectable attribute.
    fn end_prompt(&mut self, _hide_value: bool) {}

    /// Begin the editable input region; `submode` describes the
    /// client's line-editing capability (0 none, 1 single-line, 2
    /// multi-line).
    fn start_input(&mut self, _submode: u16) {}

    /// End of input, start of command output.
    fn start_command_output(&mut self) {}

    /// Command finished, with its exit code when reported.
    fn command_finished(&mut self, _exit_code: Option<i64>) {}

    fn push_hider(&mut self) {}

    fn pop_hider(&mut self) {}

    fn pop_element(&mut self) {}

    fn fresh_line(&mut self) {}

    fn start_command_group(&mut self, _op: CommandGroup, _key: Option<&str>) {}

    fn set_input_mode(&mut self, _mode: u16) {}

    fn report_window_contents(&mut self) {}

    fn open_pane(&mut self, _op: u16, _options: u16) {}

    fn set_session_number(&mut self, _number: u16) {}

    fn set_auto_paging(&mut self, _mode: AutoPaging) {}

    /// Flow-control accounting: the host asserts how many bytes have
    /// been received and confirmed.
    fn set_received_count(&mut self, _count: i64) {}

    fn eof_seen(&mut self) {}

    // --- OSC operations ---

    fn set_window_title(&mut self, _title: &str, _kind: TitleKind) {}

    fn set_working_directory(&mut self, _url: &str) {}

    fn set_process_id(&mut self, _pid: &str) {}

    fn set_hyperlink(&mut self, _link: Option<Hyperlink>) {}

    fn set_dynamic_color(&mut self, _code: usize, _color: Rgb) {}

    /// Dynamic color query (`OSC code;?`); the model answers with
    /// `OSC code;rgb:rrrr/gggg/bbbb ST` through its response sink.
    fn report_dynamic_color(&mut self, _code: usize) {}

    fn reset_color(&mut self, _index: usize) {}

    /// OSC 52 with a decoded payload.
    fn clipboard_store(&mut self, _clipboard: u8, _payload: &[u8]) {}

    fn clipboard_load(&mut self, _clipboard: u8) {}

    /// OSC 72; sanitizing and inserting the markup is the model's
    /// concern.
    fn insert_html(&mut self, _html: &str) {}

    fn start_pretty_print_group(&mut self, _prefix: Option<String>) {}

    fn end_pretty_print_group(&mut self) {}

    fn pretty_print_indent(&mut self, _indent: PrettyIndent) {}

    fn pretty_print_break(
        &mut self,
        _kind: BreakKind,
        _pre: Option<String>,
        _post: Option<String>,
        _nobreak: Option<String>,
    ) {
    }

    fn set_continuation_prompt(&mut self, _pattern: &str) {}

    // --- DCS operations ---

    /// A completed sixel image. The decoder still owns the band data;
    /// the model blits it with
    /// [`SixelDecoder::to_pixel_data`](webvt_sixel::SixelDecoder::to_pixel_data).
    fn sixel_graphic(&mut self, _image: SixelDecoder) {}

    /// DECRQSS payload; the model answers `DCS 1 $ r ... ST` or
    /// `DCS 0 $ r ST`.
    fn request_status_string(&mut self, _payload: &[u8]) {}
}
