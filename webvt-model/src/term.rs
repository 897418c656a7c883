//! Reference terminal model.
//!
//! [`TermModel`] implements [`webvt_escape::Actor`] over a plain cell
//! grid.  It is the in-memory answer to "what should the screen look
//! like after these bytes": integration tests drive it through the
//! parser, and embedders can use it as a starting point for their own
//! surface types.

use std::collections::HashMap;
use std::mem;
use std::ops::Range;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use unicode_width::UnicodeWidthChar;
use webvt_escape::{
    Actor, Attr, AutoPaging, AutomaticNewline, BreakKind, Charset,
    CharsetIndex, ClearMode, CommandGroup, CursorShape, CursorStyle,
    Hyperlink, LineClearMode, Mode, NamedMode, NamedPrivateMode, PrettyIndent,
    PrivateMode, Rgb, TabClearMode, TitleKind,
};
use webvt_sixel::{Rgba, SixelDecoder};

use crate::cell::{Cell, CellAttributes, CellBlink, CellFlags, CellUnderline};
use crate::mode::TermMode;
use crate::segment::{Segment, segments};

/// Interval between default tab stops.
const TAB_INTERVAL: usize = 8;

/// Maximum number of entries the XTWINOPS title stack holds.
const TITLE_STACK_MAX_DEPTH: usize = 4096;

/// Nominal cell geometry reported by pixel-unit window queries.
const CELL_WIDTH_PX: usize = 8;
const CELL_HEIGHT_PX: usize = 16;

const DEFAULT_FOREGROUND: Rgb = Rgb { r: 0xff, g: 0xff, b: 0xff };
const DEFAULT_BACKGROUND: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// A decoded sixel image anchored to a grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedImage {
    /// Grid line of the image's top-left corner.
    pub line: usize,
    /// Grid column of the image's top-left corner.
    pub column: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Row-major RGBA pixels, `width * height` of them.
    pub pixels: Vec<Rgba>,
}

/// Shell-integration bookkeeping maintained by the prompt/output
/// demarcation sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    pub in_prompt: bool,
    pub in_input: bool,
    pub in_error_output: bool,
    /// Exit code of the most recently finished command, when reported.
    pub last_exit_code: Option<i64>,
    /// Nesting depth of open command groups.
    pub group_depth: usize,
    /// Nesting depth of open hide-buttons.
    pub hider_depth: usize,
    /// Nesting depth of open pretty-printing groups.
    pub pretty_depth: usize,
    pub eof_seen: bool,
}

#[derive(Debug, Clone)]
struct Cursor {
    line: usize,
    column: usize,
    /// The last printable write filled the final column; the next one
    /// wraps first.
    input_needs_wrap: bool,
    template: CellAttributes,
    charsets: [Charset; 4],
    /// Origin mode at save time, restored by DECRC.
    origin: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            line: 0,
            column: 0,
            input_needs_wrap: false,
            template: CellAttributes::default(),
            charsets: [Charset::default(); 4],
            origin: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Grid {
    lines: usize,
    columns: usize,
    cells: Vec<Vec<Cell>>,
    cursor: Cursor,
    saved_cursor: Cursor,
}

impl Grid {
    fn new(lines: usize, columns: usize) -> Self {
        let template = CellAttributes::default();
        Self {
            lines,
            columns,
            cells: (0..lines).map(|_| blank_row(columns, &template)).collect(),
            cursor: Cursor::default(),
            saved_cursor: Cursor::default(),
        }
    }

    /// Blank every cell, keeping the cursor where it is.
    fn reset_cells(&mut self, template: &CellAttributes) {
        for row in &mut self.cells {
            for cell in row.iter_mut() {
                *cell = Cell::blank(template);
            }
        }
    }
}

fn blank_row(columns: usize, template: &CellAttributes) -> Vec<Cell> {
    (0..columns).map(|_| Cell::blank(template)).collect()
}

struct TabStops {
    stops: Vec<bool>,
}

impl TabStops {
    fn new(columns: usize) -> Self {
        Self {
            stops: (0..columns).map(|i| i % TAB_INTERVAL == 0).collect(),
        }
    }

    fn is_set(&self, column: usize) -> bool {
        self.stops.get(column).copied().unwrap_or(false)
    }

    fn set(&mut self, column: usize) {
        if let Some(stop) = self.stops.get_mut(column) {
            *stop = true;
        }
    }

    fn clear(&mut self, column: usize) {
        if let Some(stop) = self.stops.get_mut(column) {
            *stop = false;
        }
    }

    fn clear_all(&mut self) {
        self.stops.fill(false);
    }

    fn resize(&mut self, columns: usize) {
        let mut index = self.stops.len();
        self.stops.resize_with(columns, || {
            let is_stop = index % TAB_INTERVAL == 0;
            index += 1;
            is_stop
        });
    }
}

/// Reference screen state driven by the escape parser.
pub struct TermModel {
    grid: Grid,
    inactive_grid: Grid,
    mode: TermMode,
    scroll_region: Range<usize>,
    tabs: TabStops,
    active_charset: CharsetIndex,
    single_shift: Option<CharsetIndex>,
    cursor_style: Option<CursorStyle>,

    title: Option<String>,
    icon_title: Option<String>,
    buffer_name: Option<String>,
    title_stack: Vec<Option<String>>,

    dynamic_colors: HashMap<usize, Rgb>,
    palette: HashMap<usize, Rgb>,
    clipboards: HashMap<u8, Vec<u8>>,

    automatic_newline: AutomaticNewline,
    working_directory: Option<String>,
    process_id: Option<String>,
    continuation_prompt: Option<String>,
    input_mode: u16,
    session_number: u16,
    received_count: i64,
    shell: ShellState,
    last_html: Option<String>,

    images: Vec<PlacedImage>,
    bell_count: usize,

    /// Pause after this many scrolled/fed lines, when set.
    page_limit: Option<usize>,
    lines_since_resume: usize,

    responses: Vec<u8>,
}

impl Default for TermModel {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl TermModel {
    #[must_use]
    pub fn new(lines: usize, columns: usize) -> Self {
        let lines = lines.max(1);
        let columns = columns.max(2);
        Self {
            grid: Grid::new(lines, columns),
            inactive_grid: Grid::new(lines, columns),
            mode: TermMode::default(),
            scroll_region: 0..lines,
            tabs: TabStops::new(columns),
            active_charset: CharsetIndex::default(),
            single_shift: None,
            cursor_style: None,
            title: None,
            icon_title: None,
            buffer_name: None,
            title_stack: Vec::new(),
            dynamic_colors: HashMap::new(),
            palette: HashMap::new(),
            clipboards: HashMap::new(),
            automatic_newline: AutomaticNewline::empty(),
            working_directory: None,
            process_id: None,
            continuation_prompt: None,
            input_mode: 0,
            session_number: 0,
            received_count: 0,
            shell: ShellState::default(),
            last_html: None,
            images: Vec::new(),
            bell_count: 0,
            page_limit: None,
            lines_since_resume: 0,
            responses: Vec::new(),
        }
    }

    // --- inspection ---

    #[must_use]
    pub fn lines(&self) -> usize {
        self.grid.lines
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.grid.columns
    }

    #[must_use]
    pub fn cell(&self, line: usize, column: usize) -> &Cell {
        &self.grid.cells[line][column]
    }

    /// Cursor position as `(line, column)`.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        (self.grid.cursor.line, self.grid.cursor.column)
    }

    #[must_use]
    pub fn mode(&self) -> TermMode {
        self.mode
    }

    #[must_use]
    pub fn cursor_style(&self) -> Option<CursorStyle> {
        self.cursor_style
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn icon_title(&self) -> Option<&str> {
        self.icon_title.as_deref()
    }

    #[must_use]
    pub fn buffer_name(&self) -> Option<&str> {
        self.buffer_name.as_deref()
    }

    #[must_use]
    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    #[must_use]
    pub fn process_id(&self) -> Option<&str> {
        self.process_id.as_deref()
    }

    #[must_use]
    pub fn continuation_prompt(&self) -> Option<&str> {
        self.continuation_prompt.as_deref()
    }

    #[must_use]
    pub fn input_mode(&self) -> u16 {
        self.input_mode
    }

    #[must_use]
    pub fn session_number(&self) -> u16 {
        self.session_number
    }

    #[must_use]
    pub fn received_count(&self) -> i64 {
        self.received_count
    }

    #[must_use]
    pub fn shell(&self) -> &ShellState {
        &self.shell
    }

    #[must_use]
    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }

    #[must_use]
    pub fn bell_count(&self) -> usize {
        self.bell_count
    }

    #[must_use]
    pub fn last_html(&self) -> Option<&str> {
        self.last_html.as_deref()
    }

    /// Text content of one line, spacer cells skipped, trailing blanks
    /// trimmed.
    #[must_use]
    pub fn row_text(&self, line: usize) -> String {
        let mut text = String::new();
        for cell in &self.grid.cells[line] {
            if cell.flags.contains(CellFlags::WIDE_CHAR_SPACER) {
                continue;
            }
            text.push(cell.ch);
            text.extend(cell.zerowidth.iter());
        }
        text.truncate(text.trim_end().len());
        text
    }

    /// Drain the bytes queued as answers to host queries (DA, DSR,
    /// DECRQSS, dynamic-color and clipboard reads).
    pub fn take_responses(&mut self) -> Vec<u8> {
        mem::take(&mut self.responses)
    }

    // --- paging ---

    /// Pause output after `limit` line feeds; `None` disables paging.
    pub fn set_page_limit(&mut self, limit: Option<usize>) {
        self.page_limit = limit;
        self.lines_since_resume = 0;
    }

    /// Acknowledge a pause and allow the next page through.
    pub fn resume_paging(&mut self) {
        self.lines_since_resume = 0;
    }

    // --- text insertion ---

    /// Write a string directly, honoring grapheme cluster boundaries.
    ///
    /// Cluster continuation code points land in the zero-width list of
    /// their base cell, so one user-perceived character stays one cell.
    pub fn insert_text(&mut self, text: &str) {
        for segment in segments(text) {
            match segment {
                Segment::Simple(run) => {
                    for c in run.chars() {
                        self.write_char(c, 1);
                    }
                },
                Segment::Cluster { text, width } => {
                    let mut chars = text.chars();
                    let Some(base) = chars.next() else { continue };
                    self.write_char(base, width);
                    for c in chars {
                        self.attach_zerowidth(c);
                    }
                },
            }
        }
    }

    // --- internals ---

    fn respond(&mut self, bytes: impl AsRef<[u8]>) {
        self.responses.extend_from_slice(bytes.as_ref());
    }

    fn charset_slot(index: CharsetIndex) -> usize {
        match index {
            CharsetIndex::G0 => 0,
            CharsetIndex::G1 => 1,
            CharsetIndex::G2 => 2,
            CharsetIndex::G3 => 3,
        }
    }

    fn map_char(&mut self, c: char) -> char {
        let index = self.single_shift.take().unwrap_or(self.active_charset);
        self.grid.cursor.charsets[Self::charset_slot(index)].map(c)
    }

    /// Blank the partner half when overwriting part of a wide
    /// character.
    fn unlink_wide(&mut self, line: usize, column: usize) {
        let flags = self.grid.cells[line][column].flags;
        let template = self.grid.cursor.template.clone();
        if flags.contains(CellFlags::WIDE_CHAR)
            && column + 1 < self.grid.columns
        {
            self.grid.cells[line][column + 1] = Cell::blank(&template);
        } else if flags.contains(CellFlags::WIDE_CHAR_SPACER) && column > 0 {
            self.grid.cells[line][column - 1] = Cell::blank(&template);
        }
    }

    fn wrapline(&mut self) {
        if !self.mode.contains(TermMode::LINE_WRAP) {
            return;
        }

        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        self.grid.cells[line][column].flags.insert(CellFlags::WRAPLINE);

        if line + 1 == self.scroll_region.end {
            self.scroll_up_region(self.scroll_region.start, 1);
        } else if line + 1 < self.grid.lines {
            self.grid.cursor.line = line + 1;
        }
        self.grid.cursor.column = 0;
        self.grid.cursor.input_needs_wrap = false;
    }

    fn write_char(&mut self, c: char, width: usize) {
        if self.grid.cursor.input_needs_wrap {
            self.wrapline();
        }

        let columns = self.grid.columns;
        if width == 2 && self.grid.cursor.column + 1 == columns {
            // Both halves have to land on the same line.
            if self.mode.contains(TermMode::LINE_WRAP) {
                let line = self.grid.cursor.line;
                let column = self.grid.cursor.column;
                let template = self.grid.cursor.template.clone();
                let spacer = &mut self.grid.cells[line][column];
                *spacer = Cell::blank(&template);
                spacer.flags.insert(CellFlags::WIDE_CHAR_SPACER);
                self.grid.cursor.input_needs_wrap = true;
                self.wrapline();
            } else {
                self.grid.cursor.column = columns - 2;
            }
        }

        if self.mode.contains(TermMode::INSERT) {
            self.insert_blank(width);
        }

        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        self.unlink_wide(line, column);
        if width == 2 {
            self.unlink_wide(line, column + 1);
        }

        let template = self.grid.cursor.template.clone();
        let mut cell = Cell::with_char(c, &template);
        if width == 2 {
            cell.flags.insert(CellFlags::WIDE_CHAR);
            let mut spacer = Cell::blank(&template);
            spacer.flags.insert(CellFlags::WIDE_CHAR_SPACER);
            self.grid.cells[line][column + 1] = spacer;
        }
        self.grid.cells[line][column] = cell;

        if column + width < columns {
            self.grid.cursor.column = column + width;
        } else {
            self.grid.cursor.column = columns - 1;
            self.grid.cursor.input_needs_wrap = true;
        }
    }

    fn attach_zerowidth(&mut self, c: char) {
        let line = self.grid.cursor.line;
        let mut column = self.grid.cursor.column;
        if !self.grid.cursor.input_needs_wrap {
            column = column.saturating_sub(1);
        }
        if column > 0
            && self.grid.cells[line][column]
                .flags
                .contains(CellFlags::WIDE_CHAR_SPACER)
        {
            column -= 1;
        }
        self.grid.cells[line][column].zerowidth.push(c);
    }

    /// Scroll lines out of the top of the `origin..region_end` span.
    fn scroll_up_region(&mut self, origin: usize, count: usize) {
        let end = self.scroll_region.end;
        if origin >= end {
            return;
        }
        let count = count.min(end - origin);
        let template = self.grid.cursor.template.clone();
        for _ in 0..count {
            self.grid.cells.remove(origin);
            self.grid
                .cells
                .insert(end - 1, blank_row(self.grid.columns, &template));
        }
    }

    /// Scroll lines into the top of the `origin..region_end` span.
    fn scroll_down_region(&mut self, origin: usize, count: usize) {
        let end = self.scroll_region.end;
        if origin >= end {
            return;
        }
        let count = count.min(end - origin);
        let template = self.grid.cursor.template.clone();
        for _ in 0..count {
            self.grid.cells.remove(end - 1);
            self.grid
                .cells
                .insert(origin, blank_row(self.grid.columns, &template));
        }
    }

    fn advance_line(&mut self) {
        self.lines_since_resume += 1;
        let next = self.grid.cursor.line + 1;
        if next == self.scroll_region.end {
            self.scroll_up_region(self.scroll_region.start, 1);
        } else if next < self.grid.lines {
            self.grid.cursor.line = next;
        }
    }

    fn clear_row_span(&mut self, line: usize, span: Range<usize>) {
        let template = self.grid.cursor.template.clone();
        for cell in &mut self.grid.cells[line][span] {
            *cell = Cell::blank(&template);
        }
    }

    fn swap_alt_screen(&mut self) {
        if !self.mode.contains(TermMode::ALT_SCREEN) {
            // Entering: the alternate screen starts out blank, with the
            // primary cursor carried over.
            self.inactive_grid.cursor = self.grid.cursor.clone();
            let template = self.grid.cursor.template.clone();
            self.inactive_grid.reset_cells(&template);
        }
        mem::swap(&mut self.grid, &mut self.inactive_grid);
        self.mode ^= TermMode::ALT_SCREEN;
        self.scroll_region = 0..self.grid.lines;
    }

    fn private_mode_flag(mode: NamedPrivateMode) -> Option<TermMode> {
        let flag = match mode {
            NamedPrivateMode::CursorKeys => TermMode::APP_CURSOR,
            NamedPrivateMode::ColumnMode => TermMode::COLUMN_132,
            NamedPrivateMode::ReverseVideo => TermMode::REVERSE_VIDEO,
            NamedPrivateMode::Origin => TermMode::ORIGIN,
            NamedPrivateMode::LineWrap => TermMode::LINE_WRAP,
            NamedPrivateMode::ReportMouseClicksX10 => TermMode::MOUSE_X10,
            NamedPrivateMode::BlinkingCursor => TermMode::BLINKING_CURSOR,
            NamedPrivateMode::ShowCursor => TermMode::SHOW_CURSOR,
            NamedPrivateMode::ReverseWrap => TermMode::REVERSE_WRAP,
            NamedPrivateMode::ReportMouseClicks => {
                TermMode::MOUSE_REPORT_CLICK
            },
            NamedPrivateMode::ReportMouseHighlight => {
                TermMode::MOUSE_HIGHLIGHT
            },
            NamedPrivateMode::ReportCellMouseMotion => TermMode::MOUSE_DRAG,
            NamedPrivateMode::ReportAllMouseMotion => TermMode::MOUSE_MOTION,
            NamedPrivateMode::ReportFocusInOut => TermMode::FOCUS_IN_OUT,
            NamedPrivateMode::Utf8Mouse => TermMode::UTF8_MOUSE,
            NamedPrivateMode::SgrMouse => TermMode::SGR_MOUSE,
            NamedPrivateMode::UrxvtMouse => TermMode::URXVT_MOUSE,
            NamedPrivateMode::BracketedPaste => TermMode::BRACKETED_PASTE,
            NamedPrivateMode::AlternateScreen
            | NamedPrivateMode::AlternateScreenBuffer
            | NamedPrivateMode::SwapScreenAndSetRestoreCursor => {
                TermMode::ALT_SCREEN
            },
            NamedPrivateMode::SaveRestoreCursor => return None,
        };
        Some(flag)
    }

    fn resize(&mut self, lines: usize, columns: usize) {
        let lines = lines.max(1);
        let columns = columns.max(2);
        for grid in [&mut self.grid, &mut self.inactive_grid] {
            let template = CellAttributes::default();
            grid.cells.resize_with(lines, || blank_row(columns, &template));
            for row in &mut grid.cells {
                row.resize_with(columns, || Cell::blank(&template));
            }
            grid.lines = lines;
            grid.columns = columns;
            grid.cursor.line = grid.cursor.line.min(lines - 1);
            grid.cursor.column = grid.cursor.column.min(columns - 1);
            grid.saved_cursor.line = grid.saved_cursor.line.min(lines - 1);
            grid.saved_cursor.column =
                grid.saved_cursor.column.min(columns - 1);
        }
        self.tabs.resize(columns);
        self.scroll_region = 0..lines;
    }
}

impl Actor for TermModel {
    fn print(&mut self, c: char) {
        let c = self.map_char(c);
        match c.width().unwrap_or(0) {
            0 => self.attach_zerowidth(c),
            width => self.write_char(c, width.min(2)),
        }
    }

    fn pause_needed(&mut self) -> bool {
        self.page_limit
            .is_some_and(|limit| self.lines_since_resume >= limit)
    }

    fn put_tab(&mut self, mut count: u16) {
        let columns = self.grid.columns;
        while self.grid.cursor.column + 1 < columns && count > 0 {
            count -= 1;
            loop {
                self.grid.cursor.column += 1;
                if self.grid.cursor.column + 1 == columns
                    || self.tabs.is_set(self.grid.cursor.column)
                {
                    break;
                }
            }
        }
    }

    fn backspace(&mut self) {
        if self.grid.cursor.column > 0 {
            self.grid.cursor.column -= 1;
            self.grid.cursor.input_needs_wrap = false;
        } else if self.mode.contains(TermMode::REVERSE_WRAP)
            && self.grid.cursor.line > self.scroll_region.start
        {
            self.grid.cursor.line -= 1;
            self.grid.cursor.column = self.grid.columns - 1;
        }
    }

    fn bell(&mut self) {
        self.bell_count += 1;
    }

    fn substitute(&mut self) {
        self.write_char('\u{fffd}', 1);
    }

    fn linefeed(&mut self) {
        if self.automatic_newline.contains(AutomaticNewline::ON_OUTPUT) {
            self.carriage_return();
        }
        self.advance_line();
    }

    fn carriage_return(&mut self) {
        self.grid.cursor.column = 0;
        self.grid.cursor.input_needs_wrap = false;
    }

    fn carriage_return_linefeed(&mut self) {
        self.carriage_return();
        self.advance_line();
    }

    fn next_line(&mut self) {
        self.carriage_return();
        self.advance_line();
    }

    fn set_active_charset(&mut self, index: CharsetIndex) {
        self.active_charset = index;
    }

    fn configure_charset(&mut self, charset: Charset, index: CharsetIndex) {
        self.grid.cursor.charsets[Self::charset_slot(index)] = charset;
    }

    fn single_shift(&mut self, index: CharsetIndex) {
        self.single_shift = Some(index);
    }

    fn set_horizontal_tab(&mut self) {
        self.tabs.set(self.grid.cursor.column);
    }

    fn reverse_index(&mut self) {
        if self.grid.cursor.line == self.scroll_region.start {
            self.scroll_down_region(self.scroll_region.start, 1);
        } else if self.grid.cursor.line > 0 {
            self.grid.cursor.line -= 1;
        }
    }

    fn identify_terminal(&mut self, intermediate: Option<char>) {
        match intermediate {
            // DA1: VT220-class with sixel and color support.
            None => self.respond("\x1b[?62;1;22c"),
            Some('>') => {
                let version = version_number(env!("CARGO_PKG_VERSION"));
                self.respond(format!("\x1b[>990;{version};0c"));
            },
            // DA3: the zero unit id.
            Some('=') => self.respond("\x1bP!|00000000\x1b\\"),
            Some(other) => {
                debug!("unhandled device attributes request {other:?}");
            },
        }
    }

    fn reset_state(&mut self) {
        let responses = mem::take(&mut self.responses);
        *self = Self::new(self.grid.lines, self.grid.columns);
        self.responses = responses;
    }

    fn soft_reset(&mut self) {
        self.mode = TermMode::default()
            | (self.mode & TermMode::ALT_SCREEN)
            | (self.mode & TermMode::COLUMN_132);
        self.scroll_region = 0..self.grid.lines;
        self.grid.cursor.template = CellAttributes::default();
        self.grid.cursor.charsets = [Charset::default(); 4];
        self.grid.cursor.input_needs_wrap = false;
        self.active_charset = CharsetIndex::G0;
        self.single_shift = None;
        self.cursor_style = None;
        self.grid.saved_cursor = self.grid.cursor.clone();
    }

    fn save_cursor_position(&mut self) {
        let mut saved = self.grid.cursor.clone();
        saved.origin = self.mode.contains(TermMode::ORIGIN);
        self.grid.saved_cursor = saved;
    }

    fn restore_cursor_position(&mut self) {
        let saved = self.grid.saved_cursor.clone();
        self.mode.set(TermMode::ORIGIN, saved.origin);
        self.grid.cursor = saved;
        // With origin mode restored the cursor must land inside the
        // current margins, which may have moved since the save.
        let (floor, ceil) = if self.mode.contains(TermMode::ORIGIN) {
            (self.scroll_region.start, self.scroll_region.end - 1)
        } else {
            (0, self.grid.lines - 1)
        };
        self.grid.cursor.line = self.grid.cursor.line.clamp(floor, ceil);
        self.grid.cursor.column =
            self.grid.cursor.column.min(self.grid.columns - 1);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn screen_alignment_display(&mut self) {
        let template = CellAttributes::default();
        for row in &mut self.grid.cells {
            for cell in row.iter_mut() {
                *cell = Cell::with_char('E', &template);
            }
        }
        self.scroll_region = 0..self.grid.lines;
        self.grid.cursor.line = 0;
        self.grid.cursor.column = 0;
        self.grid.cursor.input_needs_wrap = false;
    }

    fn set_keypad_application_mode(&mut self) {
        self.mode.insert(TermMode::APP_KEYPAD);
    }

    fn unset_keypad_application_mode(&mut self) {
        self.mode.remove(TermMode::APP_KEYPAD);
    }

    fn insert_blank(&mut self, count: usize) {
        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        let count = count.min(self.grid.columns - column);
        let template = self.grid.cursor.template.clone();
        let row = &mut self.grid.cells[line];
        for _ in 0..count {
            row.pop();
            row.insert(column, Cell::blank(&template));
        }
    }

    fn move_up(&mut self, rows: usize) {
        let line = self.grid.cursor.line;
        let floor = if line >= self.scroll_region.start {
            self.scroll_region.start
        } else {
            0
        };
        self.grid.cursor.line = line.saturating_sub(rows).max(floor);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn move_down(&mut self, rows: usize) {
        let line = self.grid.cursor.line;
        let ceiling = if line < self.scroll_region.end {
            self.scroll_region.end - 1
        } else {
            self.grid.lines - 1
        };
        self.grid.cursor.line = (line + rows).min(ceiling);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn move_forward(&mut self, cols: usize) {
        self.grid.cursor.column =
            (self.grid.cursor.column + cols).min(self.grid.columns - 1);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn move_backward(&mut self, cols: usize) {
        self.grid.cursor.input_needs_wrap = false;
        let wrap = self.mode.contains(TermMode::LINE_WRAP | TermMode::REVERSE_WRAP);
        let mut remaining = cols;
        while remaining > self.grid.cursor.column {
            if !wrap || self.grid.cursor.line <= self.scroll_region.start {
                self.grid.cursor.column = 0;
                return;
            }
            remaining -= self.grid.cursor.column + 1;
            self.grid.cursor.line -= 1;
            self.grid.cursor.column = self.grid.columns - 1;
        }
        self.grid.cursor.column -= remaining;
    }

    fn move_down_and_cr(&mut self, rows: usize) {
        self.move_down(rows);
        self.grid.cursor.column = 0;
    }

    fn move_up_and_cr(&mut self, rows: usize) {
        self.move_up(rows);
        self.grid.cursor.column = 0;
    }

    fn goto(&mut self, line: i32, col: usize) {
        let (base, max_line) = if self.mode.contains(TermMode::ORIGIN) {
            (self.scroll_region.start, self.scroll_region.end - 1)
        } else {
            (0, self.grid.lines - 1)
        };
        let line = (base as i64 + i64::from(line)).clamp(0, max_line as i64);
        self.grid.cursor.line = line as usize;
        self.grid.cursor.column = col.min(self.grid.columns - 1);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn goto_line(&mut self, line: i32) {
        let column = self.grid.cursor.column;
        self.goto(line, column);
    }

    fn goto_col(&mut self, col: usize) {
        self.grid.cursor.column = col.min(self.grid.columns - 1);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn move_forward_tabs(&mut self, count: u16) {
        self.put_tab(count);
        self.grid.cursor.input_needs_wrap = false;
    }

    fn move_backward_tabs(&mut self, count: u16) {
        for _ in 0..count {
            loop {
                if self.grid.cursor.column == 0 {
                    break;
                }
                self.grid.cursor.column -= 1;
                if self.tabs.is_set(self.grid.cursor.column) {
                    break;
                }
            }
        }
        self.grid.cursor.input_needs_wrap = false;
    }

    fn clear_screen(&mut self, mode: ClearMode) {
        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        let columns = self.grid.columns;
        match mode {
            ClearMode::Below => {
                self.clear_row_span(line, column..columns);
                for l in line + 1..self.grid.lines {
                    self.clear_row_span(l, 0..columns);
                }
            },
            ClearMode::Above => {
                for l in 0..line {
                    self.clear_row_span(l, 0..columns);
                }
                self.clear_row_span(line, 0..column + 1);
            },
            ClearMode::All => {
                for l in 0..self.grid.lines {
                    self.clear_row_span(l, 0..columns);
                }
            },
            // The model keeps no scrollback.
            ClearMode::Saved => {},
        }
    }

    fn clear_line(&mut self, mode: LineClearMode) {
        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        let columns = self.grid.columns;
        match mode {
            LineClearMode::Right => {
                self.clear_row_span(line, column..columns);
            },
            LineClearMode::Left => self.clear_row_span(line, 0..column + 1),
            LineClearMode::All => self.clear_row_span(line, 0..columns),
        }
    }

    fn clear_tabs(&mut self, mode: TabClearMode) {
        match mode {
            TabClearMode::Current => self.tabs.clear(self.grid.cursor.column),
            TabClearMode::All => self.tabs.clear_all(),
        }
    }

    fn insert_blank_lines(&mut self, count: usize) {
        let line = self.grid.cursor.line;
        if self.scroll_region.contains(&line) {
            self.scroll_down_region(line, count);
        }
    }

    fn delete_lines(&mut self, count: usize) {
        let line = self.grid.cursor.line;
        if self.scroll_region.contains(&line) {
            self.scroll_up_region(line, count);
        }
    }

    fn delete_chars(&mut self, count: usize) {
        self.grid.cursor.input_needs_wrap = false;
        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        let count = count.min(self.grid.columns - column);
        let template = self.grid.cursor.template.clone();
        let row = &mut self.grid.cells[line];
        for _ in 0..count {
            row.remove(column);
            row.push(Cell::blank(&template));
        }
    }

    fn erase_chars(&mut self, count: usize) {
        let line = self.grid.cursor.line;
        let column = self.grid.cursor.column;
        let end = (column + count).min(self.grid.columns);
        self.clear_row_span(line, column..end);
    }

    fn scroll_up(&mut self, count: usize) {
        self.scroll_up_region(self.scroll_region.start, count);
    }

    fn scroll_down(&mut self, count: usize) {
        self.scroll_down_region(self.scroll_region.start, count);
    }

    fn set_scrolling_region(&mut self, top: usize, bottom: Option<usize>) {
        let lines = self.grid.lines;
        let top = top.max(1) - 1;
        let bottom = bottom.unwrap_or(lines).min(lines);
        if top < bottom {
            self.scroll_region = top..bottom;
            self.goto(0, 0);
        } else {
            debug!("rejected scroll region {}..{}", top + 1, bottom);
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Named(NamedMode::Insert) => {
                self.mode.insert(TermMode::INSERT);
            },
            Mode::Named(NamedMode::AutomaticNewline) => {},
            Mode::Unknown(mode) => debug!("ignoring set of mode {mode}"),
        }
    }

    fn unset_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Named(NamedMode::Insert) => {
                self.mode.remove(TermMode::INSERT);
            },
            Mode::Named(NamedMode::AutomaticNewline) => {},
            Mode::Unknown(mode) => debug!("ignoring reset of mode {mode}"),
        }
    }

    fn set_private_mode(&mut self, mode: PrivateMode) {
        let PrivateMode::Named(named) = mode else {
            debug!("ignoring set of private mode {}", mode.raw());
            return;
        };
        match named {
            NamedPrivateMode::ColumnMode => {
                self.mode.insert(TermMode::COLUMN_132);
                self.clear_screen(ClearMode::All);
                self.scroll_region = 0..self.grid.lines;
                self.goto(0, 0);
            },
            NamedPrivateMode::Origin => {
                self.mode.insert(TermMode::ORIGIN);
                self.goto(0, 0);
            },
            NamedPrivateMode::AlternateScreen
            | NamedPrivateMode::AlternateScreenBuffer => {
                if !self.mode.contains(TermMode::ALT_SCREEN) {
                    self.swap_alt_screen();
                }
            },
            NamedPrivateMode::SwapScreenAndSetRestoreCursor => {
                if !self.mode.contains(TermMode::ALT_SCREEN) {
                    self.save_cursor_position();
                    self.swap_alt_screen();
                }
            },
            NamedPrivateMode::SaveRestoreCursor => self.save_cursor_position(),
            _ => {
                if let Some(flag) = Self::private_mode_flag(named) {
                    self.mode.insert(flag);
                }
            },
        }
    }

    fn unset_private_mode(&mut self, mode: PrivateMode) {
        let PrivateMode::Named(named) = mode else {
            debug!("ignoring reset of private mode {}", mode.raw());
            return;
        };
        match named {
            NamedPrivateMode::ColumnMode => {
                self.mode.remove(TermMode::COLUMN_132);
                self.clear_screen(ClearMode::All);
                self.scroll_region = 0..self.grid.lines;
                self.goto(0, 0);
            },
            NamedPrivateMode::Origin => {
                self.mode.remove(TermMode::ORIGIN);
                self.goto(0, 0);
            },
            NamedPrivateMode::AlternateScreen
            | NamedPrivateMode::AlternateScreenBuffer => {
                if self.mode.contains(TermMode::ALT_SCREEN) {
                    self.swap_alt_screen();
                }
            },
            NamedPrivateMode::SwapScreenAndSetRestoreCursor => {
                if self.mode.contains(TermMode::ALT_SCREEN) {
                    self.swap_alt_screen();
                    self.restore_cursor_position();
                }
            },
            NamedPrivateMode::SaveRestoreCursor => {
                self.restore_cursor_position();
            },
            _ => {
                if let Some(flag) = Self::private_mode_flag(named) {
                    self.mode.remove(flag);
                }
            },
        }
    }

    fn private_mode(&mut self, mode: PrivateMode) -> bool {
        match mode {
            PrivateMode::Named(named) => Self::private_mode_flag(named)
                .is_some_and(|flag| self.mode.contains(flag)),
            PrivateMode::Unknown(_) => false,
        }
    }

    fn set_automatic_newline(&mut self, mask: AutomaticNewline) {
        self.automatic_newline = mask;
    }

    fn terminal_attribute(&mut self, attr: Attr) {
        let template = &mut self.grid.cursor.template;
        match attr {
            Attr::Reset => {
                // SGR 0 resets rendition only; the active hyperlink is
                // OSC 8 territory.
                let hyperlink = template.hyperlink.take();
                *template = CellAttributes { hyperlink, ..Default::default() };
            },
            Attr::Bold => template.bold = true,
            Attr::Dim => template.dim = true,
            Attr::Italic => template.italic = true,
            Attr::Underline => template.underline = CellUnderline::Single,
            Attr::DoubleUnderline => {
                template.underline = CellUnderline::Double;
            },
            Attr::Undercurl => template.underline = CellUnderline::Curl,
            Attr::DottedUnderline => {
                template.underline = CellUnderline::Dotted;
            },
            Attr::DashedUnderline => {
                template.underline = CellUnderline::Dashed;
            },
            Attr::BlinkSlow => template.blink = CellBlink::Slow,
            Attr::BlinkFast => template.blink = CellBlink::Fast,
            Attr::Reverse => template.reverse = true,
            Attr::Hidden => template.hidden = true,
            Attr::Strike => template.strike = true,
            Attr::CancelBold => template.bold = false,
            Attr::CancelBoldDim => {
                template.bold = false;
                template.dim = false;
            },
            Attr::CancelItalic => template.italic = false,
            Attr::CancelUnderline => template.underline = CellUnderline::None,
            Attr::CancelBlink => template.blink = CellBlink::None,
            Attr::CancelReverse => template.reverse = false,
            Attr::CancelHidden => template.hidden = false,
            Attr::CancelStrike => template.strike = false,
            Attr::Foreground(color) => template.foreground = color,
            Attr::Background(color) => template.background = color,
            Attr::UnderlineColor(color) => template.underline_color = color,
        }
    }

    fn set_cursor_style(&mut self, style: Option<CursorStyle>) {
        self.cursor_style = style;
    }

    fn device_status(&mut self, arg: usize, private: bool) {
        match (arg, private) {
            (5, false) => self.respond("\x1b[0n"),
            (6, _) => {
                let base = if self.mode.contains(TermMode::ORIGIN) {
                    self.scroll_region.start
                } else {
                    0
                };
                let row = self.grid.cursor.line.saturating_sub(base) + 1;
                let col = self.grid.cursor.column + 1;
                if private {
                    self.respond(format!("\x1b[?{row};{col}R"));
                } else {
                    self.respond(format!("\x1b[{row};{col}R"));
                }
            },
            // Printer not connected.
            (15, true) => self.respond("\x1b[?13n"),
            // UDKs locked.
            (25, true) => self.respond("\x1b[?20n"),
            // North American keyboard.
            (26, _) => self.respond("\x1b[?27;1;0;0n"),
            _ => debug!("unhandled device status report {arg}"),
        }
    }

    fn graphics_attribute_request(&mut self, item: u16) {
        // Failure code 3: sixel geometry is not negotiable here.
        self.respond(format!("\x1b[?{item};3;0S"));
    }

    fn request_terminal_parameters(&mut self, arg: u16) {
        self.respond(format!("\x1b[{};1;1;128;128;1;0x", arg + 2));
    }

    fn deiconify_window(&mut self) {}

    fn iconify_window(&mut self) {}

    fn resize_window(&mut self, lines: usize, cols: usize) {
        if lines > 0 && cols > 0 {
            self.resize(lines, cols);
        }
    }

    fn text_area_size_pixels(&mut self) {
        self.respond(format!(
            "\x1b[4;{};{}t",
            self.grid.lines * CELL_HEIGHT_PX,
            self.grid.columns * CELL_WIDTH_PX,
        ));
    }

    fn text_area_size_chars(&mut self) {
        self.respond(format!(
            "\x1b[8;{};{}t",
            self.grid.lines, self.grid.columns,
        ));
    }

    fn push_title(&mut self) {
        if self.title_stack.len() < TITLE_STACK_MAX_DEPTH {
            self.title_stack.push(self.title.clone());
        }
    }

    fn pop_title(&mut self) {
        if let Some(title) = self.title_stack.pop() {
            self.title = title;
        }
    }

    fn start_error_output(&mut self) {
        self.shell.in_error_output = true;
    }

    fn end_error_output(&mut self) {
        self.shell.in_error_output = false;
    }

    fn start_prompt(&mut self, _continuation: bool) {
        self.shell.in_prompt = true;
        self.shell.in_input = false;
    }

    fn end_prompt(&mut self, _hide_value: bool) {
        self.shell.in_prompt = false;
    }

    fn start_input(&mut self, _submode: u16) {
        self.shell.in_prompt = false;
        self.shell.in_input = true;
    }

    fn start_command_output(&mut self) {
        self.shell.in_input = false;
    }

    fn command_finished(&mut self, exit_code: Option<i64>) {
        self.shell.last_exit_code = exit_code;
        self.shell.in_input = false;
        self.shell.in_error_output = false;
    }

    fn push_hider(&mut self) {
        self.shell.hider_depth += 1;
    }

    fn pop_hider(&mut self) {
        self.shell.hider_depth = self.shell.hider_depth.saturating_sub(1);
    }

    fn pop_element(&mut self) {
        self.shell.group_depth = self.shell.group_depth.saturating_sub(1);
    }

    fn fresh_line(&mut self) {
        if self.grid.cursor.column > 0 || self.grid.cursor.input_needs_wrap {
            self.carriage_return();
            self.advance_line();
        }
    }

    fn start_command_group(&mut self, op: CommandGroup, _key: Option<&str>) {
        match op {
            CommandGroup::Sibling => {
                // Depth is unchanged: closes the current group, opens
                // the next.
                if self.shell.group_depth == 0 {
                    self.shell.group_depth = 1;
                }
            },
            CommandGroup::Child => self.shell.group_depth += 1,
            CommandGroup::Exit => {
                self.shell.group_depth =
                    self.shell.group_depth.saturating_sub(1);
            },
        }
    }

    fn set_input_mode(&mut self, mode: u16) {
        self.input_mode = mode;
    }

    fn report_window_contents(&mut self) {
        debug!("window contents report not supported");
    }

    fn open_pane(&mut self, op: u16, options: u16) {
        debug!("pane request {op};{options} not supported");
    }

    fn set_session_number(&mut self, number: u16) {
        self.session_number = number;
    }

    fn set_auto_paging(&mut self, mode: AutoPaging) {
        match mode {
            AutoPaging::Temporary => {
                if self.page_limit.is_none() {
                    self.set_page_limit(Some(self.grid.lines));
                }
            },
            AutoPaging::MarkOutput => self.lines_since_resume = 0,
        }
    }

    fn set_received_count(&mut self, count: i64) {
        self.received_count = count;
    }

    fn eof_seen(&mut self) {
        self.shell.eof_seen = true;
    }

    fn set_window_title(&mut self, title: &str, kind: TitleKind) {
        let title = (!title.is_empty()).then(|| title.to_owned());
        match kind {
            TitleKind::IconAndWindow => {
                self.icon_title.clone_from(&title);
                self.title = title;
            },
            TitleKind::Icon => self.icon_title = title,
            TitleKind::Window => self.title = title,
            TitleKind::Buffer => self.buffer_name = title,
        }
    }

    fn set_working_directory(&mut self, url: &str) {
        self.working_directory = Some(url.to_owned());
    }

    fn set_process_id(&mut self, pid: &str) {
        self.process_id = Some(pid.to_owned());
    }

    fn set_hyperlink(&mut self, link: Option<Hyperlink>) {
        self.grid.cursor.template.set_hyperlink(link);
    }

    fn set_dynamic_color(&mut self, code: usize, color: Rgb) {
        self.dynamic_colors.insert(code, color);
    }

    fn report_dynamic_color(&mut self, code: usize) {
        let color = self
            .dynamic_colors
            .get(&code)
            .copied()
            .unwrap_or_else(|| default_dynamic_color(code));
        self.respond(format!("\x1b]{code};{}\x1b\\", color.to_x11()));
    }

    fn reset_color(&mut self, index: usize) {
        self.palette.remove(&index);
    }

    fn clipboard_store(&mut self, clipboard: u8, payload: &[u8]) {
        self.clipboards.insert(clipboard, payload.to_vec());
    }

    fn clipboard_load(&mut self, clipboard: u8) {
        let payload = self
            .clipboards
            .get(&clipboard)
            .map(|data| BASE64.encode(data))
            .unwrap_or_default();
        self.respond(format!(
            "\x1b]52;{};{payload}\x1b\\",
            char::from(clipboard),
        ));
    }

    fn insert_html(&mut self, html: &str) {
        // The model has no DOM to sanitize into; remember the payload
        // so embedders can decide.
        self.last_html = Some(html.to_owned());
    }

    fn start_pretty_print_group(&mut self, _prefix: Option<String>) {
        self.shell.pretty_depth += 1;
    }

    fn end_pretty_print_group(&mut self) {
        self.shell.pretty_depth = self.shell.pretty_depth.saturating_sub(1);
    }

    fn pretty_print_indent(&mut self, indent: PrettyIndent) {
        debug!("pretty-print indent {indent:?} outside a layout engine");
    }

    fn pretty_print_break(
        &mut self,
        kind: BreakKind,
        _pre: Option<String>,
        _post: Option<String>,
        _nobreak: Option<String>,
    ) {
        // Without re-layout every break collapses to its required form.
        if kind == BreakKind::Required && self.shell.pretty_depth > 0 {
            self.carriage_return();
            self.advance_line();
        }
    }

    fn set_continuation_prompt(&mut self, pattern: &str) {
        self.continuation_prompt = Some(pattern.to_owned());
    }

    fn sixel_graphic(&mut self, image: SixelDecoder) {
        let width = image.width();
        let height = image.height();
        if width == 0 || height == 0 {
            return;
        }

        let mut pixels = vec![0 as Rgba; width * height];
        if let Err(error) = image.to_pixel_data(&mut pixels, width, height) {
            debug!("dropping sixel image: {error}");
            return;
        }

        self.images.push(PlacedImage {
            line: self.grid.cursor.line,
            column: self.grid.cursor.column,
            width,
            height,
            pixels,
        });

        // The cursor ends up below the image, like after printed text.
        let cell_lines = height.div_ceil(CELL_HEIGHT_PX);
        for _ in 0..cell_lines {
            self.advance_line();
        }
    }

    fn request_status_string(&mut self, payload: &[u8]) {
        match payload {
            b"r" => {
                let top = self.scroll_region.start + 1;
                let bottom = self.scroll_region.end;
                self.respond(format!("\x1bP1$r{top};{bottom}r\x1b\\"));
            },
            b"m" => self.respond("\x1bP1$r0m\x1b\\"),
            b" q" => {
                let code = match self.cursor_style {
                    None => 1,
                    Some(style) => {
                        let base = match style.shape {
                            CursorShape::Block => 1,
                            CursorShape::Underline => 3,
                            CursorShape::Beam => 5,
                        };
                        if style.blinking { base } else { base + 1 }
                    },
                };
                self.respond(format!("\x1bP1$r{code} q\x1b\\"));
            },
            b"\"p" => self.respond("\x1bP1$r64;1\"p\x1b\\"),
            _ => self.respond("\x1bP0$r\x1b\\"),
        }
    }
}

fn default_dynamic_color(code: usize) -> Rgb {
    match code {
        10 | 12 => DEFAULT_FOREGROUND,
        _ => DEFAULT_BACKGROUND,
    }
}

/// Collapse a semver string into the single number DA2 reports, two
/// decimal digits per component.
fn version_number(mut version: &str) -> usize {
    if let Some(separator) = version.rfind('-') {
        version = &version[..separator];
    }

    let mut number = 0;
    for (i, component) in version.split('.').rev().enumerate() {
        let component = component.parse::<usize>().unwrap_or(0);
        number += usize::pow(100, i as u32) * component;
    }

    number
}

#[cfg(test)]
mod tests {
    use webvt_escape::{Color, Parser, StdColor};
    use webvt_sixel::rgba;

    use super::*;

    fn feed(model: &mut TermModel, bytes: &[u8]) {
        let mut parser = Parser::new();
        parser.advance(bytes, model);
    }

    #[test]
    fn prints_text_and_applies_rendition() {
        let mut model = TermModel::default();
        feed(&mut model, b"Hello, \x1b[31mWorld\x1b[0m!");

        assert_eq!(model.row_text(0), "Hello, World!");
        assert_eq!(
            model.cell(0, 7).attributes.foreground,
            Color::Std(StdColor::Red),
        );
        assert_eq!(
            model.cell(0, 12).attributes.foreground,
            Color::Std(StdColor::Foreground),
        );
        assert_eq!(model.cursor(), (0, 13));
    }

    #[test]
    fn erase_display_then_home() {
        let mut model = TermModel::default();
        feed(&mut model, b"garbage\x1b[2J\x1b[1;1H");

        assert_eq!(model.cursor(), (0, 0));
        assert_eq!(model.row_text(0), "");
    }

    #[test]
    fn cursor_position_defaults_to_origin() {
        let mut whole = TermModel::default();
        let mut defaulted = TermModel::default();
        feed(&mut whole, b"x\x1b[1;1Hy");
        feed(&mut defaulted, b"x\x1b[Hy");

        assert_eq!(whole.row_text(0), defaulted.row_text(0));
        assert_eq!(whole.cursor(), defaulted.cursor());
    }

    #[test]
    fn chunk_boundaries_do_not_change_the_result() {
        let input: &[u8] = b"plain \x1b[1;4;38;5;208mfancy\x1b[0m \xe4\xbd\xa0";

        let mut whole = TermModel::default();
        feed(&mut whole, input);

        let mut split = TermModel::default();
        let mut parser = Parser::new();
        for chunk in [&input[..9], &input[9..10], &input[10..29], &input[29..]]
        {
            parser.advance(chunk, &mut split);
        }

        for column in 0..whole.columns() {
            assert_eq!(whole.cell(0, column), split.cell(0, column));
        }
        assert_eq!(whole.cursor(), split.cursor());
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let mut model = TermModel::default();
        feed(&mut model, "你a".as_bytes());

        assert_eq!(model.cell(0, 0).ch, '你');
        assert!(model.cell(0, 0).flags.contains(CellFlags::WIDE_CHAR));
        assert!(
            model.cell(0, 1).flags.contains(CellFlags::WIDE_CHAR_SPACER)
        );
        assert_eq!(model.cell(0, 2).ch, 'a');
        assert_eq!(model.row_text(0), "你a");
    }

    #[test]
    fn printing_past_the_last_column_wraps() {
        let mut model = TermModel::new(4, 4);
        feed(&mut model, b"abcdE");

        assert_eq!(model.row_text(0), "abcd");
        assert_eq!(model.row_text(1), "E");
        assert!(model.cell(0, 3).flags.contains(CellFlags::WRAPLINE));
    }

    #[test]
    fn disabled_wraparound_overwrites_the_last_column() {
        let mut model = TermModel::new(4, 4);
        feed(&mut model, b"\x1b[?7labcdEF");

        assert_eq!(model.row_text(0), "abcF");
        assert_eq!(model.row_text(1), "");
    }

    #[test]
    fn linefeed_scrolls_inside_the_region_only() {
        let mut model = TermModel::new(4, 10);
        feed(&mut model, b"\x1b[4;1Hkeep");
        feed(&mut model, b"\x1b[1;2rA\r\nB\r\nC");

        assert_eq!(model.row_text(0), "B");
        assert_eq!(model.row_text(1), "C");
        assert_eq!(model.row_text(2), "");
        assert_eq!(model.row_text(3), "keep");
    }

    #[test]
    fn insert_line_shifts_rows_down() {
        let mut model = TermModel::new(4, 10);
        feed(&mut model, b"A\r\nB\r\nC\x1b[1;1H\x1b[1L");

        assert_eq!(model.row_text(0), "");
        assert_eq!(model.row_text(1), "A");
        assert_eq!(model.row_text(2), "B");
        assert_eq!(model.row_text(3), "C");
    }

    #[test]
    fn tabs_stop_every_eight_columns() {
        let mut model = TermModel::default();
        feed(&mut model, b"\tx\t y");

        assert_eq!(model.cell(0, 8).ch, 'x');
        assert_eq!(model.cell(0, 17).ch, 'y');
    }

    #[test]
    fn cleared_tab_stops_fall_through_to_the_last_column() {
        let mut model = TermModel::new(2, 20);
        feed(&mut model, b"\x1b[3g\tx");

        assert_eq!(model.cell(0, 19).ch, 'x');
    }

    #[test]
    fn origin_mode_reports_region_relative_position() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b[5;20r\x1b[?6h\x1b[6n");

        assert_eq!(model.take_responses(), b"\x1b[1;1R");
        assert_eq!(model.cursor(), (4, 0));
    }

    #[test]
    fn restored_cursor_lands_inside_the_shrunken_region() {
        let mut model = TermModel::default();
        // Save inside a wide region, shrink the region, restore: the
        // cursor sits above the new top and must be pulled back in
        // before an origin-relative position report.
        feed(&mut model, b"\x1b[?6h\x1b[5;20r\x1b7");
        feed(&mut model, b"\x1b[10;20r\x1b8\x1b[6n");

        assert_eq!(model.cursor(), (9, 0));
        assert_eq!(model.take_responses(), b"\x1b[1;1R");
    }

    #[test]
    fn alternate_screen_preserves_the_primary_grid() {
        let mut model = TermModel::default();
        feed(&mut model, b"abc\x1b[?1049h");
        assert!(model.mode().contains(TermMode::ALT_SCREEN));
        assert_eq!(model.row_text(0), "");

        feed(&mut model, b"xyz");
        assert_eq!(model.row_text(0), "xyz");

        feed(&mut model, b"\x1b[?1049l");
        assert!(!model.mode().contains(TermMode::ALT_SCREEN));
        assert_eq!(model.row_text(0), "abc");
        assert_eq!(model.cursor(), (0, 3));
    }

    #[test]
    fn alignment_display_fills_the_screen() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b#8");

        assert_eq!(model.cell(0, 0).ch, 'E');
        assert_eq!(model.cell(23, 79).ch, 'E');
        assert_eq!(model.cursor(), (0, 0));
    }

    #[test]
    fn line_drawing_charset_maps_printables() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b(0qq\x1b(Bq");

        assert_eq!(model.row_text(0), "──q");
    }

    #[test]
    fn automatic_newline_adds_the_carriage_return() {
        let mut plain = TermModel::default();
        feed(&mut plain, b"ab\ncd");
        assert_eq!(plain.cell(1, 2).ch, 'c');

        let mut automatic = TermModel::default();
        feed(&mut automatic, b"\x1b[20hab\ncd");
        assert_eq!(automatic.cell(1, 0).ch, 'c');
    }

    #[test]
    fn hyperlink_attaches_to_printed_cells() {
        let mut model = TermModel::default();
        feed(
            &mut model,
            b"\x1b]8;;http://example.com/a;b\x1b\\link\x1b]8;;\x1b\\x",
        );

        let link = model.cell(0, 0).attributes.hyperlink.as_ref().unwrap();
        assert_eq!(link.uri, "http://example.com/a;b");
        assert!(model.cell(0, 4).attributes.hyperlink.is_none());
    }

    #[test]
    fn sgr_reset_keeps_the_open_hyperlink() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b]8;;http://example.com\x1b\\\x1b[31ma\x1b[0mb");

        assert!(model.cell(0, 1).attributes.hyperlink.is_some());
        assert_eq!(
            model.cell(0, 1).attributes.foreground,
            Color::Std(StdColor::Foreground),
        );
    }

    #[test]
    fn dynamic_color_set_then_query_round_trips() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b]10;#ff8000\x07\x1b]10;?\x07");

        assert_eq!(
            model.take_responses(),
            b"\x1b]10;rgb:ffff/8080/0000\x1b\\",
        );
    }

    #[test]
    fn device_attribute_queries_answer() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b[c");
        assert_eq!(model.take_responses(), b"\x1b[?62;1;22c");

        feed(&mut model, b"\x1b[>c");
        let response = model.take_responses();
        assert!(response.starts_with(b"\x1b[>990;"));
        assert!(response.ends_with(b";0c"));

        feed(&mut model, b"\x1b[=c");
        assert_eq!(model.take_responses(), b"\x1bP!|00000000\x1b\\");
    }

    #[test]
    fn status_reports() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b[5n");
        assert_eq!(model.take_responses(), b"\x1b[0n");

        feed(&mut model, b"\x1b[3;7H\x1b[6n");
        assert_eq!(model.take_responses(), b"\x1b[3;7R");

        feed(&mut model, b"\x1b[18t");
        assert_eq!(model.take_responses(), b"\x1b[8;24;80t");
    }

    #[test]
    fn status_string_requests() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b[3;20r\x1bP$qr\x1b\\");
        assert_eq!(model.take_responses(), b"\x1bP1$r3;20r\x1b\\");

        feed(&mut model, b"\x1bP$qz\x1b\\");
        assert_eq!(model.take_responses(), b"\x1bP0$r\x1b\\");
    }

    #[test]
    fn title_stack_push_and_pop() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b]2;one\x07\x1b[22t\x1b]2;two\x07");
        assert_eq!(model.title(), Some("two"));

        feed(&mut model, b"\x1b[23t");
        assert_eq!(model.title(), Some("one"));
    }

    #[test]
    fn clipboard_store_then_load() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b]52;c;aGVsbG8=\x07\x1b]52;c;?\x07");

        assert_eq!(model.take_responses(), b"\x1b]52;c;aGVsbG8=\x1b\\");
        assert_eq!(model.clipboards.get(&b'c').unwrap(), b"hello");
    }

    #[test]
    fn sixel_image_lands_at_the_cursor() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1bPq#0;2;0;0;0#1;2;100;100;100~~\x1b\\");

        let image = &model.images()[0];
        assert_eq!((image.line, image.column), (0, 0));
        assert_eq!((image.width, image.height), (2, 6));
        assert_eq!(image.pixels[0], rgba(255, 255, 255, 255));
        // The cursor moved below the image.
        assert_eq!(model.cursor().0, 1);
    }

    #[test]
    fn paging_pauses_and_resumes_without_loss() {
        let mut model = TermModel::new(6, 20);
        model.set_page_limit(Some(2));

        let mut parser = Parser::new();
        parser.advance(b"a\r\nb\r\nc\r\nd", &mut model);
        assert!(parser.has_pending());
        assert_eq!(model.row_text(2), "c");
        assert_eq!(model.row_text(3), "");

        model.resume_paging();
        parser.advance(b"", &mut model);
        assert!(!parser.has_pending());
        assert_eq!(model.row_text(3), "d");
    }

    #[test]
    fn prompt_marks_update_shell_state() {
        let mut model = TermModel::default();
        feed(&mut model, b"\x1b[14u$ \x1b[13u\x1b[15uls\x1b]133;C\x07");
        assert!(!model.shell().in_prompt);
        assert!(!model.shell().in_input);

        feed(&mut model, b"out\x1b]133;D;1\x07");
        assert_eq!(model.shell().last_exit_code, Some(1));
    }

    #[test]
    fn insert_text_keeps_clusters_in_one_cell() {
        let mut model = TermModel::default();
        model.insert_text("e\u{301}x");

        assert_eq!(model.cell(0, 0).ch, 'e');
        assert_eq!(model.cell(0, 0).zerowidth, vec!['\u{301}']);
        assert_eq!(model.cell(0, 1).ch, 'x');
    }

    #[test]
    fn combining_mark_from_the_stream_joins_its_base() {
        let mut model = TermModel::default();
        let mut parser = Parser::new();
        // The accent arrives split across feeds.
        let bytes = "e\u{301}".as_bytes();
        parser.advance(&bytes[..2], &mut model);
        parser.advance(&bytes[2..], &mut model);

        assert_eq!(model.cell(0, 0).ch, 'e');
        assert_eq!(model.cell(0, 0).zerowidth, vec!['\u{301}']);
        assert_eq!(model.cursor(), (0, 1));
    }

    #[test]
    fn full_reset_clears_screen_and_modes() {
        let mut model = TermModel::default();
        feed(&mut model, b"text\x1b[?6h\x1b[31m\x1bc");

        assert_eq!(model.row_text(0), "");
        assert_eq!(model.mode(), TermMode::default());
        assert_eq!(
            model.grid.cursor.template.foreground,
            Color::Std(StdColor::Foreground),
        );
    }

    #[test]
    fn soft_reset_keeps_screen_contents() {
        let mut model = TermModel::default();
        feed(&mut model, b"text\x1b[31m\x1b[5;10r\x1b[!p");

        assert_eq!(model.row_text(0), "text");
        assert_eq!(model.scroll_region, 0..24);
        assert_eq!(
            model.grid.cursor.template.foreground,
            Color::Std(StdColor::Foreground),
        );
    }

    #[test]
    fn version_number_packs_semver_components() {
        assert_eq!(version_number("1.2.3"), 10203);
        assert_eq!(version_number("0.1.0"), 100);
        assert_eq!(version_number("2.0.0-beta1"), 20000);
    }
}
