use log::debug;
use webvt_vte::CsiParam;

use crate::attributes::Attr;
use crate::color::{Color, StdColor, parse_sgr_color};
use crate::cursor::{CursorShape, CursorStyle};
use crate::mode::{
    AutomaticNewline, ClearMode, LineClearMode, Mode, PrivateMode,
    TabClearMode,
};
use crate::parser::ParseState;
use crate::{Actor, actor::AutoPaging, actor::CommandGroup};

/// Control sequence with raw arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Csi {
    /// ICH
    InsertBlank(usize),
    /// CUU
    CursorUp(i64),
    /// CUD
    CursorDown(i64),
    /// VPR
    VerticalPositionRelative(i64),
    /// REP
    RepeatPrecedingCharacter(i64),
    /// DA1
    PrimaryDeviceAttributes,
    /// DA2
    SecondaryDeviceAttributes,
    /// DA3
    TertiaryDeviceAttributes,
    /// CUF
    CursorForward(i64),
    /// HPR
    HorizontalPositionRelative(i64),
    /// HPA
    HorizontalPositionAbsolute(i64),
    /// CUB
    CursorBackward(i64),
    /// VPA
    VerticalPositionAbsolute(i64),
    /// CNL
    CursorNextLine(i64),
    /// CPL
    CursorPrecedingLine(i64),
    /// CHA
    CursorHorizontalAbsolute(i64),
    /// TBC
    TabClear(i64),
    /// CUP
    CursorPosition(i32, usize),
    /// HVP
    HorizontalAndVerticalPosition(i32, usize),
    /// SM
    SetMode(Vec<u16>),
    /// DECSET
    SetModePrivate(Vec<PrivateMode>),
    /// RM
    ResetMode(Vec<u16>),
    /// DECRST
    ResetModePrivate(Vec<PrivateMode>),
    /// CHT
    CursorHorizontalTabulation(i64),
    /// CBT
    CursorBackwardTabulation(i64),
    /// ED
    EraseDisplay(i64),
    /// EL
    EraseLine(i64),
    /// IL
    InsertLine(i64),
    /// DL
    DeleteLine(i64),
    /// SGR sequences
    SelectGraphicRendition(Vec<u16>),
    /// DSR; `true` marks the `?` private form
    DeviceStatusReport(i64, bool),
    /// DCH
    DeleteCharacter(i64),
    /// ECH
    EraseCharacters(i64),
    /// DECSTR
    SoftReset,
    /// DECSCUSR
    SetCursorStyle(i64),
    /// DECSTBM
    SetTopAndBottomMargin(usize, Option<usize>),
    /// SU
    ScrollUp(i64),
    /// SD
    ScrollDown(i64),
    /// `CSI ? Pi;Pa S`, sixel/ReGIS geometry query
    GraphicsAttributeRequest(u16),
    /// XTWINOPS
    WindowManipulation(Vec<u16>),
    /// SCOSC
    SaveCursor,
    /// `CSI ? ... s`, save DEC private mode values
    SavePrivateModes(Vec<u16>),
    /// `CSI ? ... r`, restore DEC private mode values
    RestorePrivateModes(Vec<u16>),
    /// The `u`-final sub-protocol used for prompt/input demarcation
    SubProtocol(Vec<u16>),
    /// DECREQTPARM
    RequestTerminalParameters(u16),
    /// Misc sequences
    Unspecified {
        params: Vec<CsiParam>,
        final_byte: u8,
    },
}

impl From<(&[CsiParam], u8)> for Csi {
    fn from(value: (&[CsiParam], u8)) -> Self {
        let (raw_params, final_byte) = value;

        match (final_byte, raw_params) {
            (b'h', [CsiParam::P(b'?'), rest @ ..]) => {
                let modes = parse_params(rest)
                    .into_iter()
                    .map(PrivateMode::from_raw)
                    .collect();

                Self::SetModePrivate(modes)
            },
            (b'h', params) => Self::SetMode(parse_params(params)),
            (b'l', [CsiParam::P(b'?'), rest @ ..]) => {
                let modes = parse_params(rest)
                    .into_iter()
                    .map(PrivateMode::from_raw)
                    .collect();

                Self::ResetModePrivate(modes)
            },
            (b'l', params) => Self::ResetMode(parse_params(params)),
            (b'm', params) => {
                Self::SelectGraphicRendition(parse_params(params))
            },

            (b'@', []) => Self::InsertBlank(1),
            (b'@', [CsiParam::Integer(count)]) => {
                Self::InsertBlank(*count as usize)
            },

            (b'A', []) => Self::CursorUp(1),
            (b'A', [CsiParam::Integer(rows)]) => Self::CursorUp(*rows),
            (b'B', []) => Self::CursorDown(1),
            (b'B', [CsiParam::Integer(rows)]) => Self::CursorDown(*rows),
            (b'C', []) => Self::CursorForward(1),
            (b'C', [CsiParam::Integer(columns)]) => {
                Self::CursorForward(*columns)
            },
            (b'D', []) => Self::CursorBackward(1),
            (b'D', [CsiParam::Integer(columns)]) => {
                Self::CursorBackward(*columns)
            },
            (b'E', []) => Self::CursorNextLine(1),
            (b'E', [CsiParam::Integer(line_count)]) => {
                Self::CursorNextLine(*line_count)
            },
            (b'F', []) => Self::CursorPrecedingLine(1),
            (b'F', [CsiParam::Integer(line_count)]) => {
                Self::CursorPrecedingLine(*line_count)
            },
            (b'G', []) => Self::CursorHorizontalAbsolute(1),
            (b'G', [CsiParam::Integer(column_num)]) => {
                Self::CursorHorizontalAbsolute(*column_num)
            },
            (b'`', []) => Self::HorizontalPositionAbsolute(1),
            (b'`', [CsiParam::Integer(column_num)]) => {
                Self::HorizontalPositionAbsolute(*column_num)
            },
            (b'a', []) => Self::HorizontalPositionRelative(1),
            (b'a', [CsiParam::Integer(columns)]) => {
                Self::HorizontalPositionRelative(*columns)
            },
            (b'b', []) => Self::RepeatPrecedingCharacter(1),
            (b'b', [CsiParam::Integer(count)]) => {
                Self::RepeatPrecedingCharacter(*count)
            },
            (b'c', []) => Self::PrimaryDeviceAttributes,
            (b'c', [CsiParam::Integer(0)]) => Self::PrimaryDeviceAttributes,
            (b'c', [CsiParam::P(b'>'), ..]) => {
                Self::SecondaryDeviceAttributes
            },
            (b'c', [CsiParam::P(b'='), ..]) => Self::TertiaryDeviceAttributes,
            (b'd', []) => Self::VerticalPositionAbsolute(1),
            (b'd', [CsiParam::Integer(line_num)]) => {
                Self::VerticalPositionAbsolute(*line_num)
            },
            (b'e', []) => Self::VerticalPositionRelative(1),
            (b'e', [CsiParam::Integer(rows)]) => {
                Self::VerticalPositionRelative(*rows)
            },
            (b'g', []) => Self::TabClear(0),
            (b'g', [CsiParam::Integer(mode)]) => Self::TabClear(*mode),

            (b'H', []) => Self::CursorPosition(1, 1),
            (b'H', [CsiParam::Integer(y)]) => {
                Self::CursorPosition(*y as i32, 1)
            },
            (
                b'H',
                [
                    CsiParam::Integer(y),
                    CsiParam::P(b';'),
                    CsiParam::Integer(x),
                ],
            ) => Self::CursorPosition(*y as i32, *x as usize),
            (b'f', []) => Self::HorizontalAndVerticalPosition(1, 1),
            (b'f', [CsiParam::Integer(y)]) => {
                Self::HorizontalAndVerticalPosition(*y as i32, 1)
            },
            (
                b'f',
                [
                    CsiParam::Integer(y),
                    CsiParam::P(b';'),
                    CsiParam::Integer(x),
                ],
            ) => Self::HorizontalAndVerticalPosition(*y as i32, *x as usize),

            (b'I', []) => Self::CursorHorizontalTabulation(1),
            (b'I', [CsiParam::Integer(count)]) => {
                Self::CursorHorizontalTabulation(*count)
            },
            (b'Z', []) => Self::CursorBackwardTabulation(1),
            (b'Z', [CsiParam::Integer(count)]) => {
                Self::CursorBackwardTabulation(*count)
            },

            (b'J', []) => Self::EraseDisplay(0),
            (b'J', [CsiParam::Integer(mode)]) => Self::EraseDisplay(*mode),
            (b'K', []) => Self::EraseLine(0),
            (b'K', [CsiParam::Integer(mode)]) => Self::EraseLine(*mode),
            (b'L', []) => Self::InsertLine(1),
            (b'L', [CsiParam::Integer(count)]) => Self::InsertLine(*count),
            (b'M', []) => Self::DeleteLine(1),
            (b'M', [CsiParam::Integer(count)]) => Self::DeleteLine(*count),
            (b'P', []) => Self::DeleteCharacter(1),
            (b'P', [CsiParam::Integer(count)]) => Self::DeleteCharacter(*count),
            (b'X', []) => Self::EraseCharacters(1),
            (b'X', [CsiParam::Integer(count)]) => Self::EraseCharacters(*count),

            (b'n', [CsiParam::Integer(report)]) => {
                Self::DeviceStatusReport(*report, false)
            },
            (b'n', [CsiParam::P(b'?'), CsiParam::Integer(report)]) => {
                Self::DeviceStatusReport(*report, true)
            },

            (b'p', [CsiParam::P(b'!')]) => Self::SoftReset,
            (b'q', [CsiParam::P(b' ')]) => Self::SetCursorStyle(1),
            (b'q', [CsiParam::Integer(shape), CsiParam::P(b' ')]) => {
                Self::SetCursorStyle(*shape)
            },

            (b'r', [CsiParam::P(b'?'), rest @ ..]) => {
                Self::RestorePrivateModes(parse_params(rest))
            },
            (b'r', []) => Self::SetTopAndBottomMargin(1, None),
            (b'r', [CsiParam::Integer(top)]) => {
                Self::SetTopAndBottomMargin(*top as usize, None)
            },
            (
                b'r',
                [
                    CsiParam::Integer(top),
                    CsiParam::P(b';'),
                    CsiParam::Integer(bottom),
                ],
            ) => Self::SetTopAndBottomMargin(
                *top as usize,
                Some(*bottom as usize),
            ),

            (b's', [CsiParam::P(b'?'), rest @ ..]) => {
                Self::SavePrivateModes(parse_params(rest))
            },
            (b's', []) => Self::SaveCursor,

            (b'S', [CsiParam::P(b'?'), rest @ ..]) => {
                let item = parse_params(rest).first().copied().unwrap_or(1);
                Self::GraphicsAttributeRequest(item)
            },
            (b'S', []) => Self::ScrollUp(1),
            (b'S', [CsiParam::Integer(count)]) => Self::ScrollUp(*count),
            (b'T', []) => Self::ScrollDown(1),
            (b'T', [CsiParam::Integer(count)]) => Self::ScrollDown(*count),

            (b't', params) => Self::WindowManipulation(parse_params(params)),
            (b'u', params) => Self::SubProtocol(parse_params(params)),
            (b'x', []) => Self::RequestTerminalParameters(0),
            (b'x', [CsiParam::Integer(arg)]) => {
                Self::RequestTerminalParameters(*arg as u16)
            },

            _ => Self::Unspecified {
                params: raw_params.to_vec(),
                final_byte,
            },
        }
    }
}

pub(crate) fn perform<A: Actor>(
    actor: &mut A,
    state: &mut ParseState,
    params: &[CsiParam],
    params_truncated: bool,
    byte: u8,
) {
    if params_truncated {
        return unexpected(params, byte);
    }

    // A deferred end-of-error-output is cancelled only by an immediate
    // `CSI 12 u`; every other sequence makes it effective first.
    let cancels_errout = byte == b'u'
        && matches!(params.first(), Some(CsiParam::Integer(12)));
    if !cancels_errout {
        state.flush_error_output_end(actor);
    }

    match Csi::from((params, byte)) {
        Csi::InsertBlank(count) => actor.insert_blank(count),
        Csi::CursorUp(rows) => actor.move_up(rows.max(1) as usize),
        Csi::CursorDown(rows) => actor.move_down(rows.max(1) as usize),
        Csi::VerticalPositionRelative(rows) => {
            actor.move_down(rows.max(1) as usize)
        },
        Csi::RepeatPrecedingCharacter(count) => {
            repeat_preceding_char(actor, state, count)
        },
        Csi::CursorForward(columns) => {
            actor.move_forward(columns.max(1) as usize)
        },
        Csi::HorizontalPositionRelative(columns) => {
            actor.move_forward(columns.max(1) as usize)
        },
        Csi::CursorBackward(columns) => {
            actor.move_backward(columns.max(1) as usize)
        },
        Csi::PrimaryDeviceAttributes => actor.identify_terminal(None),
        Csi::SecondaryDeviceAttributes => {
            actor.identify_terminal(Some('>'))
        },
        Csi::TertiaryDeviceAttributes => actor.identify_terminal(Some('=')),
        Csi::VerticalPositionAbsolute(line_num) => {
            actor.goto_line(line_num as i32 - 1)
        },
        Csi::CursorNextLine(line_count) => {
            actor.move_down_and_cr(line_count.max(1) as usize)
        },
        Csi::CursorPrecedingLine(line_count) => {
            actor.move_up_and_cr(line_count.max(1) as usize)
        },
        Csi::CursorHorizontalAbsolute(column_num) => {
            actor.goto_col(column_num.max(1) as usize - 1)
        },
        Csi::HorizontalPositionAbsolute(column_num) => {
            actor.goto_col(column_num.max(1) as usize - 1)
        },
        Csi::TabClear(mode_index) => {
            let mode = match mode_index {
                0 => TabClearMode::Current,
                3 => TabClearMode::All,
                _ => {
                    return unexpected(params, byte);
                },
            };

            actor.clear_tabs(mode);
        },
        Csi::CursorPosition(y, x)
        | Csi::HorizontalAndVerticalPosition(y, x) => {
            actor.goto(y - 1, x.max(1) - 1)
        },
        Csi::SetMode(values) => {
            if values.first() == Some(&20) {
                let bits = values.get(1).copied().unwrap_or(3);
                actor.set_automatic_newline(
                    AutomaticNewline::from_bits_truncate(bits),
                );
            } else {
                for value in values {
                    actor.set_mode(Mode::from_raw(value));
                }
            }
        },
        Csi::ResetMode(values) => {
            if values.first() == Some(&20) {
                actor.set_automatic_newline(AutomaticNewline::empty());
            } else {
                for value in values {
                    actor.unset_mode(Mode::from_raw(value));
                }
            }
        },
        Csi::SetModePrivate(modes) => {
            for mode in modes {
                actor.set_private_mode(mode);
            }
        },
        Csi::ResetModePrivate(modes) => {
            for mode in modes {
                actor.unset_private_mode(mode);
            }
        },
        Csi::SavePrivateModes(values) => {
            for raw in values {
                let mode = PrivateMode::from_raw(raw);
                let value = actor.private_mode(mode);
                state.save_private_mode(raw, value);
            }
        },
        Csi::RestorePrivateModes(values) => {
            for raw in values {
                let Some(saved) = state.saved_private_mode(raw) else {
                    // Nothing was ever saved; xterm leaves the modes
                    // untouched in that case.
                    break;
                };
                let mode = PrivateMode::from_raw(raw);
                if saved {
                    actor.set_private_mode(mode);
                } else {
                    actor.unset_private_mode(mode);
                }
            }
        },
        Csi::CursorHorizontalTabulation(count) => {
            actor.move_forward_tabs(count.max(1) as u16)
        },
        Csi::CursorBackwardTabulation(count) => {
            actor.move_backward_tabs(count.max(1) as u16)
        },
        Csi::EraseDisplay(mode_index) => {
            let mode = match mode_index {
                0 => ClearMode::Below,
                1 => ClearMode::Above,
                2 => ClearMode::All,
                3 => ClearMode::Saved,
                _ => {
                    return unexpected(params, byte);
                },
            };

            actor.clear_screen(mode);
        },
        Csi::EraseLine(mode_index) => {
            let mode = match mode_index {
                0 => LineClearMode::Right,
                1 => LineClearMode::Left,
                2 => LineClearMode::All,
                _ => {
                    return unexpected(params, byte);
                },
            };

            actor.clear_line(mode);
        },
        Csi::InsertLine(count) => {
            actor.insert_blank_lines(count.max(1) as usize)
        },
        Csi::DeleteLine(count) => actor.delete_lines(count.max(1) as usize),
        Csi::DeleteCharacter(count) => {
            actor.delete_chars(count.max(1) as usize)
        },
        Csi::EraseCharacters(count) => {
            actor.erase_chars(count.max(1) as usize)
        },
        Csi::SelectGraphicRendition(values) => {
            attrs_from_sgr_parameters(actor, values);
        },
        Csi::DeviceStatusReport(report, private) => {
            actor.device_status(report as usize, private)
        },
        Csi::SoftReset => actor.soft_reset(),
        Csi::SetCursorStyle(raw_shape) => {
            let shape = match raw_shape {
                0 => None,
                1 | 2 => Some(CursorShape::Block),
                3 | 4 => Some(CursorShape::Underline),
                5 | 6 => Some(CursorShape::Beam),
                _ => {
                    return unexpected(params, byte);
                },
            };
            let cursor_style = shape.map(|shape| CursorStyle {
                shape,
                blinking: raw_shape % 2 == 1,
            });

            actor.set_cursor_style(cursor_style);
        },
        Csi::SetTopAndBottomMargin(top, bottom) => {
            actor.set_scrolling_region(top, bottom);
        },
        Csi::ScrollUp(count) => actor.scroll_up(count.max(1) as usize),
        Csi::ScrollDown(count) => actor.scroll_down(count.max(1) as usize),
        Csi::GraphicsAttributeRequest(item) => {
            actor.graphics_attribute_request(item)
        },
        Csi::WindowManipulation(values) => {
            match values.first().copied().unwrap_or(0) {
                1 => actor.deiconify_window(),
                2 => actor.iconify_window(),
                8 => {
                    let lines = values.get(1).copied().unwrap_or(0) as usize;
                    let cols = values.get(2).copied().unwrap_or(0) as usize;
                    actor.resize_window(lines, cols);
                },
                14 => actor.text_area_size_pixels(),
                18 => actor.text_area_size_chars(),
                22 => actor.push_title(),
                23 => actor.pop_title(),
                _ => unexpected(params, byte),
            }
        },
        Csi::SaveCursor => actor.save_cursor_position(),
        Csi::SubProtocol(values) => sub_protocol(actor, state, &values),
        Csi::RequestTerminalParameters(arg) => {
            actor.request_terminal_parameters(arg)
        },
        Csi::Unspecified { params, final_byte } => {
            unexpected(params.as_slice(), final_byte)
        },
    }
}

/// The `u`-final sub-protocol governing prompt/input demarcation.
fn sub_protocol<A: Actor>(
    actor: &mut A,
    state: &mut ParseState,
    values: &[u16],
) {
    let arg = |index: usize, default: u16| {
        values.get(index).copied().unwrap_or(default)
    };

    match values.first().copied().unwrap_or(0) {
        0 => actor.restore_cursor_position(),
        // End of error output is deferred: an immediately following
        // `CSI 12 u` cancels the end/start pair so the error region
        // stays open.
        11 => state.errout_end_pending = true,
        12 => {
            if !std::mem::take(&mut state.errout_end_pending) {
                actor.start_error_output();
            }
        },
        13 => actor.end_prompt(false),
        18 => actor.end_prompt(true),
        14 => actor.start_prompt(false),
        24 => actor.start_prompt(true),
        15 => actor.start_input(arg(1, 1)),
        16 => actor.push_hider(),
        17 => actor.pop_hider(),
        19 => {
            actor.fresh_line();
            actor.start_command_group(CommandGroup::Sibling, None);
        },
        20 => actor.fresh_line(),
        44 => {
            if arg(1, 0) == 0 {
                actor.pop_element();
            }
        },
        80 => actor.set_input_mode(arg(1, 112)),
        81 => actor.report_window_contents(),
        90 => actor.open_pane(arg(1, 0), arg(2, 0)),
        91 => actor.set_session_number(arg(1, 0)),
        92 => match arg(1, 0) {
            1 => actor.set_auto_paging(AutoPaging::Temporary),
            2 => actor.set_auto_paging(AutoPaging::MarkOutput),
            other => debug!("[unexpected: csi u 92] sub-code {other}"),
        },
        96 => actor.set_received_count(arg(1, 0) as i64),
        99 => {
            if arg(1, 0) == 99 {
                actor.eof_seen();
            }
        },
        other => debug!("[unexpected: csi u] operation {other}"),
    }
}

#[inline]
fn attrs_from_sgr_parameters<A: Actor>(handler: &mut A, params: Vec<u16>) {
    let mut iter = params.into_iter().peekable();

    while let Some(param) = iter.next() {
        let attr = match param {
            0 => Some(Attr::Reset),
            1 => Some(Attr::Bold),
            2 => Some(Attr::Dim),
            3 => Some(Attr::Italic),
            4 => match iter.peek().copied() {
                Some(0) => {
                    iter.next();
                    Some(Attr::CancelUnderline)
                },
                Some(2) => {
                    iter.next();
                    Some(Attr::DoubleUnderline)
                },
                Some(3) => {
                    iter.next();
                    Some(Attr::Undercurl)
                },
                Some(4) => {
                    iter.next();
                    Some(Attr::DottedUnderline)
                },
                Some(5) => {
                    iter.next();
                    Some(Attr::DashedUnderline)
                },
                _ => Some(Attr::Underline),
            },
            5 => Some(Attr::BlinkSlow),
            6 => Some(Attr::BlinkFast),
            7 => Some(Attr::Reverse),
            8 => Some(Attr::Hidden),
            9 => Some(Attr::Strike),
            21 => Some(Attr::CancelBold),
            22 => Some(Attr::CancelBoldDim),
            23 => Some(Attr::CancelItalic),
            24 => Some(Attr::CancelUnderline),
            25 => Some(Attr::CancelBlink),
            27 => Some(Attr::CancelReverse),
            28 => Some(Attr::CancelHidden),
            29 => Some(Attr::CancelStrike),
            30..=37 => standard_color(param)
                .map(|color| Attr::Foreground(Color::Std(color))),
            38 => parse_sgr_color(&mut iter).map(Attr::Foreground),
            39 => Some(Attr::Foreground(Color::Std(StdColor::Foreground))),
            40..=47 => standard_color(param - 10)
                .map(|color| Attr::Background(Color::Std(color))),
            48 => parse_sgr_color(&mut iter).map(Attr::Background),
            49 => Some(Attr::Background(Color::Std(StdColor::Background))),
            58 => parse_sgr_color(&mut iter)
                .map(|color| Attr::UnderlineColor(Some(color))),
            59 => Some(Attr::UnderlineColor(None)),
            90..=97 => bright_color(param)
                .map(|color| Attr::Foreground(Color::Std(color))),
            100..=107 => bright_color(param - 10)
                .map(|color| Attr::Background(Color::Std(color))),
            _ => None,
        };

        if let Some(attr) = attr {
            handler.terminal_attribute(attr);
        }
    }
}

fn standard_color(code: u16) -> Option<StdColor> {
    match code {
        30 => Some(StdColor::Black),
        31 => Some(StdColor::Red),
        32 => Some(StdColor::Green),
        33 => Some(StdColor::Yellow),
        34 => Some(StdColor::Blue),
        35 => Some(StdColor::Magenta),
        36 => Some(StdColor::Cyan),
        37 => Some(StdColor::White),
        _ => None,
    }
}

fn bright_color(code: u16) -> Option<StdColor> {
    match code {
        90 => Some(StdColor::BrightBlack),
        91 => Some(StdColor::BrightRed),
        92 => Some(StdColor::BrightGreen),
        93 => Some(StdColor::BrightYellow),
        94 => Some(StdColor::BrightBlue),
        95 => Some(StdColor::BrightMagenta),
        96 => Some(StdColor::BrightCyan),
        97 => Some(StdColor::BrightWhite),
        _ => None,
    }
}

/// Upper bound on `CSI Ps b` repeats; larger counts come from garbled
/// streams, not real applications, and are capped rather than obeyed.
const REPEAT_LIMIT: i64 = 65_535;

fn repeat_preceding_char<A: Actor>(
    actor: &mut A,
    state: &mut ParseState,
    count: i64,
) {
    if let Some(c) = state.last_preceding_char {
        for _ in 0..count.clamp(1, REPEAT_LIMIT) {
            actor.print(c);
        }
    } else {
        debug!("tried to repeat with no preceding char");
    }
}

/// Flatten the parameter tokens to plain integers. The `:`
/// sub-parameter separator is treated the same as `;`, which is all the
/// downstream dispatch needs.
fn parse_params(params: &[CsiParam]) -> Vec<u16> {
    let mut values = Vec::new();
    let mut pending: Option<u16> = None;

    for param in params.iter() {
        match param {
            CsiParam::Integer(value) => {
                let parsed = if (0..=u16::MAX as i64).contains(value) {
                    *value as u16
                } else {
                    0
                };
                pending = Some(parsed);
            },
            CsiParam::P(b';') | CsiParam::P(b':') => {
                values.push(pending.take().unwrap_or(0));
            },
            CsiParam::P(_) => {},
        }
    }

    if let Some(value) = pending {
        values.push(value);
    } else if values.is_empty() {
        values.push(0);
    }

    values
}

fn unexpected(params: &[CsiParam], byte: u8) {
    debug!("[unexpected csi] action: {byte:?}, params: {params:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use webvt_vte::CsiParam::{Integer, P};

    #[track_caller]
    fn assert_csi(params: &[CsiParam], byte: u8, expected: Csi) {
        assert_eq!(
            Csi::from((params, byte)),
            expected,
            "params {params:?} final {byte}"
        );
    }

    #[test]
    fn parses_cursor_movement_sequences() {
        assert_csi(&[Integer(3)], b'A', Csi::CursorUp(3));
        assert_csi(&[], b'B', Csi::CursorDown(1));
        assert_csi(&[Integer(5)], b'C', Csi::CursorForward(5));
        assert_csi(&[Integer(2)], b'E', Csi::CursorNextLine(2));
        assert_csi(&[Integer(9)], b'G', Csi::CursorHorizontalAbsolute(9));
        assert_csi(
            &[Integer(7), P(b';'), Integer(9)],
            b'H',
            Csi::CursorPosition(7, 9),
        );
        assert_csi(&[], b'H', Csi::CursorPosition(1, 1));
        assert_csi(&[Integer(12)], b'd', Csi::VerticalPositionAbsolute(12));
        assert_csi(&[Integer(5)], b'b', Csi::RepeatPrecedingCharacter(5));
        assert_csi(&[Integer(3)], b'I', Csi::CursorHorizontalTabulation(3));
        assert_csi(&[Integer(2)], b'Z', Csi::CursorBackwardTabulation(2));
    }

    #[test]
    fn parses_private_markers() {
        assert_csi(
            &[P(b'?'), Integer(1049)],
            b'h',
            Csi::SetModePrivate(vec![
                PrivateMode::from_raw(1049),
            ]),
        );
        assert_csi(
            &[P(b'?'), Integer(25)],
            b'l',
            Csi::ResetModePrivate(vec![PrivateMode::from_raw(25)]),
        );
        assert_csi(&[P(b'>')], b'c', Csi::SecondaryDeviceAttributes);
        assert_csi(&[P(b'=')], b'c', Csi::TertiaryDeviceAttributes);
        assert_csi(
            &[P(b'?'), Integer(6)],
            b'n',
            Csi::DeviceStatusReport(6, true),
        );
        assert_csi(
            &[P(b'?'), Integer(1), P(b';'), Integer(1)],
            b'S',
            Csi::GraphicsAttributeRequest(1),
        );
        assert_csi(
            &[P(b'?'), Integer(47), P(b';'), Integer(2004)],
            b's',
            Csi::SavePrivateModes(vec![47, 2004]),
        );
        assert_csi(
            &[P(b'?'), Integer(47)],
            b'r',
            Csi::RestorePrivateModes(vec![47]),
        );
    }

    #[test]
    fn parses_intermediate_markers() {
        assert_csi(&[P(b'!')], b'p', Csi::SoftReset);
        assert_csi(&[Integer(4), P(b' ')], b'q', Csi::SetCursorStyle(4));
        assert_csi(&[P(b' ')], b'q', Csi::SetCursorStyle(1));
    }

    #[test]
    fn parses_margins_and_scrolling() {
        assert_csi(
            &[Integer(1), P(b';'), Integer(24)],
            b'r',
            Csi::SetTopAndBottomMargin(1, Some(24)),
        );
        assert_csi(&[], b'r', Csi::SetTopAndBottomMargin(1, None));
        assert_csi(&[Integer(2)], b'S', Csi::ScrollUp(2));
        assert_csi(&[Integer(2)], b'T', Csi::ScrollDown(2));
    }

    #[test]
    fn parses_sub_protocol_and_window_ops() {
        assert_csi(&[Integer(15), P(b';'), Integer(2)], b'u', {
            Csi::SubProtocol(vec![15, 2])
        });
        assert_csi(&[], b'u', Csi::SubProtocol(vec![0]));
        assert_csi(
            &[Integer(18)],
            b't',
            Csi::WindowManipulation(vec![18]),
        );
        assert_csi(&[], b'x', Csi::RequestTerminalParameters(0));
    }

    #[test]
    fn colon_separators_collapse_to_semicolons() {
        assert_eq!(
            parse_params(&[
                Integer(38),
                P(b':'),
                Integer(5),
                P(b':'),
                Integer(160)
            ]),
            vec![38, 5, 160]
        );
        assert_eq!(parse_params(&[P(b';'), Integer(2)]), vec![0, 2]);
        assert_eq!(parse_params(&[]), vec![0]);
    }

    #[test]
    fn parses_fallback_to_unspecified() {
        assert_csi(
            &[Integer(2)],
            b'~',
            Csi::Unspecified {
                params: vec![Integer(2)],
                final_byte: b'~',
            },
        );
    }
}
