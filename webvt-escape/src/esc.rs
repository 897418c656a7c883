use log::debug;

use crate::{
    Actor,
    charset::{Charset, CharsetIndex},
};

pub(crate) fn perform<A: Actor>(actor: &mut A, intermediates: &[u8], byte: u8) {
    match (byte, intermediates) {
        // IND - Index
        (b'D', []) => actor.linefeed(),
        // NEL - Next Line
        (b'E', []) => actor.next_line(),
        // HTS - Horizontal Tab Set
        (b'H', []) => actor.set_horizontal_tab(),
        // RI - Reverse Index, moves cursor up one line, scrolls the
        // region if the cursor is at its top
        (b'M', []) => actor.reverse_index(),
        // RIS - Full Reset
        (b'c', []) => actor.reset_state(),
        // DECSC - Save cursor position
        (b'7', []) => actor.save_cursor_position(),
        // DECRC - Restore saved cursor position
        (b'8', []) => actor.restore_cursor_position(),
        // DECPAM - Application Keypad
        (b'=', []) => actor.set_keypad_application_mode(),
        // DECPNM - Normal Keypad
        (b'>', []) => actor.unset_keypad_application_mode(),
        // SS2 - Single Shift G2 for the next character only
        (b'N', []) => actor.single_shift(CharsetIndex::G2),
        // SS3 - Single Shift G3 for the next character only
        (b'O', []) => actor.single_shift(CharsetIndex::G3),
        // LS2 - Locking Shift G2
        (b'n', []) => actor.set_active_charset(CharsetIndex::G2),
        // LS3 - Locking Shift G3
        (b'o', []) => actor.set_active_charset(CharsetIndex::G3),
        // DECALN - Screen Alignment Test, fill the screen with 'E'
        (b'8', [b'#']) => actor.screen_alignment_display(),
        // DECSWL/DECDWL - single/double width lines
        (b'5' | b'6', [b'#']) => {
            debug!("[unimplemented: esc] line width control: {byte:02X}");
        },
        // Designate G0-G3 character sets. `-` and `.` are the VT300
        // 96-character designators for G1/G2.
        (_, [b'(']) => designate(actor, CharsetIndex::G0, byte),
        (_, [b')' | b'-']) => designate(actor, CharsetIndex::G1, byte),
        (_, [b'*' | b'.']) => designate(actor, CharsetIndex::G2, byte),
        (_, [b'+']) => designate(actor, CharsetIndex::G3, byte),
        // ST - String Terminator
        (b'\\', []) => {},
        _ => debug!(
            "[unexpected: esc] control: {:02X} intermediates: {:?}",
            byte, intermediates
        ),
    };
}

fn designate<A: Actor>(actor: &mut A, index: CharsetIndex, byte: u8) {
    let charset = match byte {
        b'0' => Charset::DecLineDrawing,
        b'A' => Charset::UnitedKingdom,
        b'B' => Charset::Ascii,
        _ => {
            debug!("[unexpected: esc] charset designator: {byte:02X}");
            Charset::Ascii
        },
    };

    actor.configure_charset(charset, index);
}
