/// Identifiers which can be assigned to a G-set.
///
/// While many in the linked reference are present here, the identifiers
/// approved for use only ever designate a handful of sets in practice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Charset {
    #[default]
    Ascii,
    UnitedKingdom,
    DecLineDrawing,
}

impl Charset {
    /// Map a character through the charset.
    pub fn map(self, c: char) -> char {
        match self {
            Charset::Ascii => c,
            Charset::UnitedKingdom => match c {
                '#' => '£',
                _ => c,
            },
            Charset::DecLineDrawing => match c {
                '_' => ' ',
                '`' => '◆',
                'a' => '▒',
                'b' => '\u{2409}', // Symbol for horizontal tabulation
                'c' => '\u{240c}', // Symbol for form feed
                'd' => '\u{240d}', // Symbol for carriage return
                'e' => '\u{240a}', // Symbol for line feed
                'f' => '°',
                'g' => '±',
                'h' => '\u{2424}', // Symbol for newline
                'i' => '\u{240b}', // Symbol for vertical tabulation
                'j' => '┘',
                'k' => '┐',
                'l' => '┌',
                'm' => '└',
                'n' => '┼',
                'o' => '⎺',
                'p' => '⎻',
                'q' => '─',
                'r' => '⎼',
                's' => '⎽',
                't' => '├',
                'u' => '┤',
                'v' => '┴',
                'w' => '┬',
                'x' => '│',
                'y' => '≤',
                'z' => '≥',
                '{' => 'π',
                '|' => '≠',
                '}' => '£',
                '~' => '·',
                _ => c,
            },
        }
    }
}

/// Identifiers which can be assigned to a G-set slot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CharsetIndex {
    /// Default set, is designated as ASCII at startup.
    #[default]
    G0,
    G1,
    G2,
    G3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_identity() {
        assert_eq!(Charset::Ascii.map('#'), '#');
        assert_eq!(Charset::Ascii.map('q'), 'q');
    }

    #[test]
    fn united_kingdom_remaps_hash() {
        assert_eq!(Charset::UnitedKingdom.map('#'), '£');
        assert_eq!(Charset::UnitedKingdom.map('q'), 'q');
    }

    #[test]
    fn line_drawing_box_characters() {
        assert_eq!(Charset::DecLineDrawing.map('q'), '─');
        assert_eq!(Charset::DecLineDrawing.map('x'), '│');
        assert_eq!(Charset::DecLineDrawing.map('A'), 'A');
    }
}
