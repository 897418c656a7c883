//! Grapheme-cluster segmentation for column accounting.
//!
//! Terminal column math needs two things the byte stream does not give
//! directly: where the user-perceived character boundaries are, and how
//! many columns each one occupies. [`segments`] partitions a string
//! into runs of simple single-column characters (kept as plain slices)
//! and explicit cluster markers for everything else (combining marks,
//! wide CJK, ZWJ emoji sequences, flags).

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// The emoji presentation selector forces two-column rendering even on
/// base characters that are narrow by default.
const VARIATION_SELECTOR_16: char = '\u{fe0f}';

/// One segment of a partitioned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A run of single-codepoint, single-column characters.
    Simple(&'a str),
    /// One extended grapheme cluster with its column width (1 or 2).
    Cluster { text: &'a str, width: usize },
}

impl Segment<'_> {
    /// Columns this segment occupies.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Segment::Simple(text) => text.chars().count(),
            Segment::Cluster { width, .. } => *width,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Segment::Simple(text) => text,
            Segment::Cluster { text, .. } => text,
        }
    }
}

/// Partition `text` into simple runs and grapheme clusters.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut run_start = None;

    for (offset, grapheme) in text.grapheme_indices(true) {
        if is_simple(grapheme) {
            run_start.get_or_insert(offset);
            continue;
        }

        if let Some(start) = run_start.take() {
            out.push(Segment::Simple(&text[start..offset]));
        }
        out.push(Segment::Cluster {
            text: grapheme,
            width: cluster_width(grapheme),
        });
    }

    if let Some(start) = run_start {
        out.push(Segment::Simple(&text[start..]));
    }

    out
}

/// Total column width of `text`.
#[must_use]
pub fn display_width(text: &str) -> usize {
    segments(text).iter().map(Segment::width).sum()
}

/// A grapheme is simple when it is one code point occupying exactly
/// one column; those can be batch-copied without per-cluster handling.
fn is_simple(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.width() == Some(1),
        _ => false,
    }
}

/// Column width of one extended grapheme cluster, clamped to 1 or 2.
#[must_use]
pub fn cluster_width(grapheme: &str) -> usize {
    if grapheme.contains(VARIATION_SELECTOR_16) {
        return 2;
    }

    grapheme.width().clamp(1, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_one_simple_run() {
        assert_eq!(segments("hello"), vec![Segment::Simple("hello")]);
        assert_eq!(display_width("hello"), 5);
    }

    #[test]
    fn wide_cjk_characters_are_two_column_clusters() {
        assert_eq!(
            segments("hi你"),
            vec![
                Segment::Simple("hi"),
                Segment::Cluster { text: "你", width: 2 },
            ]
        );
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn combining_marks_join_their_base() {
        // 'e' followed by a combining acute accent.
        let text = "e\u{0301}x";
        assert_eq!(
            segments(text),
            vec![
                Segment::Cluster { text: "e\u{0301}", width: 1 },
                Segment::Simple("x"),
            ]
        );
        assert_eq!(display_width(text), 2);
    }

    #[test]
    fn zwj_emoji_sequence_is_one_cluster() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let segs = segments(family);
        assert_eq!(segs.len(), 1);
        assert!(matches!(segs[0], Segment::Cluster { width: 2, .. }));
    }

    #[test]
    fn regional_indicator_pair_is_one_cluster() {
        // Two regional indicators form one flag.
        let flag = "\u{1F1FA}\u{1F1F8}";
        let segs = segments(flag);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].text(), flag);
    }

    #[test]
    fn presentation_selector_forces_two_columns() {
        // U+2764 HEAVY BLACK HEART is narrow; VS16 makes it emoji.
        assert_eq!(cluster_width("\u{2764}\u{fe0f}"), 2);
    }

    #[test]
    fn hangul_syllable_joins() {
        // Decomposed Hangul L+V+T forms one wide syllable.
        let syllable = "\u{1100}\u{1161}\u{11A8}";
        let segs = segments(syllable);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].width(), 2);
    }
}
