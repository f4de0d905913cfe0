//! Font metrics for the standard-14 Helvetica family.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em for the printable
//! ASCII range and the WinAnsi punctuation block. Other characters fall back
//! to a typical lowercase width, which is good enough for wrapping form
//! captions.

/// Helvetica and Helvetica-Oblique, chars 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold and Helvetica-BoldOblique, chars 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// WinAnsiEncoding 0x80..=0x9F: character, code, regular and bold widths.
const WIN_ANSI_HIGH: [(char, u8, u16, u16); 27] = [
    ('\u{20AC}', 0x80, 556, 556),  // Euro
    ('\u{201A}', 0x82, 222, 278),  // quotesinglbase
    ('\u{0192}', 0x83, 556, 556),  // florin
    ('\u{201E}', 0x84, 333, 500),  // quotedblbase
    ('\u{2026}', 0x85, 1000, 1000), // ellipsis
    ('\u{2020}', 0x86, 556, 556),  // dagger
    ('\u{2021}', 0x87, 556, 556),  // daggerdbl
    ('\u{02C6}', 0x88, 333, 333),  // circumflex
    ('\u{2030}', 0x89, 1000, 1000), // perthousand
    ('\u{0160}', 0x8A, 667, 667),  // Scaron
    ('\u{2039}', 0x8B, 333, 333),  // guilsinglleft
    ('\u{0152}', 0x8C, 1000, 1000), // OE
    ('\u{017D}', 0x8E, 611, 611),  // Zcaron
    ('\u{2018}', 0x91, 222, 278),  // quoteleft
    ('\u{2019}', 0x92, 222, 278),  // quoteright
    ('\u{201C}', 0x93, 333, 500),  // quotedblleft
    ('\u{201D}', 0x94, 333, 500),  // quotedblright
    ('\u{2022}', 0x95, 350, 350),  // bullet
    ('\u{2013}', 0x96, 556, 556),  // endash
    ('\u{2014}', 0x97, 1000, 1000), // emdash
    ('\u{02DC}', 0x98, 333, 333),  // tilde
    ('\u{2122}', 0x99, 1000, 1000), // trademark
    ('\u{0161}', 0x9A, 500, 556),  // scaron
    ('\u{203A}', 0x9B, 333, 333),  // guilsinglright
    ('\u{0153}', 0x9C, 944, 944),  // oe
    ('\u{017E}', 0x9E, 500, 500),  // zcaron
    ('\u{0178}', 0x9F, 667, 667),  // Ydieresis
];

const FALLBACK_WIDTH: u16 = 556;

/// Single-byte WinAnsiEncoding code for `ch`, if the encoding has one.
pub fn win_ansi_code(ch: char) -> Option<u8> {
    match ch as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => win_ansi_high(ch).map(|(_, code, ..)| code),
    }
}

fn win_ansi_high(ch: char) -> Option<(char, u8, u16, u16)> {
    WIN_ANSI_HIGH.iter().copied().find(|(c, ..)| *c == ch)
}

/// The built-in fonts the drawing surface can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl BuiltinFont {
    pub const ALL: [BuiltinFont; 4] = [
        BuiltinFont::Helvetica,
        BuiltinFont::HelveticaBold,
        BuiltinFont::HelveticaOblique,
        BuiltinFont::HelveticaBoldOblique,
    ];

    pub fn base_font(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
            BuiltinFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
            BuiltinFont::HelveticaOblique => "F3",
            BuiltinFont::HelveticaBoldOblique => "F4",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, BuiltinFont::HelveticaBold | BuiltinFont::HelveticaBoldOblique)
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(self, ch: char) -> u16 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        match ch as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            0xA0 => table[0],
            _ => match win_ansi_high(ch) {
                Some((_, _, regular, bold)) => {
                    if self.is_bold() { bold } else { regular }
                }
                None => FALLBACK_WIDTH,
            },
        }
    }

    /// Rendered width of `text` in points.
    pub fn text_width(self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * font_size / 1000.0
    }
}

/// Accuracy tier used when measuring text for wrapping.
///
/// `Metrics` uses the AFM tables above and is the default. `Approximate`
/// is the legacy estimate of `font_size * 0.6` per character; it needs no
/// font data but over-estimates narrow text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMeasure {
    #[default]
    Metrics,
    Approximate,
}

impl TextMeasure {
    pub fn width(self, text: &str, font: BuiltinFont, font_size: f32) -> f32 {
        match self {
            TextMeasure::Metrics => font.text_width(text, font_size),
            TextMeasure::Approximate => text.chars().count() as f32 * font_size * 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names_distinct() {
        let names: std::collections::HashSet<_> =
            BuiltinFont::ALL.iter().map(|f| f.resource_name()).collect();
        assert_eq!(names.len(), BuiltinFont::ALL.len());
        assert_eq!(BuiltinFont::HelveticaBold.base_font(), "Helvetica-Bold");
    }

    #[test]
    fn test_known_widths() {
        assert_eq!(BuiltinFont::Helvetica.char_width(' '), 278);
        assert_eq!(BuiltinFont::Helvetica.char_width('W'), 944);
        assert_eq!(BuiltinFont::Helvetica.char_width('i'), 222);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('i'), 278);
        assert_eq!(BuiltinFont::HelveticaOblique.char_width('m'), 833);
        assert_eq!(BuiltinFont::Helvetica.char_width('\u{2022}'), 350);
    }

    #[test]
    fn test_win_ansi_punctuation() {
        assert_eq!(win_ansi_code('A'), Some(0x41));
        assert_eq!(win_ansi_code('\u{E9}'), Some(0xE9));
        assert_eq!(win_ansi_code('\u{2019}'), Some(0x92));
        assert_eq!(win_ansi_code('\u{2014}'), Some(0x97));
        assert_eq!(win_ansi_code('\u{20AC}'), Some(0x80));
        assert_eq!(win_ansi_code('\u{0394}'), None);
        assert_eq!(win_ansi_code('\u{7F}'), None);

        assert_eq!(BuiltinFont::Helvetica.char_width('\u{2019}'), 222);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('\u{201C}'), 500);
        assert_eq!(BuiltinFont::Helvetica.char_width('\u{2026}'), 1000);
        assert_eq!(BuiltinFont::Helvetica.char_width('\u{2013}'), 556);
    }

    #[test]
    fn test_text_width() {
        // "Hello" = 722 + 556 + 222 + 222 + 556 = 2278 units
        let w = BuiltinFont::Helvetica.text_width("Hello", 10.0);
        assert!((w - 22.78).abs() < 0.001);
        assert_eq!(BuiltinFont::Helvetica.text_width("", 10.0), 0.0);
    }

    #[test]
    fn test_approximate_tier() {
        let approx = TextMeasure::Approximate.width("iiii", BuiltinFont::Helvetica, 10.0);
        assert!((approx - 24.0).abs() < 0.001);
        let exact = TextMeasure::Metrics.width("iiii", BuiltinFont::Helvetica, 10.0);
        assert!(exact < approx);
    }
}
