//! Standard Helvetica faces: metrics for alignment and WinAnsi text encoding.

/// The two faces the invoice uses. Both are PDF base-14 fonts and are
/// never embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// PDF BaseFont name.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Advance width of a character in 1/1000 em.
    pub fn char_width(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (32..=126).contains(&code) {
            let index = (code - 32) as usize;
            return match self {
                Font::Regular => HELVETICA_WIDTHS[index],
                Font::Bold => HELVETICA_BOLD_WIDTHS[index],
            };
        }
        match (self, ch) {
            (_, '€') => 556,
            (_, '\u{a0}') => 278,
            (_, 'ß') => 611,
            (Font::Regular, 'Ä') => 667,
            (Font::Bold, 'Ä') => 722,
            (_, 'Ö') => 778,
            (_, 'Ü') => 722,
            (Font::Regular, 'ö' | 'ü') => 556,
            (Font::Bold, 'ö' | 'ü') => 611,
            (_, 'ä') => 556,
            _ => DEFAULT_WIDTH,
        }
    }

    /// Width of `text` in points at `size`.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|ch| self.char_width(ch) as u32).sum();
        units as f64 * size / 1000.0
    }
}

const DEFAULT_WIDTH: u16 = 556;

/// Encode text for a font with `/WinAnsiEncoding`.
///
/// Latin-1 characters map to themselves, `€` and typographic quotes and
/// dashes to their cp1252 slots. Anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Helvetica widths for ASCII 32..=126, Adobe AFM data.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold widths for ASCII 32..=126, Adobe AFM data.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_german_text() {
        assert_eq!(encode_win_ansi("Gebühr"), b"Geb\xfchr".to_vec());
        assert_eq!(encode_win_ansi("30,00 €"), b"30,00 \x80".to_vec());
        assert_eq!(encode_win_ansi("ẞ"), b"?".to_vec());
    }

    #[test]
    fn measures_with_afm_widths() {
        // "Hi" = 722 + 222 units.
        assert!((Font::Regular.measure("Hi", 10.0) - 9.44).abs() < 1e-9);
        assert!(Font::Bold.measure("RECHNUNG", 24.0) > Font::Regular.measure("RECHNUNG", 24.0));
    }

    #[test]
    fn width_tables_are_complete() {
        assert_eq!(Font::Regular.char_width('~'), 584);
        assert_eq!(Font::Bold.char_width(' '), 278);
        assert_eq!(Font::Regular.char_width('€'), 556);
    }
}
