// Metrics for the two built-in faces the report uses.
//
// Widths are the Adobe core-14 AFM values (thousandths of an em) for the
// printable ASCII range. That range covers every string the composer emits;
// anything outside it falls back to an average width and encodes as '?'.

/// The faces registered in every page's resource dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// Resource name used in content streams (`/F1 Tf`).
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// PostScript base font name for the font dictionary.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

const FALLBACK_WIDTH: u16 = 556;

// ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(c: char, font: Font) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        font.widths()[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Advance width of `text` at `size` points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, font) as u32).sum();
    units as f32 / 1000.0 * size
}

/// Truncate `text` so it fits in `max_width` points, appending `...` when
/// anything was cut. Returns the input unchanged when it already fits.
pub fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }
    let ellipsis_w = text_width("...", font, size);
    let budget = (max_width - ellipsis_w).max(0.0);
    let mut out = String::new();
    let mut used = 0.0f32;
    for c in text.chars() {
        let w = glyph_width(c, font) as f32 / 1000.0 * size;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Encode text for a WinAnsi-encoded simple font. Characters outside the
/// Latin-1 range become '?'.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code < 0x80 || (0xA0..=0xFF).contains(&code) {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_matches_afm_values() {
        // "Hi" in Helvetica: H=722, i=222.
        let w = text_width("Hi", Font::Helvetica, 10.0);
        assert!((w - 9.44).abs() < 1e-4);
        // Digits are 556 in both faces.
        let d = text_width("42", Font::HelveticaBold, 10.0);
        assert!((d - 11.12).abs() < 1e-4);
    }

    #[test]
    fn bold_is_wider_for_lowercase() {
        let regular = text_width("offense", Font::Helvetica, 12.0);
        let bold = text_width("offense", Font::HelveticaBold, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn truncation_respects_budget() {
        let long = "Driving without a valid passenger service permit";
        let cut = truncate_to_width(long, Font::Helvetica, 10.0, 80.0);
        assert!(cut.ends_with("..."));
        assert!(text_width(&cut, Font::Helvetica, 10.0) <= 80.0);

        let short = "Speeding";
        assert_eq!(truncate_to_width(short, Font::Helvetica, 10.0, 160.0), short);
    }

    #[test]
    fn winansi_replaces_unmappable_chars() {
        assert_eq!(encode_winansi("Route 5"), b"Route 5".to_vec());
        assert_eq!(encode_winansi("\u{20AC}"), vec![b'?']);
    }
}
