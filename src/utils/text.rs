/// Code point ranges rendered two columns wide: CJK scripts, kana, hangul and
/// fullwidth forms.
const WIDE_RANGES: &[(char, char)] = &[
    ('\u{1100}', '\u{115F}'),
    ('\u{2E80}', '\u{303E}'),
    ('\u{3041}', '\u{33FF}'),
    ('\u{3400}', '\u{4DBF}'),
    ('\u{4E00}', '\u{9FFF}'),
    ('\u{A000}', '\u{A4CF}'),
    ('\u{AC00}', '\u{D7A3}'),
    ('\u{F900}', '\u{FAFF}'),
    ('\u{FE30}', '\u{FE4F}'),
    ('\u{FF00}', '\u{FF60}'),
    ('\u{FFE0}', '\u{FFE6}'),
    ('\u{1F300}', '\u{1F64F}'),
    ('\u{1F900}', '\u{1F9FF}'),
    ('\u{20000}', '\u{2FFFD}'),
];

pub fn char_width(c: char) -> usize {
    if WIDE_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&c)) {
        2
    } else {
        1
    }
}

/// Terminal columns taken by `s`.
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Splits `text` into lines no wider than `max_width` columns. Latin text
/// breaks at the last space that fits; Japanese text, which has no spaces,
/// breaks at the column limit.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(2);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut remaining = source_line;
        while display_width(remaining) > max_width {
            let mut width = 0;
            let mut cut = 0;
            let mut last_space = None;
            for (pos, ch) in remaining.char_indices() {
                width += char_width(ch);
                if width > max_width {
                    break;
                }
                if ch == ' ' {
                    last_space = Some(pos);
                }
                cut = pos + ch.len_utf8();
            }

            match last_space.filter(|&pos| pos > 0) {
                Some(pos) => {
                    lines.push(remaining[..pos].to_string());
                    remaining = remaining[pos + 1..].trim_start();
                }
                None => {
                    lines.push(remaining[..cut].to_string());
                    remaining = &remaining[cut..];
                }
            }
        }
        lines.push(remaining.to_string());
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Right-pads `s` with spaces to exactly `width` columns.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(padding))
}
