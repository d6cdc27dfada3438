// Copyright (c) 2026 rezky_nightky

use crate::error::{GlyphfallError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    /// Halfwidth katakana, digits and capitals: the intro's rain alphabet
    /// restricted to single-column glyphs.
    Intro,
    AsciiSafe,
    Ascii,
    Binary,
    Hex,
    Digits,
    English,
    Katakana,
    Symbols,
    Blocks,
    Braille,
}

pub fn charset_from_str(spec: &str, default_to_ascii: bool) -> Result<Charset> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "auto" => Ok(if default_to_ascii {
            Charset::AsciiSafe
        } else {
            Charset::Intro
        }),
        "intro" | "matrix" => Ok(Charset::Intro),
        "ascii" => Ok(Charset::Ascii),
        "bin" | "binary" | "01" => Ok(Charset::Binary),
        "hex" | "hexadecimal" => Ok(Charset::Hex),
        "digits" | "dec" | "decimal" => Ok(Charset::Digits),
        "english" => Ok(Charset::English),
        "katakana" => Ok(Charset::Katakana),
        "symbols" => Ok(Charset::Symbols),
        "blocks" => Ok(Charset::Blocks),
        "braille" => Ok(Charset::Braille),
        _ => Err(GlyphfallError::UnknownCharset(spec)),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

pub fn build_chars(charset: Charset) -> Vec<char> {
    let mut out = Vec::new();
    match charset {
        Charset::Intro => {
            push_range(&mut out, 0xFF66, 0xFF9D);
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x5A);
        }
        Charset::AsciiSafe => {
            push_range(&mut out, 0x41, 0x5A);
            push_range(&mut out, 0x61, 0x7A);
            push_range(&mut out, 0x30, 0x39);
        }
        Charset::Ascii => push_range(&mut out, 0x21, 0x7E),
        Charset::Binary => push_range(&mut out, 0x30, 0x31),
        Charset::Hex => {
            push_range(&mut out, 0x30, 0x39);
            push_range(&mut out, 0x41, 0x46);
        }
        Charset::Digits => push_range(&mut out, 0x30, 0x39),
        Charset::English => {
            push_range(&mut out, 0x41, 0x5A);
            push_range(&mut out, 0x61, 0x7A);
        }
        Charset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
        Charset::Symbols => out.extend("∞∑∫√π∆Ωµλ≈≠≤≥×÷±∂∇∈∉∩∪⊂⊃⊆⊇⊕⊗".chars()),
        Charset::Blocks => push_range(&mut out, 0x2580, 0x259F),
        Charset::Braille => push_range(&mut out, 0x2801, 0x28FF),
    }
    out
}

/// Alphabet from a literal string. Whitespace and control characters are
/// dropped, duplicates keep their first position.
pub fn literal_chars(s: &str) -> Result<Vec<char>> {
    let mut out: Vec<char> = Vec::new();
    for ch in s.chars() {
        if ch.is_whitespace() || ch.is_control() || out.contains(&ch) {
            continue;
        }
        out.push(ch);
    }
    if out.is_empty() {
        return Err(GlyphfallError::invalid(
            "--chars",
            format!("{:?}", s),
            "needs at least one visible character",
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_ascii_safe_outside_utf_locales() {
        assert_eq!(charset_from_str("auto", true).unwrap(), Charset::AsciiSafe);
        assert_eq!(charset_from_str(" AUTO ", false).unwrap(), Charset::Intro);
    }

    #[test]
    fn unknown_charset_is_reported() {
        let e = charset_from_str("klingon", false).unwrap_err();
        assert!(e.to_string().contains("klingon"));
    }

    #[test]
    fn intro_alphabet_is_single_width() {
        let chars = build_chars(Charset::Intro);
        assert_eq!(chars.len(), 56 + 10 + 26);
        assert!(chars.contains(&'ｱ'));
        assert!(chars.contains(&'7'));
        assert!(chars.contains(&'Q'));
    }

    #[test]
    fn binary_has_only_0_and_1() {
        assert_eq!(build_chars(Charset::Binary), vec!['0', '1']);
    }

    #[test]
    fn literal_chars_drop_blanks_and_duplicates() {
        assert_eq!(literal_chars("a b\ta\nc").unwrap(), vec!['a', 'b', 'c']);
        assert!(literal_chars(" \t").is_err());
    }
}
