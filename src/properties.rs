//! Line-oriented `key=value` properties grammar.
//!
//! Comment lines start with `#` or `!`, keys are separated from values by
//! `=`, `:` or whitespace, a trailing odd backslash continues the line, and
//! the usual `\t \n \r \f \uXXXX` escapes are honoured.

use std::borrow::Cow;

use crate::error::ConfigError;

const WHITESPACE: &[char] = &[' ', '\t', '\x0c'];

/// Decodes raw resource bytes. Invalid UTF-8 falls back to ISO-8859-1, which
/// maps every byte to the code point of the same value.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Parses properties text into entries in source order. Duplicate keys are
/// all returned; the caller decides which one wins.
pub fn parse(text: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut entries = Vec::new();
    for (line, logical) in logical_lines(text) {
        let (raw_key, raw_value) = split_entry(&logical);
        let key = unescape(raw_key, line, false)?;
        let value = unescape(raw_value, line, true)?;
        entries.push((key, value));
    }
    Ok(entries)
}

fn skip_ws(s: &str) -> &str {
    s.trim_start_matches(WHITESPACE)
}

fn is_ws(c: char) -> bool {
    WHITESPACE.contains(&c)
}

// Splits on `\n`, `\r` and `\r\n`. A terminator at end of input does not
// produce a trailing empty line.
fn natural_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Joins continued natural lines. Each logical line is paired with the
/// 1-based number of the natural line it starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let natural = natural_lines(text);
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < natural.len() {
        let line_no = idx + 1;
        let mut current = skip_ws(natural[idx]);
        idx += 1;
        if current.is_empty() || current.starts_with('#') || current.starts_with('!') {
            continue;
        }

        let mut logical = String::new();
        loop {
            if !continues(current) {
                logical.push_str(current);
                break;
            }
            logical.push_str(&current[..current.len() - 1]);
            match natural.get(idx) {
                Some(next) => {
                    current = skip_ws(next);
                    idx += 1;
                }
                None => break,
            }
        }
        out.push((line_no, logical));
    }
    out
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_ws(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut rest = skip_ws(&line[key_end..]);
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = skip_ws(stripped);
    }
    (&line[..key_end], rest)
}

fn malformed(line: usize, reason: &str) -> ConfigError {
    ConfigError::Parse {
        line,
        reason: reason.to_string(),
    }
}

fn hex_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16, ConfigError> {
    let mut unit: u16 = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| malformed(line, "malformed \\uxxxx encoding"))?;
        unit = (unit << 4) | digit as u16;
    }
    Ok(unit)
}

fn unicode_escape(chars: &mut std::str::Chars<'_>, line: usize) -> Result<char, ConfigError> {
    let unit = hex_unit(chars, line)?;
    if !(0xD800..0xDC00).contains(&unit) {
        return char::from_u32(unit as u32).ok_or_else(|| malformed(line, "unpaired low surrogate"));
    }

    // High surrogate: the low half must follow as another \u escape.
    let mut lookahead = chars.clone();
    if lookahead.next() != Some('\\') || lookahead.next() != Some('u') {
        return Err(malformed(line, "unpaired high surrogate"));
    }
    let low = hex_unit(&mut lookahead, line)?;
    if !(0xDC00..0xE000).contains(&low) {
        return Err(malformed(line, "unpaired high surrogate"));
    }
    *chars = lookahead;
    let code = 0x10000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
    char::from_u32(code).ok_or_else(|| malformed(line, "invalid surrogate pair"))
}

fn unescape(raw: &str, line: usize, trim_trailing: bool) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    // Length of `out` up to the last character that must survive trimming.
    let mut keep = 0;
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            if !is_ws(c) {
                keep = out.len();
            }
            continue;
        }
        let decoded = match chars.next() {
            None => break,
            Some('t') => '\t',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('f') => '\x0c',
            Some('u') => unicode_escape(&mut chars, line)?,
            Some(other) => other,
        };
        out.push(decoded);
        keep = out.len();
    }
    if trim_trailing {
        out.truncate(keep);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse(text).expect("parse")
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn separators() {
        assert_eq!(
            pairs("a=1\nb:2\nc 3\nd = 4\ne\t:\t5\nf"),
            vec![
                pair("a", "1"),
                pair("b", "2"),
                pair("c", "3"),
                pair("d", "4"),
                pair("e", "5"),
                pair("f", ""),
            ]
        );
    }

    #[test]
    fn only_first_separator_splits() {
        assert_eq!(pairs("url=http://host:80/a=b"), vec![pair("url", "http://host:80/a=b")]);
    }

    #[test]
    fn comments_and_blank_lines() {
        let text = "# comment\n   ! bang comment\n\n   \nkey=value\n#trailing";
        assert_eq!(pairs(text), vec![pair("key", "value")]);
    }

    #[test]
    fn hash_inside_value_is_literal() {
        assert_eq!(pairs("color=#ff0000"), vec![pair("color", "#ff0000")]);
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(pairs("   host =  localhost   \t"), vec![pair("host", "localhost")]);
    }

    #[test]
    fn escaped_trailing_space_survives() {
        assert_eq!(pairs("pad=x\\ "), vec![pair("pad", "x ")]);
    }

    #[test]
    fn line_endings() {
        assert_eq!(
            pairs("a=1\r\nb=2\rc=3\n"),
            vec![pair("a", "1"), pair("b", "2"), pair("c", "3")]
        );
    }

    #[test]
    fn continuation_joins_lines() {
        let text = "fruits=apple, \\\n        banana, \\\n        pear\nnext=1";
        assert_eq!(
            pairs(text),
            vec![pair("fruits", "apple, banana, pear"), pair("next", "1")]
        );
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        assert_eq!(pairs("path=c:\\\\\nx=1"), vec![pair("path", "c:\\"), pair("x", "1")]);
    }

    #[test]
    fn continuation_at_end_of_input() {
        assert_eq!(pairs("k=v\\"), vec![pair("k", "v")]);
    }

    #[test]
    fn continued_line_is_not_a_comment() {
        assert_eq!(pairs("k=a\\\n#b"), vec![pair("k", "a#b")]);
    }

    #[test]
    fn comment_lines_do_not_continue() {
        assert_eq!(pairs("# note \\\nk=v"), vec![pair("k", "v")]);
    }

    #[test]
    fn escapes() {
        assert_eq!(
            pairs("k=tab\\there\\nnl\\u0041\\z"),
            vec![pair("k", "tab\there\nnlAz")]
        );
    }

    #[test]
    fn escaped_separators_in_key() {
        assert_eq!(
            pairs("a\\=b\\:c\\ d=v"),
            vec![pair("a=b:c d", "v")]
        );
    }

    #[test]
    fn surrogate_pair() {
        assert_eq!(pairs("smile=\\uD83D\\uDE00"), vec![pair("smile", "\u{1F600}")]);
    }

    #[test]
    fn malformed_unicode_reports_line() {
        let err = parse("ok=1\n# c\nbad=\\u12G4").unwrap_err();
        match err {
            ConfigError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_unicode_is_malformed() {
        assert!(matches!(parse("k=\\u00"), Err(ConfigError::Parse { line: 1, .. })));
    }

    #[test]
    fn lone_high_surrogate_is_malformed() {
        assert!(matches!(parse("k=\\uD83Dx"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        assert_eq!(pairs("a=1\na=2"), vec![pair("a", "1"), pair("a", "2")]);
    }

    #[test]
    fn decode_utf8_and_bom() {
        assert_eq!(decode("\u{feff}k=é".as_bytes()), "k=é");
    }

    #[test]
    fn decode_falls_back_to_latin1() {
        assert_eq!(decode(b"name=caf\xe9"), "name=café");
    }
}
