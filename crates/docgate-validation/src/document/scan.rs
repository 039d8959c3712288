//! Linear scans over raw PDF bytes
//!
//! These run before (or instead of) the structural parser and never recurse, so they are
//! safe on any input the size gate lets through.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::bytes::Regex;

/// Deepest array/dictionary nesting accepted. Matches the bound lopdf itself applies to
/// nested parentheses in literal strings.
pub(crate) const MAX_NESTING_DEPTH: usize = 100;

/// Longest `/Prev` chain followed when looking for a cycle
const MAX_XREF_SECTIONS: usize = 1024;

/// How far back from an `/Encrypt` entry to look for the keyword that opened its context
const ENCRYPT_CONTEXT_WINDOW: usize = 4096;

/// Only the last few `/Encrypt` candidates are examined; trailers sit at the end
const MAX_ENCRYPT_CANDIDATES: usize = 64;

static ENCRYPT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/Encrypt\s*(?:\d+\s+\d+\s+R|<<)").expect("valid encrypt pattern")
});

static STRUCTURE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:trailer|endobj|obj|endstream|stream)\b").expect("valid keyword pattern")
});

static XREF_STREAM_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/XRef\b").expect("valid xref type pattern"));

static STARTXREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"startxref\s+(\d+)").expect("valid startxref pattern"));

static STARTXREF_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"startxref").expect("valid startxref keyword pattern"));

static PREV_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Prev\s+(\d+)").expect("valid prev pattern"));

/// True if `[`/`<<` nesting goes deeper than `limit` anywhere outside strings, comments
/// and stream bodies.
pub(crate) fn exceeds_nesting_depth(data: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            b'%' => {
                i = skip_to_eol(data, i);
                continue;
            }
            b'(' => {
                i = skip_literal_string(data, i);
                continue;
            }
            b'[' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' => depth = depth.saturating_sub(1),
            b'<' if data.get(i + 1) == Some(&b'<') => {
                depth += 1;
                if depth > limit {
                    return true;
                }
                i += 2;
                continue;
            }
            b'<' => {
                // Hex string
                i = data[i..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(data.len(), |p| i + p + 1);
                continue;
            }
            b'>' if data.get(i + 1) == Some(&b'>') => {
                depth = depth.saturating_sub(1);
                i += 2;
                continue;
            }
            b's' if starts_stream_body(data, i) => {
                i = find(&data[i..], b"endstream").map_or(data.len(), |p| i + p + 9);
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    false
}

/// True if following `/Prev` from the last `startxref` revisits a cross-reference section
pub(crate) fn has_cyclic_xref_chain(data: &[u8]) -> bool {
    let Some(mut offset) = STARTXREF
        .captures_iter(data)
        .last()
        .and_then(|caps| parse_offset(caps.get(1)?.as_bytes()))
    else {
        return false;
    };

    let mut seen = HashSet::new();
    while seen.len() < MAX_XREF_SECTIONS {
        if !seen.insert(offset) {
            return true;
        }
        let Some(section) = data.get(offset..) else {
            return false;
        };
        // A section's trailer (or xref stream dictionary) ends before its own startxref
        let end = STARTXREF_KEYWORD
            .find(section)
            .map_or(section.len(), |m| m.start());
        match PREV_ENTRY
            .captures(&section[..end])
            .and_then(|caps| parse_offset(caps.get(1)?.as_bytes()))
        {
            Some(prev) => offset = prev,
            None => return false,
        }
    }

    false
}

/// True if a trailer, or a cross-reference stream dictionary, carries an `/Encrypt` entry.
/// The same text inside a content stream or an ordinary object does not count.
pub(crate) fn trailer_declares_encryption(data: &[u8]) -> bool {
    let candidates: Vec<usize> = ENCRYPT_ENTRY.find_iter(data).map(|m| m.start()).collect();
    candidates
        .iter()
        .rev()
        .take(MAX_ENCRYPT_CANDIDATES)
        .any(|&at| encrypt_entry_in_trailer(data, at))
}

fn encrypt_entry_in_trailer(data: &[u8], at: usize) -> bool {
    let from = at.saturating_sub(ENCRYPT_CONTEXT_WINDOW);
    let Some(opener) = STRUCTURE_KEYWORD.find_iter(&data[from..at]).last() else {
        return false;
    };

    match opener.as_bytes() {
        b"trailer" => true,
        b"obj" => {
            let dict_start = from + opener.end();
            let after = &data[at..data.len().min(at + ENCRYPT_CONTEXT_WINDOW)];
            let dict_end = STRUCTURE_KEYWORD
                .find(after)
                .map_or(at + after.len(), |m| at + m.start());
            XREF_STREAM_TYPE.is_match(&data[dict_start..dict_end])
        }
        _ => false,
    }
}

/// `stream` keyword at `i` followed by an end of line, and not the tail of `endstream`
fn starts_stream_body(data: &[u8], i: usize) -> bool {
    if !data[i..].starts_with(b"stream") {
        return false;
    }
    if i > 0 && data[i - 1].is_ascii_alphanumeric() {
        return false;
    }
    matches!(data.get(i + 6), Some(b'\r') | Some(b'\n'))
}

fn skip_to_eol(data: &[u8], i: usize) -> usize {
    data[i..]
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .map_or(data.len(), |p| i + p)
}

/// Index just past the literal string starting at `start`
fn skip_literal_string(data: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    data.len()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_offset(digits: &[u8]) -> Option<usize> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_array(depth: usize) -> Vec<u8> {
        let mut data = b"1 0 obj\n<< /X ".to_vec();
        data.extend(std::iter::repeat(b'[').take(depth));
        data.extend(std::iter::repeat(b']').take(depth));
        data.extend_from_slice(b" >>\nendobj\n");
        data
    }

    #[test]
    fn test_nesting_depth_limit() {
        // The enclosing dictionary adds one level
        assert!(!exceeds_nesting_depth(&nested_array(MAX_NESTING_DEPTH - 1), MAX_NESTING_DEPTH));
        assert!(exceeds_nesting_depth(&nested_array(MAX_NESTING_DEPTH), MAX_NESTING_DEPTH));
        assert!(exceeds_nesting_depth(&nested_array(200_000), MAX_NESTING_DEPTH));
    }

    #[test]
    fn test_nesting_ignores_strings_comments_and_streams() {
        let opens = "[".repeat(500);
        let data = format!(
            "% {opens}\n1 0 obj\n<< /T ({opens}) /H <5B5B> /Length 500 >>\nstream\n{opens}\nendstream\nendobj\n"
        );
        assert!(!exceeds_nesting_depth(data.as_bytes(), 10));
    }

    #[test]
    fn test_nesting_counts_dictionaries() {
        let data = "<<".repeat(20) + &">>".repeat(20);
        assert!(exceeds_nesting_depth(data.as_bytes(), 10));
        assert!(!exceeds_nesting_depth(data.as_bytes(), 20));
    }

    #[test]
    fn test_escaped_parenthesis_does_not_end_string() {
        let data = format!("(a \\) {} b) [[]]", "[".repeat(50));
        assert!(!exceeds_nesting_depth(data.as_bytes(), 5));
    }

    #[test]
    fn test_cyclic_xref_chain() {
        let data = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 /Prev 9 >>\nstartxref\n9\n%%EOF\n";
        assert!(has_cyclic_xref_chain(data));
    }

    #[test]
    fn test_linear_xref_chain() {
        let first = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 >>\nstartxref\n9\n%%EOF\n";
        let mut data = first.to_vec();
        let second_offset = data.len();
        data.extend_from_slice(b"xref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 /Prev 9 >>\n");
        data.extend_from_slice(format!("startxref\n{}\n%%EOF\n", second_offset).as_bytes());
        assert!(!has_cyclic_xref_chain(&data));
    }

    #[test]
    fn test_encrypt_in_trailer() {
        let data = b"trailer\n<< /Size 5 /Root 1 0 R /Encrypt 4 0 R >>\nstartxref\n0\n%%EOF";
        assert!(trailer_declares_encryption(data));
    }

    #[test]
    fn test_encrypt_in_xref_stream_dictionary() {
        let data = b"7 0 obj\n<< /Encrypt << /Filter /Standard >> /Type /XRef /Size 8 >>\nstream\n\x00\x01\nendstream\nendobj\n";
        assert!(trailer_declares_encryption(data));
    }

    #[test]
    fn test_encrypt_in_content_stream_is_ignored() {
        let data = b"4 0 obj\n<< /Length 40 >>\nstream\nBT (see /Encrypt 5 0 R) Tj ET\nendstream\nendobj\ntrailer\n<< /Root 1 0 R >>";
        assert!(!trailer_declares_encryption(data));
    }

    #[test]
    fn test_encrypt_in_ordinary_object_is_ignored() {
        let data = b"4 0 obj\n<< /Note /Encrypt 5 0 R >>\nendobj\n";
        assert!(!trailer_declares_encryption(data));
    }
}
