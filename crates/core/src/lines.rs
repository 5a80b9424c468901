// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Byte-oriented line reading.
//!
//! Benchmark logs interleave readings with tool chatter that is not always
//! valid UTF-8. Lines are handed out undecoded so callers can discard the
//! ones they do not care about before any decoding happens.

use std::borrow::Cow;
use std::io::{self, BufRead};

/// Iterate over the lines of `reader` with `\n` or `\r\n` removed.
pub(crate) fn raw_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<Vec<u8>>> {
    reader.split(b'\n').map(|line| {
        line.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            bytes
        })
    })
}

/// Decode a line, replacing invalid sequences with U+FFFD.
pub(crate) fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// True for lines holding only whitespace.
pub(crate) fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_invalid_utf8_is_not_an_error() {
        let lines: Vec<Vec<u8>> = raw_lines(Cursor::new(&b"caf\xe9\r\nok\nlast"[..]))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec![b"caf\xe9".to_vec(), b"ok".to_vec(), b"last".to_vec()]);
        assert_eq!(decode(&lines[0]), "caf\u{fffd}");
    }

    #[test]
    fn test_blank_lines() {
        assert!(is_blank(b""));
        assert!(is_blank(b" \t "));
        assert!(!is_blank(b" x"));
    }
}
