//! Lazy `key: value` scanner for loosely structured text files
//! like `/proc/cpuinfo`.
//!
//! A line qualifies only if it contains a `:`; everything before the
//! colon is the key, everything after (minus leading spaces) is the
//! value. Malformed lines are skipped silently. Keys and values are
//! clipped to fixed maximum lengths; overly long tokens are truncated,
//! never an error.

use std::fs;
use std::path::Path;

/// Maximum key length in bytes; longer keys are clipped.
pub const MAX_KEY_LEN: usize = 128;
/// Maximum value length in bytes; longer values are clipped.
pub const MAX_VALUE_LEN: usize = 512;

/// Single forward pass over an owned text buffer, yielding
/// `(key, value)` pairs. Not restartable; create a new scanner to
/// re-scan the same content.
pub struct KvScanner {
    buffer: String,
    pos: usize,
}

impl KvScanner {
    pub fn new(buffer: impl Into<String>) -> Self {
        KvScanner {
            buffer: buffer.into(),
            pos: 0,
        }
    }

    /// Reads the file fully into memory first. `None` if the file
    /// cannot be read (missing pseudo-file is "no data", not an error).
    pub fn from_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Some(Self::new(content))
    }

    fn next_pair(&mut self) -> Option<(String, String)> {
        while self.pos < self.buffer.len() {
            let rest = &self.buffer[self.pos..];
            let line_end = rest.find('\n').unwrap_or(rest.len());
            let line = &rest[..line_end];
            self.pos += line_end + 1;

            if let Some(col) = line.find(':') {
                let key = clip(&line[..col], MAX_KEY_LEN);
                let value = clip(line[col + 1..].trim_start_matches(' '), MAX_VALUE_LEN);
                return Some((key.to_string(), value.to_string()));
            }
        }
        None
    }
}

impl Iterator for KvScanner {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_pair()
    }
}

/// Clip to at most `max` bytes without splitting a UTF-8 sequence.
fn clip(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Compares the first `min(len, len)` bytes of the two keys, so a
/// shorter search key matching a line key's prefix counts as a match.
/// This tolerates kernels that pad keys with tabs (`processor\t`) and
/// minor key variants. Case-sensitive.
pub fn key_matches(line_key: &str, wanted: &str) -> bool {
    let n = line_key.len().min(wanted.len());
    line_key.as_bytes()[..n] == wanted.as_bytes()[..n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_scan_basic_pairs() {
        let text = "processor\t: 0\nmodel name\t: ARMv7 Processor rev 4 (v7l)\n";
        let pairs: Vec<_> = KvScanner::new(text).collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("processor\t".to_string(), "0".to_string()));
        assert_eq!(pairs[1].1, "ARMv7 Processor rev 4 (v7l)");
    }

    #[test]
    fn test_lines_without_colon_are_skipped() {
        let text = "no colon here\nkey: value\n\nanother bare line";
        let pairs: Vec<_> = KvScanner::new(text).collect();
        assert_eq!(pairs, vec![("key".to_string(), "value".to_string())]);
    }

    #[test]
    fn test_value_leading_spaces_trimmed() {
        let pairs: Vec<_> = KvScanner::new("Hardware\t:    BCM2709\n").collect();
        assert_eq!(pairs[0].1, "BCM2709");
    }

    #[test]
    fn test_last_line_without_newline() {
        let pairs: Vec<_> = KvScanner::new("Revision: a02082").collect();
        assert_eq!(pairs, vec![("Revision".to_string(), "a02082".to_string())]);
    }

    #[test]
    fn test_long_tokens_are_clipped() {
        let long_key = "k".repeat(MAX_KEY_LEN + 50);
        let long_val = "v".repeat(MAX_VALUE_LEN + 50);
        let text = format!("{}: {}\n", long_key, long_val);
        let pairs: Vec<_> = KvScanner::new(text).collect();
        assert_eq!(pairs[0].0.len(), MAX_KEY_LEN);
        assert_eq!(pairs[0].1.len(), MAX_VALUE_LEN);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "flags: fpu vme\n").unwrap();
        let pairs: Vec<_> = KvScanner::from_file(file.path()).unwrap().collect();
        assert_eq!(pairs[0], ("flags".to_string(), "fpu vme".to_string()));
    }

    #[test]
    fn test_from_missing_file() {
        assert!(KvScanner::from_file(Path::new("/nonexistent/cpuinfo")).is_none());
    }

    #[test]
    fn test_key_matches_prefix_of_shorter() {
        assert!(key_matches("processor\t", "processor"));
        assert!(key_matches("processor", "processor"));
        assert!(key_matches("model name\t", "model name"));
        assert!(!key_matches("Processor", "processor"));
        assert!(!key_matches("core id", "physical id"));
    }
}
