//! Field tokenizer for fixed-layout kernel table lines
//!
//! [`StringParser`] walks a line field by field with "advance or fail"
//! semantics, so positional layouts like `/proc/net/tcp` can be consumed
//! without collecting every field first.

use crate::error::{Error, Result};

/// Cursor over the delimited fields of one line
#[derive(Debug, Clone)]
pub struct StringParser<'a> {
    buffer: &'a str,
    separator: char,
    skip_empty: bool,
    /// Byte offset where the next search starts
    position: usize,
    /// Current field as a byte range, `None` before the first move
    current: Option<(usize, usize)>,
}

impl<'a> StringParser<'a> {
    /// Create a parser over `buffer` splitting on `separator`.
    ///
    /// With `skip_empty`, runs of separators count as a single boundary and
    /// no empty fields are yielded.
    pub fn new(buffer: &'a str, separator: char, skip_empty: bool) -> Self {
        Self {
            buffer,
            separator,
            skip_empty,
            position: 0,
            current: None,
        }
    }

    /// Advance to the next field. Returns false once the line is exhausted.
    pub fn move_next(&mut self) -> bool {
        loop {
            if self.position > self.buffer.len() {
                self.current = None;
                return false;
            }

            let rest = &self.buffer[self.position..];
            let (start, end) = match rest.find(self.separator) {
                Some(offset) => (self.position, self.position + offset),
                None => (self.position, self.buffer.len()),
            };
            // Step past the separator; at end of buffer this overshoots by one,
            // which marks the cursor as exhausted on the next call.
            self.position = end + self.separator.len_utf8();

            if self.skip_empty && start == end {
                continue;
            }

            self.current = Some((start, end));
            return true;
        }
    }

    /// Advance to the next field, failing if none remains
    pub fn move_next_or_fail(&mut self) -> Result<()> {
        if self.move_next() {
            Ok(())
        } else {
            Err(Error::parse(format!(
                "unexpected end of line: {:?}",
                self.buffer
            )))
        }
    }

    /// Text of the current field
    pub fn extract_current(&self) -> Result<&'a str> {
        match self.current {
            Some((start, end)) => Ok(&self.buffer[start..end]),
            None => Err(Error::parse("no current field")),
        }
    }

    /// Advance and return the next field's text
    pub fn move_and_extract_next(&mut self) -> Result<&'a str> {
        self.move_next_or_fail()?;
        self.extract_current()
    }

    /// Advance and parse the next field as a decimal `i32`
    pub fn parse_next_i32(&mut self) -> Result<i32> {
        let field = self.move_and_extract_next()?;
        field
            .parse()
            .map_err(|_| Error::parse(format!("invalid integer field: {:?}", field)))
    }

    /// Advance and parse the next field as a decimal `u32`
    pub fn parse_next_u32(&mut self) -> Result<u32> {
        let field = self.move_and_extract_next()?;
        field
            .parse()
            .map_err(|_| Error::parse(format!("invalid integer field: {:?}", field)))
    }

    /// Advance and parse the next field as a decimal `u64`
    pub fn parse_next_u64(&mut self) -> Result<u64> {
        let field = self.move_and_extract_next()?;
        field
            .parse()
            .map_err(|_| Error::parse(format!("invalid integer field: {:?}", field)))
    }

    /// Advance and parse the next field as base-16
    pub fn parse_next_hex_u32(&mut self) -> Result<u32> {
        let field = self.move_and_extract_next()?;
        parse_hex_u32(field)
    }
}

/// Parse hex digits (no `0x` prefix, either case) into a `u32`
pub(crate) fn parse_hex_u32(digits: &str) -> Result<u32> {
    // from_str_radix tolerates a leading sign, the kernel never writes one
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::parse(format!("invalid hex field: {:?}", digits)));
    }
    u32::from_str_radix(digits, 16)
        .map_err(|_| Error::parse(format!("hex field out of range: {:?}", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_empty_collapses_runs() {
        let mut parser = StringParser::new("  0: 0100007F:0035   00000000:0000 0A ", ' ', true);
        assert_eq!(parser.move_and_extract_next().unwrap(), "0:");
        assert_eq!(parser.move_and_extract_next().unwrap(), "0100007F:0035");
        assert_eq!(parser.move_and_extract_next().unwrap(), "00000000:0000");
        assert_eq!(parser.move_and_extract_next().unwrap(), "0A");
        assert!(!parser.move_next());
        assert!(parser.move_next_or_fail().is_err());
    }

    #[test]
    fn test_without_skip_yields_empty_fields() {
        let mut parser = StringParser::new("a  b", ' ', false);
        assert_eq!(parser.move_and_extract_next().unwrap(), "a");
        assert_eq!(parser.move_and_extract_next().unwrap(), "");
        assert_eq!(parser.move_and_extract_next().unwrap(), "b");
        assert!(!parser.move_next());
    }

    #[test]
    fn test_trailing_separator_without_skip() {
        let mut parser = StringParser::new("TCP: inuse 42 ", ' ', false);
        parser.move_next_or_fail().unwrap();
        parser.move_next_or_fail().unwrap();
        assert_eq!(parser.parse_next_i32().unwrap(), 42);
        assert_eq!(parser.move_and_extract_next().unwrap(), "");
        assert!(!parser.move_next());
    }

    #[test]
    fn test_empty_line() {
        let mut parser = StringParser::new("", ' ', true);
        assert!(!parser.move_next());

        let mut parser = StringParser::new("", ' ', false);
        assert_eq!(parser.move_and_extract_next().unwrap(), "");
        assert!(!parser.move_next());
    }

    #[test]
    fn test_numeric_fields() {
        let mut parser = StringParser::new("7 ff x", ' ', true);
        assert_eq!(parser.parse_next_u32().unwrap(), 7);
        assert_eq!(parser.parse_next_hex_u32().unwrap(), 0xff);
        assert!(parser.parse_next_u64().is_err());
    }

    #[test]
    fn test_extract_before_move_fails() {
        let parser = StringParser::new("abc", ' ', true);
        assert!(parser.extract_current().is_err());
    }

    #[test]
    fn test_parse_hex_rejects_sign_and_prefix() {
        assert!(parse_hex_u32("+1").is_err());
        assert!(parse_hex_u32("0x1").is_err());
        assert!(parse_hex_u32("").is_err());
        assert_eq!(parse_hex_u32("aBc").unwrap(), 0xabc);
    }
}
