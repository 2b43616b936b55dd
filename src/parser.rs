use crate::error::{ErrorKind, ParseError};
use crate::quote::{unquote, UnquoteError};
use crate::tag::{is_key_byte, Tag};

/// Parser state: tracks position in the input string.
///
/// Only ASCII bytes are structural (space, `:`, `"`, `,`, `\`, DEL), so the
/// scan walks bytes and every slice boundary lands on one of them or on the
/// end of input.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
    tag: Tag,
    cause: Option<UnquoteError>,
}

/// Parse a tag string such as `json:"host" env:"SERVER_HOST"` into a [`Tag`].
///
/// Pairs are separated by ASCII spaces. A key repeated later in the input
/// overwrites the earlier value. Scanning stops at the first malformed pair;
/// the returned error carries the pairs read up to that point.
pub fn parse(input: &str) -> Result<Tag, ParseError> {
    let mut parser = Parser {
        input,
        pos: 0,
        tag: Tag::new(),
        cause: None,
    };

    loop {
        parser.skip_spaces();
        if parser.at_end() {
            return Ok(parser.tag);
        }
        if let Err(kind) = parser.parse_pair() {
            return Err(parser.fail(kind));
        }
    }
}

impl<'a> Parser<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn byte_at(&self, index: usize) -> Option<u8> {
        self.bytes().get(index).copied()
    }

    fn fail(self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.pos, self.tag).with_cause(self.cause)
    }

    /// Only the ASCII space separates pairs; tabs and newlines do not.
    fn skip_spaces(&mut self) {
        while self.byte_at(self.pos) == Some(b' ') {
            self.pos += 1;
        }
    }

    // ── Pairs ────────────────────────────────────────────────────────

    /// Read one `key:"value"` pair starting at `self.pos`, which is left
    /// pointing at the start of the pair on failure.
    fn parse_pair(&mut self) -> Result<(), ErrorKind> {
        let input = self.input;
        let key_end = self.scan_key()?;
        let key = &input[self.pos..key_end];

        let value_start = key_end + 1;
        let value_end = self.scan_value(value_start)?;
        let value = match unquote(&input[value_start..value_end]) {
            Ok(value) => value,
            Err(err) => {
                self.cause = Some(err);
                return Err(ErrorKind::InvalidValue);
            }
        };

        log::trace!("tag entry {}={:?}", key, value);
        self.tag.insert(key, value);
        self.pos = value_end;
        Ok(())
    }

    /// Returns the index of the `:` that ends the key.
    fn scan_key(&self) -> Result<usize, ErrorKind> {
        let mut end = self.pos;
        while let Some(b) = self.byte_at(end) {
            if !is_key_byte(b) {
                break;
            }
            if b == b',' {
                return Err(ErrorKind::InvalidSeparator);
            }
            end += 1;
        }

        if end == self.pos {
            return Err(ErrorKind::InvalidKey);
        }
        if self.byte_at(end) != Some(b':') || end + 1 >= self.input.len() {
            return Err(ErrorKind::InvalidSyntax);
        }
        if self.byte_at(end + 1) != Some(b'"') {
            return Err(ErrorKind::InvalidValue);
        }
        Ok(end)
    }

    /// `start` is the opening quote. Returns the index just past the closing
    /// quote. A backslash hides the byte after it from the search.
    fn scan_value(&self, start: usize) -> Result<usize, ErrorKind> {
        let mut i = start + 1;
        while let Some(b) = self.byte_at(i) {
            match b {
                b'"' => return Ok(i + 1),
                b'\\' => i += 2,
                _ => i += 1,
            }
        }
        Err(ErrorKind::InvalidValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(input: &str) -> ErrorKind {
        parse(input).unwrap_err().kind
    }

    #[test]
    fn parses_field_tag() {
        let tag = parse(r#"json:"host" env:"SERVER_HOST" default:"localhost""#).unwrap();
        assert_eq!(tag.len(), 3);
        assert_eq!(tag.get("json"), Some("host"));
        assert_eq!(tag.get("env"), Some("SERVER_HOST"));
        assert_eq!(tag.get("default"), Some("localhost"));
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("    ").unwrap().is_empty());
    }

    #[test]
    fn surrounding_and_repeated_spaces() {
        let tag = parse(r#"   a:"1"    b:"2"   "#).unwrap();
        assert_eq!(tag, Tag::from([("a", "1"), ("b", "2")]));
    }

    #[test]
    fn adjacent_pairs_need_no_space() {
        let tag = parse(r#"a:"1"b:"2""#).unwrap();
        assert_eq!(tag, Tag::from([("a", "1"), ("b", "2")]));
    }

    #[test]
    fn last_duplicate_wins() {
        let tag = parse(r#"env:"A" json:"x" env:"B""#).unwrap();
        assert_eq!(tag, Tag::from([("env", "B"), ("json", "x")]));
    }

    #[test]
    fn values_are_unescaped() {
        let tag = parse(r#"doc:"say \"hi\" \\ now\n" empty:"""#).unwrap();
        assert_eq!(tag.get("doc"), Some("say \"hi\" \\ now\n"));
        assert_eq!(tag.get("empty"), Some(""));
    }

    #[test]
    fn values_keep_spaces_commas_and_unicode() {
        let tag = parse(r#"json:"name,omitempty" label:"Grüße, Welt""#).unwrap();
        assert_eq!(tag.get("json"), Some("name,omitempty"));
        assert_eq!(tag.get("label"), Some("Grüße, Welt"));
    }

    #[test]
    fn unicode_keys_are_accepted() {
        let tag = parse(r#"clé:"v""#).unwrap();
        assert_eq!(tag.get("clé"), Some("v"));
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(kind("invalid syntax"), ErrorKind::InvalidSyntax);
        assert_eq!(kind("key"), ErrorKind::InvalidSyntax);
        assert_eq!(kind("key:"), ErrorKind::InvalidSyntax);
        assert_eq!(kind("key\t:\"v\""), ErrorKind::InvalidSyntax);
    }

    #[test]
    fn key_errors() {
        assert_eq!(kind(r#":"value""#), ErrorKind::InvalidKey);
        assert_eq!(kind(r#""key":"value""#), ErrorKind::InvalidKey);
        assert_eq!(kind(":"), ErrorKind::InvalidKey);
        assert_eq!(kind("\t"), ErrorKind::InvalidKey);
    }

    #[test]
    fn value_errors() {
        for input in [
            "key:value",
            r#"key:value""#,
            r#"key:"value"#,
            r#"key:"value\""#,
            r#"key:\"value""#,
            r#"key: """#,
            r#"key:"\q""#,
            "key:\"a\nb\"",
        ] {
            assert_eq!(kind(input), ErrorKind::InvalidValue, "input {:?}", input);
        }
    }

    #[test]
    fn separator_errors() {
        assert_eq!(
            kind(r#"key:"value", other:"value""#),
            ErrorKind::InvalidSeparator
        );
        assert_eq!(kind("a,b"), ErrorKind::InvalidSeparator);
        assert_eq!(kind(","), ErrorKind::InvalidSeparator);
    }

    #[test]
    fn error_keeps_partial_result_and_offset() {
        let err = parse(r#"json:"host"  env:SERVER_HOST"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        assert_eq!(err.offset, 13);
        assert_eq!(err.partial(), &Tag::from([("json", "host")]));
    }

    #[test]
    fn bad_escape_is_kept_as_cause() {
        use std::error::Error as _;

        let err = parse(r#"a:"1" key:"\q""#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        assert_eq!(err.offset, 6);
        assert!(err.source().is_some());

        let err = parse("key:value").unwrap_err();
        assert!(err.source().is_none());
    }

    #[test]
    fn from_str_delegates_to_parse() {
        let tag: Tag = r#"env:"SERVER_HOST""#.parse().unwrap();
        assert_eq!(tag.get("env"), Some("SERVER_HOST"));
        assert!(":x".parse::<Tag>().is_err());
    }
}
