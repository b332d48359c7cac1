// src/common/response/parse.rs

//! Field extraction from loosely formatted replies.
//!
//! Replies are split with a strtok-like [`Tokenizer`]: each step names the set of
//! delimiter characters that ends the next token. A [`FieldSpec`] is the ordered
//! list of those sets for one field of one command's reply.

/// Splits text the way C `strtok` does: leading delimiters are skipped, the token
/// runs up to the next delimiter character, and that single delimiter is consumed.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Tokenizer { rest: text }
    }

    /// Next token ending at any character of `delimiters`, or `None` once only
    /// delimiters (or nothing) are left.
    pub fn next_token(&mut self, delimiters: &str) -> Option<&'a str> {
        let is_delimiter = |c: char| delimiters.contains(c);
        let start = self.rest.trim_start_matches(is_delimiter);
        if start.is_empty() {
            self.rest = start;
            return None;
        }

        match start.find(is_delimiter) {
            Some(end) => {
                let delimiter_len = start[end..].chars().next().map_or(0, char::len_utf8);
                self.rest = &start[end + delimiter_len..];
                Some(&start[..end])
            }
            None => {
                self.rest = "";
                Some(start)
            }
        }
    }

    /// What has not been tokenized yet.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

/// Describes where one field sits in a reply.
///
/// `steps[i]` is the delimiter set ending the i-th token; the field is the token
/// produced by the last step, minus `skip` leading bytes (a fixed prefix such as
/// `"Revision: "`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldSpec {
    pub steps: &'static [&'static str],
    pub skip: usize,
}

impl FieldSpec {
    pub const fn new(steps: &'static [&'static str]) -> Self {
        FieldSpec { steps, skip: 0 }
    }

    pub const fn skipping(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Returns the field, or `None` if the reply ran out of tokens or the token is
    /// not longer than the prefix to skip.
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        let mut tokenizer = Tokenizer::new(text);
        let mut field = None;
        for delimiters in self.steps {
            field = Some(tokenizer.next_token(delimiters)?);
        }
        field
            .and_then(|token| token.get(self.skip..))
            .filter(|token| !token.is_empty())
    }

    /// The field read as an integer.
    pub fn extract_int(&self, text: &str) -> Option<i32> {
        self.extract(text).and_then(parse_int)
    }
}

/// Parses the leading integer of `token` the way `strtol(.., 10)` would: leading
/// whitespace and an optional sign are accepted, parsing stops at the first
/// non-digit. `None` when there are no digits or the value does not fit `i32`.
pub fn parse_int(token: &str) -> Option<i32> {
    let text = token.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

/// [`parse_int`] with a fallback for replies that do not carry a number.
pub fn parse_int_or(token: &str, default: i32) -> i32 {
    parse_int(token).unwrap_or(default)
}
