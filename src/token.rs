// Token values produced by the tokenizer.
//
// Every token remembers the exact source substring it came from; the decoded
// value is derived from that text on demand and never stored. Decoding rules
// per kind:
//
// - Comment: the original text, verbatim (including `#` and any brackets).
// - BracketArgument: the content between the `[=*[` opener and the matching
//   `]=*]` closer; no escape processing.
// - QuotedArgument: the content between the surrounding quotes, with the
//   backslash substitutions below applied.
// - UnquotedArgument: the original text with the substitutions applied.
// - OpenParen / CloseParen: the literal `(` or `)`.
//
// The substitutions, applied in this order: `\<newline>` is a line
// continuation and disappears, `\ ` becomes a space, `\;` a semicolon, and
// `\n` `\r` `\t` `\v` become the control characters they name.

use std::fmt;

use thiserror::Error;

/// The closed set of token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    BracketArgument,
    QuotedArgument,
    UnquotedArgument,
    OpenParen,
    CloseParen,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Comment => "Comment",
            TokenKind::BracketArgument => "BracketArgument",
            TokenKind::QuotedArgument => "QuotedArgument",
            TokenKind::UnquotedArgument => "UnquotedArgument",
            TokenKind::OpenParen => "OpenParen",
            TokenKind::CloseParen => "CloseParen",
        }
    }
}

/// A single lexical token. Two tokens are equal iff their kind and original
/// text are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Comment(String),
    BracketArgument(String),
    QuotedArgument(String),
    UnquotedArgument(String),
    OpenParen,
    CloseParen,
}

/// Raised when a decoded value is requested from a token whose text does not
/// have the shape its kind requires. The tokenizer never produces such
/// tokens; only hand-constructed ones can trigger this.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bracket argument text {0:?} has no matching bracket delimiters")]
    MalformedBracketArgument(String),
    #[error("quoted argument text {0:?} is not surrounded by double quotes")]
    MalformedQuotedArgument(String),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Comment(_) => TokenKind::Comment,
            Token::BracketArgument(_) => TokenKind::BracketArgument,
            Token::QuotedArgument(_) => TokenKind::QuotedArgument,
            Token::UnquotedArgument(_) => TokenKind::UnquotedArgument,
            Token::OpenParen => TokenKind::OpenParen,
            Token::CloseParen => TokenKind::CloseParen,
        }
    }

    /// The exact source substring this token was produced from. The paren
    /// kinds carry their canonical literal.
    pub fn orig_text(&self) -> &str {
        match self {
            Token::Comment(text)
            | Token::BracketArgument(text)
            | Token::QuotedArgument(text)
            | Token::UnquotedArgument(text) => text,
            Token::OpenParen => "(",
            Token::CloseParen => ")",
        }
    }

    /// Decodes the original text into the token's semantic string value.
    ///
    /// This is a pure function of the original text; repeated calls return
    /// equal results.
    pub fn value(&self) -> Result<String, DecodeError> {
        match self {
            Token::Comment(text) => Ok(text.clone()),
            Token::BracketArgument(text) => bracket_value(text),
            Token::QuotedArgument(text) => quoted_value(text),
            Token::UnquotedArgument(text) => Ok(apply_escapes(text)),
            Token::OpenParen => Ok("(".to_string()),
            Token::CloseParen => Ok(")".to_string()),
        }
    }
}

/// Applies the backslash substitutions shared by quoted and unquoted
/// arguments. The passes run in a fixed order; each `\` in tokenizer-produced
/// text starts exactly one escape sequence, so the passes cannot observe each
/// other's output.
fn apply_escapes(text: &str) -> String {
    text.replace("\\\n", "")
        .replace("\\ ", " ")
        .replace("\\;", ";")
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
        .replace("\\v", "\x0B")
}

/// Recovers the bracket length from the opening delimiter, checks that the
/// text closes with a bracket of the same length, and returns the content
/// between the two.
fn bracket_value(text: &str) -> Result<String, DecodeError> {
    let malformed = || DecodeError::MalformedBracketArgument(text.to_string());
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'[') {
        return Err(malformed());
    }
    let mut bracket_len = None;
    for (i, &byte) in bytes.iter().enumerate().skip(1) {
        match byte {
            b'[' => {
                bracket_len = Some(i + 1);
                break;
            }
            b'=' => {}
            _ => return Err(malformed()),
        }
    }
    let bracket_len = match bracket_len {
        Some(len) => len,
        None => return Err(malformed()),
    };
    let closer = format!("]{}]", "=".repeat(bracket_len - 2));
    if bytes.len() < 2 * bracket_len || !text.ends_with(&closer) {
        return Err(malformed());
    }
    Ok(text[bracket_len..text.len() - bracket_len].to_string())
}

fn quoted_value(text: &str) -> Result<String, DecodeError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| DecodeError::MalformedQuotedArgument(text.to_string()))?;
    Ok(apply_escapes(inner))
}

impl fmt::Display for Token {
    /// Renders `<Kind BYTES>` where `BYTES` is the original text written as a
    /// Python-style bytes literal (`b'…'`). This format is what the `.toks`
    /// regression corpus stores, one token per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} ", self.kind().name())?;
        write_bytes_literal(f, self.orig_text().as_bytes())?;
        write!(f, ">")
    }
}

fn write_bytes_literal(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    // Same quote selection as repr(bytes): single quotes, unless the content
    // contains a single quote but no double quote.
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    write!(f, "b{}", quote as char)?;
    for &byte in bytes {
        match byte {
            b'\\' => f.write_str("\\\\")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            _ if byte == quote => write!(f, "\\{}", quote as char)?,
            0x20..=0x7e => write!(f, "{}", byte as char)?,
            _ => write!(f, "\\x{:02x}", byte)?,
        }
    }
    write!(f, "{}", quote as char)
}
