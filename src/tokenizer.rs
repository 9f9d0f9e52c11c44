// The lexical format of CMake scripts, in brief (cmake-language(7)):
//
// - Line comments start with `#` and run to the end of the line.
// - Bracket comments start with `#[=*[` and end at the matching `]=*]`, where
//   the number of `=` between the brackets must be the same on both sides.
//   Like line comments, an open bracket comment is also terminated by a
//   newline or end of input.
// - Bracket arguments are `[=*[ ... ]=*]` with the same length-matching rule;
//   their content is taken verbatim, with no escape processing.
// - Quoted arguments are `"..."` with backslash escapes.
// - Unquoted arguments are runs of characters that are not whitespace and not
//   one of `()#"`, with optional backslash escapes. Legacy unquoted forms
//   that mix quoting into an unquoted argument (`a" "b"c"d`) are rejected.
// - `(` and `)` delimit command argument lists.
//
// Semicolons are list separators: an unescaped `;` terminates an unquoted
// argument and is otherwise skipped like whitespace, so `foo;bar;` yields the
// two arguments `foo` and `bar` and no empty trailing one.
//
// The tokenizer is a state machine over those productions, driven one
// looked-ahead byte at a time:
//
// START: between tokens
// COMMENT: consumed `#`, deciding between a line and a bracket comment
// COMMENT_LINE: inside `# ...`, runs until newline or EOF
// COMMENT_BRACKET_OPEN: consumed `#[`, counting `=`
// COMMENT_BRACKET_CONTENT: inside the bracket comment body
// COMMENT_BRACKET_CLOSE: saw `]` in the body, counting `=`
// BRACKET_ARGUMENT_OPEN: consumed `[`, counting `=`
// BRACKET_ARGUMENT_CONTENT: inside the bracket argument body
// BRACKET_ARGUMENT_CLOSE: saw `]` in the body, counting `=`
// QUOTED_ARGUMENT: inside `"..."`
// QUOTED_ARGUMENT_BACKSLASH: consumed `\` inside a quoted argument
// UNQUOTED_ARGUMENT: inside an unquoted argument
// UNQUOTED_ARGUMENT_ESCAPE: consumed `\` inside an unquoted argument
//
// The bracket states remember how many `=` the opening delimiter carried
// (out of band, in `open_eq_len`/`close_eq_len`) so the matching closer can
// be recognized by counting rather than by multi-byte lookahead.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::char_stream::CharStream;
use crate::token::Token;

#[derive(Copy, Clone, Debug)]
enum State {
    Start,
    Comment,
    CommentLine,
    CommentBracketOpen,
    CommentBracketContent,
    CommentBracketClose,
    BracketArgumentOpen,
    BracketArgumentContent,
    BracketArgumentClose,
    QuotedArgument,
    QuotedArgumentBackslash,
    UnquotedArgument,
    UnquotedArgumentEscape,
}

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("read error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot tokenize after {partial:?}: unexpected character {found:?}")]
    UnexpectedChar { partial: String, found: char },
    #[error("cannot tokenize after {partial:?}: unexpected end of input")]
    UnexpectedEof { partial: String },
    #[error("unterminated quoted argument {partial:?}")]
    UnterminatedString { partial: String },
    #[error("unterminated bracket argument {partial:?}")]
    UnterminatedBracket { partial: String },
    #[error("token text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\x0B' | b'\n' | b'\r')
}

/// Pull-style CMake tokenizer.
///
/// Repeated [`next_token`](Tokenizer::next_token) calls (or the [`Iterator`]
/// adapter) yield tokens in source order until the input is exhausted.
/// Tokenization is deterministic and single-pass; a lexical error is fatal to
/// the instance. The tokenizer exclusively owns its stream, so a file-backed
/// source is closed when the tokenizer goes out of scope on any path.
pub struct Tokenizer<R> {
    stream: CharStream<R>,
    state: State,
    orig_text: Vec<u8>,
    open_eq_len: usize,
    close_eq_len: usize,
}

impl Tokenizer<io::Cursor<Vec<u8>>> {
    /// Tokenizes in-memory source text.
    pub fn from_string(text: &str) -> Self {
        Tokenizer::new(CharStream::new(io::Cursor::new(text.as_bytes().to_vec())))
    }
}

impl Tokenizer<BufReader<File>> {
    /// Tokenizes the contents of a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Tokenizer::new(CharStream::new(BufReader::new(file))))
    }
}

impl<R: Read> Tokenizer<R> {
    pub fn new(stream: CharStream<R>) -> Self {
        Tokenizer {
            stream,
            state: State::Start,
            orig_text: Vec::new(),
            open_eq_len: 0,
            close_eq_len: 0,
        }
    }

    /// Returns the next token, or `Ok(None)` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        while !self.stream.is_eof()? {
            if let Some(token) = self.step()? {
                return Ok(Some(token));
            }
        }
        // One more step at EOF flushes whatever token is still in progress.
        self.step()
    }

    /// Consumes the current byte and appends it to the in-progress token.
    fn push(&mut self) -> Result<(), TokenizeError> {
        if let Some(byte) = self.stream.peek()? {
            self.orig_text.push(byte);
            self.stream.advance()?;
        }
        Ok(())
    }

    /// Consumes the current byte without recording it.
    fn skip(&mut self) -> Result<(), TokenizeError> {
        self.stream.advance()?;
        Ok(())
    }

    /// Finishes the in-progress token, handing the accumulated original text
    /// to the given constructor and resetting the buffer.
    fn emit(
        &mut self,
        make: fn(String) -> Token,
    ) -> Result<Option<Token>, TokenizeError> {
        let text = String::from_utf8(std::mem::take(&mut self.orig_text))?;
        Ok(Some(make(text)))
    }

    fn partial(&self) -> String {
        String::from_utf8_lossy(&self.orig_text).into_owned()
    }

    /// Processes the single byte currently visible through the lookahead
    /// (`None` at EOF), possibly emitting a token.
    fn step(&mut self) -> Result<Option<Token>, TokenizeError> {
        let curr = self.stream.peek()?;
        match self.state {
            State::Start => match curr {
                Some(b'#') => {
                    self.push()?;
                    self.state = State::Comment;
                }
                Some(b'[') => {
                    self.push()?;
                    self.open_eq_len = 0;
                    self.state = State::BracketArgumentOpen;
                }
                Some(b'"') => {
                    self.push()?;
                    self.state = State::QuotedArgument;
                }
                Some(b'(') => {
                    self.skip()?;
                    return Ok(Some(Token::OpenParen));
                }
                Some(b')') => {
                    self.skip()?;
                    return Ok(Some(Token::CloseParen));
                }
                Some(byte) if is_whitespace(byte) || byte == b';' => self.skip()?,
                Some(b'\\') => {
                    // Not consumed: the unquoted-argument state handles the
                    // backslash itself so the escape pair stays together.
                    self.state = State::UnquotedArgument;
                }
                Some(_) => {
                    self.push()?;
                    self.state = State::UnquotedArgument;
                }
                None => {}
            },
            State::Comment => match curr {
                Some(b'[') => {
                    self.push()?;
                    self.open_eq_len = 0;
                    self.state = State::CommentBracketOpen;
                }
                Some(b'\n') | None => {
                    self.skip()?;
                    self.state = State::Start;
                    return self.emit(Token::Comment);
                }
                Some(_) => {
                    self.push()?;
                    self.state = State::CommentLine;
                }
            },
            State::CommentLine => match curr {
                Some(b'\n') | None => {
                    self.skip()?;
                    self.state = State::Start;
                    return self.emit(Token::Comment);
                }
                Some(_) => self.push()?,
            },
            State::CommentBracketOpen => match curr {
                Some(b'=') => {
                    self.push()?;
                    self.open_eq_len += 1;
                }
                Some(b'[') => {
                    self.push()?;
                    self.state = State::CommentBracketContent;
                }
                Some(b'\n') | None => {
                    self.skip()?;
                    self.state = State::Start;
                    return self.emit(Token::Comment);
                }
                Some(_) => {
                    // `#[=*X` is just a line comment.
                    self.push()?;
                    self.state = State::CommentLine;
                }
            },
            State::CommentBracketContent => match curr {
                Some(b']') => {
                    self.push()?;
                    self.close_eq_len = 0;
                    self.state = State::CommentBracketClose;
                }
                Some(b'\n') | None => {
                    // Unterminated bracket comments end at the line, like
                    // line comments.
                    self.skip()?;
                    self.state = State::Start;
                    return self.emit(Token::Comment);
                }
                Some(_) => self.push()?,
            },
            State::CommentBracketClose => match curr {
                Some(b'=') => {
                    self.push()?;
                    self.close_eq_len += 1;
                }
                Some(b']') if self.close_eq_len == self.open_eq_len => {
                    self.push()?;
                    self.state = State::Start;
                    return self.emit(Token::Comment);
                }
                Some(b'\n') | None => {
                    self.skip()?;
                    self.state = State::Start;
                    return self.emit(Token::Comment);
                }
                Some(_) => {
                    self.push()?;
                    self.state = State::CommentBracketContent;
                }
            },
            State::BracketArgumentOpen => match curr {
                Some(b'=') => {
                    self.push()?;
                    self.open_eq_len += 1;
                }
                Some(b'[') => {
                    self.push()?;
                    self.state = State::BracketArgumentContent;
                }
                Some(byte) => {
                    return Err(TokenizeError::UnexpectedChar {
                        partial: self.partial(),
                        found: byte as char,
                    });
                }
                None => {
                    return Err(TokenizeError::UnexpectedEof {
                        partial: self.partial(),
                    });
                }
            },
            State::BracketArgumentContent => match curr {
                Some(b']') => {
                    self.push()?;
                    self.close_eq_len = 0;
                    self.state = State::BracketArgumentClose;
                }
                Some(_) => self.push()?,
                None => {
                    return Err(TokenizeError::UnterminatedBracket {
                        partial: self.partial(),
                    });
                }
            },
            State::BracketArgumentClose => match curr {
                Some(b'=') => {
                    self.push()?;
                    self.close_eq_len += 1;
                }
                Some(b']') if self.close_eq_len == self.open_eq_len => {
                    self.push()?;
                    self.state = State::Start;
                    return self.emit(Token::BracketArgument);
                }
                Some(_) => {
                    self.push()?;
                    self.state = State::BracketArgumentContent;
                }
                None => {
                    return Err(TokenizeError::UnterminatedBracket {
                        partial: self.partial(),
                    });
                }
            },
            State::QuotedArgument => match curr {
                Some(b'\\') => {
                    self.push()?;
                    self.state = State::QuotedArgumentBackslash;
                }
                Some(b'"') => {
                    self.push()?;
                    self.state = State::Start;
                    return self.emit(Token::QuotedArgument);
                }
                Some(_) => self.push()?,
                None => {
                    return Err(TokenizeError::UnterminatedString {
                        partial: self.partial(),
                    });
                }
            },
            State::QuotedArgumentBackslash => match curr {
                Some(b'\n') => {
                    // Line continuation.
                    self.push()?;
                    self.state = State::QuotedArgument;
                }
                Some(b't') | Some(b'r') | Some(b'n') | Some(b';') => {
                    self.push()?;
                    self.state = State::QuotedArgument;
                }
                Some(byte) if !byte.is_ascii_alphanumeric() => {
                    // Permissive: any non-alphanumeric escape passes through,
                    // which admits `\"`, `\\`, `\$` and friends.
                    self.push()?;
                    self.state = State::QuotedArgument;
                }
                Some(byte) => {
                    return Err(TokenizeError::UnexpectedChar {
                        partial: self.partial(),
                        found: byte as char,
                    });
                }
                None => {
                    return Err(TokenizeError::UnterminatedString {
                        partial: self.partial(),
                    });
                }
            },
            State::UnquotedArgument => match curr {
                Some(b'\\') => {
                    self.push()?;
                    self.state = State::UnquotedArgumentEscape;
                }
                Some(byte)
                    if is_whitespace(byte)
                        || matches!(byte, b'(' | b')' | b'#' | b'"' | b';') =>
                {
                    // The delimiter is left in the stream so the start state
                    // re-processes it.
                    self.state = State::Start;
                    return self.emit(Token::UnquotedArgument);
                }
                Some(_) => self.push()?,
                None => {
                    self.state = State::Start;
                    return self.emit(Token::UnquotedArgument);
                }
            },
            State::UnquotedArgumentEscape => match curr {
                Some(b't') | Some(b'r') | Some(b'n') | Some(b';') | Some(b' ') => {
                    self.push()?;
                    self.state = State::UnquotedArgument;
                }
                Some(byte) => {
                    return Err(TokenizeError::UnexpectedChar {
                        partial: self.partial(),
                        found: byte as char,
                    });
                }
                None => {
                    return Err(TokenizeError::UnexpectedEof {
                        partial: self.partial(),
                    });
                }
            },
        }
        Ok(None)
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Token, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
