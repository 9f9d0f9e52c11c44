//! Lexical analysis for the CMake language.
//!
//! The crate turns a byte stream holding `CMakeLists.txt` text into an
//! ordered sequence of typed tokens: comments, bracket/quoted/unquoted
//! arguments, and the parentheses delimiting argument lists. Every token
//! keeps the exact source substring it came from and can decode it into a
//! semantic string value on demand.
//!
//! ```
//! use cmlex::{Token, Tokenizer};
//!
//! let tokens: Vec<Token> = Tokenizer::from_string("project(demo)")
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(
//!     tokens,
//!     [
//!         Token::UnquotedArgument("project".to_string()),
//!         Token::OpenParen,
//!         Token::UnquotedArgument("demo".to_string()),
//!         Token::CloseParen,
//!     ]
//! );
//! ```

pub mod char_stream;
pub mod token;
pub mod tokenizer;

pub use crate::char_stream::CharStream;
pub use crate::token::{DecodeError, Token, TokenKind};
pub use crate::tokenizer::{TokenizeError, Tokenizer};
