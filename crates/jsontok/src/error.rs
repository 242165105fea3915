use alloc::string::String;
use core::fmt;
use std::io;

use thiserror::Error;

use crate::{
    literal_buffer::Literal,
    reader::{ContainerKind, ParserState},
    token::JsonToken,
};

/// A reader failure together with where it happened.
///
/// The message follows the pattern `"<what>. Path '<path>', line <n>,
/// position <n>."` so it can be shown to users as-is.
#[derive(Error, Debug)]
#[error("{kind} Path '{path}', line {line}, position {position}.")]
pub struct ReaderError {
    #[source]
    pub(crate) kind: ErrorKind,
    pub(crate) path: String,
    pub(crate) line: usize,
    pub(crate) position: usize,
}

impl ReaderError {
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// JSON path of the token being read when the error happened.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("{site} {found}.")]
    UnexpectedCharacter { site: CharSite, found: Found },
    #[error("{0}")]
    UnexpectedEndOfInput(EndSite),
    #[error("{0}")]
    InvalidEscapeSequence(String),
    #[error("{0}")]
    InvalidLiteral(Literal),
    #[error("{0}")]
    NumberFormat(String),
    #[error("{0}")]
    InvalidBytes(String),
    #[error("Unexpected token when reading bytes: {0}.")]
    UnexpectedToken(JsonToken),
    #[error("JsonToken {token} is not valid for closing JsonType {container}.")]
    MismatchedClose {
        token: JsonToken,
        container: ContainerName,
    },
    #[error("The reader's MaxDepth of {0} has been exceeded.")]
    MaxDepthExceeded(usize),
    /// A typed read was called where the grammar expects a property name.
    #[error("Unexpected state: {0:?}.")]
    UnexpectedState(ParserState),
    /// A defect in the reader rather than bad input.
    #[error("Internal invariant violated: {0}.")]
    InternalInvariantViolation(String),
    #[error("The read operation was cancelled.")]
    Cancelled,
    #[error("I/O error while reading JSON: {0}.")]
    Io(#[from] io::Error),
}

/// The character that triggered an [`ErrorKind::UnexpectedCharacter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Char(char),
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Char(c) => write!(f, "{c}"),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

impl From<char> for Found {
    fn from(c: char) -> Self {
        Found::Char(c)
    }
}

/// Where in the grammar an unexpected character was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSite {
    Value,
    AfterValue,
    AfterContent,
    PropertyStart,
    UnquotedProperty,
    PropertyColon,
    Comment,
    Constructor,
}

impl fmt::Display for CharSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CharSite::Value => "Unexpected character encountered while parsing value:",
            CharSite::AfterValue => {
                "After parsing a value an unexpected character was encountered:"
            }
            CharSite::AfterContent => {
                "Additional text encountered after finished reading JSON content:"
            }
            CharSite::PropertyStart => "Invalid property identifier character:",
            CharSite::UnquotedProperty => "Invalid JavaScript property identifier character:",
            CharSite::PropertyColon => {
                "Invalid character after parsing property name. Expected ':' but got:"
            }
            CharSite::Comment => "Error parsing comment. Expected: *, got",
            CharSite::Constructor => "Unexpected character while parsing constructor:",
        })
    }
}

/// The construct that was still open when input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndSite {
    Value,
    String(u8),
    UnicodeEscape,
    UnquotedProperty,
    Comment,
    Constructor,
    Bytes,
}

impl fmt::Display for EndSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndSite::Value => f.write_str("Unexpected end when reading JSON."),
            EndSite::String(q) => {
                write!(f, "Unterminated string. Expected delimiter: {}.", char::from(*q))
            }
            EndSite::UnicodeEscape => {
                f.write_str("Unexpected end while parsing Unicode escape sequence.")
            }
            EndSite::UnquotedProperty => {
                f.write_str("Unexpected end while parsing unquoted property name.")
            }
            EndSite::Comment => f.write_str("Unexpected end while parsing comment."),
            EndSite::Constructor => f.write_str("Unexpected end while parsing constructor."),
            EndSite::Bytes => f.write_str("Unexpected end when reading bytes."),
        }
    }
}

/// Container kind as printed in close-token mismatch errors; `None` when the
/// close token arrived with no container open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerName(pub Option<ContainerKind>);

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("None"),
            Some(kind) => write!(f, "{kind:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_layout() {
        let err = ReaderError {
            kind: ErrorKind::UnexpectedCharacter {
                site: CharSite::Value,
                found: Found::Char('}'),
            },
            path: "a".into(),
            line: 1,
            position: 6,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected character encountered while parsing value: }. Path 'a', line 1, position 6."
        );
    }

    #[test]
    fn end_site_messages() {
        assert_eq!(
            EndSite::String(b'\'').to_string(),
            "Unterminated string. Expected delimiter: '."
        );
        assert_eq!(
            ErrorKind::MismatchedClose {
                token: JsonToken::EndObject,
                container: ContainerName(Some(ContainerKind::Array)),
            }
            .to_string(),
            "JsonToken EndObject is not valid for closing JsonType Array."
        );
    }
}
