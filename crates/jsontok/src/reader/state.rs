//! Parser state, the container stack and the token transition rules.

use alloc::{string::String, sync::Arc};
use core::fmt::Write;

use tracing::trace;

use super::{JsonTokenizer, Slot};
use crate::{
    error::{ContainerName, ErrorKind, ReaderError},
    token::JsonToken,
};

/// Where the reader is in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParserState {
    /// Nothing read yet, or between top-level values in multiple-values mode.
    #[default]
    Start,
    /// A property name was read; its value comes next.
    Property,
    ObjectStart,
    Object,
    ArrayStart,
    Array,
    ConstructorStart,
    Constructor,
    /// A value was completed; a separator or close token comes next.
    PostValue,
    /// The top-level value is complete.
    Finished,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContainerKind {
    Object,
    Array,
    Constructor,
}

impl ContainerKind {
    fn closed_by(token: JsonToken) -> Option<Self> {
        match token {
            JsonToken::EndObject => Some(ContainerKind::Object),
            JsonToken::EndArray => Some(ContainerKind::Array),
            JsonToken::EndConstructor => Some(ContainerKind::Constructor),
            _ => None,
        }
    }
}

/// One open container.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) kind: ContainerKind,
    /// Index of the current element; `-1` before the first one.
    pub(crate) index: isize,
    pub(crate) name: Option<Arc<str>>,
}

impl Frame {
    fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            index: -1,
            name: None,
        }
    }

    fn has_index(&self) -> bool {
        matches!(self.kind, ContainerKind::Array | ContainerKind::Constructor)
    }

    fn write_to(&self, path: &mut String) {
        match self.kind {
            ContainerKind::Object => {
                let Some(name) = &self.name else { return };
                if name.contains(needs_brackets) {
                    path.push_str("['");
                    for c in name.chars() {
                        if matches!(c, '\'' | '\\') {
                            path.push('\\');
                        }
                        path.push(c);
                    }
                    path.push_str("']");
                } else {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(name);
                }
            }
            ContainerKind::Array | ContainerKind::Constructor => {
                let _ = write!(path, "[{}]", self.index);
            }
        }
    }
}

fn needs_brackets(c: char) -> bool {
    matches!(
        c,
        '.' | ' '
            | '\''
            | '/'
            | '"'
            | '['
            | ']'
            | '('
            | ')'
            | '\t'
            | '\n'
            | '\r'
            | '\x0C'
            | '\x08'
            | '\\'
            | '\u{0085}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

impl<S> JsonTokenizer<S> {
    /// Number of containers enclosing the current token. A start token
    /// reports the depth outside the container it opens.
    pub fn depth(&self) -> usize {
        let len = self.stack.len();
        if len == 0 || self.token.is_start() {
            len.saturating_sub(1)
        } else {
            len
        }
    }

    /// JSON path of the current token, such as `a.b[0]` or `['x y']`.
    pub fn path(&self) -> String {
        let inside = !matches!(
            self.state,
            ParserState::ObjectStart | ParserState::ArrayStart | ParserState::ConstructorStart
        );
        let frames = if inside {
            &self.stack[..]
        } else {
            &self.stack[..self.stack.len().saturating_sub(1)]
        };
        let mut path = String::new();
        for frame in frames {
            frame.write_to(&mut path);
        }
        path
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> ReaderError {
        ReaderError {
            kind,
            path: self.path(),
            line: self.lines.line(),
            position: self.lines.position(self.buffer.global_pos()),
        }
    }

    pub(crate) fn peek_container(&self) -> Option<ContainerKind> {
        self.stack.last().map(|frame| frame.kind)
    }

    fn push(&mut self, kind: ContainerKind) -> Result<(), ReaderError> {
        self.update_scope_with_finished_value();
        self.stack.push(Frame::new(kind));
        match self.options.max_depth {
            Some(max) if self.stack.len() > max => Err(self.error(ErrorKind::MaxDepthExceeded(max))),
            _ => Ok(()),
        }
    }

    fn update_scope_with_finished_value(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.has_index() {
                frame.index += 1;
            }
        }
    }

    fn set_finished(&mut self) {
        self.state = if self.options.allow_multiple_values {
            ParserState::Start
        } else {
            ParserState::Finished
        };
    }

    pub(crate) fn set_post_value_state(&mut self, update_index: bool) {
        if !self.stack.is_empty() || self.options.allow_multiple_values {
            self.state = ParserState::PostValue;
        } else {
            self.set_finished();
        }
        if update_index {
            self.update_scope_with_finished_value();
        }
    }

    /// Returns to the state of the enclosing container after a `,`.
    pub(crate) fn set_state_based_on_current(&mut self) {
        match self.peek_container() {
            Some(ContainerKind::Object) => self.state = ParserState::Object,
            Some(ContainerKind::Array) => self.state = ParserState::Array,
            Some(ContainerKind::Constructor) => self.state = ParserState::Constructor,
            None => self.set_finished(),
        }
    }

    fn validate_end(&mut self, token: JsonToken) -> Result<(), ReaderError> {
        let popped = self.stack.pop().map(|frame| frame.kind);
        if popped != ContainerKind::closed_by(token) {
            return Err(self.error(ErrorKind::MismatchedClose {
                token,
                container: ContainerName(popped),
            }));
        }
        if !self.stack.is_empty() || self.options.allow_multiple_values {
            self.state = ParserState::PostValue;
        } else {
            self.set_finished();
        }
        Ok(())
    }

    /// Publishes `token` and applies its state transition.
    pub(crate) fn set_token(
        &mut self,
        token: JsonToken,
        value: Slot,
        update_index: bool,
    ) -> Result<(), ReaderError> {
        trace!(?token, state = ?self.state, "token");
        self.token = token;
        self.value = value;
        match token {
            JsonToken::StartObject => {
                self.state = ParserState::ObjectStart;
                self.push(ContainerKind::Object)
            }
            JsonToken::StartArray => {
                self.state = ParserState::ArrayStart;
                self.push(ContainerKind::Array)
            }
            JsonToken::StartConstructor => {
                self.state = ParserState::ConstructorStart;
                self.push(ContainerKind::Constructor)
            }
            JsonToken::EndObject | JsonToken::EndArray | JsonToken::EndConstructor => {
                self.validate_end(token)
            }
            JsonToken::PropertyName => {
                self.state = ParserState::Property;
                if let (Some(frame), Slot::Name(name)) = (self.stack.last_mut(), &self.value) {
                    frame.name = Some(Arc::clone(name));
                }
                Ok(())
            }
            JsonToken::String
            | JsonToken::Integer
            | JsonToken::Float
            | JsonToken::Boolean
            | JsonToken::Null
            | JsonToken::Undefined
            | JsonToken::Date
            | JsonToken::Bytes => {
                self.set_post_value_state(update_index);
                Ok(())
            }
            JsonToken::None | JsonToken::Comment => Ok(()),
        }
    }

    /// Publishes a token that carries no value.
    pub(crate) fn set_bare(&mut self, token: JsonToken) -> Result<(), ReaderError> {
        self.set_token(token, Slot::Empty, true)
    }
}
