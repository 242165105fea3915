use alloc::sync::Arc;
use core::fmt;

use crate::{name_table::NameTable, pool::BufferPool};

/// How non-integer numbers (and integers that overflow `i64`) are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloatParseHandling {
    /// Parse as `f64`. `NaN` and `Infinity` literals are accepted.
    #[default]
    Double,
    /// Parse as [`rust_decimal::Decimal`]. `NaN` and `Infinity` literals are
    /// rejected because a decimal cannot hold them.
    Decimal,
}

/// Whether date-looking strings are surfaced as [`JsonToken::Date`].
///
/// [`JsonToken::Date`]: crate::JsonToken::Date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateParseHandling {
    /// Strings always stay strings.
    None,
    /// ISO-8601 and `/Date(…)/` strings become [`JsonDate::Utc`] or
    /// [`JsonDate::Unspecified`].
    ///
    /// [`JsonDate::Utc`]: crate::JsonDate::Utc
    /// [`JsonDate::Unspecified`]: crate::JsonDate::Unspecified
    #[default]
    DateTime,
    /// Date strings become [`JsonDate::Offset`], keeping the written offset.
    ///
    /// [`JsonDate::Offset`]: crate::JsonDate::Offset
    DateTimeOffset,
}

/// Configuration options for [`JsonTokenizer`](crate::JsonTokenizer).
///
/// Numbers and dates are always parsed with invariant formatting rules; there
/// is no locale setting.
///
/// # Examples
///
/// ```rust
/// use jsontok::{JsonTokenizer, ReaderOptions};
///
/// let options = ReaderOptions {
///     allow_multiple_values: true,
///     ..Default::default()
/// };
/// let mut reader = JsonTokenizer::from_text_with_options("1 2 3", options);
/// let mut count = 0;
/// while reader.read().unwrap() {
///     count += 1;
/// }
/// assert_eq!(count, 3);
/// ```
#[derive(Clone)]
pub struct ReaderOptions {
    /// Number type used for floats and for integers that overflow `i64`.
    ///
    /// # Default
    ///
    /// [`FloatParseHandling::Double`]
    pub float_parse_handling: FloatParseHandling,

    /// Whether date-looking strings are parsed into dates by `read`.
    ///
    /// # Default
    ///
    /// [`DateParseHandling::DateTime`]
    pub date_parse_handling: DateParseHandling,

    /// Whether to read several top-level values from one stream.
    ///
    /// When `true`, the reader does not finish after the first complete
    /// value but continues with the next one. This supports JSON Lines and
    /// concatenated JSON.
    ///
    /// ```json
    /// {}{}{}
    /// ```
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_values: bool,

    /// Whether `read` surfaces comments as [`JsonToken::Comment`] tokens.
    /// Typed `read_as_*` calls always skip comments.
    ///
    /// [`JsonToken::Comment`]: crate::JsonToken::Comment
    ///
    /// # Default
    ///
    /// `true`
    pub surface_comments: bool,

    /// Maximum container nesting, or `None` for no limit.
    ///
    /// # Default
    ///
    /// `Some(64)`
    pub max_depth: Option<usize>,

    /// Whether `close` also releases the underlying source.
    ///
    /// # Default
    ///
    /// `true`
    pub close_input: bool,

    /// Surface integers that overflow `i64` as
    /// [`Value::BigInteger`](crate::Value::BigInteger) instead of falling
    /// back to [`float_parse_handling`](Self::float_parse_handling).
    ///
    /// # Default
    ///
    /// `false`
    pub arbitrary_precision_integers: bool,

    /// Interning table consulted for property names.
    pub name_table: Option<Arc<dyn NameTable>>,

    /// Pool the character buffer is rented from and returned to.
    pub buffer_pool: Option<Arc<dyn BufferPool>>,

    /// Initial buffer capacity in bytes.
    ///
    /// # Default
    ///
    /// `1024`
    pub initial_buffer_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            float_parse_handling: FloatParseHandling::Double,
            date_parse_handling: DateParseHandling::DateTime,
            allow_multiple_values: false,
            surface_comments: true,
            max_depth: Some(64),
            close_input: true,
            arbitrary_precision_integers: false,
            name_table: None,
            buffer_pool: None,
            initial_buffer_size: 1024,
        }
    }
}

impl fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("float_parse_handling", &self.float_parse_handling)
            .field("date_parse_handling", &self.date_parse_handling)
            .field("allow_multiple_values", &self.allow_multiple_values)
            .field("surface_comments", &self.surface_comments)
            .field("max_depth", &self.max_depth)
            .field("close_input", &self.close_input)
            .field(
                "arbitrary_precision_integers",
                &self.arbitrary_precision_integers,
            )
            .field("name_table", &self.name_table.is_some())
            .field("buffer_pool", &self.buffer_pool.is_some())
            .field("initial_buffer_size", &self.initial_buffer_size)
            .finish()
    }
}
