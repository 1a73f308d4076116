//! Symbolic enum codec.
//!
//! Maps enum constants to and from string tokens. The token of a constant is
//! its override when one is declared, otherwise its declared name. Ignored
//! constants have no token at all.
//!
//! ## Menu
//!
//! - [`FieldValue`]: Metadata of one constant.
//! - [`FieldEnum`]: Implemented by enums that can be tokenized,
//!   usually through [`derive FieldEnum`](crate::derive::FieldEnum)
//!   or [`impl_field_enum!`](crate::impl_field_enum) for `bitflags` types.
//! - [`FieldTable`]: The per-type lookup table, built on first use.
//! - [`FieldEnumCodec`]: Reads and writes tokens with a configurable flag separator.
//! - [`as_token`]: A module usable with `#[serde(with = "...")]`.
//!
//! ## Flags
//!
//! For flag enums a value whose combined bits have their own token is written
//! as that token. Otherwise it is written as the tokens of every non-zero
//! constant contained in it, joined by the separator. Reading splits on the
//! separator and combines the constants with bitwise OR.
//!
//! ## Example
//!
//! ```
//! use vc_json::field::FieldEnumCodec;
//! use vc_json::derive::FieldEnum;
//!
//! #[derive(FieldEnum, Clone, Copy, PartialEq, Debug)]
//! enum Mode {
//!     #[field(value = "none")]
//!     None,
//!     #[field(value = "other")]
//!     Other,
//! }
//!
//! let codec = FieldEnumCodec::<Mode>::new();
//! assert_eq!(codec.write(Mode::Other).unwrap(), "other");
//! assert_eq!(codec.read("none").unwrap(), Mode::None);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod table;

pub mod as_token;

// -----------------------------------------------------------------------------
// Exports

pub use codec::FieldEnumCodec;
pub use table::{FieldEntry, FieldTable};

// -----------------------------------------------------------------------------
// FieldValue

/// Metadata of one enum constant.
///
/// Usually generated by [`derive FieldEnum`](crate::derive::FieldEnum).
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<T> {
    name: &'static str,
    value: T,
    token: Option<&'static str>,
    ignored: bool,
}

impl<T> FieldValue<T> {
    /// A constant written as its declared name.
    #[inline]
    pub const fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            value,
            token: None,
            ignored: false,
        }
    }

    /// Overrides the token of this constant.
    ///
    /// # Panics
    /// If `token` is empty. In a `const` context this fails the build.
    #[inline]
    pub const fn with_token(mut self, token: &'static str) -> Self {
        assert!(!token.is_empty(), "field token can't be empty");
        self.token = Some(token);
        self
    }

    /// Excludes this constant from the token table.
    #[inline]
    pub const fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// The declared name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The token override, if any.
    #[inline]
    pub const fn token_override(&self) -> Option<&'static str> {
        self.token
    }

    /// The effective token: the override, else the declared name.
    #[inline]
    pub const fn token(&self) -> &'static str {
        match self.token {
            Some(token) => token,
            None => self.name,
        }
    }

    #[inline]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[inline]
    pub const fn value(&self) -> &T {
        &self.value
    }
}

// -----------------------------------------------------------------------------
// FieldEnum

/// An enum whose constants can be written as string tokens.
///
/// Constants are compared through their bit pattern, [`to_bits`](FieldEnum::to_bits).
/// For a flag enum, [`from_bits`](FieldEnum::from_bits) must accept every
/// combination the enum can represent.
///
/// # Example
///
/// ```
/// use vc_json::field::{FieldEnum, FieldValue};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Level {
///     Low = 1,
///     High = 2,
/// }
///
/// impl FieldEnum for Level {
///     const FIELDS: &'static [FieldValue<Self>] = &[
///         FieldValue::new("Low", Level::Low).with_token("low"),
///         FieldValue::new("High", Level::High),
///     ];
///
///     fn to_bits(self) -> u64 {
///         self as u64
///     }
/// }
///
/// assert_eq!(Level::from_bits(2), Some(Level::High));
/// assert_eq!(Level::from_bits(3), None);
/// ```
pub trait FieldEnum: Copy + Send + Sync + 'static {
    /// Whether values combine through bitwise OR.
    const FLAGS: bool = false;

    /// Every declared constant, ignored ones included.
    const FIELDS: &'static [FieldValue<Self>];

    fn to_bits(self) -> u64;

    /// Returns the value with the given bits.
    ///
    /// The default implementation searches [`FIELDS`](FieldEnum::FIELDS).
    fn from_bits(bits: u64) -> Option<Self> {
        Self::FIELDS
            .iter()
            .map(|field| field.value)
            .find(|value| value.to_bits() == bits)
    }
}
