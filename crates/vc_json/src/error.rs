use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Failures raised by the codecs of this crate.
///
/// Every variant is terminal for the single encode or decode call that
/// produced it. Inside `serde` adapters the error is converted into the
/// format's own error type through `custom`, keeping the message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The input does not have the shape the codec requires.
    #[error("expected {expected}, found {found}")]
    MalformedInput {
        expected: &'static str,
        found: String,
    },

    /// A polymorphic object carried no discriminator property.
    #[error("no value for '{field}' found")]
    DiscriminatorMissing { field: &'static str },

    /// An encoded value carries a discriminator other than its type's own.
    #[error("'{field}' is {found} but the runtime type is written as {expected}")]
    DiscriminatorMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },

    /// No variant of the base is registered for the discriminator.
    #[error("no {base} found with value {value}")]
    NotFound { base: &'static str, value: String },

    /// Several variants of the base carry the same discriminator.
    #[error("more than one {base} found for value {value}: {candidates:?}")]
    AmbiguousVariant {
        base: &'static str,
        value: String,
        candidates: Vec<&'static str>,
    },

    /// A map key decoded to, or encoded from, `null`.
    #[error("map key of `{key}` is null")]
    MissingKey { key: &'static str },

    /// Two distinct enum constants share one token.
    #[error("the token '{token}' of `{ty}::{first}` collides with `{ty}::{second}`")]
    DuplicateToken {
        ty: &'static str,
        token: &'static str,
        first: &'static str,
        second: &'static str,
    },

    /// The token does not name any constant of the enum.
    #[error("the token '{token}' could not be converted to `{ty}`")]
    UnknownToken { ty: &'static str, token: String },

    /// The enum value has no token.
    #[error("the value {bits:#x} of `{ty}` has no token")]
    UnmappedValue { ty: &'static str, bits: u64 },

    /// A codec was configured with an unusable setting.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// The converter declined the type it was asked to handle.
    #[error("no converter available for `{ty}`")]
    NotConvertible { ty: &'static str },

    /// Error reported by `serde_json` itself.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Converts this error into a `serde` deserialization error.
    #[inline]
    pub fn into_de<E: serde::de::Error>(self) -> E {
        E::custom(self)
    }

    /// Converts this error into a `serde` serialization error.
    #[inline]
    pub fn into_ser<E: serde::ser::Error>(self) -> E {
        E::custom(self)
    }
}

/// Short description of a JSON value kind, used in error messages.
pub(crate) fn describe(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Error;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn messages() {
        let err = Error::DiscriminatorMissing { field: "Type" };
        assert_eq!(err.to_string(), "no value for 'Type' found");

        let err = Error::AmbiguousVariant {
            base: "dyn Base",
            value: "5".to_string(),
            candidates: vec!["Sub5", "Sub6"],
        };
        assert_eq!(
            err.to_string(),
            "more than one dyn Base found for value 5: [\"Sub5\", \"Sub6\"]"
        );

        let err = Error::UnmappedValue { ty: "Flags", bits: 8 };
        assert_eq!(err.to_string(), "the value 0x8 of `Flags` has no token");
    }

    #[test]
    fn json_error_is_transparent() {
        let inner = serde_json::from_str::<i32>("x").unwrap_err();
        let text = inner.to_string();
        let err = Error::from(inner);
        assert_eq!(err.to_string(), text);
    }
}
