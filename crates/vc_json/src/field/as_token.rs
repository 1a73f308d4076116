//! `#[serde(with = "vc_json::field::as_token")]` for [`FieldEnum`] fields.
//!
//! Uses a [`FieldEnumCodec`] with the default separator.
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
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
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Holder {
//!     #[serde(rename = "Value", with = "vc_json::field::as_token")]
//!     value: Mode,
//! }
//!
//! let text = serde_json::to_string(&Holder { value: Mode::Other }).unwrap();
//! assert_eq!(text, r#"{"Value":"other"}"#);
//!
//! let back: Holder = serde_json::from_str(&text).unwrap();
//! assert_eq!(back.value, Mode::Other);
//! ```

use serde::de::DeserializeSeed;
use serde::{Deserializer, Serializer};

use super::{FieldEnum, FieldEnumCodec};

pub fn serialize<T: FieldEnum, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    FieldEnumCodec::<T>::new().serialize(value, serializer)
}

pub fn deserialize<'de, T: FieldEnum, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    (&FieldEnumCodec::<T>::new()).deserialize(deserializer)
}

/// The same codec for `Option<T>` fields, `null` standing for `None`.
pub mod option {
    use serde::de::{DeserializeSeed, Visitor};
    use serde::{Deserializer, Serializer};

    use crate::field::{FieldEnum, FieldEnumCodec};

    pub fn serialize<T: FieldEnum, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => {
                let token = FieldEnumCodec::<T>::new()
                    .write(*value)
                    .map_err(crate::Error::into_ser)?;
                serializer.serialize_some(&*token)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: FieldEnum, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        struct OptionVisitor<T>(core::marker::PhantomData<T>);

        impl<'de, T: FieldEnum> Visitor<'de> for OptionVisitor<T> {
            type Value = Option<T>;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a token or null")
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
                (&FieldEnumCodec::<T>::new()).deserialize(deserializer).map(Some)
            }
        }

        deserializer.deserialize_option(OptionVisitor(core::marker::PhantomData))
    }
}

// -----------------------------------------------------------------------------
// Tests
