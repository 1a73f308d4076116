use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;

use serde::de::{DeserializeSeed, Unexpected, Visitor};
use serde::{Deserializer, Serializer};

use super::{FieldEnum, FieldTable};
use crate::Error;

const DEFAULT_SEPARATOR: &str = ",";

// -----------------------------------------------------------------------------
// FieldEnumCodec

/// Reads and writes the tokens of a [`FieldEnum`].
///
/// The separator joins and splits the tokens of flag enums; it is `","` by
/// default and can never be empty. Changing it needs `&mut self`, so a codec
/// shared by reference keeps one separator for all of its calls.
///
/// Before every read and write the token table of `T` is checked for two
/// distinct constants sharing a token, in which case the call fails with
/// [`Error::DuplicateToken`] whatever the value is.
///
/// # Example
///
/// ```
/// use vc_json::field::FieldEnumCodec;
/// use vc_json::derive::FieldEnum;
///
/// #[derive(FieldEnum, Clone, Copy, PartialEq, Debug)]
/// #[field_enum(flags)]
/// #[repr(u8)]
/// enum Side {
///     None = 0,
///     #[field(value = "left")]
///     Left = 1,
///     #[field(value = "right")]
///     Right = 2,
///     #[field(value = "both")]
///     Both = 3,
/// }
///
/// let mut codec = FieldEnumCodec::<Side>::new();
/// assert_eq!(codec.read("left,right").unwrap(), Side::Both);
///
/// codec.set_separator("|").unwrap();
/// assert_eq!(codec.read("right|left").unwrap(), Side::Both);
/// assert!(codec.set_separator("").is_err());
/// ```
pub struct FieldEnumCodec<T: FieldEnum> {
    separator: Cow<'static, str>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T: FieldEnum> Default for FieldEnumCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldEnum> Clone for FieldEnumCodec<T> {
    fn clone(&self) -> Self {
        Self {
            separator: self.separator.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: FieldEnum> fmt::Debug for FieldEnumCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEnumCodec")
            .field("type", &type_name::<T>())
            .field("separator", &self.separator)
            .finish()
    }
}

impl<T: FieldEnum> FieldEnumCodec<T> {
    /// A codec with the default separator.
    #[inline]
    pub const fn new() -> Self {
        Self {
            separator: Cow::Borrowed(DEFAULT_SEPARATOR),
            _marker: PhantomData,
        }
    }

    /// A codec with the given separator.
    pub fn with_separator(separator: impl Into<Cow<'static, str>>) -> Result<Self, Error> {
        let mut codec = Self::new();
        codec.set_separator(separator)?;
        Ok(codec)
    }

    #[inline]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Replaces the separator.
    ///
    /// An empty separator is rejected with [`Error::InvalidConfiguration`]
    /// and the previous one is kept.
    pub fn set_separator(&mut self, separator: impl Into<Cow<'static, str>>) -> Result<(), Error> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(Error::InvalidConfiguration("the flags separator can't be empty"));
        }
        self.separator = separator;
        Ok(())
    }

    /// Decodes a token, or a separated token list for flag enums.
    ///
    /// Every token must name a constant, so an empty string is an
    /// [`Error::UnknownToken`].
    pub fn read(&self, text: &str) -> Result<T, Error> {
        let table = FieldTable::<T>::of();
        table.validate()?;

        if !T::FLAGS {
            return table
                .lookup(text)
                .map(|entry| entry.value)
                .ok_or_else(|| unknown_token::<T>(text));
        }

        let mut bits = 0;
        for token in text.split(&*self.separator) {
            match table.lookup(token) {
                Some(entry) => bits |= entry.bits,
                None => return Err(unknown_token::<T>(token)),
            }
        }

        T::from_bits(bits).ok_or(Error::UnmappedValue {
            ty: type_name::<T>(),
            bits,
        })
    }

    /// Encodes a value as its token, or as a separated token list for flag enums.
    ///
    /// A flag value that no constant token covers, zero included when it has
    /// no token, is an [`Error::UnmappedValue`].
    pub fn write(&self, value: T) -> Result<Cow<'static, str>, Error> {
        let table = FieldTable::<T>::of();
        table.validate()?;

        let bits = value.to_bits();
        if let Some(entry) = table.lookup_bits(bits) {
            return Ok(Cow::Borrowed(entry.token));
        }

        let unmapped = Error::UnmappedValue {
            ty: type_name::<T>(),
            bits,
        };
        if !T::FLAGS {
            return Err(unmapped);
        }

        // Zero without a token of its own decomposes into nothing.
        let mut covered = 0;
        let mut tokens = Vec::new();
        for entry in table.contained_in(bits) {
            covered |= entry.bits;
            tokens.push(entry.token);
        }
        if covered != bits || tokens.is_empty() {
            return Err(unmapped);
        }

        Ok(Cow::Owned(tokens.join(&*self.separator)))
    }

    /// Writes `value` as a string through `serializer`.
    pub fn serialize<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        let token = self.write(*value).map_err(Error::into_ser)?;
        serializer.serialize_str(&token)
    }
}

#[cold]
fn unknown_token<T>(token: &str) -> Error {
    Error::UnknownToken {
        ty: type_name::<T>(),
        token: token.to_string(),
    }
}

// -----------------------------------------------------------------------------
// DeserializeSeed

impl<'de, T: FieldEnum> DeserializeSeed<'de> for &FieldEnumCodec<T> {
    type Value = T;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<T, D::Error> {
        deserializer.deserialize_str(TokenVisitor { codec: self })
    }
}

struct TokenVisitor<'a, T: FieldEnum> {
    codec: &'a FieldEnumCodec<T>,
}

impl<T: FieldEnum> Visitor<'_> for TokenVisitor<'_, T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a token of `{}`", type_name::<T>())
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<T, E> {
        self.codec.read(v).map_err(Error::into_de)
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<T, E> {
        self.visit_str(&v)
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<T, E> {
        match core::str::from_utf8(v) {
            Ok(s) => self.visit_str(s),
            Err(_) => Err(E::invalid_value(Unexpected::Bytes(v), &self)),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::FieldEnumCodec;
    use crate::Error;
    use crate::field::{FieldEnum, FieldValue};
    use serde::de::DeserializeSeed;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum NoDuplicates {
        None,
        Value1,
        Value2,
    }

    impl FieldEnum for NoDuplicates {
        const FIELDS: &'static [FieldValue<Self>] = &[
            FieldValue::new("None", Self::None),
            FieldValue::new("Value1", Self::Value1).with_token("Value2"),
            FieldValue::new("Value2", Self::Value2).with_token("Value1"),
        ];

        fn to_bits(self) -> u64 {
            self as u64
        }
    }

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum AttributeDuplicates {
        None,
        Value1,
        Value2,
    }

    impl FieldEnum for AttributeDuplicates {
        const FIELDS: &'static [FieldValue<Self>] = &[
            FieldValue::new("None", Self::None),
            FieldValue::new("Value1", Self::Value1).with_token("value"),
            FieldValue::new("Value2", Self::Value2).with_token("value"),
        ];

        fn to_bits(self) -> u64 {
            self as u64
        }
    }

    #[derive(Clone, Copy, PartialEq, Debug)]
    #[repr(u8)]
    enum Flags {
        None = 0,
        Value1 = 1,
        Value2 = 2,
        Value4 = 4,
        Value6 = 6,
    }

    impl FieldEnum for Flags {
        const FLAGS: bool = true;
        const FIELDS: &'static [FieldValue<Self>] = &[
            FieldValue::new("None", Self::None),
            FieldValue::new("Value1", Self::Value1).with_token("value_1"),
            FieldValue::new("Value2", Self::Value2).with_token("value_2"),
            FieldValue::new("Value4", Self::Value4).with_token("value_4"),
            FieldValue::new("Value6", Self::Value6).with_token("value_6"),
        ];

        fn to_bits(self) -> u64 {
            self as u64
        }
    }

    #[test]
    fn switched_tokens() {
        let codec = FieldEnumCodec::<NoDuplicates>::new();
        assert_eq!(codec.write(NoDuplicates::Value1).unwrap(), "Value2");
        assert_eq!(codec.write(NoDuplicates::Value2).unwrap(), "Value1");
        assert_eq!(codec.read("Value2").unwrap(), NoDuplicates::Value1);
        assert_eq!(codec.read("Value1").unwrap(), NoDuplicates::Value2);
        assert!(matches!(codec.read("value1"), Err(Error::UnknownToken { .. })));
    }

    #[test]
    fn duplicates_fail_every_call() {
        let codec = FieldEnumCodec::<AttributeDuplicates>::new();
        // `None` is not part of the collision.
        assert!(matches!(
            codec.write(AttributeDuplicates::None),
            Err(Error::DuplicateToken { .. })
        ));
        assert!(matches!(codec.read("None"), Err(Error::DuplicateToken { .. })));
        assert!(matches!(codec.read(""), Err(Error::DuplicateToken { .. })));

        match codec.write(AttributeDuplicates::Value1) {
            Err(Error::DuplicateToken { token, first, second, .. }) => {
                assert_eq!(token, "value");
                assert_eq!(first, "Value1");
                assert_eq!(second, "Value2");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flags_use_own_token() {
        let codec = FieldEnumCodec::<Flags>::new();
        assert_eq!(codec.write(Flags::Value1).unwrap(), "value_1");
        assert_eq!(codec.write(Flags::Value6).unwrap(), "value_6");
        assert_eq!(codec.read("value_6").unwrap(), Flags::Value6);
        assert_eq!(codec.read("value_2,value_4").unwrap(), Flags::Value6);
        assert_eq!(codec.read("value_4,value_2").unwrap(), Flags::Value6);
    }

    #[test]
    fn flags_zero_and_unmapped() {
        let codec = FieldEnumCodec::<Flags>::new();
        assert_eq!(codec.write(Flags::None).unwrap(), "None");
        assert_eq!(codec.read("None").unwrap(), Flags::None);
        assert!(matches!(codec.read(""), Err(Error::UnknownToken { .. })));
        assert!(matches!(codec.read("value_2,"), Err(Error::UnknownToken { .. })));

        // 1 | 2 is not a constant of `Flags`.
        assert!(matches!(
            codec.read("value_1,value_2"),
            Err(Error::UnmappedValue { bits: 3, .. })
        ));
        assert!(matches!(
            codec.read("value_1,value_3"),
            Err(Error::UnknownToken { .. })
        ));
    }

    #[test]
    fn separator() {
        let mut codec = FieldEnumCodec::<Flags>::new();
        assert_eq!(codec.separator(), ",");

        codec.set_separator("|").unwrap();
        assert_eq!(codec.separator(), "|");
        assert_eq!(codec.read("value_2|value_4").unwrap(), Flags::Value6);
        assert!(codec.read("value_2,value_4").is_err());

        assert!(matches!(codec.set_separator(""), Err(Error::InvalidConfiguration(_))));
        assert_eq!(codec.separator(), "|");
        assert!(FieldEnumCodec::<Flags>::with_separator("").is_err());
    }

    bitflags::bitflags! {
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        struct Perm: u32 {
            const READ = 1;
            const WRITE = 2;
            const ADMIN = 0x100;
        }
    }

    crate::impl_field_enum! {
        #[flags]
        Perm {
            READ = Perm::READ => "r",
            WRITE = Perm::WRITE => "w",
            ADMIN = Perm::ADMIN => "admin",
            #[ignore]
            ALL = Perm::all(),
        }
    }

    #[test]
    fn bitflags_with_separator() {
        let codec = FieldEnumCodec::<Perm>::with_separator("|").unwrap();
        assert_eq!(codec.write(Perm::READ | Perm::ADMIN).unwrap(), "r|admin");
        assert_eq!(codec.write(Perm::all()).unwrap(), "r|w|admin");
        assert_eq!(codec.read("w|r").unwrap(), Perm::READ | Perm::WRITE);
        assert!(matches!(codec.read("r|x"), Err(Error::UnknownToken { .. })));
        assert!(matches!(codec.read("ALL"), Err(Error::UnknownToken { .. })));
        assert_eq!(crate::field::FieldTable::<Perm>::of().entries().len(), 3);

        // No constant is zero.
        assert!(matches!(codec.write(Perm::empty()), Err(Error::UnmappedValue { bits: 0, .. })));
        assert!(matches!(codec.read(""), Err(Error::UnknownToken { .. })));
    }

    #[test]
    fn through_serde() {
        let codec = FieldEnumCodec::<NoDuplicates>::new();

        let mut de = serde_json::Deserializer::from_str("\"Value1\"");
        assert_eq!((&codec).deserialize(&mut de).unwrap(), NoDuplicates::Value2);

        let mut out = alloc::vec::Vec::new();
        let mut ser = serde_json::Serializer::new(&mut out);
        codec.serialize(&NoDuplicates::None, &mut ser).unwrap();
        assert_eq!(out, b"\"None\"");

        let mut de = serde_json::Deserializer::from_str("\"Other\"");
        let err = (&codec).deserialize(&mut de).unwrap_err();
        assert!(err.to_string().contains("'Other'"));
    }
}
