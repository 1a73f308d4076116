//! Discriminator driven polymorphic JSON codecs on top of `serde_json`.
//!
//! - [`typed`]: decodes one of several concrete types of a `dyn Base` from a
//!   discriminator property, and encodes trait objects by their runtime type.
//! - [`keyed`]: maps whose keys are not strings.
//! - [`field`]: enum constants written as string tokens, flag sets included.
//!
//! Bytes are only read and written by `serde_json`; every codec here works on
//! the `serde` data model, so the typed decoder also reads any self-describing
//! format.
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macros emit `::vc_json::...` paths, which must also resolve in
// the unit tests of this crate.
extern crate self as vc_json;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod cell;
pub mod field;
pub mod keyed;
pub mod typed;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::Error;
pub use vc_json_derive as derive;

// -----------------------------------------------------------------------------
// Macros

/// Implements [`FieldEnum`](crate::field::FieldEnum) for a `bitflags` type.
///
/// Every listed constant becomes a field named after the identifier. A
/// constant may carry a token override after `=>` and may be excluded with
/// `#[ignore]`. With a leading `#[flags]` the type is written as a flag set,
/// combined values decomposed into the listed constants.
///
/// Any value `bitflags` accepts through `from_bits` can be read back.
///
/// # Example
///
/// ```
/// use vc_json::field::FieldEnumCodec;
///
/// bitflags::bitflags! {
///     #[derive(Clone, Copy, PartialEq, Eq, Debug)]
///     struct Access: u8 {
///         const READ = 1;
///         const WRITE = 2;
///         const EXEC = 4;
///     }
/// }
///
/// vc_json::impl_field_enum! {
///     #[flags]
///     Access {
///         NONE = Access::empty() => "none",
///         READ = Access::READ => "read",
///         WRITE = Access::WRITE => "write",
///         EXEC = Access::EXEC => "exec",
///         #[ignore]
///         ALL = Access::all(),
///     }
/// }
///
/// let codec = FieldEnumCodec::<Access>::new();
/// assert_eq!(codec.write(Access::READ | Access::EXEC).unwrap(), "read,exec");
/// assert_eq!(codec.write(Access::all()).unwrap(), "read,write,exec");
/// assert_eq!(codec.write(Access::empty()).unwrap(), "none");
/// assert_eq!(codec.read("write,read").unwrap(), Access::READ | Access::WRITE);
/// ```
#[macro_export]
macro_rules! impl_field_enum {
    (@field $name:ident, $value:expr, [], [$($token:literal)?]) => {
        $crate::field::FieldValue::new(::core::stringify!($name), $value)
            $(.with_token($token))?
    };
    (@field $name:ident, $value:expr, [ignore], [$($token:literal)?]) => {
        $crate::field::FieldValue::new(::core::stringify!($name), $value)
            $(.with_token($token))?
            .ignored()
    };
    (@impl $flags:literal, $ty:ty {
        $( $(#[$attr:ident])? $name:ident = $value:expr $(=> $token:literal)? ),* $(,)?
    }) => {
        impl $crate::field::FieldEnum for $ty {
            const FLAGS: bool = $flags;

            const FIELDS: &'static [$crate::field::FieldValue<Self>] = &[
                $( $crate::impl_field_enum!(@field $name, $value, [$($attr)?], [$($token)?]), )*
            ];

            #[inline]
            fn to_bits(self) -> u64 {
                ::core::convert::Into::<u64>::into(
                    $crate::__macro_exports::bitflags::Flags::bits(&self)
                )
            }

            #[inline]
            fn from_bits(bits: u64) -> ::core::option::Option<Self> {
                let bits = ::core::convert::TryFrom::try_from(bits).ok()?;
                <Self as $crate::__macro_exports::bitflags::Flags>::from_bits(bits)
            }
        }
    };
    (#[flags] $ty:ty { $($body:tt)* }) => {
        $crate::impl_field_enum!(@impl true, $ty { $($body)* });
    };
    ($ty:ty { $($body:tt)* }) => {
        $crate::impl_field_enum!(@impl false, $ty { $($body)* });
    };
}
