//! Items used by the code generated in `vc_json_derive` and `impl_field_enum!`.

pub use alloc::boxed::Box;
pub use std::sync::LazyLock;

pub use bitflags;
pub use erased_serde;
pub use serde;

#[cfg(feature = "auto_register")]
pub use inventory;
