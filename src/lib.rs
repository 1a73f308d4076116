//! Polymorphic JSON codecs built on `serde` and `serde_json`.
//!
//! This umbrella crate only re-exports the member crates, see [`json`].
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_json as json;
