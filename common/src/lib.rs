//! A small crate containing the raw ABI definitions and the data-holding utilities that are common
//! to both addons and hosts.
//!
//! All modules of this crate are re-exported in the `kaddon` and `kaddon-host` crates. Most users
//! should not have to use `kaddon-common` directly.

pub mod addon_type;
pub mod entry;
pub mod handle;
pub mod log;
pub mod setting;
pub mod status;
pub mod structure;
pub mod sys;
pub mod version;
