#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package storage for pakt
//!
//! Two layers: a content-addressed cache of fetched source trees keyed by
//! source hash, and a manual override store mapping package identities to
//! local directories. Overrides always outrank network resolution.

mod cache;
mod overrides;

pub use cache::{CacheGuard, PackageCache};
pub use overrides::OverrideStore;
