#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network layer for pakt
//!
//! HTTP client with connection pooling and retry logic, size-bounded
//! streaming downloads and archive unpacking.

mod archive;
mod client;
mod download;

pub use archive::{is_archive, unpack_archive};
pub use client::{NetClient, NetConfig};
pub use download::download_file;
