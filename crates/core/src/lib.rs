//! Ng Store Core - Shared catalog types.
//!
//! This crate provides the types exchanged between the catalog API and the
//! storefront state layer. It is used by:
//! - `storefront` - Catalog client, cart store and page state
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, categories and products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
