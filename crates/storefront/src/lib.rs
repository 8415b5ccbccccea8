//! Ng Store storefront library.
//!
//! Catalog access, the shared cart, page metadata and the page state
//! machines that tie them together. Front ends build an [`state::AppState`]
//! and drive pages from it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod meta;
pub mod pages;
pub mod state;
pub mod ticket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
