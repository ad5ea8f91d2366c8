//! RocketShoes Core - Shared types library.
//!
//! This crate provides the small set of types shared by the cart library and
//! its tests:
//! - `cart` - Cart state container (catalog lookups, persistence, notifications)
//! - `integration-tests` - End-to-end tests against a fake catalog server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and currencies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
