//! Common utilities used throughout the Vesper compiler
//!
//! Most importantly, this crate declares [`span::Span`] and
//! [`span::Spanned<T>`], which associate values with their location in the
//! input source.

#![warn(
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    clippy::missing_docs_in_private_items,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

pub mod span;
