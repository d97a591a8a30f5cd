//! Diagnostics for the Vesper semantic core
//!
//! This crate declares the [`Diagnostic`] type -- a [`Severity`] paired with
//! a spanned [`DiagnosticKind`] -- along with extension traits to create
//! diagnostics ergonomically from spans.

#![warn(
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    clippy::missing_docs_in_private_items,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

mod diagnostic;
mod diagnostic_kind;
mod ext;

pub use diagnostic::{Diagnostic, Severity};
pub use diagnostic_kind::DiagnosticKind;
pub use ext::{SpanExt, SpannedExt};
