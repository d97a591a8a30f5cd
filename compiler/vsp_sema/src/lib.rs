//! Semantic core of the Vesper compiler front end
//!
//! This crate owns the three subsystems that sit between the grammar driver
//! and any later backend:
//!
//! - the [type model](ty) -- a tagged-union representation of every
//!   declarable Vesper type, plus [declaration entities](decl);
//! - the [scope chain](scope) -- an arena of nested lexical environments
//!   mapping names to variables, functions, types and foreign declarations;
//! - the [structural compatibility engine](compat) and the
//!   [resolution & inference pass](check) that consumes it.
//!
//! The grammar driver constructs the [tree] with scopes pre-wired and every
//! declaration registered; [`check::check_program`] then walks it, attaching
//! inferred types and reporting verdicts. The [pretty] module exposes
//! read-only debug serializers over every tree shape.

#![warn(
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    clippy::missing_docs_in_private_items,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

pub mod check;
pub mod compat;
pub mod decl;
pub mod pretty;
pub mod scope;
pub mod tree;
pub mod ty;
