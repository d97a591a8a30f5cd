//! Defines all possible Vesper semantic diagnostics.

use thiserror::Error;
use vsp_utils::span::{Span, Spannable};

use crate::{Diagnostic, Severity};

/// The list of possible errors
// These remain as Strings, not 'input str slices, because most of them carry
// the rendered form of a type rather than a slice of the input.
#[allow(missing_docs)]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    // SCOPE / REGISTRATION ERRORS
    #[error("identifier `{0}` already in use in this scope")]
    IdentifierAlreadyInUse(String),
    #[error("member `{0}` is declared more than once across the inheritance chain")]
    DuplicateInheritedMember(String),

    // RESOLUTION ERRORS
    #[error("unable to resolve `{0}` to a type")]
    UnableToResolveType(String),
    #[error("unable to resolve identifier `{0}`")]
    UnableToResolveIdentifier(String),
    #[error("`{0}` names a type, not a value")]
    TypeUsedAsValue(String),

    // COMPATIBILITY ERRORS
    #[error("cannot cast `{0}` to `{1}`")]
    InvalidCast(String, String),
    #[error("`{0}` does not structurally contain `{1}`: member `{2}` is missing or mismatched")]
    StructureMismatch(String, String, String),
    #[error("cannot join `{0}` and `{1}`: member `{2}` appears on both sides")]
    JoinMemberCollision(String, String, String),
    #[error("cannot join `{0}` and `{1}`: operands must be structs or interfaces of one kind")]
    InvalidJoinOperands(String, String),
    #[error("cannot union `{0}` and `{1}`: operands must be structs or interfaces of one kind")]
    InvalidUnionOperands(String, String),
    #[error("union operand `{0}` is not well-formed: duplicate member `{1}`")]
    UnionOperandCollision(String, String),
    #[error("`{0}` cannot extend `{1}`: base kinds differ")]
    InvalidExtend(String, String),
    #[error("`{0}` does not have member `{1}`")]
    DoesNotHaveMember(String, String),
    #[error("cannot access member of non-structural type `{0}`")]
    MemberAccessOnNonStructural(String),
    #[error("expected `{0}` and `{1}` to be the same type")]
    ExpectedSameType(String, String),

    // PROCESS ERRORS
    #[error("process `{0}` must declare exactly one handler named `receive`")]
    ProcessMissingReceive(String),

    // INTERNAL ERRORS
    /// Raised when an assumption the checking pass relies on turns out to be
    /// false. Indicates a defect in tree construction upstream; callers
    /// should abort rather than continue checking.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

impl DiagnosticKind {
    /// Create an [error] diagnostic in a given [`Span`]
    ///
    /// [error]: [`Severity::Error`]
    #[must_use]
    #[inline]
    pub fn error_in(self, span: Span) -> Diagnostic {
        Diagnostic(Severity::Error, self.in_span(span))
    }
}
