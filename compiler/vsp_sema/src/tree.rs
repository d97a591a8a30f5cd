//! The program tree the resolution pass walks
//!
//! The tree arrives from the front end with every [`Expr`]'s `ty` slot empty
//! (except literals, which the front end types itself) and leaves the pass
//! fully annotated. Scopes are not stored in the tree; each node that opens
//! one carries a [`ScopeId`] into the arena instead.

use vsp_utils::span::Spanned;

use crate::{
    decl::{ExternDeclaration, FunctionHeader, Import},
    scope::ScopeId,
    ty::Type,
};

/// A literal value, kept as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal<'input> {
    /// Any numeric literal, integer or floating
    Number(&'input str),
    /// A string literal, quotes stripped
    String(&'input str),
    /// A character literal
    Char(&'input str),
    /// `true` or `false`
    Bool(bool),
}

/// The kinds of expression the resolution pass types
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<'input> {
    /// A literal value
    Literal(Literal<'input>),
    /// A bare name
    Identifier(&'input str),
    /// `x as T`
    Cast(Box<Expr<'input>>, Type<'input>),
    /// `x.member`
    Member(Box<Expr<'input>>, Spanned<&'input str>),
}

/// An expression: a spanned kind plus the type slot the pass fills in
#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'input> {
    /// What the expression is
    pub kind: Spanned<ExprKind<'input>>,
    /// The expression's type; [`None`] until the pass annotates it
    pub ty: Option<Type<'input>>,
}

impl<'input> Expr<'input> {
    /// Create an untyped expression; the pass fills in its type.
    #[must_use]
    pub const fn new(kind: Spanned<ExprKind<'input>>) -> Self {
        Self { kind, ty: None }
    }

    /// Create a literal expression. Literals are typed by the front end, so
    /// the type is attached immediately.
    #[must_use]
    pub fn literal(literal: Spanned<Literal<'input>>, ty: Type<'input>) -> Self {
        Self {
            kind: literal.map(ExprKind::Literal),
            ty: Some(ty),
        }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'input> {
    /// A bare expression
    Expr(Expr<'input>),
    /// `let name = value;` -- the binding itself already lives in `scope`'s
    /// variable table; the node records the initializer to check against it
    Let {
        /// The declared name
        name: Spanned<&'input str>,
        /// The scope the binding was registered into
        scope: ScopeId,
        /// The initializer, if any
        value: Option<Expr<'input>>,
    },
    /// `{ ... }`
    Block {
        /// The scope the block opens
        scope: ScopeId,
        /// The block's statements
        body: Vec<Stmt<'input>>,
    },
    /// `unsafe { ... }`
    Unsafe {
        /// The scope the region opens, flagged unsafe
        scope: ScopeId,
        /// The region's statements
        body: Vec<Stmt<'input>>,
    },
    /// `sync { ... }`
    Sync {
        /// The scope the region opens, flagged sync
        scope: ScopeId,
        /// The region's statements
        body: Vec<Stmt<'input>>,
    },
    /// `return;` or `return expr;`
    Return(Option<Expr<'input>>),
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration<'input> {
    /// A function with its body
    Function {
        /// The function's header, also registered in the enclosing scope
        header: FunctionHeader<'input>,
        /// The body scope
        scope: ScopeId,
        /// The body's statements
        body: Vec<Stmt<'input>>,
    },
    /// A named type declaration
    Type {
        /// The declared name
        name: Spanned<&'input str>,
        /// The declared type
        ty: Type<'input>,
    },
    /// A foreign declaration block
    Extern(ExternDeclaration<'input>),
    /// An import of another unit
    Import(Import<'input>),
}

/// A whole compilation unit, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Program<'input>(pub Vec<Declaration<'input>>);

#[cfg(test)]
mod tests {
    use vsp_utils::{span::Spannable, spanned};

    use super::*;
    use crate::ty::TypeKind;

    #[test]
    fn literal_expressions_arrive_typed() {
        let expr = Expr::literal(
            spanned!(0, Literal::Number("42"), 2),
            crate::ty::Type::new(TypeKind::I32),
        );

        assert_eq!(expr.ty, Some(crate::ty::Type::new(TypeKind::I32)));
        assert_eq!(
            expr.kind,
            ExprKind::Literal(Literal::Number("42")).in_span(
                vsp_utils::span::Span::from_positions(0, 2)
            )
        );
    }

    #[test]
    fn plain_expressions_arrive_untyped() {
        let expr = Expr::new(spanned!(0, ExprKind::Identifier("x"), 1));
        assert_eq!(expr.ty, None);
    }
}
