//! Value expressions in exported variables and commands.
//!
//! Expressions are literal text with embedded references:
//!
//! ```text
//! #{ocamlfind.lib / 'ocaml' : $CAML_LD_LIBRARY_PATH}
//!   ^^^^^^^^^^^^^             package field, resolved to a store path
//!                 ^^^^^^^     quoted path component
//!                           ^ path-list separator (`;` on windows)
//!                             ^^^^^^^^^^^^^^^^^^^^^ value bound so far
//! ```
//!
//! Atoms joined by `/` form a path; paths joined by `:` form a list. In a list
//! with more than one element, an unset or empty `$VAR` element is dropped
//! together with its separator, which is how chained variables start out.
//!
//! # Literal text
//!
//! Everything outside `#{ }` is copied unchanged, so shell variables like
//! `$HOME` in commands pass through. Use `##{` for a literal `#{`.
//!
//! # Example
//!
//! ```
//! use strata_lib::expr::{Atom, Chain, Expression, Segment};
//!
//! let expr = Expression::parse("-I#{self.lib / 'ocaml'}").unwrap();
//! assert_eq!(expr.segments, vec![
//!     Segment::Literal("-I".to_string()),
//!     Segment::Reference(vec![Chain(vec![
//!         Atom::PathRef { package: "self".to_string(), field: "lib".to_string() },
//!         Atom::Quoted("ocaml".to_string()),
//!     ])]),
//! ]);
//! ```

mod eval;
mod parse;

use thiserror::Error;

use crate::store::PathResolutionError;

pub use eval::evaluate;
pub use parse::parse;

/// Smallest unit of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
  /// `pkg.field`, e.g. `self.lib` or `ocaml.name`.
  PathRef { package: String, field: String },

  /// `'text'`, a literal path component.
  Quoted(String),

  /// `$NAME`, the value bound so far in the current composition.
  VarRef(String),
}

/// Atoms joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain(pub Vec<Atom>);

impl Chain {
  /// The variable name if this chain is a lone `$NAME`.
  pub fn as_var(&self) -> Option<&str> {
    match self.0.as_slice() {
      [Atom::VarRef(name)] => Some(name.as_str()),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),

  /// `#{ ... }`: chains joined with the path-list separator.
  Reference(Vec<Chain>),
}

/// A parsed expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
  pub segments: Vec<Segment>,
}

impl Expression {
  pub fn parse(input: &str) -> Result<Self, ExpressionError> {
    parse(input)
  }

  pub fn evaluate(&self, resolver: &impl Resolver) -> Result<String, ExpressionError> {
    evaluate(self, resolver)
  }

  /// Whether the expression reads `$name`, i.e. extends rather than replaces it.
  pub fn references_var(&self, name: &str) -> bool {
    self.atoms().any(|atom| matches!(atom, Atom::VarRef(var) if var == name))
  }

  fn atoms(&self) -> impl Iterator<Item = &Atom> {
    self
      .segments
      .iter()
      .filter_map(|segment| match segment {
        Segment::Reference(chains) => Some(chains),
        Segment::Literal(_) => None,
      })
      .flatten()
      .flat_map(|chain| chain.0.iter())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
  #[error("unclosed reference at position {0}")]
  Unclosed(usize),

  #[error("unterminated quote in reference at position {0}")]
  UnterminatedQuote(usize),

  #[error("unexpected {found} at position {pos}")]
  Unexpected { found: String, pos: usize },

  #[error("empty reference at position {0}")]
  EmptyReference(usize),

  #[error("'{0}' is missing a field, e.g. '{0}.lib'")]
  MissingField(String),

  #[error("unknown package '{0}'")]
  UnknownPackage(String),

  #[error("unknown field '{field}' of package '{package}'")]
  UnknownField { package: String, field: String },

  #[error("variable ${0} is not set")]
  UnresolvedVar(String),

  #[error("invalid variable name '{0}'")]
  InvalidName(String),

  #[error(transparent)]
  Path(#[from] PathResolutionError),
}

/// Supplies values for references during evaluation.
pub trait Resolver {
  /// Resolve `package.field`.
  fn resolve_field(&self, package: &str, field: &str) -> Result<String, ExpressionError>;

  /// Current value of a variable, if bound.
  fn resolve_var(&self, name: &str) -> Option<&str>;

  /// Separator between list elements.
  fn list_separator(&self) -> &str;
}

/// Parse and evaluate in one step.
pub fn interpolate(input: &str, resolver: &impl Resolver) -> Result<String, ExpressionError> {
  parse(input)?.evaluate(resolver)
}

/// Whether `name` can be exported by a POSIX shell.
pub fn is_valid_var_name(name: &str) -> bool {
  let mut chars = name.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
