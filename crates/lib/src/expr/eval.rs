//! Evaluation of parsed expressions.

use super::{Atom, Chain, Expression, ExpressionError, Resolver, Segment};

/// Evaluate an expression to its final string.
///
/// # Errors
///
/// Returns the first reference that fails to resolve.
pub fn evaluate(expr: &Expression, resolver: &impl Resolver) -> Result<String, ExpressionError> {
  let mut result = String::new();

  for segment in &expr.segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Reference(chains) => result.push_str(&evaluate_list(chains, resolver)?),
    }
  }

  Ok(result)
}

fn evaluate_list(chains: &[Chain], resolver: &impl Resolver) -> Result<String, ExpressionError> {
  let mut parts = Vec::with_capacity(chains.len());

  for chain in chains {
    // An unset list element contributes nothing, not even a separator
    if chains.len() > 1
      && let Some(name) = chain.as_var()
    {
      if let Some(value) = resolver.resolve_var(name).filter(|v| !v.is_empty()) {
        parts.push(value.to_string());
      }
      continue;
    }
    parts.push(evaluate_chain(chain, resolver)?);
  }

  Ok(parts.join(resolver.list_separator()))
}

fn evaluate_chain(chain: &Chain, resolver: &impl Resolver) -> Result<String, ExpressionError> {
  let mut result = String::new();

  for (i, atom) in chain.0.iter().enumerate() {
    if i > 0 {
      result.push('/');
    }
    match atom {
      Atom::PathRef { package, field } => result.push_str(&resolver.resolve_field(package, field)?),
      Atom::Quoted(text) => result.push_str(text),
      Atom::VarRef(name) => {
        let value = resolver
          .resolve_var(name)
          .ok_or_else(|| ExpressionError::UnresolvedVar(name.clone()))?;
        result.push_str(value);
      }
    }
  }

  Ok(result)
}
