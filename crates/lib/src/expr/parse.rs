//! Parser for value expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use super::{Atom, Chain, Expression, ExpressionError, Segment};

/// Parse an expression into literal and reference segments.
///
/// # Errors
///
/// Returns an error if a reference is unclosed, contains an unterminated
/// quote, or does not follow the reference grammar.
pub fn parse(input: &str) -> Result<Expression, ExpressionError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '#' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '#')) => {
        chars.next();
        match chars.peek() {
          Some((_, '{')) => {
            // "##{" escapes to a literal "#{"
            chars.next();
            literal.push_str("#{");
          }
          _ => literal.push_str("##"),
        }
      }
      Some((_, '{')) => {
        chars.next();

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let body_start = pos + 2;
        let body_end = find_reference_end(&mut chars).map_err(|quoted| {
          if quoted {
            ExpressionError::UnterminatedQuote(pos)
          } else {
            ExpressionError::Unclosed(pos)
          }
        })?;

        let chains = parse_reference(&input[body_start..body_end], body_start, pos)?;
        segments.push(Segment::Reference(chains));
      }
      _ => literal.push('#'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(Expression { segments })
}

/// Consume up to and including the closing `}` and return its position.
/// On failure, reports whether the input ended inside a quote.
fn find_reference_end(chars: &mut Peekable<CharIndices<'_>>) -> Result<usize, bool> {
  let mut in_quote = false;
  for (pos, c) in chars.by_ref() {
    match c {
      '\'' => in_quote = !in_quote,
      '}' if !in_quote => return Ok(pos),
      _ => {}
    }
  }
  Err(in_quote)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Ident(String),
  Dot,
  Slash,
  Colon,
  Quoted(String),
  Var(String),
}

impl Token {
  fn describe(&self) -> String {
    match self {
      Token::Ident(s) => format!("'{s}'"),
      Token::Dot => "'.'".to_string(),
      Token::Slash => "'/'".to_string(),
      Token::Colon => "':'".to_string(),
      Token::Quoted(s) => format!("'{s}' (quoted)"),
      Token::Var(s) => format!("'${s}'"),
    }
  }
}

fn is_ident_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Split a reference body into tokens. `offset` is the body's position in the
/// full input, used for error positions.
fn tokenize(body: &str, offset: usize) -> Result<Vec<(usize, Token)>, ExpressionError> {
  let mut tokens = Vec::new();
  let mut chars = body.char_indices().peekable();

  while let Some((i, c)) = chars.next() {
    let pos = offset + i;
    match c {
      c if c.is_whitespace() => {}
      '.' => tokens.push((pos, Token::Dot)),
      '/' => tokens.push((pos, Token::Slash)),
      ':' => tokens.push((pos, Token::Colon)),
      '\'' => {
        let mut text = String::new();
        let mut closed = false;
        for (_, q) in chars.by_ref() {
          if q == '\'' {
            closed = true;
            break;
          }
          text.push(q);
        }
        if !closed {
          return Err(ExpressionError::UnterminatedQuote(pos));
        }
        tokens.push((pos, Token::Quoted(text)));
      }
      '$' => {
        let mut name = String::new();
        while let Some(&(_, n)) = chars.peek() {
          if !(n.is_ascii_alphanumeric() || n == '_') {
            break;
          }
          name.push(n);
          chars.next();
        }
        if name.is_empty() || name.starts_with(|d: char| d.is_ascii_digit()) {
          return Err(ExpressionError::InvalidName(format!("${name}")));
        }
        tokens.push((pos, Token::Var(name)));
      }
      c if is_ident_char(c) => {
        let mut ident = String::from(c);
        while let Some(&(_, n)) = chars.peek() {
          if !is_ident_char(n) {
            break;
          }
          ident.push(n);
          chars.next();
        }
        tokens.push((pos, Token::Ident(ident)));
      }
      other => {
        return Err(ExpressionError::Unexpected {
          found: format!("'{other}'"),
          pos,
        });
      }
    }
  }

  Ok(tokens)
}

/// Parse `chain (':' chain)*`.
fn parse_reference(body: &str, offset: usize, start: usize) -> Result<Vec<Chain>, ExpressionError> {
  let tokens = tokenize(body, offset)?;
  if tokens.is_empty() {
    return Err(ExpressionError::EmptyReference(start));
  }

  let end = offset + body.len();
  let mut tokens = tokens.into_iter().peekable();
  let mut chains = vec![parse_chain(&mut tokens, end)?];

  while let Some((pos, token)) = tokens.next() {
    match token {
      Token::Colon => chains.push(parse_chain(&mut tokens, end)?),
      other => {
        return Err(ExpressionError::Unexpected {
          found: other.describe(),
          pos,
        });
      }
    }
  }

  Ok(chains)
}

type Tokens = Peekable<std::vec::IntoIter<(usize, Token)>>;

/// Parse `atom ('/' atom)*`.
fn parse_chain(tokens: &mut Tokens, end: usize) -> Result<Chain, ExpressionError> {
  let mut atoms = vec![parse_atom(tokens, end)?];
  while let Some((_, Token::Slash)) = tokens.peek() {
    tokens.next();
    atoms.push(parse_atom(tokens, end)?);
  }
  Ok(Chain(atoms))
}

/// Parse `pkg '.' field | quoted | var`.
fn parse_atom(tokens: &mut Tokens, end: usize) -> Result<Atom, ExpressionError> {
  match tokens.next() {
    Some((_, Token::Quoted(text))) => Ok(Atom::Quoted(text)),
    Some((_, Token::Var(name))) => Ok(Atom::VarRef(name)),
    Some((_, Token::Ident(package))) => {
      if !matches!(tokens.peek(), Some((_, Token::Dot))) {
        return Err(ExpressionError::MissingField(package));
      }
      tokens.next();
      match tokens.next() {
        Some((_, Token::Ident(field))) => Ok(Atom::PathRef { package, field }),
        Some((pos, other)) => Err(ExpressionError::Unexpected {
          found: other.describe(),
          pos,
        }),
        None => Err(end_of_reference(end)),
      }
    }
    Some((pos, other)) => Err(ExpressionError::Unexpected {
      found: other.describe(),
      pos,
    }),
    None => Err(end_of_reference(end)),
  }
}

fn end_of_reference(pos: usize) -> ExpressionError {
  ExpressionError::Unexpected {
    found: "end of reference".to_string(),
    pos,
  }
}
