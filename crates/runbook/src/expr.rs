// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for `start on`/`stop on` boolean event-match expressions.
//!
//! Grammar (loosest binding first):
//!
//! ```text
//! expr  := and_expr ("or" and_expr)*
//! and   := term ("and" term)*
//! term  := NAME (KEY=VALUE)*
//! ```
//!
//! `NAME` is any whitespace-delimited token that isn't `and`/`or` and
//! doesn't contain `=`; tokens of the form `KEY=VALUE` attach as env-match
//! constraints to the event name immediately before them.

use oj_core::{Operator, OperatorPattern};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("empty start_on/stop_on expression")]
    Empty,
    #[error("expected an event name, found '{0}'")]
    ExpectedName(String),
    #[error("unexpected trailing tokens starting at '{0}'")]
    TrailingTokens(String),
}

struct Tokens<'a> {
    rest: std::iter::Peekable<std::str::SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            rest: s.split_whitespace().peekable(),
        }
    }

    fn peek(&mut self) -> Option<&&'a str> {
        self.rest.peek()
    }

    fn next(&mut self) -> Option<&'a str> {
        self.rest.next()
    }
}

/// Parse a `start on`/`stop on` expression into an [`Operator`] tree.
pub fn parse(expr: &str) -> Result<Operator, ExprError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut tokens = Tokens::new(expr);
    let tree = parse_or(&mut tokens)?;
    if let Some(extra) = tokens.next() {
        return Err(ExprError::TrailingTokens(extra.to_string()));
    }
    Ok(tree)
}

fn parse_or(tokens: &mut Tokens) -> Result<Operator, ExprError> {
    let mut lhs = parse_and(tokens)?;
    while matches!(tokens.peek(), Some(&t) if t.eq_ignore_ascii_case("or")) {
        tokens.next();
        let rhs = parse_and(tokens)?;
        lhs = lhs.or(rhs);
    }
    Ok(lhs)
}

fn parse_and(tokens: &mut Tokens) -> Result<Operator, ExprError> {
    let mut lhs = parse_term(tokens)?;
    while matches!(tokens.peek(), Some(&t) if t.eq_ignore_ascii_case("and")) {
        tokens.next();
        let rhs = parse_term(tokens)?;
        lhs = lhs.and(rhs);
    }
    Ok(lhs)
}

fn parse_term(tokens: &mut Tokens) -> Result<Operator, ExprError> {
    let name = tokens
        .next()
        .ok_or_else(|| ExprError::ExpectedName(String::new()))?;
    if name.contains('=') || name.eq_ignore_ascii_case("and") || name.eq_ignore_ascii_case("or") {
        return Err(ExprError::ExpectedName(name.to_string()));
    }
    let mut pattern = OperatorPattern::new(name);
    while let Some(&tok) = tokens.peek() {
        if let Some((key, value)) = tok.split_once('=') {
            pattern = pattern.with_match(key, value);
            tokens.next();
        } else {
            break;
        }
    }
    Ok(Operator::leaf(pattern))
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
