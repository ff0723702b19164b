//! strings68 expressions: AST, lexer, parser, and evaluator.
//!
//! An expression is a string literal, a variable reference, or a call to a
//! built-in function:
//!
//! ```text
//! expr      := "literal" | NAME | fname ( [expr {, expr}] )
//! condition := expr (equals | contains | startswith | endswith) expr
//! ```
//!
//! Evaluation is strict and left to right.  The evaluator only ever reads
//! variables, through [`EvalContext`].

use std::fmt;

use tracing::trace;

use super::builtins::{call_builtin, Builtin};
use super::error::ScriptError;

// ── EvalContext ───────────────────────────────────────────────────────────────

/// Read-only variable access used by the evaluator.
///
/// [`VarStore`](crate::var::VarStore) implements this; tests may supply
/// their own.
pub trait EvalContext {
    /// Look up a variable, failing with `UndefinedVariable` if unset.
    fn get_var(&self, name: &str) -> Result<&str, ScriptError>;
}

// ── AST ───────────────────────────────────────────────────────────────────────

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `"text"`
    Str(String),
    /// `12`
    Var(String),
    /// `name(args…)`
    Call { name: String, args: Vec<Expr> },
}

/// Condition operator used by `if` and `while`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl CondOp {
    pub fn from_keyword(word: &str) -> Option<CondOp> {
        Some(match word {
            "equals" => CondOp::Equals,
            "contains" => CondOp::Contains,
            "startswith" => CondOp::StartsWith,
            "endswith" => CondOp::EndsWith,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CondOp::Equals => "equals",
            CondOp::Contains => "contains",
            CondOp::StartsWith => "startswith",
            CondOp::EndsWith => "endswith",
        }
    }

    /// Apply the operator to two evaluated operands.
    pub fn test(self, lhs: &str, rhs: &str) -> bool {
        match self {
            CondOp::Equals => lhs == rhs,
            CondOp::Contains => lhs.contains(rhs),
            CondOp::StartsWith => lhs.starts_with(rhs),
            CondOp::EndsWith => lhs.ends_with(rhs),
        }
    }
}

/// `lhs op rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub lhs: Expr,
    pub op: CondOp,
    pub rhs: Expr,
}

impl Condition {
    /// Evaluate both sides (left first) and compare.
    pub fn eval<C: EvalContext + ?Sized>(&self, ctx: &C) -> Result<bool, ScriptError> {
        let lhs = eval(&self.lhs, ctx)?;
        let rhs = eval(&self.rhs, ctx)?;
        Ok(self.op.test(&lhs, &rhs))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.keyword(), self.rhs)
    }
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Evaluate an expression to its string value.
pub fn eval<C: EvalContext + ?Sized>(expr: &Expr, ctx: &C) -> Result<String, ScriptError> {
    match expr {
        Expr::Str(s) => Ok(s.clone()),
        Expr::Var(name) => ctx.get_var(name).map(str::to_owned),
        Expr::Call { name, args } => {
            let builtin = Builtin::from_name(name)
                .ok_or_else(|| ScriptError::UnknownFunction(name.clone()))?;
            builtin.check_arity(args.len())?;
            let values = args
                .iter()
                .map(|a| eval(a, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let out = call_builtin(builtin, &values)?;
            trace!(function = name.as_str(), args = ?values, result = %out, "call");
            Ok(out)
        }
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A `"..."` literal with escapes already resolved.
    Str(String),
    /// A run of ASCII letters, digits, and `_`.
    Word(String),
    LParen,
    RParen,
    Comma,
    Assign,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Word(w) => write!(f, "'{w}'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Assign => write!(f, "'='"),
        }
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

/// Split one source line into tokens.
pub fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            ',' => tokens.push(Token::Comma),
            '=' => tokens.push(Token::Assign),
            '"' => {
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, '"')) => s.push('"'),
                            Some((_, '\\')) => s.push('\\'),
                            Some((_, 'n')) => s.push('\n'),
                            Some((_, 't')) => s.push('\t'),
                            Some((_, other)) => {
                                return Err(format!("unknown escape '\\{other}'"));
                            }
                            None => break,
                        },
                        '\0' => return Err("NUL character in string literal".to_owned()),
                        c => s.push(c),
                    }
                }
                if !closed {
                    return Err(format!("unterminated string starting at column {}", i + 1));
                }
                tokens.push(Token::Str(s));
            }
            c if is_word_char(c) => {
                let mut w = String::from(c);
                while let Some(&(_, c)) = chars.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    w.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(w));
            }
            other => {
                return Err(format!("unexpected character '{other}' at column {}", i + 1));
            }
        }
    }
    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Recursive-descent parser over the tokens of one line.
pub struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        ExprParser { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Fail unless every token has been consumed.
    pub fn finish(&self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(format!("unexpected {t} after end of statement")),
        }
    }

    /// Consume a bare word, returning it.
    pub fn expect_word(&mut self, what: &str) -> Result<String, String> {
        match self.advance() {
            Some(Token::Word(w)) => Ok(w),
            Some(t) => Err(format!("expected {what}, found {t}")),
            None => Err(format!("expected {what}, found end of line")),
        }
    }

    /// Consume the keyword `kw`.
    pub fn expect_keyword(&mut self, kw: &str) -> Result<(), String> {
        match self.advance() {
            Some(Token::Word(w)) if w == kw => Ok(()),
            Some(t) => Err(format!("expected '{kw}', found {t}")),
            None => Err(format!("expected '{kw}', found end of line")),
        }
    }

    /// Consume the next token if it is the word `kw`.
    pub fn eat_keyword(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Some(Token::Word(w)) if w == kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn parse_expr(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Word(w)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.parse_args(&w)?;
                    Ok(Expr::Call { name: w, args })
                } else {
                    Ok(Expr::Var(w))
                }
            }
            Some(t) => Err(format!("expected expression, found {t}")),
            None => Err("expected expression, found end of line".to_owned()),
        }
    }

    /// Parse call arguments after the opening `(`, consuming the `)`.
    fn parse_args(&mut self, fname: &str) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => return Ok(args),
                Some(t) => return Err(format!("expected ',' or ')' in {fname}(), found {t}")),
                None => return Err(format!("missing ')' in call to {fname}")),
            }
        }
    }

    pub fn parse_condition(&mut self) -> Result<Condition, String> {
        let lhs = self.parse_expr()?;
        let word = self.expect_word("condition operator")?;
        let op = CondOp::from_keyword(&word).ok_or_else(|| {
            format!("unknown condition operator '{word}' (expected equals, contains, startswith or endswith)")
        })?;
        let rhs = self.parse_expr()?;
        Ok(Condition { lhs, op, rhs })
    }
}

/// Parse a complete expression from source text.
pub fn parse_expr_str(src: &str) -> Result<Expr, String> {
    let mut p = ExprParser::new(tokenize(src)?);
    let e = p.parse_expr()?;
    p.finish()?;
    Ok(e)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::error::ErrorKind;
    use crate::var::VarStore;

    fn parse(src: &str) -> Expr {
        parse_expr_str(src).expect("parse failed")
    }

    fn eval_src(src: &str, vars: &VarStore) -> Result<String, ScriptError> {
        eval(&parse(src), vars)
    }

    #[test]
    fn tokens() {
        let toks = tokenize(r#"3 = concat(1, "a,b")"#).unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Word("3".into()),
                Token::Assign,
                Token::Word("concat".into()),
                Token::LParen,
                Token::Word("1".into()),
                Token::Comma,
                Token::Str("a,b".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let toks = tokenize(r#""say \"hi\"\n\\""#).unwrap();
        assert_eq!(toks, vec![Token::Str("say \"hi\"\n\\".into())]);
    }

    #[test]
    fn unterminated_string() {
        assert!(tokenize(r#""oops"#).is_err());
    }

    #[test]
    fn nul_rejected_in_literal() {
        assert!(tokenize("\"a\0b\"").is_err());
    }

    #[test]
    fn unexpected_char() {
        assert!(tokenize("1 + 2").is_err());
    }

    #[test]
    fn nested_calls() {
        let e = parse(r#"get(split("a,b", ","), "1")"#);
        assert_eq!(e.to_string(), r#"get(split("a,b", ","), "1")"#);
    }

    #[test]
    fn parse_errors() {
        assert!(parse_expr_str("concat(1,").is_err());
        assert!(parse_expr_str("concat(1 2)").is_err());
        assert!(parse_expr_str("1 2").is_err());
        assert!(parse_expr_str("").is_err());
    }

    #[test]
    fn eval_literal_and_var() {
        let mut vars = VarStore::new();
        vars.set("1", "Hello");
        assert_eq!(eval_src(r#""lit""#, &vars).unwrap(), "lit");
        assert_eq!(eval_src("1", &vars).unwrap(), "Hello");
    }

    #[test]
    fn eval_undefined() {
        let vars = VarStore::new();
        let e = eval_src("999", &vars).unwrap_err();
        assert_eq!(e.to_string(), "Variable '999' not defined");
    }

    #[test]
    fn eval_nested() {
        let mut vars = VarStore::new();
        vars.set("1", "strings68");
        assert_eq!(
            eval_src("reverse(uppercase(1))", &vars).unwrap(),
            "86SGNIRTS"
        );
        assert_eq!(
            eval_src(r#"get(split("apple,banana,cherry", ","), "1")"#, &vars).unwrap(),
            "banana"
        );
    }

    #[test]
    fn unknown_function() {
        let vars = VarStore::new();
        let e = eval_src(r#"frobnicate("x")"#, &vars).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::UnknownFunction);
    }

    #[test]
    fn arity_checked_before_arguments() {
        // The undefined variable is never evaluated: arity fails first.
        let vars = VarStore::new();
        let e = eval_src("reverse(1, 2)", &vars).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::ArityMismatch);
    }

    #[test]
    fn arguments_evaluated_left_to_right() {
        let vars = VarStore::new();
        let e = eval_src("concat(7, 8)", &vars).unwrap_err();
        assert_eq!(e, ScriptError::UndefinedVariable("7".into()));
    }

    #[test]
    fn conditions() {
        let mut vars = VarStore::new();
        vars.set("1", "hello world");
        let mut p = ExprParser::new(tokenize(r#"1 contains "lo w""#).unwrap());
        let c = p.parse_condition().unwrap();
        assert!(c.eval(&vars).unwrap());
        assert!(CondOp::StartsWith.test("hello", "he"));
        assert!(CondOp::EndsWith.test("hello", "llo"));
        assert!(!CondOp::Equals.test("a", "A"));
        assert!(CondOp::Contains.test("abc", ""));
    }

    #[test]
    fn bad_condition_operator() {
        let mut p = ExprParser::new(tokenize(r#"1 is "x""#).unwrap());
        assert!(p.parse_condition().is_err());
    }
}
