//! strings68 statement AST and script-level parser.
//!
//! A program is a sequence of lines.  Blank lines and lines starting with
//! `#` are skipped; every other line holds exactly one statement or block
//! keyword:
//!
//! ```text
//! N = expr
//! print expr
//! if cond then … [else …] endif
//! foreach [char|item] N in expr do … endfor
//! while cond do … endwhile
//! ```

use super::error::ScriptError;
use super::expr::{tokenize, Condition, Expr, ExprParser, Token};

/// A parsed strings68 statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `N = expr`.  The target is checked when the statement runs.
    Assign { target: String, expr: Expr },
    /// `print expr`
    Print(Expr),
    /// `if cond then … [else …] endif`
    If {
        cond: Condition,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
    },
    /// `foreach char N in expr do … endfor`
    ForEachChar {
        var: String,
        source: Expr,
        body: Vec<Stmt>,
    },
    /// `foreach item N in expr do … endfor`
    ForEachItem {
        var: String,
        source: Expr,
        body: Vec<Stmt>,
    },
    /// `foreach N in expr do … endfor`: items if the value is an array,
    /// characters otherwise.
    ForEach {
        var: String,
        source: Expr,
        body: Vec<Stmt>,
    },
    /// `while cond do … endwhile`
    While { cond: Condition, body: Vec<Stmt> },
}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Parse a strings68 program into a list of statements.
pub fn parse_script(src: &str) -> Result<Vec<Stmt>, ScriptError> {
    let lines: Vec<(usize, String)> = src
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim().to_owned()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .collect();

    let mut parser = StmtParser { lines, pos: 0 };
    parser.parse_block_until(&[])
}

// ── Statement-level parser ────────────────────────────────────────────────────

const TERMINATORS: [&str; 4] = ["else", "endif", "endfor", "endwhile"];

struct StmtParser {
    lines: Vec<(usize, String)>,
    pos: usize,
}

impl StmtParser {
    /// Parse statements until a block terminator (not consumed) or EOF.
    ///
    /// `stop_at` names the terminators the caller expects; it is empty at
    /// the top level, where any terminator is an error.  Inside a block a
    /// foreign terminator also ends the block and the caller's
    /// [`expect_terminator`](Self::expect_terminator) reports the mismatch.
    fn parse_block_until(&mut self, stop_at: &[&str]) -> Result<Vec<Stmt>, ScriptError> {
        let mut stmts = Vec::new();
        while let Some((lineno, line)) = self.lines.get(self.pos).cloned() {
            if TERMINATORS.contains(&line.as_str()) {
                if stop_at.is_empty() {
                    return Err(ScriptError::parse(
                        lineno,
                        format!("'{line}' without a matching block"),
                    ));
                }
                break;
            }
            self.pos += 1;
            stmts.push(self.parse_one(lineno, &line)?);
        }
        Ok(stmts)
    }

    /// Consume the terminator `kw` closing the block opened on `open_line`.
    fn expect_terminator(
        &mut self,
        kw: &str,
        opener: &str,
        open_line: usize,
    ) -> Result<(), ScriptError> {
        match self.lines.get(self.pos) {
            Some((_, line)) if line == kw => {
                self.pos += 1;
                Ok(())
            }
            Some((lineno, line)) => Err(ScriptError::parse(
                *lineno,
                format!("expected '{kw}' to close '{opener}' from line {open_line}, found '{line}'"),
            )),
            None => Err(ScriptError::parse(
                open_line,
                format!("unmatched {opener}/{kw}"),
            )),
        }
    }

    fn parse_one(&mut self, lineno: usize, line: &str) -> Result<Stmt, ScriptError> {
        let err = |msg: String| ScriptError::parse(lineno, msg);
        let tokens = tokenize(line).map_err(err)?;

        if tokens.get(1) == Some(&Token::Assign) {
            return parse_assign(tokens).map_err(err);
        }

        let mut p = ExprParser::new(tokens);
        let keyword = match p.peek() {
            Some(Token::Word(w)) => w.clone(),
            _ => return Err(err(format!("unrecognized statement: {line}"))),
        };

        match keyword.as_str() {
            "print" => {
                p.expect_keyword("print").map_err(err)?;
                let e = p.parse_expr().map_err(err)?;
                p.finish().map_err(err)?;
                Ok(Stmt::Print(e))
            }
            "if" => self.parse_if(lineno, p),
            "foreach" => self.parse_foreach(lineno, p),
            "while" => self.parse_while(lineno, p),
            _ => Err(err(format!("unrecognized statement: {line}"))),
        }
    }

    fn parse_if(&mut self, lineno: usize, mut p: ExprParser) -> Result<Stmt, ScriptError> {
        let err = |msg: String| ScriptError::parse(lineno, msg);
        p.expect_keyword("if").map_err(err)?;
        let cond = p.parse_condition().map_err(err)?;
        p.expect_keyword("then").map_err(err)?;
        p.finish().map_err(err)?;

        let then_block = self.parse_block_until(&["else", "endif"])?;
        let else_block = match self.lines.get(self.pos) {
            Some((_, line)) if line == "else" => {
                self.pos += 1;
                Some(self.parse_block_until(&["endif"])?)
            }
            _ => None,
        };
        self.expect_terminator("endif", "if", lineno)?;

        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_foreach(&mut self, lineno: usize, mut p: ExprParser) -> Result<Stmt, ScriptError> {
        let err = |msg: String| ScriptError::parse(lineno, msg);
        p.expect_keyword("foreach").map_err(err)?;
        let mode = if p.eat_keyword("char") {
            Some("char")
        } else if p.eat_keyword("item") {
            Some("item")
        } else {
            None
        };
        let var = p.expect_word("loop variable").map_err(err)?;
        p.expect_keyword("in").map_err(err)?;
        let source = p.parse_expr().map_err(err)?;
        p.expect_keyword("do").map_err(err)?;
        p.finish().map_err(err)?;

        let body = self.parse_block_until(&["endfor"])?;
        self.expect_terminator("endfor", "foreach", lineno)?;

        Ok(match mode {
            Some("char") => Stmt::ForEachChar { var, source, body },
            Some(_) => Stmt::ForEachItem { var, source, body },
            None => Stmt::ForEach { var, source, body },
        })
    }

    fn parse_while(&mut self, lineno: usize, mut p: ExprParser) -> Result<Stmt, ScriptError> {
        let err = |msg: String| ScriptError::parse(lineno, msg);
        p.expect_keyword("while").map_err(err)?;
        let cond = p.parse_condition().map_err(err)?;
        p.expect_keyword("do").map_err(err)?;
        p.finish().map_err(err)?;

        let body = self.parse_block_until(&["endwhile"])?;
        self.expect_terminator("endwhile", "while", lineno)?;
        Ok(Stmt::While { cond, body })
    }
}

/// `target = expr`; `tokens[1]` is already known to be `=`.
fn parse_assign(tokens: Vec<Token>) -> Result<Stmt, String> {
    let mut tokens = tokens.into_iter();
    let target = match tokens.next() {
        Some(Token::Word(w)) => w,
        Some(t) => return Err(format!("invalid assignment target {t}")),
        None => return Err("missing assignment target".to_owned()),
    };
    tokens.next(); // `=`
    let mut p = ExprParser::new(tokens.collect());
    let expr = p.parse_expr()?;
    p.finish()?;
    Ok(Stmt::Assign { target, expr })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
