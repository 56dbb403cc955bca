use std::fmt;

use crate::ast::{
    DependencyDecl, GroupBlock, PlatformBlock, SourceDecl, Statement, UnsupportedStmt, Value,
    VersionPin,
};
use crate::token::{Span, Token, TokenKind};

/// Keywords that open an `end`-delimited block when they start a
/// statement. Their bodies are skipped wholesale: nothing inside an
/// unevaluated conditional may produce a dependency record.
const BLOCK_KEYWORDS: [&str; 10] = [
    "if", "unless", "while", "until", "case", "begin", "def", "class", "module", "for",
];

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// End of input while a `do`/`end` or `if`/`end` block was open.
    UnterminatedBlock,
    /// Expected `)`, found something else or EOF.
    ExpectedCloseParen { found: Option<String> },
    /// Expected `]`, found something else or EOF.
    ExpectedCloseBracket { found: Option<String> },
    /// Expected `}`, found something else or EOF.
    ExpectedCloseBrace { found: Option<String> },
    /// An unsupported construct under strict extraction.
    UnsupportedConstruct { construct: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedBlock => {
                write!(f, "unterminated block, expected 'end'")
            }
            Self::ExpectedCloseParen { found: None } => {
                write!(f, "expected ')'")
            }
            Self::ExpectedCloseParen { found: Some(t) } => {
                write!(f, "expected ')', got '{t}'")
            }
            Self::ExpectedCloseBracket { found: None } => {
                write!(f, "expected ']'")
            }
            Self::ExpectedCloseBracket { found: Some(t) } => {
                write!(f, "expected ']', got '{t}'")
            }
            Self::ExpectedCloseBrace { found: None } => {
                write!(f, "expected '}}'")
            }
            Self::ExpectedCloseBrace { found: Some(t) } => {
                write!(f, "expected '}}', got '{t}'")
            }
            Self::UnsupportedConstruct { construct } => {
                write!(f, "unsupported construct `{construct}`")
            }
        }
    }
}

/// Error produced during parsing (or strict-mode extraction).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parse a token stream into a statement tree.
///
/// # Errors
///
/// Returns `ParseError` on structurally invalid input: an unterminated
/// block or an unbalanced bracket. Constructs outside the declarative
/// subset do not error; they parse into [`Statement::Unsupported`] and
/// parsing continues after them.
pub fn parse(tokens: &[Token]) -> Result<Vec<Statement>, ParseError> {
    Parser::new(tokens).parse()
}

/// Non-fatal shape mismatches rewind to the statement start and
/// degrade to `Unsupported`; fatal errors abort the whole parse.
enum StmtError {
    Fatal(ParseError),
    Shape,
}

type StmtResult<T> = Result<T, StmtError>;

/// One parsed argument: positional value or `key: value` pair.
enum Arg {
    Positional(Value),
    Keyword(String, Value),
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<Vec<Statement>, ParseError> {
        self.parse_statements(0)
    }

    fn parse_statements(&mut self, depth: usize) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines_and_comments();
            let Some(token) = self.current() else { break };
            if token.kind == TokenKind::End && depth > 0 {
                break;
            }
            statements.push(self.parse_statement(depth)?);
        }

        Ok(statements)
    }

    fn parse_statement(&mut self, depth: usize) -> Result<Statement, ParseError> {
        let start = self.pos;
        match self.try_parse_statement(depth) {
            Ok(statement) => Ok(statement),
            Err(StmtError::Fatal(e)) => Err(e),
            Err(StmtError::Shape) => {
                self.pos = start;
                self.skip_unsupported()
            }
        }
    }

    fn try_parse_statement(&mut self, depth: usize) -> StmtResult<Statement> {
        let Some(token) = self.current() else {
            return Err(StmtError::Shape);
        };
        if token.kind != TokenKind::Ident {
            return Err(StmtError::Shape);
        }
        match token.text.as_str() {
            "source" => self.parse_source(depth),
            "gem" => self.parse_gem(),
            "group" => self.parse_group(depth),
            "platforms" | "platform" => self.parse_platforms(depth),
            "ruby" => self.parse_ruby(),
            _ => Err(StmtError::Shape),
        }
    }

    fn parse_source(&mut self, depth: usize) -> StmtResult<Statement> {
        let span = self.tokens[self.pos].span;
        self.pos += 1;

        let args = self.parse_args()?;
        let url = match args.as_slice() {
            [Arg::Positional(v @ Value::Str(_))] => v.clone(),
            _ => return Err(StmtError::Shape),
        };

        let body = if self.current_kind() == Some(&TokenKind::Do) {
            self.pos += 1;
            let body = self.parse_statements(depth + 1).map_err(StmtError::Fatal)?;
            self.expect_end()?;
            Some(body)
        } else {
            None
        };

        Ok(Statement::Source(SourceDecl { url, body, span }))
    }

    fn parse_gem(&mut self) -> StmtResult<Statement> {
        let span = self.tokens[self.pos].span;
        self.pos += 1;

        let mut args = self.parse_args()?.into_iter();
        let name = match args.next() {
            Some(Arg::Positional(Value::Str(s))) => s,
            _ => return Err(StmtError::Shape),
        };

        let mut version_constraints = Vec::new();
        let mut options = Vec::new();
        for arg in args {
            match arg {
                Arg::Positional(Value::Str(s)) => version_constraints.push(s),
                Arg::Positional(_) => return Err(StmtError::Shape),
                Arg::Keyword(key, value) => options.push((key, value)),
            }
        }

        // A dependency declaration takes no block.
        if self.current_kind() == Some(&TokenKind::Do) {
            return Err(StmtError::Shape);
        }

        Ok(Statement::Dependency(DependencyDecl {
            name,
            version_constraints,
            options,
            span,
        }))
    }

    fn parse_group(&mut self, depth: usize) -> StmtResult<Statement> {
        let (names, body) = self.parse_name_block(depth)?;
        Ok(Statement::Group(GroupBlock { names, body }))
    }

    fn parse_platforms(&mut self, depth: usize) -> StmtResult<Statement> {
        let (names, body) = self.parse_name_block(depth)?;
        Ok(Statement::Platforms(PlatformBlock { names, body }))
    }

    /// Shared shape of `group`/`platforms`: one or more name values
    /// followed by a `do ... end` block.
    fn parse_name_block(&mut self, depth: usize) -> StmtResult<(Vec<String>, Vec<Statement>)> {
        self.pos += 1;

        let mut names = Vec::new();
        for arg in self.parse_args()? {
            match arg {
                Arg::Positional(Value::Symbol(s) | Value::Str(s)) => names.push(s),
                _ => return Err(StmtError::Shape),
            }
        }
        if names.is_empty() {
            return Err(StmtError::Shape);
        }

        if self.current_kind() != Some(&TokenKind::Do) {
            return Err(StmtError::Shape);
        }
        self.pos += 1;

        let body = self.parse_statements(depth + 1).map_err(StmtError::Fatal)?;
        self.expect_end()?;

        Ok((names, body))
    }

    fn parse_ruby(&mut self) -> StmtResult<Statement> {
        self.pos += 1;

        let args = self.parse_args()?;
        if self.current_kind() == Some(&TokenKind::Do) {
            return Err(StmtError::Shape);
        }
        match args.as_slice() {
            [Arg::Positional(Value::Str(s))] => Ok(Statement::RubyPin(VersionPin {
                value: s.clone(),
            })),
            _ => Err(StmtError::Shape),
        }
    }

    /// Parse a statement's argument list: comma-separated positional
    /// values and keyword arguments, optionally parenthesized. In the
    /// bare form the list ends at a newline, comment, `do`, or `end`;
    /// a trailing comma continues the statement on the next line.
    fn parse_args(&mut self) -> StmtResult<Vec<Arg>> {
        let parens = self.current_kind() == Some(&TokenKind::OpenParen);
        if parens {
            self.pos += 1;
        }

        let mut args = Vec::new();
        loop {
            if parens {
                self.skip_newlines_and_comments();
            }
            let Some(token) = self.current() else {
                if parens {
                    return Err(StmtError::Fatal(ParseError {
                        kind: ParseErrorKind::ExpectedCloseParen { found: None },
                        span: self.eof_span(),
                    }));
                }
                break;
            };
            match token.kind {
                TokenKind::CloseParen if parens => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Comma => {
                    self.pos += 1;
                    if !parens {
                        self.skip_newlines_and_comments();
                    }
                }
                TokenKind::Newline | TokenKind::Comment | TokenKind::Do | TokenKind::End
                    if !parens =>
                {
                    break;
                }
                _ => args.push(self.parse_arg()?),
            }
        }

        Ok(args)
    }

    /// Detect `key:` sugar at the cursor: Identifier then Colon, or
    /// the tight form the greedy symbol lexer produces (Identifier
    /// plus an adjacent SymbolLiteral, as in `require:false`).
    /// Returns the key and, for the tight form, the materialized
    /// value.
    fn keyword_sugar(&mut self) -> Option<(String, Option<Value>)> {
        let token = self.current()?;
        if token.kind != TokenKind::Ident {
            return None;
        }
        let next = self.tokens.get(self.pos + 1)?;
        if next.kind == TokenKind::Colon {
            let key = token.text.clone();
            self.pos += 2;
            return Some((key, None));
        }
        if next.kind == TokenKind::SymbolLit && adjacent(token, next) {
            let key = token.text.clone();
            let value = symbol_as_value(&next.text);
            self.pos += 2;
            return Some((key, Some(value)));
        }
        None
    }

    fn parse_arg(&mut self) -> StmtResult<Arg> {
        if let Some((key, tight)) = self.keyword_sugar() {
            let value = match tight {
                Some(value) => value,
                None => self.parse_value()?,
            };
            return Ok(Arg::Keyword(key, value));
        }

        let value = self.parse_value()?;

        // Legacy `key => value` form.
        if self.current_kind() == Some(&TokenKind::FatArrow) {
            let key = match value {
                Value::Symbol(s) | Value::Str(s) => s,
                _ => return Err(StmtError::Shape),
            };
            self.pos += 1;
            let value = self.parse_value()?;
            return Ok(Arg::Keyword(key, value));
        }

        Ok(Arg::Positional(value))
    }

    fn parse_value(&mut self) -> StmtResult<Value> {
        let Some(token) = self.current() else {
            return Err(StmtError::Shape);
        };
        match &token.kind {
            TokenKind::StringLit { interpolated } => {
                // Interpolation needs evaluation; the statement
                // degrades to unsupported.
                if *interpolated {
                    return Err(StmtError::Shape);
                }
                let value = Value::Str(token.text.clone());
                self.pos += 1;
                Ok(value)
            }
            TokenKind::SymbolLit => {
                let value = Value::Symbol(token.text.clone());
                self.pos += 1;
                Ok(value)
            }
            TokenKind::Number => {
                let value = token.text.parse::<i64>().map_err(|_| StmtError::Shape)?;
                self.pos += 1;
                Ok(Value::Number(value))
            }
            TokenKind::Ident => {
                let value = match token.text.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "nil" => Value::Nil,
                    _ => return Err(StmtError::Shape),
                };
                self.pos += 1;
                Ok(value)
            }
            TokenKind::OpenBracket => self.parse_array(),
            TokenKind::OpenBrace => self.parse_hash(),
            _ => Err(StmtError::Shape),
        }
    }

    fn parse_array(&mut self) -> StmtResult<Value> {
        self.pos += 1; // skip [

        let mut items = Vec::new();
        loop {
            self.skip_newlines_and_comments();
            let Some(token) = self.current() else {
                return Err(StmtError::Fatal(ParseError {
                    kind: ParseErrorKind::ExpectedCloseBracket { found: None },
                    span: self.eof_span(),
                }));
            };
            match token.kind {
                TokenKind::CloseBracket => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                TokenKind::Comma => self.pos += 1,
                TokenKind::Do | TokenKind::End => {
                    return Err(StmtError::Fatal(ParseError {
                        kind: ParseErrorKind::ExpectedCloseBracket {
                            found: Some(token.text.clone()),
                        },
                        span: token.span,
                    }));
                }
                _ => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_hash(&mut self) -> StmtResult<Value> {
        self.pos += 1; // skip {

        let mut pairs = Vec::new();
        loop {
            self.skip_newlines_and_comments();
            let Some(token) = self.current() else {
                return Err(StmtError::Fatal(ParseError {
                    kind: ParseErrorKind::ExpectedCloseBrace { found: None },
                    span: self.eof_span(),
                }));
            };
            match token.kind {
                TokenKind::CloseBrace => {
                    self.pos += 1;
                    return Ok(Value::Hash(pairs));
                }
                TokenKind::Comma => self.pos += 1,
                TokenKind::Do | TokenKind::End => {
                    return Err(StmtError::Fatal(ParseError {
                        kind: ParseErrorKind::ExpectedCloseBrace {
                            found: Some(token.text.clone()),
                        },
                        span: token.span,
                    }));
                }
                _ => {
                    let pair = self.parse_hash_pair()?;
                    pairs.push(pair);
                }
            }
        }
    }

    /// One hash entry: `key: value` shorthand (key normalizes to a
    /// symbol) or `key => value`. Both produce the same pair.
    fn parse_hash_pair(&mut self) -> StmtResult<(Value, Value)> {
        if let Some((key, tight)) = self.keyword_sugar() {
            let value = match tight {
                Some(value) => value,
                None => self.parse_value()?,
            };
            return Ok((Value::Symbol(key), value));
        }

        let key = self.parse_value()?;
        if self.current_kind() != Some(&TokenKind::FatArrow) {
            return Err(StmtError::Shape);
        }
        self.pos += 1;
        let value = self.parse_value()?;
        Ok((key, value))
    }

    /// Consume a construct outside the declarative subset. Skips to
    /// the end of the line, or past the balanced `end` when the
    /// construct opens a block (`do`, or a leading block keyword such
    /// as `if`). Returns the inert statement for the extractor to
    /// turn into a warning.
    fn skip_unsupported(&mut self) -> Result<Statement, ParseError> {
        let start = self.pos;
        let first = &self.tokens[start];
        let construct = first.text.clone();
        let span = first.span;

        let mut parts: Vec<String> = Vec::new();
        let mut depth: usize = 0;
        let mut at_line_start = true;

        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::Newline => {
                    if depth == 0 {
                        break;
                    }
                    self.pos += 1;
                    at_line_start = true;
                }
                TokenKind::Comment => {
                    self.pos += 1;
                }
                TokenKind::Do => {
                    depth += 1;
                    parts.push(token.text.clone());
                    self.pos += 1;
                    at_line_start = false;
                }
                TokenKind::End => {
                    if depth == 0 {
                        if self.pos == start {
                            // stray `end` with no opener: consume it
                            parts.push(token.text.clone());
                            self.pos += 1;
                        }
                        break;
                    }
                    depth -= 1;
                    parts.push(token.text.clone());
                    self.pos += 1;
                    if depth == 0 {
                        break;
                    }
                    at_line_start = false;
                }
                TokenKind::Ident
                    if at_line_start && BLOCK_KEYWORDS.contains(&token.text.as_str()) =>
                {
                    depth += 1;
                    parts.push(token.text.clone());
                    self.pos += 1;
                    at_line_start = false;
                }
                _ => {
                    parts.push(token.text.clone());
                    self.pos += 1;
                    at_line_start = false;
                }
            }
        }

        if depth > 0 {
            return Err(ParseError {
                kind: ParseErrorKind::UnterminatedBlock,
                span: self.eof_span(),
            });
        }

        Ok(Statement::Unsupported(UnsupportedStmt {
            construct,
            text: parts.join(" "),
            span,
        }))
    }

    fn expect_end(&mut self) -> StmtResult<()> {
        self.skip_newlines_and_comments();
        match self.current() {
            Some(token) if token.kind == TokenKind::End => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(StmtError::Fatal(ParseError {
                kind: ParseErrorKind::UnterminatedBlock,
                span: self.eof_span(),
            })),
        }
    }

    fn skip_newlines_and_comments(&mut self) {
        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::Newline | TokenKind::Comment => {
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<&'a TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn eof_span(&self) -> Span {
        self.tokens
            .last()
            .map_or(Span { line: 1, column: 1 }, |last| last.span)
    }
}

/// True when `b` starts on the byte right after `a` ends, with no
/// whitespace in between.
fn adjacent(a: &Token, b: &Token) -> bool {
    b.span.line == a.span.line && b.span.column == a.span.column + a.text.len()
}

/// Reinterpret a greedily-lexed symbol as the value of a tight
/// `key:value` pair: `require:false` carries a boolean, not `:false`.
fn symbol_as_value(name: &str) -> Value {
    match name {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "nil" => Value::Nil,
        _ => Value::Symbol(name.to_string()),
    }
}
