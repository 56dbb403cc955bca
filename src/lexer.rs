use crate::token::{Span, Token, TokenKind};

/// Tokenize a Gemfile source string into a sequence of tokens.
///
/// Lexing is total: every byte of input is consumed and unrecognized
/// characters become [`TokenKind::Unknown`] tokens instead of errors.
/// Structural problems are reported later by the parser, which has the
/// statement context needed for a useful message.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let bytes = input.as_bytes();
        let start = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            input: bytes,
            pos: start,
            line: 1,
            col: 1,
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            let ch = self.input[self.pos];

            match ch {
                b'\n' => {
                    tokens.push(self.make_token(TokenKind::Newline, "\n".to_string()));
                    self.advance();
                }
                b'\r' => {
                    self.advance();
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                    tokens.push(Self::make_token_at(
                        TokenKind::Newline,
                        "\n".to_string(),
                        self.line - 1,
                        self.col,
                    ));
                }
                b' ' | b'\t' => {
                    self.advance();
                }
                b'#' => {
                    tokens.push(self.read_comment());
                }
                b'\'' => {
                    tokens.push(self.read_single_quoted());
                }
                b'"' => {
                    tokens.push(self.read_double_quoted());
                }
                b':' => {
                    // Greedy symbol match: `:identifier` is one token.
                    // A colon not followed by an identifier stays
                    // standalone punctuation (hash `key: value` sugar).
                    if self.peek_at(1).is_some_and(is_ident_start) {
                        tokens.push(self.read_symbol());
                    } else {
                        tokens.push(self.make_token(TokenKind::Colon, ":".to_string()));
                        self.advance();
                    }
                }
                b'=' if self.peek_at(1) == Some(b'>') => {
                    tokens.push(self.make_token(TokenKind::FatArrow, "=>".to_string()));
                    self.advance();
                    self.advance();
                }
                b',' | b'(' | b')' | b'[' | b']' | b'{' | b'}' => {
                    let kind = match ch {
                        b',' => TokenKind::Comma,
                        b'(' => TokenKind::OpenParen,
                        b')' => TokenKind::CloseParen,
                        b'[' => TokenKind::OpenBracket,
                        b']' => TokenKind::CloseBracket,
                        b'{' => TokenKind::OpenBrace,
                        _ => TokenKind::CloseBrace,
                    };
                    tokens.push(self.make_token(kind, char::from(ch).to_string()));
                    self.advance();
                }
                b'\\' if self.peek_at(1) == Some(b'\n') => {
                    // line continuation
                    self.advance();
                    self.advance();
                }
                b'\\' if self.peek_at(1) == Some(b'\r') => {
                    self.advance();
                    self.advance();
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                }
                b'0'..=b'9' => {
                    tokens.push(self.read_number());
                }
                _ if is_ident_start(ch) => {
                    tokens.push(self.read_ident());
                }
                _ => {
                    let text = String::from_utf8_lossy(&[ch]).into_owned();
                    tokens.push(self.make_token(TokenKind::Unknown, text));
                    self.advance();
                }
            }
        }

        tokens
    }

    const fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.col,
        }
    }

    const fn make_token(&self, kind: TokenKind, text: String) -> Token {
        Token {
            kind,
            text,
            span: self.span(),
        }
    }

    const fn make_token_at(kind: TokenKind, text: String, line: usize, col: usize) -> Token {
        Token {
            kind,
            text,
            span: Span { line, column: col },
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn read_comment(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
            self.pos += 1;
            self.col += 1;
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        Token {
            kind: TokenKind::Comment,
            text,
            span: Span {
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Single-quoted string: only `\'` and `\\` are escapes, no
    /// interpolation. An unterminated string runs to end of input and
    /// still yields a token (lexing never fails).
    fn read_single_quoted(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // skip opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None => break,
                Some(b'\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c @ (b'\'' | b'\\')) => {
                            value.push(char::from(c));
                            self.advance();
                        }
                        Some(c) => {
                            value.push('\\');
                            value.push(char::from(c));
                            self.advance();
                        }
                        None => {
                            value.push('\\');
                        }
                    }
                }
                Some(b'\'') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    value.push(char::from(c));
                    self.advance();
                }
            }
        }

        Token {
            kind: TokenKind::StringLit {
                interpolated: false,
            },
            text: value,
            span: Span {
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Double-quoted string with the usual escapes. A `#{` marker sets
    /// the `interpolated` flag; the statement parser downgrades the
    /// containing statement to unsupported.
    fn read_double_quoted(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // skip opening quote

        let mut value = String::new();
        let mut interpolated = false;
        loop {
            match self.peek() {
                None => break,
                Some(b'\\') => {
                    self.advance();
                    match self.peek() {
                        Some(b'n') => {
                            value.push('\n');
                            self.advance();
                        }
                        Some(b't') => {
                            value.push('\t');
                            self.advance();
                        }
                        Some(b'r') => {
                            value.push('\r');
                            self.advance();
                        }
                        Some(b'"') => {
                            value.push('"');
                            self.advance();
                        }
                        Some(b'\\') => {
                            value.push('\\');
                            self.advance();
                        }
                        Some(c) => {
                            value.push('\\');
                            value.push(char::from(c));
                            self.advance();
                        }
                        None => {
                            value.push('\\');
                        }
                    }
                }
                Some(b'#') => {
                    if self.peek_at(1) == Some(b'{') {
                        interpolated = true;
                    }
                    value.push('#');
                    self.advance();
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    if c == b'\n' {
                        self.advance();
                        value.push('\n');
                    } else {
                        value.push(char::from(c));
                        self.advance();
                    }
                }
            }
        }

        Token {
            kind: TokenKind::StringLit { interpolated },
            text: value,
            span: Span {
                line: start_line,
                column: start_col,
            },
        }
    }

    fn read_symbol(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // skip colon

        let start = self.pos;
        while self.pos < self.input.len() && is_ident_continue(self.input[self.pos]) {
            self.pos += 1;
            self.col += 1;
        }

        let name = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        Token {
            kind: TokenKind::SymbolLit,
            text: name,
            span: Span {
                line: start_line,
                column: start_col,
            },
        }
    }

    fn read_ident(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        while self.pos < self.input.len() && is_ident_continue(self.input[self.pos]) {
            self.pos += 1;
            self.col += 1;
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let kind = match text.as_str() {
            "do" => TokenKind::Do,
            "end" => TokenKind::End,
            _ => TokenKind::Ident,
        };

        Token {
            kind,
            text,
            span: Span {
                line: start_line,
                column: start_col,
            },
        }
    }

    fn read_number(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
            self.col += 1;
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();

        Token {
            kind: TokenKind::Number,
            text,
            span: Span {
                line: start_line,
                column: start_col,
            },
        }
    }
}

const fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

const fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, b'_' | b'!' | b'?')
}
