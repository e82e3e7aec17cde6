//! Trivia-attaching C# lexer.
//!
//! Every byte of the input ends up in exactly one token or trivia piece, so
//! concatenating the token stream reproduces the source. A token's trailing
//! trivia runs up to and including the first line break; everything else
//! before a token is its leading trivia.

use dataverse_lint_core::syntax::{GreenToken, TokenKind, Trivia, TriviaKind};

/// Reserved words. Contextual keywords (`var`, `await`, `record`, ...) are
/// identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Multi-character punctuators, longest first. `>>` is deliberately absent:
/// the parser joins adjacent `>` tokens so nested generics close cleanly.
const PUNCTUATORS: &[&str] = &[
    "<<=", "??=", "...", "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", "??", "?.", "::", "..",
];

/// Returns true for reserved keywords.
#[must_use]
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

/// Splits `source` into tokens with attached trivia. The last token is always
/// [`TokenKind::EndOfFile`], carrying the file's final trivia.
#[must_use]
pub fn tokenize(source: &str) -> Vec<GreenToken> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let leading = lexer.trivia(false);
        if lexer.at_end() {
            tokens.push(GreenToken::new(TokenKind::EndOfFile, "").with_leading(leading));
            return tokens;
        }
        let (kind, text) = lexer.token();
        let trailing = lexer.trivia(true);
        tokens.push(
            GreenToken::new(kind, text)
                .with_leading(leading)
                .with_trailing(trailing),
        );
    }
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take(&self, start: usize) -> &'s str {
        &self.src[start..self.pos]
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump_char();
        }
    }

    fn at_line_start(&self) -> bool {
        self.src[..self.pos]
            .chars()
            .rev()
            .take_while(|&c| c != '\n')
            .all(|c| c == ' ' || c == '\t')
    }

    fn trivia(&mut self, trailing: bool) -> Vec<Trivia> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.pos;
            let kind = match c {
                ' ' | '\t' | '\u{feff}' | '\u{000c}' => {
                    self.eat_while(|c| matches!(c, ' ' | '\t' | '\u{feff}' | '\u{000c}'));
                    TriviaKind::Whitespace
                }
                '\r' | '\n' => {
                    if self.rest().starts_with("\r\n") {
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                    }
                    out.push(Trivia::new(TriviaKind::EndOfLine, self.take(start)));
                    if trailing {
                        return out;
                    }
                    continue;
                }
                '/' if self.rest().starts_with("///") && !self.rest().starts_with("////") => {
                    self.eat_while(|c| c != '\r' && c != '\n');
                    TriviaKind::DocComment
                }
                '/' if self.rest().starts_with("//") => {
                    self.eat_while(|c| c != '\r' && c != '\n');
                    TriviaKind::LineComment
                }
                '/' if self.rest().starts_with("/*") => {
                    self.pos += 2;
                    match self.rest().find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => self.pos = self.src.len(),
                    }
                    TriviaKind::BlockComment
                }
                '#' if !trailing && self.at_line_start() => {
                    self.eat_while(|c| c != '\r' && c != '\n');
                    TriviaKind::Directive
                }
                _ => break,
            };
            out.push(Trivia::new(kind, self.take(start)));
        }
        out
    }

    fn token(&mut self) -> (TokenKind, &'s str) {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return (TokenKind::EndOfFile, "");
        };
        let next = self.peek_at(1);

        let kind = if c == '"'
            || (c == '@' && matches!(next, Some('"' | '$')))
            || (c == '$' && matches!(next, Some('"' | '@' | '$')))
        {
            self.string_like()
        } else if c == '\'' {
            self.char_literal();
            TokenKind::CharLiteral
        } else if c == '@' && next.is_some_and(is_ident_start) {
            self.pos += 1;
            self.eat_while(is_ident_part);
            TokenKind::Identifier
        } else if is_ident_start(c) {
            self.eat_while(is_ident_part);
            if is_keyword(self.take(start)) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else if c.is_ascii_digit() || c == '.' && next.is_some_and(|n| n.is_ascii_digit()) {
            self.number();
            TokenKind::NumericLiteral
        } else if let Some(p) = PUNCTUATORS.iter().find(|p| self.rest().starts_with(**p)) {
            self.pos += p.len();
            TokenKind::Punct
        } else if "{}()[];,.:?=<>+-*/%&|^!~".contains(c) {
            self.pos += 1;
            TokenKind::Punct
        } else {
            self.bump_char();
            TokenKind::Unknown
        };
        (kind, self.take(start))
    }

    fn number(&mut self) {
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            self.pos += 2;
            self.eat_while(|c| c == '0' || c == '1' || c == '_');
        } else {
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
                self.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let sign = matches!(self.peek_at(1), Some('+' | '-'));
                let digit_at = if sign { 2 } else { 1 };
                if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += digit_at;
                    self.eat_while(|c| c.is_ascii_digit());
                }
            }
        }
        self.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D' | 'm' | 'M'));
    }

    fn char_literal(&mut self) {
        self.pos += 1;
        while let Some(c) = self.bump_char() {
            match c {
                '\\' => {
                    self.bump_char();
                }
                '\'' | '\n' => return,
                _ => {}
            }
        }
    }

    /// Regular, verbatim, raw and interpolated strings.
    fn string_like(&mut self) -> TokenKind {
        let mut interpolated = false;
        let mut verbatim = false;
        while let Some(c) = self.peek() {
            match c {
                '$' => interpolated = true,
                '@' => verbatim = true,
                _ => break,
            }
            self.pos += 1;
        }

        let quotes = self.rest().chars().take_while(|&c| c == '"').count();
        if quotes >= 3 {
            self.raw_string(quotes);
        } else {
            self.pos += 1;
            self.quoted_body(verbatim, interpolated);
        }
        if self.rest().starts_with("u8") || self.rest().starts_with("U8") {
            self.pos += 2;
        }
        if interpolated {
            TokenKind::InterpolatedString
        } else {
            TokenKind::StringLiteral
        }
    }

    fn raw_string(&mut self, quotes: usize) {
        self.pos += quotes;
        let closing = "\"".repeat(quotes);
        match self.rest().find(&closing) {
            Some(end) => {
                self.pos += end;
                let run = self.rest().chars().take_while(|&c| c == '"').count();
                self.pos += run;
            }
            None => self.pos = self.src.len(),
        }
    }

    fn quoted_body(&mut self, verbatim: bool, interpolated: bool) {
        while let Some(c) = self.peek() {
            match c {
                '"' if verbatim && self.peek_at(1) == Some('"') => self.pos += 2,
                '"' => {
                    self.pos += 1;
                    return;
                }
                '\\' if !verbatim => {
                    self.pos += 1;
                    self.bump_char();
                }
                '\n' if !verbatim => return,
                '{' if interpolated && self.peek_at(1) == Some('{') => self.pos += 2,
                '{' if interpolated => {
                    self.pos += 1;
                    self.interpolation_hole();
                }
                _ => {
                    self.bump_char();
                }
            }
        }
    }

    /// Skips an interpolation hole up to its closing `}`, stepping over
    /// nested braces and string literals.
    fn interpolation_hole(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '{' | '(' | '[' => {
                    depth += 1;
                    self.pos += 1;
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                '}' => {
                    self.pos += 1;
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                '"' | '$' | '@' if self.starts_string() => {
                    self.string_like();
                }
                '\'' => self.char_literal(),
                '\n' if depth == 0 => return,
                _ => {
                    self.bump_char();
                }
            }
        }
    }

    fn starts_string(&self) -> bool {
        let rest = self.rest();
        rest.starts_with('"')
            || rest.starts_with("@\"")
            || rest.starts_with("$\"")
            || rest.starts_with("$@\"")
            || rest.starts_with("@$\"")
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
