use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Literal, Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &str) -> Result<(), Error>;

const TAB_WIDTH: usize = 8;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    /// Python-mode token table. Order matters: the first pattern that matches
    /// at the cursor wins, so longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"\A[ \t\x0c\r]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"\A#[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"\A\\\n").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"\A\n").unwrap(), handler: newline_handler },
        RegexPattern { regex: Regex::new(r#"\A(?i:rb|br|fr|rf|r|b|u|f)?("""|'''|"|')"#).unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new(r"\A0[xX](?:_?[0-9a-fA-F])+").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"\A0[oO](?:_?[0-7])+").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"\A0[bB](?:_?[01])+").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"\A(?:[0-9](?:_?[0-9])*\.(?:[0-9](?:_?[0-9])*)?|\.[0-9](?:_?[0-9])*)(?:[eE][+-]?[0-9](?:_?[0-9])*)?[jJ]?").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"\A[0-9](?:_?[0-9])*(?:[eE][+-]?[0-9](?:_?[0-9])*)?[jJ]?").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new(r"\A[_\p{L}][_\p{L}\p{N}]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"\A\*\*=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::DoubleStarEquals, "**=") },
        RegexPattern { regex: Regex::new(r"\A//=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::DoubleSlashEquals, "//=") },
        RegexPattern { regex: Regex::new(r"\A>>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::RightShiftEquals, ">>=") },
        RegexPattern { regex: Regex::new(r"\A<<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LeftShiftEquals, "<<=") },
        RegexPattern { regex: Regex::new(r"\A\.\.\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...") },
        RegexPattern { regex: Regex::new(r"\A\*\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::DoubleStar, "**") },
        RegexPattern { regex: Regex::new(r"\A//").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::DoubleSlash, "//") },
        RegexPattern { regex: Regex::new(r"\A>>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::RightShift, ">>") },
        RegexPattern { regex: Regex::new(r"\A<<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LeftShift, "<<") },
        RegexPattern { regex: Regex::new(r"\A->").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->") },
        RegexPattern { regex: Regex::new(r"\A:=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Walrus, ":=") },
        RegexPattern { regex: Regex::new(r"\A==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new(r"\A!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new(r"\A<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new(r"\A>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new(r"\A\+=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=") },
        RegexPattern { regex: Regex::new(r"\A-=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=") },
        RegexPattern { regex: Regex::new(r"\A\*=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=") },
        RegexPattern { regex: Regex::new(r"\A/=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=") },
        RegexPattern { regex: Regex::new(r"\A%=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=") },
        RegexPattern { regex: Regex::new(r"\A&=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::AmpersandEquals, "&=") },
        RegexPattern { regex: Regex::new(r"\A\|=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PipeEquals, "|=") },
        RegexPattern { regex: Regex::new(r"\A\^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CaretEquals, "^=") },
        RegexPattern { regex: Regex::new(r"\A@=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::AtEquals, "@=") },
        RegexPattern { regex: Regex::new(r"\A<").unwrap(), handler: less_handler },
        RegexPattern { regex: Regex::new(r"\A>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new(r"\A\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new(r"\A-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"\A\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new(r"\A/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new(r"\A%").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Percent, "%") },
        RegexPattern { regex: Regex::new(r"\A&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&") },
        RegexPattern { regex: Regex::new(r"\A\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|") },
        RegexPattern { regex: Regex::new(r"\A\^").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Caret, "^") },
        RegexPattern { regex: Regex::new(r"\A~").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~") },
        RegexPattern { regex: Regex::new(r"\A@").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::At, "@") },
        RegexPattern { regex: Regex::new(r"\A=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new(r"\A:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new(r"\A;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";") },
        RegexPattern { regex: Regex::new(r"\A,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new(r"\A\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new(r"\A[(\[{]").unwrap(), handler: open_bracket_handler },
        RegexPattern { regex: Regex::new(r"\A[)\]]").unwrap(), handler: close_bracket_handler },
        RegexPattern { regex: Regex::new(r"\A\}").unwrap(), handler: close_curly_handler },
    ];

    static ref TAG_NAME: Regex = Regex::new(r"\A[_\p{L}][-_:.\p{L}\p{N}]*").unwrap();
    static ref TAG_NUMBER: Regex = Regex::new(r"\A[0-9]+(?:\.[0-9]+)?").unwrap();

    /// Statement shapes that mark an element body line as code rather than text:
    /// assignments (plain, augmented, chained or unpacking) and bare calls.
    static ref CODE_LINE: Regex = Regex::new(
        r"\A(?:[_\p{L}][_\p{L}\p{N}]*(?:\.[_\p{L}][_\p{L}\p{N}]*|\[[^\]\n]*\])*\s*(?:\*\*|//|>>|<<|[-+*/%&|^@])?=(?:[^=]|\z)|[_\p{L}][_\p{L}\p{N}]*(?:\s*,\s*\*?[_\p{L}][_\p{L}\p{N}]*)+\s*=(?:[^=]|\z)|[_\p{L}][_\p{L}\p{N}.]*\(.*\)\z)"
    ).unwrap();
}

const COMPOUND_KEYWORDS: [&str; 15] = [
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally", "match", "case",
    "def", "class", "async", "view",
];

const SIMPLE_KEYWORDS: [&str; 12] = [
    "pass", "break", "continue", "return", "raise", "del", "global", "nonlocal", "assert",
    "import", "yield", "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Python,
    Tag,
    Content,
}

struct OpenElement {
    name: String,
    indent: usize,
}

struct Interpolation {
    resume: Mode,
    depth: usize,
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    position: Position,
    file: Rc<String>,
    mode: Mode,
    layout: bool,
    indent_stack: Vec<usize>,
    bracket_depth: usize,
    at_line_start: bool,
    line_indent: usize,
    line_has_tokens: bool,
    views: Vec<usize>,
    elements: Vec<OpenElement>,
    interpolations: Vec<Interpolation>,
    pending_tag: Option<String>,
    closing_tag: bool,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            tokens: vec![],
            source: source.replace("\r\n", "\n"),
            pos: 0,
            position: Position::new(1, 1),
            file: file_name,
            mode: Mode::Python,
            layout: true,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            line_indent: 0,
            line_has_tokens: false,
            views: vec![],
            elements: vec![],
            interpolations: vec![],
            pending_tag: None,
            closing_tag: false,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        self.position = self.position.advanced_by(&self.source[self.pos..end]);
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        if !token.kind.is_layout() {
            self.line_has_tokens = true;
        }
        self.tokens.push(token);
    }

    /// Pushes a token covering the next `len` bytes and moves past them.
    pub fn push_span(&mut self, kind: TokenKind, len: usize, literal: Option<Literal>) {
        let value = self.source[self.pos..self.pos + len].to_string();
        let start = self.position;
        self.advance_n(len);
        let token = MK_TOKEN!(kind, value, literal, Span::new(start, self.position));
        self.push(token);
    }

    pub fn push_fixed(&mut self, kind: TokenKind, text: &str) {
        self.push_span(kind, text.len(), None);
    }

    /// Pushes a zero-width layout token at the cursor.
    fn push_marker(&mut self, kind: TokenKind, value: &str) {
        let span = Span::new(self.position, self.position);
        self.push(MK_TOKEN!(kind, value.to_string(), span));
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn in_brackets(&self) -> bool {
        self.bracket_depth > 0 || !self.interpolations.is_empty() || self.mode == Mode::Tag
    }

    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|token| token.kind)
    }

    fn error(&self, error: ErrorImpl) -> Error {
        let value = self.at().map(String::from).unwrap_or_default();
        let end = self.position.advanced_by(&value);
        Error::new(error, MK_TOKEN!(TokenKind::Invalid, value, Span::new(self.position, end)))
    }

    fn run(mut self) -> Result<Vec<Token>, Error> {
        while !self.at_eof() {
            if self.layout && self.at_line_start {
                self.begin_line()?;
                continue;
            }

            match self.mode {
                Mode::Python => self.scan_python()?,
                Mode::Tag => self.scan_tag()?,
                Mode::Content => self.scan_content()?,
            }
        }

        self.finish();
        debug!(file = %self.file, tokens = self.tokens.len(), "tokenized source");
        Ok(combine_composite_tokens(self.tokens))
    }

    fn finish(&mut self) {
        if self.layout {
            if self.line_has_tokens {
                self.push_marker(TokenKind::Newline, "");
            }
            while self.indent_stack.len() > 1 {
                self.indent_stack.pop();
                self.push_marker(TokenKind::Dedent, "");
            }
        }
        self.push_marker(TokenKind::EOF, "EOF");
    }

    /// Measures indentation at the start of a logical line, skipping blank and
    /// comment-only lines, and emits INDENT/DEDENT tokens for real ones.
    fn begin_line(&mut self) -> Result<(), Error> {
        let mut indent = 0;
        let mut len = 0;
        for ch in self.remainder().chars() {
            match ch {
                ' ' => indent += 1,
                '\t' => indent += TAB_WIDTH - indent % TAB_WIDTH,
                '\x0c' => indent = 0,
                _ => break,
            }
            len += 1;
        }
        self.advance_n(len);

        match self.at() {
            None => return Ok(()),
            Some('\n') => {
                self.advance_n(1);
                return Ok(());
            }
            Some('#') => {
                let end = self.remainder().find('\n').map_or(self.remainder().len(), |i| i + 1);
                self.advance_n(end);
                return Ok(());
            }
            _ => {}
        }

        self.at_line_start = false;
        self.line_has_tokens = false;
        self.line_indent = indent;
        self.apply_indentation(indent)?;

        while self.views.last().map_or(false, |view| *view >= indent) {
            self.views.pop();
        }
        while self.elements.last().map_or(false, |element| element.indent > indent) {
            self.elements.pop();
        }

        self.mode = self.line_mode(indent);
        Ok(())
    }

    fn apply_indentation(&mut self, indent: usize) -> Result<(), Error> {
        let top = self.indent_stack.last().copied().unwrap_or(0);
        if indent > top {
            self.indent_stack.push(indent);
            self.push_marker(TokenKind::Indent, "");
        } else if indent < top {
            while self.indent_stack.last().map_or(false, |level| indent < *level) {
                self.indent_stack.pop();
                self.push_marker(TokenKind::Dedent, "");
            }
            if self.indent_stack.last().copied().unwrap_or(0) != indent {
                return Err(self.error(ErrorImpl::InconsistentIndentation));
            }
        }
        Ok(())
    }

    fn line_mode(&self, indent: usize) -> Mode {
        if self.views.is_empty() {
            return Mode::Python;
        }

        let rest = self.remainder();
        if looks_like_tag(rest) {
            return Mode::Tag;
        }

        let in_element_body = self
            .elements
            .last()
            .map_or(false, |element| indent > element.indent);
        if in_element_body {
            let line = rest.split('\n').next().unwrap_or_default();
            if !looks_like_code(line) {
                trace!(line, "treating element body line as text");
                return Mode::Content;
            }
        }

        Mode::Python
    }

    fn scan_python(&mut self) -> Result<(), Error> {
        let rest = self.remainder();
        for pattern in PATTERNS.iter() {
            if let Some(found) = pattern.regex.find(rest) {
                let matched = found.as_str().to_string();
                return (pattern.handler)(self, &matched);
            }
        }

        let token = self.at().map(String::from).unwrap_or_default();
        Err(self.error(ErrorImpl::UnrecognisedToken { token }))
    }

    fn scan_tag(&mut self) -> Result<(), Error> {
        let rest = self.remainder();
        let Some(ch) = rest.chars().next() else {
            return Ok(());
        };

        match ch {
            ' ' | '\t' | '\n' | '\r' | '\x0c' => self.advance_n(1),
            '<' if rest.starts_with("<!--") => match rest.find("-->") {
                Some(end) => {
                    self.advance_n(end + 3);
                    self.mode = Mode::Content;
                }
                None => return Err(self.error(ErrorImpl::UnterminatedComment)),
            },
            '<' if rest.starts_with("</") => {
                self.closing_tag = true;
                self.push_fixed(TokenKind::TagCloseStart, "</");
            }
            '<' => {
                self.closing_tag = false;
                self.push_fixed(TokenKind::TagOpen, "<");
            }
            '>' => {
                self.push_fixed(TokenKind::TagClose, ">");
                self.end_tag();
                self.mode = Mode::Content;
            }
            '/' if rest.starts_with("/>") => {
                self.push_fixed(TokenKind::TagSelfClose, "/>");
                self.pending_tag = None;
                self.mode = Mode::Content;
            }
            '=' => self.push_fixed(TokenKind::Assignment, "="),
            '"' | '\'' => string_handler(self, &ch.to_string())?,
            '{' => {
                self.push_fixed(TokenKind::HtmlInterpolationStart, "{");
                self.interpolations.push(Interpolation {
                    resume: Mode::Tag,
                    depth: self.bracket_depth,
                });
                self.mode = Mode::Python;
            }
            c if c.is_ascii_digit() => {
                let len = TAG_NUMBER.find(rest).map_or(1, |found| found.end());
                let matched = rest[..len].to_string();
                number_handler(self, &matched)?;
            }
            c if is_identifier_start(c) => {
                let len = TAG_NAME.find(rest).map_or(c.len_utf8(), |found| found.end());
                let text = rest[..len].to_string();
                let kind = match text.as_str() {
                    "True" => TokenKind::True,
                    "False" => TokenKind::False,
                    _ => TokenKind::Identifier,
                };
                if matches!(
                    self.last_kind(),
                    Some(TokenKind::TagOpen) | Some(TokenKind::TagCloseStart)
                ) {
                    self.pending_tag = Some(text);
                }
                self.push_span(kind, len, None);
            }
            other => {
                return Err(self.error(ErrorImpl::UnrecognisedToken {
                    token: other.to_string(),
                }))
            }
        }
        Ok(())
    }

    fn end_tag(&mut self) {
        let Some(name) = self.pending_tag.take() else {
            return;
        };

        if self.closing_tag {
            if let Some(index) = self.elements.iter().rposition(|element| element.name == name) {
                self.elements.truncate(index);
            }
        } else {
            self.elements.push(OpenElement {
                name,
                indent: self.line_indent,
            });
        }
    }

    fn scan_content(&mut self) -> Result<(), Error> {
        let rest = self.remainder();
        let mut end = rest.len();
        for (index, ch) in rest.char_indices() {
            let stops = match ch {
                '\n' | '{' => true,
                '<' => looks_like_tag(&rest[index..]),
                _ => false,
            };
            if stops {
                end = index;
                break;
            }
        }

        if end > 0 {
            let text = &rest[..end];
            let ends_line = matches!(rest[end..].chars().next(), None | Some('\n'));
            let kept = if ends_line { text.trim_end().len() } else { end };

            if text.trim().is_empty() {
                self.advance_n(end);
            } else {
                let literal = Literal::Str(text[..kept].to_string());
                self.push_span(TokenKind::HtmlText, kept, Some(literal));
                self.advance_n(end - kept);
            }
        }

        match self.at() {
            Some('{') => {
                self.push_fixed(TokenKind::HtmlInterpolationStart, "{");
                self.interpolations.push(Interpolation {
                    resume: Mode::Content,
                    depth: self.bracket_depth,
                });
                self.mode = Mode::Python;
            }
            Some('<') => self.mode = Mode::Tag,
            Some('\n') => newline_handler(self, "\n")?,
            _ => {}
        }
        Ok(())
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

/// True when the text starts with `<` followed by a tag name, `/` or `!`.
fn looks_like_tag(text: &str) -> bool {
    let mut chars = text.chars();
    if chars.next() != Some('<') {
        return false;
    }
    matches!(chars.next(), Some(c) if is_identifier_start(c) || c == '/' || c == '!')
}

/// Decides whether a line inside an element body is a statement or text.
fn looks_like_code(line: &str) -> bool {
    let line = line.trim_end();
    let word_len = line
        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
        .unwrap_or(line.len());
    let word = &line[..word_len];

    if COMPOUND_KEYWORDS.contains(&word) {
        return line.ends_with(':');
    }
    if SIMPLE_KEYWORDS.contains(&word) {
        return true;
    }
    if word == "from" {
        return line.contains(" import ");
    }

    CODE_LINE.is_match(line)
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.advance_n(matched.len());
    Ok(())
}

fn newline_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    let terminates = lexer.layout && !lexer.in_brackets();
    if terminates && lexer.line_has_tokens {
        lexer.push_fixed(TokenKind::Newline, "\n");
        lexer.line_has_tokens = false;
    } else {
        lexer.advance_n(1);
    }

    if terminates {
        lexer.at_line_start = true;
        lexer.mode = Mode::Python;
    }
    Ok(())
}

fn open_bracket_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let kind = match matched {
        "(" => TokenKind::OpenParen,
        "[" => TokenKind::OpenBracket,
        _ => TokenKind::OpenCurly,
    };
    lexer.bracket_depth += 1;
    lexer.push_span(kind, 1, None);
    Ok(())
}

fn close_bracket_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let kind = match matched {
        ")" => TokenKind::CloseParen,
        _ => TokenKind::CloseBracket,
    };
    lexer.bracket_depth = lexer.bracket_depth.saturating_sub(1);
    lexer.push_span(kind, 1, None);
    Ok(())
}

fn close_curly_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    let closes_interpolation = lexer
        .interpolations
        .last()
        .map_or(false, |interpolation| interpolation.depth == lexer.bracket_depth);

    if closes_interpolation {
        if let Some(interpolation) = lexer.interpolations.pop() {
            lexer.push_fixed(TokenKind::HtmlInterpolationEnd, "}");
            lexer.mode = interpolation.resume;
        }
    } else {
        lexer.bracket_depth = lexer.bracket_depth.saturating_sub(1);
        lexer.push_fixed(TokenKind::CloseCurly, "}");
    }
    Ok(())
}

/// `<` opens a tag only as the first thing after a `:` at the top level of a
/// view body; everywhere else it is the less-than operator.
fn less_handler(lexer: &mut Lexer, _matched: &str) -> Result<(), Error> {
    let opens_tag = !lexer.views.is_empty()
        && lexer.bracket_depth == 0
        && lexer.interpolations.is_empty()
        && lexer.last_kind() == Some(TokenKind::Colon)
        && looks_like_tag(lexer.remainder())
        && !lexer.remainder().starts_with("<!");

    if opens_tag {
        lexer.mode = Mode::Tag;
    } else {
        lexer.push_fixed(TokenKind::Less, "<");
    }
    Ok(())
}

fn string_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let quote_len = if matched.ends_with("\"\"\"") || matched.ends_with("'''") {
        3
    } else {
        1
    };
    let prefix = matched[..matched.len() - quote_len].to_ascii_lowercase();
    let quote = &matched[matched.len() - quote_len..];

    let body_start = lexer.pos + matched.len();
    let rest = &lexer.source[body_start..];
    let end = if prefix.contains('f') {
        find_fstring_end(rest, quote)
    } else {
        find_string_end(rest, quote)
    };
    let Some(body_len) = end else {
        return Err(lexer.error(ErrorImpl::UnterminatedString));
    };
    let body = lexer.source[body_start..body_start + body_len].to_string();
    let total = matched.len() + body_len + quote_len;

    let is_raw = prefix.contains('r');
    let (kind, literal) = if prefix.contains('f') {
        (TokenKind::FString, Literal::Str(body))
    } else {
        let text = if is_raw {
            body
        } else {
            decode_escapes(&body)
                .map_err(|sequence| lexer.error(ErrorImpl::InvalidEscape { sequence }))?
        };
        if prefix.contains('b') {
            (TokenKind::String, Literal::Bytes(text.into_bytes()))
        } else {
            (TokenKind::String, Literal::Str(text))
        }
    };

    lexer.push_span(kind, total, Some(literal));
    Ok(())
}

/// Byte offset of the closing quote, honouring backslash escapes.
fn find_string_end(body: &str, quote: &str) -> Option<usize> {
    let triple = quote.len() == 3;
    let mut chars = body.char_indices();
    while let Some((index, ch)) = chars.next() {
        if ch == '\\' {
            chars.next();
            continue;
        }
        if ch == '\n' && !triple {
            return None;
        }
        if body[index..].starts_with(quote) {
            return Some(index);
        }
    }
    None
}

/// An open `{...}` field while scanning an f-string body.
#[derive(Default)]
struct OpenField {
    brackets: usize,
    in_spec: bool,
}

/// Like `find_string_end`, but inside a `{...}` field a quote opens a nested
/// string, so `f"{d["k"]}"` ends at its last quote. Format specs and the
/// text outside fields are scanned as plain text.
fn find_fstring_end(body: &str, quote: &str) -> Option<usize> {
    let triple = quote.len() == 3;
    let mut fields: Vec<OpenField> = vec![];
    let mut index = 0;

    while let Some(ch) = body[index..].chars().next() {
        let rest = &body[index..];
        let in_code = fields.last().map_or(false, |field| !field.in_spec);

        if ch == '\\' {
            index += 1;
            if let Some(next) = body[index..].chars().next() {
                index += next.len_utf8();
            }
            continue;
        }
        if fields.is_empty() {
            if ch == '\n' && !triple {
                return None;
            }
            if rest.starts_with(quote) {
                return Some(index);
            }
            if rest.starts_with("{{") {
                index += 2;
                continue;
            }
        }

        if in_code && (ch == '\'' || ch == '"') {
            let nested = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
                &rest[..3]
            } else {
                &rest[..1]
            };
            let after = index + nested.len();
            let len = if has_fstring_prefix(&body[..index]) {
                find_fstring_end(&body[after..], nested)?
            } else {
                find_string_end(&body[after..], nested)?
            };
            index = after + len + nested.len();
            continue;
        }

        let mut opens_field = ch == '{';
        let mut closes_field = ch == '}';
        if let Some(field) = fields.last_mut().filter(|field| !field.in_spec) {
            opens_field = false;
            match ch {
                '{' | '(' | '[' => field.brackets += 1,
                ')' | ']' => field.brackets = field.brackets.saturating_sub(1),
                '}' if field.brackets > 0 => {
                    field.brackets -= 1;
                    closes_field = false;
                }
                ':' if field.brackets == 0 => field.in_spec = true,
                _ => {}
            }
        }
        if opens_field {
            fields.push(OpenField::default());
        } else if closes_field {
            fields.pop();
        }
        index += ch.len_utf8();
    }
    None
}

/// Whether the text before a nested quote ends in an f-string prefix.
fn has_fstring_prefix(before: &str) -> bool {
    let prefix: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    matches!(prefix.to_ascii_lowercase().as_str(), "f" | "rf" | "fr")
}

/// Decodes backslash escapes. On failure returns the offending sequence.
pub fn decode_escapes(body: &str) -> Result<String, String> {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let Some(next) = chars.next() else {
            result.push('\\');
            break;
        };

        match next {
            '\n' => {}
            '\\' => result.push('\\'),
            '\'' => result.push('\''),
            '"' => result.push('"'),
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'a' => result.push('\x07'),
            'b' => result.push('\x08'),
            'f' => result.push('\x0c'),
            'v' => result.push('\x0b'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut hex = String::new();
                for _ in 0..width {
                    match chars.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(*c);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let decoded = if hex.len() == width {
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(c) => result.push(c),
                    None => return Err(format!("\\{}{}", next, hex)),
                }
            }
            '0'..='7' => {
                let mut octal = next.to_string();
                while octal.len() < 3 {
                    match chars.peek() {
                        Some(c) if ('0'..='7').contains(c) => {
                            octal.push(*c);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&octal, 8).ok().and_then(char::from_u32) {
                    Some(c) => result.push(c),
                    None => return Err(format!("\\{}", octal)),
                }
            }
            other => {
                result.push('\\');
                result.push(other);
            }
        }
    }

    Ok(result)
}

fn number_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let cleaned = matched.replace('_', "").to_ascii_lowercase();

    let literal = if let Some(hex) = cleaned.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok().map(Literal::Int)
    } else if let Some(octal) = cleaned.strip_prefix("0o") {
        u64::from_str_radix(octal, 8).ok().map(Literal::Int)
    } else if let Some(binary) = cleaned.strip_prefix("0b") {
        u64::from_str_radix(binary, 2).ok().map(Literal::Int)
    } else if let Some(imaginary) = cleaned.strip_suffix('j') {
        imaginary.parse::<f64>().ok().map(Literal::Imaginary)
    } else if cleaned.contains('.') || cleaned.contains('e') {
        cleaned.parse::<f64>().ok().map(Literal::Float)
    } else {
        cleaned.parse::<u64>().ok().map(Literal::Int)
    };

    match literal {
        Some(literal) => {
            lexer.push_span(TokenKind::Number, matched.len(), Some(literal));
            Ok(())
        }
        None => Err(lexer.error(ErrorImpl::NumberParseError {
            token: matched.to_string(),
        })),
    }
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    if kind == TokenKind::View && lexer.bracket_depth == 0 && lexer.interpolations.is_empty() {
        lexer.views.push(lexer.line_indent);
    }

    lexer.push_span(kind, matched.len(), None);
    Ok(())
}

/// Folds `is not` and `not in` into single operator tokens.
fn combine_composite_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut combined = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let composite = match (token.kind, iter.peek().map(|next| next.kind)) {
            (TokenKind::Is, Some(TokenKind::Not)) => Some((TokenKind::IsNot, "is not")),
            (TokenKind::Not, Some(TokenKind::In)) => Some((TokenKind::NotIn, "not in")),
            _ => None,
        };

        match (composite, composite.and_then(|_| iter.next())) {
            (Some((kind, value)), Some(next)) => {
                let span = token.span.to(next.span);
                combined.push(MK_TOKEN!(kind, value.to_string(), span));
            }
            _ => combined.push(token),
        }
    }

    combined
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    Lexer::new(source, file).run()
}

/// Tokenizes an embedded expression (an interpolation or f-string field).
///
/// The text is lexed as if it were inside brackets: no NEWLINE, INDENT or
/// DEDENT tokens are produced, and positions start at `origin`.
pub fn tokenize_expression(
    source: &str,
    file: Option<String>,
    origin: Position,
) -> Result<Vec<Token>, Error> {
    let mut lexer = Lexer::new(source.to_string(), file);
    lexer.position = origin;
    lexer.layout = false;
    lexer.at_line_start = false;
    lexer.run()
}
