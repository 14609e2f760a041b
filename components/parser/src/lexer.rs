//! JavaScript Lexer - tokenizes source code into tokens
//!
//! The lexer keeps one token of lookahead together with its span and
//! whether a line terminator preceded it. Plugins can claim characters
//! before the built-in rules run by supplying [`TokenRule`]s.

use crate::error::syntax_error;
use core_types::{JsError, SourcePosition, Span};

/// JavaScript keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// let keyword
    Let,
    /// const keyword
    Const,
    /// var keyword
    Var,
    /// function keyword
    Function,
    /// return keyword
    Return,
    /// if keyword
    If,
    /// else keyword
    Else,
    /// while keyword
    While,
    /// for keyword
    For,
    /// break keyword
    Break,
    /// continue keyword
    Continue,
    /// class keyword
    Class,
    /// extends keyword
    Extends,
    /// new keyword
    New,
    /// this keyword
    This,
    /// super keyword
    Super,
    /// async keyword
    Async,
    /// await keyword
    Await,
    /// true keyword
    True,
    /// false keyword
    False,
    /// null keyword
    Null,
    /// typeof keyword
    Typeof,
    /// void keyword
    Void,
    /// instanceof keyword
    Instanceof,
    /// in keyword
    In,
    /// try keyword
    Try,
    /// catch keyword
    Catch,
    /// finally keyword
    Finally,
    /// throw keyword
    Throw,
    /// yield keyword
    Yield,
    /// import keyword
    Import,
    /// export keyword
    Export,
    /// default keyword
    Default,
    /// delete keyword
    Delete,
    /// with keyword
    With,
    /// switch keyword
    Switch,
    /// case keyword
    Case,
    /// do keyword
    Do,
    /// debugger keyword
    Debugger,
    /// static keyword
    Static,
}

impl Keyword {
    /// Map a word to its keyword, if it is one
    pub fn from_word(word: &str) -> Option<Keyword> {
        let keyword = match word {
            "let" => Keyword::Let,
            "const" => Keyword::Const,
            "var" => Keyword::Var,
            "function" => Keyword::Function,
            "return" => Keyword::Return,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "for" => Keyword::For,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "class" => Keyword::Class,
            "extends" => Keyword::Extends,
            "new" => Keyword::New,
            "this" => Keyword::This,
            "super" => Keyword::Super,
            "async" => Keyword::Async,
            "await" => Keyword::Await,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "typeof" => Keyword::Typeof,
            "void" => Keyword::Void,
            "instanceof" => Keyword::Instanceof,
            "in" => Keyword::In,
            "try" => Keyword::Try,
            "catch" => Keyword::Catch,
            "finally" => Keyword::Finally,
            "throw" => Keyword::Throw,
            "yield" => Keyword::Yield,
            "import" => Keyword::Import,
            "export" => Keyword::Export,
            "default" => Keyword::Default,
            "delete" => Keyword::Delete,
            "with" => Keyword::With,
            "switch" => Keyword::Switch,
            "case" => Keyword::Case,
            "do" => Keyword::Do,
            "debugger" => Keyword::Debugger,
            "static" => Keyword::Static,
            _ => return None,
        };
        Some(keyword)
    }

    /// Source spelling of the keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Let => "let",
            Keyword::Const => "const",
            Keyword::Var => "var",
            Keyword::Function => "function",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::Class => "class",
            Keyword::Extends => "extends",
            Keyword::New => "new",
            Keyword::This => "this",
            Keyword::Super => "super",
            Keyword::Async => "async",
            Keyword::Await => "await",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::Typeof => "typeof",
            Keyword::Void => "void",
            Keyword::Instanceof => "instanceof",
            Keyword::In => "in",
            Keyword::Try => "try",
            Keyword::Catch => "catch",
            Keyword::Finally => "finally",
            Keyword::Throw => "throw",
            Keyword::Yield => "yield",
            Keyword::Import => "import",
            Keyword::Export => "export",
            Keyword::Default => "default",
            Keyword::Delete => "delete",
            Keyword::With => "with",
            Keyword::Switch => "switch",
            Keyword::Case => "case",
            Keyword::Do => "do",
            Keyword::Debugger => "debugger",
            Keyword::Static => "static",
        }
    }

    /// Keywords that are ordinary identifiers outside specific contexts
    pub fn is_contextual(&self) -> bool {
        matches!(
            self,
            Keyword::Let | Keyword::Async | Keyword::Await | Keyword::Yield | Keyword::Static
        )
    }
}

/// JavaScript punctuators (operators and delimiters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
    /// Opening brace
    LBrace,
    /// Closing brace
    RBrace,
    /// Opening bracket
    LBracket,
    /// Closing bracket
    RBracket,
    /// Semicolon
    Semicolon,
    /// Comma
    Comma,
    /// Dot
    Dot,
    /// Spread operator
    Spread,
    /// Optional chaining
    OptionalChain,
    /// Colon
    Colon,
    /// Question mark
    Question,
    /// Assignment
    Assign,
    /// Arrow function
    Arrow,
    /// Plus
    Plus,
    /// Minus
    Minus,
    /// Multiply
    Star,
    /// Divide
    Slash,
    /// Modulo
    Percent,
    /// Exponentiation
    StarStar,
    /// Equality
    EqEq,
    /// Strict equality
    EqEqEq,
    /// Inequality
    NotEq,
    /// Strict inequality
    NotEqEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Logical AND
    AndAnd,
    /// Logical OR
    OrOr,
    /// Nullish coalescing
    NullishCoalesce,
    /// Logical NOT
    Not,
    /// Bitwise AND
    And,
    /// Bitwise OR
    Or,
    /// Bitwise XOR
    Xor,
    /// Bitwise NOT
    Tilde,
    /// Left shift
    LtLt,
    /// Right shift
    GtGt,
    /// Unsigned right shift
    GtGtGt,
    /// Plus equals
    PlusEq,
    /// Minus equals
    MinusEq,
    /// Multiply equals
    StarEq,
    /// Divide equals
    SlashEq,
    /// Modulo equals
    PercentEq,
    /// Exponentiation equals
    StarStarEq,
    /// Bitwise AND equals
    AndEq,
    /// Bitwise OR equals
    OrEq,
    /// Bitwise XOR equals
    XorEq,
    /// Left shift equals
    LtLtEq,
    /// Right shift equals
    GtGtEq,
    /// Unsigned right shift equals
    GtGtGtEq,
    /// Logical AND equals
    AndAndEq,
    /// Logical OR equals
    OrOrEq,
    /// Nullish coalescing equals
    NullishCoalesceEq,
    /// Increment
    PlusPlus,
    /// Decrement
    MinusMinus,
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (variable name, etc.). Second field is true if the identifier
    /// contained Unicode escape sequences (escaped keywords stay identifiers)
    Identifier(String, bool),
    /// Private name (`#name`), carrying the bare name. Only produced when a
    /// plugin installs a rule for `#`; the name may be empty.
    PrivateName(String),
    /// Number literal
    Number(f64),
    /// BigInt literal (integer with 'n' suffix)
    BigIntLiteral(String),
    /// String literal, decoded. Lone surrogate escapes (`"\uD800"`) are
    /// stored as U+FFFD since a Rust `String` cannot hold them.
    String(String),
    /// Template literal with no substitutions (no `${}`)
    TemplateLiteral(String),
    /// Template head: from ` to first ${
    TemplateHead(String),
    /// Template middle: from } to next ${
    TemplateMiddle(String),
    /// Template tail: from } to closing `
    TemplateTail(String),
    /// Regular expression literal (pattern, flags)
    RegExp(String, String),
    /// Keyword
    Keyword(Keyword),
    /// Punctuator/operator
    Punctuator(Punctuator),
    /// End of file
    EOF,
}

/// A plugin-supplied scanning rule.
///
/// Called with the next significant character before the built-in rules.
/// Returning `None` leaves the lexer untouched and lets the next rule run.
pub type TokenRule = fn(char, &mut Lexer) -> Option<Result<Token, JsError>>;

#[derive(Debug, Clone)]
struct Lookahead {
    token: Token,
    span: Span,
    newline_before: bool,
}

/// Saved lexer position, used for bounded backtracking
#[derive(Debug, Clone)]
pub struct LexerState {
    position: usize,
    line: u32,
    column: u32,
    lookahead: Option<Lookahead>,
    last_token_span: Span,
}

/// Lexer for JavaScript source code
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    lookahead: Option<Lookahead>,
    last_token_span: Span,
    rules: Vec<TokenRule>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self::with_rules(source, Vec::new())
    }

    /// Create a lexer that consults `rules` before its own scanning rules
    pub fn with_rules(source: &str, rules: Vec<TokenRule>) -> Self {
        let mut lexer = Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            lookahead: None,
            last_token_span: Span::default(),
            rules,
        };
        lexer.last_token_span = Span::new(lexer.current_position(), lexer.current_position());

        lexer.skip_hashbang();
        lexer
    }

    /// Skip hashbang comment (#!) at the beginning of the source
    fn skip_hashbang(&mut self) {
        if self.peek() == '#' && self.peek_next() == Some('!') {
            while !self.is_at_end() && !is_line_terminator(self.peek()) {
                self.advance();
            }
        }
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Result<Token, JsError> {
        let lookahead = match self.lookahead.take() {
            Some(lookahead) => lookahead,
            None => self.scan_token()?,
        };
        self.last_token_span = lookahead.span;
        Ok(lookahead.token)
    }

    /// Peek at the next token without consuming it
    pub fn peek_token(&mut self) -> Result<&Token, JsError> {
        Ok(&self.fill_lookahead()?.token)
    }

    /// Span of the next token
    pub fn peek_span(&mut self) -> Result<&Span, JsError> {
        Ok(&self.fill_lookahead()?.span)
    }

    /// Start position of the next token
    pub fn peek_start(&mut self) -> Result<SourcePosition, JsError> {
        Ok(self.fill_lookahead()?.span.start.clone())
    }

    /// Whether a line terminator separates the next token from the previous one
    pub fn has_newline_before(&mut self) -> Result<bool, JsError> {
        Ok(self.fill_lookahead()?.newline_before)
    }

    /// Span of the most recently consumed token
    pub fn last_token_span(&self) -> &Span {
        &self.last_token_span
    }

    /// End position of the most recently consumed token
    pub fn last_token_end(&self) -> SourcePosition {
        self.last_token_span.end.clone()
    }

    /// Capture the current state so it can be restored
    pub fn snapshot(&self) -> LexerState {
        LexerState {
            position: self.position,
            line: self.line,
            column: self.column,
            lookahead: self.lookahead.clone(),
            last_token_span: self.last_token_span.clone(),
        }
    }

    /// Return to a previously captured state
    pub fn restore(&mut self, state: LexerState) {
        self.position = state.position;
        self.line = state.line;
        self.column = state.column;
        self.lookahead = state.lookahead;
        self.last_token_span = state.last_token_span;
    }

    fn fill_lookahead(&mut self) -> Result<&Lookahead, JsError> {
        let lookahead = match self.lookahead.take() {
            Some(lookahead) => lookahead,
            None => self.scan_token()?,
        };
        Ok(self.lookahead.insert(lookahead))
    }

    // Primitives exposed to token rules

    /// The character at the scan position, if any
    pub fn peek_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Consume one character
    pub fn bump(&mut self) -> Option<char> {
        if self.is_at_end() {
            None
        } else {
            Some(self.advance())
        }
    }

    /// Position of the scan cursor
    pub fn current_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    /// Read an identifier word at the scan position, decoding `\u` escapes.
    ///
    /// Returns an empty string when no identifier character follows.
    pub fn read_word(&mut self) -> Result<String, JsError> {
        let mut word = String::new();
        loop {
            if self.peek() == '\\' && self.peek_next() == Some('u') {
                let start = self.current_position();
                self.advance();
                let ch = self.parse_unicode_escape()?;
                let valid = if word.is_empty() {
                    is_id_start(ch)
                } else {
                    is_id_continue(ch)
                };
                if !valid {
                    return Err(syntax_error(
                        "Invalid Unicode escape sequence in identifier",
                        Some(start),
                    ));
                }
                word.push(ch);
            } else if !self.is_at_end()
                && (if word.is_empty() {
                    is_id_start(self.peek())
                } else {
                    is_id_continue(self.peek())
                })
            {
                word.push(self.advance());
            } else {
                break;
            }
        }
        Ok(word)
    }

    // Re-scanning on demand by the grammar

    /// Re-scan the `/` or `/=` token just consumed as a regular expression.
    pub fn rescan_regexp(&mut self) -> Result<Token, JsError> {
        let start = self.last_token_span.start.clone();
        self.lookahead = None;
        self.position = start.offset + 1;
        self.line = start.line;
        self.column = start.column + 1;

        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            if self.is_at_end() || is_line_terminator(self.peek()) {
                return Err(syntax_error(
                    "Unterminated regular expression",
                    Some(start),
                ));
            }
            let ch = self.advance();
            match ch {
                '\\' => {
                    pattern.push(ch);
                    if !self.is_at_end() && !is_line_terminator(self.peek()) {
                        pattern.push(self.advance());
                    }
                }
                '[' => {
                    in_class = true;
                    pattern.push(ch);
                }
                ']' if in_class => {
                    in_class = false;
                    pattern.push(ch);
                }
                '/' if !in_class => break,
                _ => pattern.push(ch),
            }
        }

        let mut flags = String::new();
        while !self.is_at_end() && is_id_continue(self.peek()) {
            flags.push(self.advance());
        }

        self.last_token_span = Span::new(start, self.current_position());
        Ok(Token::RegExp(pattern, flags))
    }

    /// Scan the continuation of a template literal after the `}` closing a
    /// substitution was consumed.
    pub fn read_template_continuation(&mut self) -> Result<Token, JsError> {
        let start = self.last_token_span.start.clone();
        self.lookahead = None;
        let token = self.scan_template_chars(&start, true)?;
        self.last_token_span = Span::new(start, self.current_position());
        Ok(token)
    }

    fn scan_token(&mut self) -> Result<Lookahead, JsError> {
        let line_before = self.line;
        self.skip_whitespace_and_comments()?;
        let newline_before = self.line > line_before;

        let start = self.current_position();
        let token = self.scan_token_at(&start)?;
        Ok(Lookahead {
            token,
            span: Span::new(start, self.current_position()),
            newline_before,
        })
    }

    fn scan_token_at(&mut self, start_pos: &SourcePosition) -> Result<Token, JsError> {
        let Some(first) = self.peek_char() else {
            return Ok(Token::EOF);
        };

        for index in 0..self.rules.len() {
            let rule = self.rules[index];
            if let Some(result) = rule(first, self) {
                return result;
            }
        }

        let ch = self.advance();
        let punctuator = match ch {
            '(' => Punctuator::LParen,
            ')' => Punctuator::RParen,
            '{' => Punctuator::LBrace,
            '}' => Punctuator::RBrace,
            '[' => Punctuator::LBracket,
            ']' => Punctuator::RBracket,
            ';' => Punctuator::Semicolon,
            ',' => Punctuator::Comma,
            ':' => Punctuator::Colon,
            '~' => Punctuator::Tilde,

            '.' => {
                if self.peek() == '.' && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    Punctuator::Spread
                } else if self.peek().is_ascii_digit() {
                    return self.scan_number('.', start_pos);
                } else {
                    Punctuator::Dot
                }
            }

            '?' => {
                if self.match_char('?') {
                    if self.match_char('=') {
                        Punctuator::NullishCoalesceEq
                    } else {
                        Punctuator::NullishCoalesce
                    }
                } else if self.peek() == '.'
                    && !self.peek_next().is_some_and(|c| c.is_ascii_digit())
                {
                    self.advance();
                    Punctuator::OptionalChain
                } else {
                    Punctuator::Question
                }
            }

            '=' => {
                if self.match_char('>') {
                    Punctuator::Arrow
                } else if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::EqEqEq
                    } else {
                        Punctuator::EqEq
                    }
                } else {
                    Punctuator::Assign
                }
            }

            '+' => {
                if self.match_char('+') {
                    Punctuator::PlusPlus
                } else if self.match_char('=') {
                    Punctuator::PlusEq
                } else {
                    Punctuator::Plus
                }
            }

            '-' => {
                if self.match_char('-') {
                    Punctuator::MinusMinus
                } else if self.match_char('=') {
                    Punctuator::MinusEq
                } else {
                    Punctuator::Minus
                }
            }

            '*' => {
                if self.match_char('*') {
                    if self.match_char('=') {
                        Punctuator::StarStarEq
                    } else {
                        Punctuator::StarStar
                    }
                } else if self.match_char('=') {
                    Punctuator::StarEq
                } else {
                    Punctuator::Star
                }
            }

            '/' => {
                if self.match_char('=') {
                    Punctuator::SlashEq
                } else {
                    Punctuator::Slash
                }
            }

            '%' => {
                if self.match_char('=') {
                    Punctuator::PercentEq
                } else {
                    Punctuator::Percent
                }
            }

            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::NotEqEq
                    } else {
                        Punctuator::NotEq
                    }
                } else {
                    Punctuator::Not
                }
            }

            '<' => {
                if self.match_char('<') {
                    if self.match_char('=') {
                        Punctuator::LtLtEq
                    } else {
                        Punctuator::LtLt
                    }
                } else if self.match_char('=') {
                    Punctuator::LtEq
                } else {
                    Punctuator::Lt
                }
            }

            '>' => {
                if self.match_char('>') {
                    if self.match_char('>') {
                        if self.match_char('=') {
                            Punctuator::GtGtGtEq
                        } else {
                            Punctuator::GtGtGt
                        }
                    } else if self.match_char('=') {
                        Punctuator::GtGtEq
                    } else {
                        Punctuator::GtGt
                    }
                } else if self.match_char('=') {
                    Punctuator::GtEq
                } else {
                    Punctuator::Gt
                }
            }

            '&' => {
                if self.match_char('&') {
                    if self.match_char('=') {
                        Punctuator::AndAndEq
                    } else {
                        Punctuator::AndAnd
                    }
                } else if self.match_char('=') {
                    Punctuator::AndEq
                } else {
                    Punctuator::And
                }
            }

            '|' => {
                if self.match_char('|') {
                    if self.match_char('=') {
                        Punctuator::OrOrEq
                    } else {
                        Punctuator::OrOr
                    }
                } else if self.match_char('=') {
                    Punctuator::OrEq
                } else {
                    Punctuator::Or
                }
            }

            '^' => {
                if self.match_char('=') {
                    Punctuator::XorEq
                } else {
                    Punctuator::Xor
                }
            }

            '`' => return self.scan_template_chars(start_pos, false),

            '"' | '\'' => return self.scan_string(ch, start_pos),

            _ if ch.is_ascii_digit() => return self.scan_number(ch, start_pos),

            _ if is_id_start(ch) || ch == '\\' => {
                return self.scan_identifier(ch, start_pos);
            }

            _ => {
                return Err(syntax_error(
                    format!("Unexpected character '{}'", ch),
                    Some(start_pos.clone()),
                ))
            }
        };
        Ok(Token::Punctuator(punctuator))
    }

    fn scan_string(&mut self, quote: char, start_pos: &SourcePosition) -> Result<Token, JsError> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != quote {
            match self.peek() {
                '\\' => {
                    self.advance();
                    if self.is_at_end() {
                        break;
                    }
                    let escaped = self.advance();
                    self.scan_escape(escaped, &mut value, start_pos, false)?;
                }
                '\n' | '\r' => {
                    return Err(syntax_error(
                        "Unterminated string constant",
                        Some(start_pos.clone()),
                    ));
                }
                _ => value.push(self.advance()),
            }
        }

        if self.is_at_end() {
            return Err(syntax_error(
                "Unterminated string constant",
                Some(start_pos.clone()),
            ));
        }

        self.advance(); // Closing quote
        Ok(Token::String(value))
    }

    /// Scan template characters up to `${` or the closing backtick.
    fn scan_template_chars(
        &mut self,
        start_pos: &SourcePosition,
        continuation: bool,
    ) -> Result<Token, JsError> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '`' {
            if self.peek() == '$' && self.peek_next() == Some('{') {
                self.advance(); // $
                self.advance(); // {
                return Ok(if continuation {
                    Token::TemplateMiddle(value)
                } else {
                    Token::TemplateHead(value)
                });
            } else if self.peek() == '\\' {
                self.advance();
                if !self.is_at_end() {
                    let escaped = self.advance();
                    self.scan_escape(escaped, &mut value, start_pos, true)?;
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(syntax_error(
                "Unterminated template",
                Some(start_pos.clone()),
            ));
        }

        self.advance(); // Closing backtick
        Ok(if continuation {
            Token::TemplateTail(value)
        } else {
            Token::TemplateLiteral(value)
        })
    }

    /// Decode the escape sequence whose introducing backslash was consumed
    fn scan_escape(
        &mut self,
        escaped: char,
        value: &mut String,
        start_pos: &SourcePosition,
        in_template: bool,
    ) -> Result<(), JsError> {
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{0008}'),
            'f' => value.push('\u{000C}'),
            'v' => value.push('\u{000B}'),
            '0' if !self.peek().is_ascii_digit() => value.push('\0'),
            '0'..='9' if in_template => {
                return Err(syntax_error(
                    "Octal literal in template string",
                    Some(start_pos.clone()),
                ));
            }
            'x' => {
                let mut hex = String::new();
                for _ in 0..2 {
                    if !self.peek().is_ascii_hexdigit() {
                        return Err(syntax_error(
                            "Bad character escape sequence",
                            Some(self.current_position()),
                        ));
                    }
                    hex.push(self.advance());
                }
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| syntax_error("Bad character escape sequence", Some(start_pos.clone())))?;
                if let Some(ch) = char::from_u32(code) {
                    value.push(ch);
                }
            }
            'u' => {
                self.position -= 1;
                self.column -= 1;
                value.push(self.parse_string_unicode_escape()?);
            }
            // Line continuation
            '\r' => {
                self.match_char('\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            _ => value.push(escaped),
        }
        Ok(())
    }

    fn scan_number(&mut self, first: char, start_pos: &SourcePosition) -> Result<Token, JsError> {
        let mut digits = String::new();
        let mut radix = 10;
        let mut is_float = false;

        if first == '0' && matches!(self.peek(), 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
            radix = match self.advance() {
                'x' | 'X' => 16,
                'o' | 'O' => 8,
                _ => 2,
            };
            while !self.is_at_end() && (self.peek().is_digit(radix) || self.peek() == '_') {
                let ch = self.advance();
                if ch != '_' {
                    digits.push(ch);
                }
            }
            if digits.is_empty() {
                return Err(syntax_error(
                    format!("Expected number in radix {}", radix),
                    Some(start_pos.clone()),
                ));
            }
        } else {
            if first == '.' {
                digits.push_str("0.");
                is_float = true;
            } else {
                digits.push(first);
            }
            self.scan_decimal_digits(&mut digits);
            if !is_float && self.peek() == '.' {
                is_float = true;
                digits.push(self.advance());
                self.scan_decimal_digits(&mut digits);
            }
            if matches!(self.peek(), 'e' | 'E') {
                is_float = true;
                digits.push(self.advance());
                if matches!(self.peek(), '+' | '-') {
                    digits.push(self.advance());
                }
                if !self.peek().is_ascii_digit() {
                    return Err(syntax_error("Invalid number", Some(start_pos.clone())));
                }
                self.scan_decimal_digits(&mut digits);
            }
        }

        let token = if self.peek() == 'n' {
            if is_float {
                return Err(syntax_error(
                    "Invalid BigInt literal",
                    Some(start_pos.clone()),
                ));
            }
            self.advance();
            let literal = match radix {
                16 => format!("0x{}", digits),
                8 => format!("0o{}", digits),
                2 => format!("0b{}", digits),
                _ => digits,
            };
            Token::BigIntLiteral(literal)
        } else if radix != 10 {
            let value = u64::from_str_radix(&digits, radix)
                .map(|n| n as f64)
                .map_err(|_| syntax_error("Invalid number", Some(start_pos.clone())))?;
            Token::Number(value)
        } else {
            let value = digits
                .parse::<f64>()
                .map_err(|_| syntax_error("Invalid number", Some(start_pos.clone())))?;
            Token::Number(value)
        };

        if !self.is_at_end() && is_id_start(self.peek()) {
            return Err(syntax_error(
                "Identifier directly after number",
                Some(self.current_position()),
            ));
        }
        Ok(token)
    }

    fn scan_decimal_digits(&mut self, digits: &mut String) {
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_ascii_digit() {
                digits.push(self.advance());
            } else if ch == '_' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_identifier(&mut self, first: char, start_pos: &SourcePosition) -> Result<Token, JsError> {
        // Re-read from the first character so escapes are handled in one place
        self.position = start_pos.offset;
        self.column = start_pos.column;
        let has_escape = first == '\\' || self.word_has_escape();
        let word = self.read_word()?;
        if word.is_empty() {
            return Err(syntax_error(
                format!("Unexpected character '{}'", first),
                Some(start_pos.clone()),
            ));
        }

        if has_escape {
            return Ok(Token::Identifier(word, true));
        }
        Ok(match Keyword::from_word(&word) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(word, false),
        })
    }

    /// Whether the identifier word at the cursor contains a `\` escape
    fn word_has_escape(&self) -> bool {
        self.chars[self.position..]
            .iter()
            .take_while(|&&c| c == '\\' || is_id_continue(c))
            .any(|&c| c == '\\')
    }

    /// Parse a Unicode escape sequence: \uXXXX or \u{XXXX}; the cursor is on the `\`
    fn parse_unicode_escape(&mut self) -> Result<char, JsError> {
        let start_pos = self.current_position();
        let code = self.read_unicode_escape()?;
        char::from_u32(code)
            .ok_or_else(|| syntax_error("Bad character escape sequence", Some(start_pos)))
    }

    /// Unicode escape inside a string or template. Surrogate pairs written as
    /// two escapes are joined; a lone surrogate becomes U+FFFD.
    fn parse_string_unicode_escape(&mut self) -> Result<char, JsError> {
        let code = self.read_unicode_escape()?;
        if let Some(ch) = char::from_u32(code) {
            return Ok(ch);
        }
        if (0xD800..=0xDBFF).contains(&code)
            && self.peek() == '\\'
            && self.peek_next() == Some('u')
        {
            let (position, column) = (self.position, self.column);
            let low = self.read_unicode_escape()?;
            if (0xDC00..=0xDFFF).contains(&low) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                if let Some(ch) = char::from_u32(combined) {
                    return Ok(ch);
                }
            }
            self.position = position;
            self.column = column;
        }
        Ok(char::REPLACEMENT_CHARACTER)
    }

    /// Code unit or code point of a `\u` escape, not yet validated as a char
    fn read_unicode_escape(&mut self) -> Result<u32, JsError> {
        let start_pos = self.current_position();
        let bad_escape = || syntax_error("Bad character escape sequence", Some(start_pos.clone()));

        self.match_char('\\');
        if !self.match_char('u') {
            return Err(bad_escape());
        }

        let mut hex = String::new();
        if self.match_char('{') {
            while !self.is_at_end() && self.peek().is_ascii_hexdigit() {
                hex.push(self.advance());
            }
            if hex.is_empty() || !self.match_char('}') {
                return Err(bad_escape());
            }
        } else {
            for _ in 0..4 {
                if !self.peek().is_ascii_hexdigit() {
                    return Err(bad_escape());
                }
                hex.push(self.advance());
            }
        }

        match u32::from_str_radix(&hex, 16) {
            Ok(code) if code <= 0x10FFFF => Ok(code),
            _ => Err(syntax_error("Code point out of bounds", Some(start_pos.clone()))),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), JsError> {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}' | '\u{1680}'
                | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                    self.advance();
                }
                c if is_line_terminator(c) => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    while !self.is_at_end() && !is_line_terminator(self.peek()) {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    let comment_start = self.current_position();
                    self.advance(); // /
                    self.advance(); // *
                    loop {
                        if self.is_at_end() {
                            return Err(syntax_error(
                                "Unterminated comment",
                                Some(comment_start),
                            ));
                        }
                        if self.peek() == '*' && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.peek_char().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    /// Consume one character, keeping line and column current.
    /// A CRLF pair counts as a single line break.
    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        if ch == '\r' && self.peek_char() == Some('\n') {
            self.column += 1;
        } else if is_line_terminator(ch) {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Check if a character can start an identifier
pub fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

/// Check if a character can continue an identifier
pub fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric() || ch == '\u{200C}' || ch == '\u{200D}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::EOF {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_lexer_empty_source() {
        let mut lexer = Lexer::new("");
        assert!(matches!(lexer.next_token().unwrap(), Token::EOF));
    }

    #[test]
    fn test_lexer_identifier() {
        let mut lexer = Lexer::new("foo");
        let token = lexer.next_token().unwrap();
        assert!(matches!(token, Token::Identifier(s, false) if s == "foo"));
    }

    #[test]
    fn test_lexer_escaped_keyword_stays_identifier() {
        let mut lexer = Lexer::new(r"\u0061sync");
        let token = lexer.next_token().unwrap();
        assert_eq!(token, Token::Identifier("async".to_string(), true));
    }

    #[test]
    fn test_lexer_number() {
        assert_eq!(tokens("123.45"), vec![Token::Number(123.45)]);
        assert_eq!(tokens(".5"), vec![Token::Number(0.5)]);
        assert_eq!(tokens("0x1F"), vec![Token::Number(31.0)]);
        assert_eq!(tokens("1e3"), vec![Token::Number(1000.0)]);
        assert_eq!(tokens("1_000"), vec![Token::Number(1000.0)]);
    }

    #[test]
    fn test_lexer_bigint() {
        assert_eq!(
            tokens("10n 0xFFn"),
            vec![
                Token::BigIntLiteral("10".to_string()),
                Token::BigIntLiteral("0xFF".to_string())
            ]
        );
    }

    #[test]
    fn test_lexer_string() {
        assert_eq!(
            tokens(r#""hello" 'a\nb'"#),
            vec![
                Token::String("hello".to_string()),
                Token::String("a\nb".to_string())
            ]
        );
    }

    #[test]
    fn test_lexer_string_surrogate_escapes() {
        assert_eq!(
            tokens(r#""\uD83D\uDE00" "\uD800" "\u{D800}x" "\uDC00\u0041""#),
            vec![
                Token::String("\u{1F600}".to_string()),
                Token::String("\u{FFFD}".to_string()),
                Token::String("\u{FFFD}x".to_string()),
                Token::String("\u{FFFD}A".to_string()),
            ]
        );
        let err = Lexer::new(r#""\u{110000}""#).next_token().unwrap_err();
        assert_eq!(err.message, "Code point out of bounds");
    }

    #[test]
    fn test_lexer_unterminated_string() {
        let mut lexer = Lexer::new("'abc");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.message, "Unterminated string constant");
    }

    #[test]
    fn test_lexer_keywords() {
        assert_eq!(
            tokens("let const var"),
            vec![
                Token::Keyword(Keyword::Let),
                Token::Keyword(Keyword::Const),
                Token::Keyword(Keyword::Var)
            ]
        );
    }

    #[test]
    fn test_lexer_punctuators() {
        assert_eq!(
            tokens("= === == => ... ?. ?? **="),
            vec![
                Token::Punctuator(Punctuator::Assign),
                Token::Punctuator(Punctuator::EqEqEq),
                Token::Punctuator(Punctuator::EqEq),
                Token::Punctuator(Punctuator::Arrow),
                Token::Punctuator(Punctuator::Spread),
                Token::Punctuator(Punctuator::OptionalChain),
                Token::Punctuator(Punctuator::NullishCoalesce),
                Token::Punctuator(Punctuator::StarStarEq),
            ]
        );
    }

    #[test]
    fn test_lexer_question_dot_digit_is_conditional() {
        assert_eq!(
            tokens("?.5"),
            vec![Token::Punctuator(Punctuator::Question), Token::Number(0.5)]
        );
    }

    #[test]
    fn test_lexer_comments() {
        assert_eq!(
            tokens("a // line\n/* block */ b"),
            vec![
                Token::Identifier("a".to_string(), false),
                Token::Identifier("b".to_string(), false)
            ]
        );
    }

    #[test]
    fn test_lexer_hashbang() {
        assert_eq!(
            tokens("#!/usr/bin/env node\nx"),
            vec![Token::Identifier("x".to_string(), false)]
        );
    }

    #[test]
    fn test_lexer_hash_without_rule_is_error() {
        let mut lexer = Lexer::new("#x");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.to_string(), "Unexpected character '#' (1:0)");
    }

    #[test]
    fn test_lexer_spans_and_newlines() {
        let mut lexer = Lexer::new("ab\n  cd");
        assert_eq!(lexer.peek_span().unwrap().start.column, 0);
        assert!(!lexer.has_newline_before().unwrap());
        lexer.next_token().unwrap();
        assert_eq!(lexer.last_token_end().offset, 2);

        let start = lexer.peek_start().unwrap();
        assert_eq!((start.line, start.column, start.offset), (2, 2, 5));
        assert!(lexer.has_newline_before().unwrap());
    }

    #[test]
    fn test_lexer_template_parts() {
        let mut lexer = Lexer::new("`a${x}b${y}c`");
        assert_eq!(lexer.next_token().unwrap(), Token::TemplateHead("a".to_string()));
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Identifier("x".to_string(), false)
        );
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Punctuator(Punctuator::RBrace)
        );
        assert_eq!(
            lexer.read_template_continuation().unwrap(),
            Token::TemplateMiddle("b".to_string())
        );
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.read_template_continuation().unwrap(),
            Token::TemplateTail("c".to_string())
        );
        assert_eq!(lexer.next_token().unwrap(), Token::EOF);
    }

    #[test]
    fn test_lexer_regexp_rescan() {
        let mut lexer = Lexer::new("/a[/]b/gi.x");
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Punctuator(Punctuator::Slash)
        );
        assert_eq!(
            lexer.rescan_regexp().unwrap(),
            Token::RegExp("a[/]b".to_string(), "gi".to_string())
        );
        assert_eq!(lexer.next_token().unwrap(), Token::Punctuator(Punctuator::Dot));
    }

    #[test]
    fn test_lexer_snapshot_restore() {
        let mut lexer = Lexer::new("a b c");
        lexer.next_token().unwrap();
        let state = lexer.snapshot();
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.restore(state);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Identifier("b".to_string(), false)
        );
    }

    fn at_rule(ch: char, lexer: &mut Lexer) -> Option<Result<Token, JsError>> {
        if ch != '@' {
            return None;
        }
        lexer.bump();
        Some(lexer.read_word().map(Token::PrivateName))
    }

    #[test]
    fn test_lexer_token_rule_runs_first() {
        let mut lexer = Lexer::with_rules("@foo bar", vec![at_rule]);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::PrivateName("foo".to_string())
        );
        assert_eq!(lexer.last_token_span().len(), 4);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Identifier("bar".to_string(), false)
        );
    }

    #[test]
    fn test_read_word_may_be_empty() {
        let mut lexer = Lexer::with_rules("@ x", vec![at_rule]);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::PrivateName(String::new())
        );
    }
}
