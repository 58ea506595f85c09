use std::fmt;

use crate::error::LexError;

/// The category of a lexical [Token].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // --- Special ---
    /// End of input, always the last token of a sequence.
    Eof,
    /// A character the language does not know about.
    Illegal,

    // --- Identifiers & Literals ---
    /// A table, column or type name (e.g., `users`, `INT`).
    Ident,
    /// An unsigned integer literal (e.g., `42`).
    Number,
    /// A string literal, defined between single quotes (e.g., `'Alice'`).
    String,

    // --- Symbols ---
    /// Wildcard `*`
    Star,
    /// Equal to `=`
    Equal,
    /// Comma `,`
    Comma,
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Qualifier separator `.`
    Dot,

    // --- SQL Keywords ---
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Create,
    Table,
    Delete,
    Update,
    Set,
    Join,
    On,
}

impl TokenKind {
    /// Looks a word up in the keyword table. Matching is case-insensitive.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word.to_uppercase().as_str() {
            "SELECT" => Some(TokenKind::Select),
            "FROM" => Some(TokenKind::From),
            "WHERE" => Some(TokenKind::Where),
            "INSERT" => Some(TokenKind::Insert),
            "INTO" => Some(TokenKind::Into),
            "VALUES" => Some(TokenKind::Values),
            "CREATE" => Some(TokenKind::Create),
            "TABLE" => Some(TokenKind::Table),
            "DELETE" => Some(TokenKind::Delete),
            "UPDATE" => Some(TokenKind::Update),
            "SET" => Some(TokenKind::Set),
            "JOIN" => Some(TokenKind::Join),
            "ON" => Some(TokenKind::On),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Illegal => "illegal token",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Star => "'*'",
            TokenKind::Equal => "'='",
            TokenKind::Comma => "','",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Dot => "'.'",
            TokenKind::Select => "SELECT",
            TokenKind::From => "FROM",
            TokenKind::Where => "WHERE",
            TokenKind::Insert => "INSERT",
            TokenKind::Into => "INTO",
            TokenKind::Values => "VALUES",
            TokenKind::Create => "CREATE",
            TokenKind::Table => "TABLE",
            TokenKind::Delete => "DELETE",
            TokenKind::Update => "UPDATE",
            TokenKind::Set => "SET",
            TokenKind::Join => "JOIN",
            TokenKind::On => "ON",
        };
        f.write_str(name)
    }
}

/// A `(kind, literal)` pair. The literal is the exact source text, except for
/// strings where the surrounding quotes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }
}

/// Converts a statement into its token sequence.
///
/// # Example
/// ```
/// use minidb::tokenizer::{tokenize, TokenKind};
/// let tokens = tokenize("SELECT *").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Select);
/// assert_eq!(tokens[2].kind, TokenKind::Eof);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(input).tokenize()
}

/// A lexical scanner (lexer) that converts a raw SQL string into a sequence of [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens terminated by
    /// an [TokenKind::Eof] token.
    ///
    /// # Errors
    /// Returns [LexError::IllegalCharacter] on the first character that cannot
    /// start a token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let start = self.position;
            let token = self.next_token();
            if token.kind == TokenKind::Illegal {
                let ch = token.literal.chars().next().unwrap_or('\0');
                return Err(LexError::IllegalCharacter {
                    ch,
                    position: start,
                });
            }
            tokens.push(token);
        }

        tokens.push(Token::eof());
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> Token {
        let ch = self.current_char();

        let kind = match ch {
            '=' => TokenKind::Equal,
            ',' => TokenKind::Comma,
            '*' => TokenKind::Star,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '.' => TokenKind::Dot,
            '\'' => return self.read_string(),
            c if is_ident_start(c) => return self.read_identifier(),
            c if c.is_ascii_digit() => return self.read_number(),
            _ => TokenKind::Illegal,
        };

        self.advance();
        Token::new(kind, ch)
    }

    // --- Navigation Helpers ---

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Only space, tab, newline and carriage return separate tokens.
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && matches!(self.current_char(), ' ' | '\t' | '\n' | '\r') {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    fn read_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while !self.is_at_end() && keep(self.current_char()) {
            self.advance();
        }
        self.input[start..self.position].iter().collect()
    }

    /// Reads a word and decides whether it is a keyword or an identifier.
    /// The literal keeps the original spelling in both cases.
    fn read_identifier(&mut self) -> Token {
        let word = self.read_while(|c| is_ident_start(c) || c.is_ascii_digit());
        let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Ident);
        Token::new(kind, word)
    }

    /// Reads an unsigned digit run. Signs, decimal points and exponents are
    /// not part of the language.
    fn read_number(&mut self) -> Token {
        let digits = self.read_while(|c| c.is_ascii_digit());
        Token::new(TokenKind::Number, digits)
    }

    /// Reads a string literal enclosed in single quotes. There are no escape
    /// sequences; a missing closing quote runs to the end of the input.
    fn read_string(&mut self) -> Token {
        self.advance(); // opening quote
        let text = self.read_while(|c| c != '\'');
        if !self.is_at_end() {
            self.advance(); // closing quote
        }
        Token::new(TokenKind::String, text)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
