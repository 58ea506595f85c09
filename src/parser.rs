use crate::command::*;
use crate::error::{Result, SyntaxError};
use crate::table::Row;
use crate::tokenizer::{Token, TokenKind};
use crate::{Column, DataType, Value};

/// Parses a token sequence into a [Command].
///
/// # Example
/// ```
/// use minidb::{parse, tokenize, Command};
/// let tokens = tokenize("DELETE FROM users WHERE id = 1").unwrap();
/// assert!(matches!(parse(tokens).unwrap(), Command::Delete(_)));
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Command> {
    Parser::new(tokens).parse()
}

/// Recursive descent parser with one token of lookahead.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::eof());
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Command> {
        let command = match self.current_kind() {
            TokenKind::Create => Command::CreateTable(self.parse_create_table()?),
            TokenKind::Insert => Command::Insert(self.parse_insert()?),
            TokenKind::Select => Command::Select(self.parse_select()?),
            TokenKind::Delete => Command::Delete(self.parse_delete()?),
            TokenKind::Update => Command::Update(self.parse_update()?),
            found => return Err(SyntaxError::UnknownStatement(found).into()),
        };

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(SyntaxError::TrailingInput(self.current_kind()).into());
        }

        Ok(command)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn current_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Moves past the current token and returns it. Stays on the final
    /// end-of-input token.
    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    fn expect(&mut self, expected: TokenKind) -> std::result::Result<Token, SyntaxError> {
        if self.current_kind() == expected {
            Ok(self.advance())
        } else {
            Err(SyntaxError::UnexpectedToken {
                expected,
                found: self.current_kind(),
            })
        }
    }

    fn expect_ident(&mut self) -> std::result::Result<String, SyntaxError> {
        self.expect(TokenKind::Ident).map(|token| token.literal)
    }

    /// True if the current token is the identifier `word`, compared
    /// case-insensitively.
    fn at_word(&self, word: &str) -> bool {
        let token = self.current_token();
        token.kind == TokenKind::Ident && token.literal.eq_ignore_ascii_case(word)
    }

    fn expect_word(&mut self, word: &'static str) -> std::result::Result<(), SyntaxError> {
        if self.at_word(word) {
            self.advance();
            Ok(())
        } else {
            Err(SyntaxError::ExpectedWord {
                expected: word,
                found: self.current_token().literal.clone(),
            })
        }
    }

    /// A number or string token, turned into the matching [Value] variant.
    fn parse_literal(&mut self) -> std::result::Result<Value, SyntaxError> {
        match self.current_kind() {
            TokenKind::Number => {
                let token = self.advance();
                token
                    .literal
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| SyntaxError::InvalidNumber(token.literal))
            }
            TokenKind::String => Ok(Value::Text(self.advance().literal)),
            found => Err(SyntaxError::ExpectedLiteral(found)),
        }
    }

    /// `ident = literal`
    fn parse_predicate(&mut self) -> std::result::Result<WhereClause, SyntaxError> {
        let column = self.expect_ident()?;
        self.expect(TokenKind::Equal)?;
        let value = self.parse_literal()?;
        Ok(WhereClause { column, value })
    }

    /// `[WHERE ident = literal]`
    fn parse_optional_where(&mut self) -> std::result::Result<Option<WhereClause>, SyntaxError> {
        if self.current_kind() != TokenKind::Where {
            return Ok(None);
        }
        self.advance();
        self.parse_predicate().map(Some)
    }

    /// Parses a comma separated list, calling `item` once per element.
    fn parse_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> std::result::Result<T, SyntaxError>,
    ) -> std::result::Result<Vec<T>, SyntaxError> {
        let mut items = vec![item(self)?];
        while self.current_kind() == TokenKind::Comma {
            self.advance();
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn parse_column_def(&mut self) -> Result<Column> {
        let name = self.expect_ident()?;
        let data_type: DataType = self.expect_ident()?.parse()?;

        let mut column = Column::new(name, data_type);
        if self.at_word("PRIMARY") {
            self.advance();
            self.expect_word("KEY")?;
            column.primary_key = true;
        }
        Ok(column)
    }

    /// `CREATE TABLE ident ( ident ident [PRIMARY KEY] (, ...)* )`
    fn parse_create_table(&mut self) -> Result<CreateTable> {
        self.expect(TokenKind::Create)?;
        self.expect(TokenKind::Table)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LeftParen)?;

        let mut columns = vec![self.parse_column_def()?];
        while self.current_kind() == TokenKind::Comma {
            self.advance();
            columns.push(self.parse_column_def()?);
        }

        self.expect(TokenKind::RightParen)?;
        Ok(CreateTable { name, columns })
    }

    /// `INSERT INTO ident ( ident (, ident)* ) VALUES ( literal (, literal)* )`
    fn parse_insert(&mut self) -> Result<Insert> {
        self.expect(TokenKind::Insert)?;
        self.expect(TokenKind::Into)?;
        let table = self.expect_ident()?;

        self.expect(TokenKind::LeftParen)?;
        let columns = self.parse_list(Self::expect_ident)?;
        self.expect(TokenKind::RightParen)?;

        self.expect(TokenKind::Values)?;
        self.expect(TokenKind::LeftParen)?;
        let values = self.parse_list(Self::parse_literal)?;
        self.expect(TokenKind::RightParen)?;

        if columns.len() != values.len() {
            return Err(SyntaxError::ValueCountMismatch {
                columns: columns.len(),
                values: values.len(),
            }
            .into());
        }

        let values: Row = columns.into_iter().zip(values).collect();
        Ok(Insert { table, values })
    }

    /// `SELECT (ident|*) (, ident|*)* FROM ident [JOIN ...] [WHERE ident = literal]`
    fn parse_select(&mut self) -> Result<Select> {
        self.expect(TokenKind::Select)?;

        // `None` stands for `*`
        let projection = self.parse_list(|parser| match parser.current_kind() {
            TokenKind::Star => {
                parser.advance();
                Ok(None)
            }
            TokenKind::Ident => Ok(Some(parser.advance().literal)),
            found => Err(SyntaxError::UnexpectedToken {
                expected: TokenKind::Ident,
                found,
            }),
        })?;
        // A star anywhere selects every column.
        let columns = projection.into_iter().collect::<Option<Vec<_>>>().unwrap_or_default();

        self.expect(TokenKind::From)?;
        let table = self.expect_ident()?;

        let join = if self.current_kind() == TokenKind::Join {
            Some(self.parse_join(&table)?)
        } else {
            None
        };

        let where_clause = self.parse_optional_where()?;

        Ok(Select {
            table,
            columns,
            join,
            where_clause,
        })
    }

    /// `JOIN ident ON ident.ident = ident.ident`
    fn parse_join(&mut self, from: &str) -> std::result::Result<JoinSpec, SyntaxError> {
        self.expect(TokenKind::Join)?;
        let right_table = self.expect_ident()?;
        self.expect(TokenKind::On)?;

        let (on_left_table, left_column) = self.parse_qualified_column()?;
        self.expect(TokenKind::Equal)?;
        let (on_right_table, right_column) = self.parse_qualified_column()?;

        if on_right_table != right_table {
            return Err(SyntaxError::JoinTableMismatch {
                expected: right_table,
                found: on_right_table,
            });
        }
        if on_left_table != from {
            return Err(SyntaxError::JoinTableMismatch {
                expected: from.to_string(),
                found: on_left_table,
            });
        }

        Ok(JoinSpec {
            left_table: on_left_table,
            left_column,
            right_table,
            right_column,
        })
    }

    /// `ident.ident`
    fn parse_qualified_column(&mut self) -> std::result::Result<(String, String), SyntaxError> {
        let table = self.expect_ident()?;
        self.expect(TokenKind::Dot)?;
        let column = self.expect_ident()?;
        Ok((table, column))
    }

    /// `DELETE FROM ident [WHERE ident = literal]`
    ///
    /// A predicate written without the WHERE keyword is accepted as well.
    fn parse_delete(&mut self) -> Result<Delete> {
        self.expect(TokenKind::Delete)?;
        self.expect(TokenKind::From)?;
        let table = self.expect_ident()?;

        let where_clause = match self.current_kind() {
            TokenKind::Where => {
                self.advance();
                Some(self.parse_predicate()?)
            }
            TokenKind::Ident => Some(self.parse_predicate()?),
            _ => None,
        };

        Ok(Delete {
            table,
            where_clause,
        })
    }

    /// `UPDATE ident SET ident = literal [WHERE ident = literal]`
    fn parse_update(&mut self) -> Result<Update> {
        self.expect(TokenKind::Update)?;
        let table = self.expect_ident()?;
        self.expect(TokenKind::Set)?;

        let column = self.expect_ident()?;
        self.expect(TokenKind::Equal)?;
        let value = self.parse_literal()?;

        let where_clause = self.parse_optional_where()?;

        Ok(Update {
            table,
            assignments: Row::from([(column, value)]),
            where_clause,
        })
    }
}
