use crate::ast::*;
use crate::lexer::{LexError, Lexer, Token};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Unexpected token: {0:?}, expected {1}")]
    Unexpected(Token, &'static str),
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> &Token {
        let tok = self.tokens.get(self.pos).unwrap_or(&Token::Eof);
        self.pos += 1;
        tok
    }

    /// Bare or double-quoted identifier.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Ident(s) | Token::Quoted(s) => Ok(s),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "identifier")),
        }
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ParseError> {
        let tok = self.advance().clone();
        if tok == expected {
            Ok(())
        } else if tok == Token::Eof {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(ParseError::Unexpected(tok, what))
        }
    }

    fn check_ident(&self, name: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(name))
    }

    fn is_name(tok: &Token) -> bool {
        matches!(tok, Token::Ident(_) | Token::Quoted(_))
    }

    pub fn parse(&mut self) -> Result<Schema, ParseError> {
        let mut schema = Schema::default();

        while *self.peek() != Token::Eof {
            if self.check_ident("table") {
                self.advance();
                let (table, inline_refs) = self.parse_table()?;
                schema.tables.push(table);
                schema.refs.extend(inline_refs);
            } else if self.check_ident("ref") {
                self.advance();
                schema.refs.extend(self.parse_ref_decl()?);
            } else if self.check_ident("enum") {
                self.advance();
                schema.enums.push(self.parse_enum()?);
            } else if self.check_ident("project")
                || self.check_ident("tablegroup")
                || self.check_ident("note")
            {
                self.advance();
                self.skip_named_block()?;
            } else {
                return Err(ParseError::Unexpected(
                    self.peek().clone(),
                    "Table, Ref, Enum, Project, TableGroup or Note",
                ));
            }
        }

        Ok(schema)
    }

    /// `name` or `schema.name`.
    fn parse_qualified_name(&mut self) -> Result<(Option<String>, String), ParseError> {
        let name = self.expect_name()?;
        if *self.peek() == Token::Dot && Self::is_name(self.peek_at(1)) {
            self.advance();
            return Ok((Some(name), self.expect_name()?));
        }
        Ok((None, name))
    }

    /// Skips `Name { ... }`, `{ ... }` or `: value` after a block keyword.
    fn skip_named_block(&mut self) -> Result<(), ParseError> {
        if *self.peek() == Token::Colon {
            self.advance();
            self.advance();
            return Ok(());
        }
        while Self::is_name(self.peek()) || *self.peek() == Token::Dot {
            self.advance();
        }
        if *self.peek() == Token::LBracket {
            self.skip_balanced(Token::LBracket, Token::RBracket)?;
        }
        self.skip_balanced(Token::LBrace, Token::RBrace)
    }

    fn skip_balanced(&mut self, open: Token, close: Token) -> Result<(), ParseError> {
        self.expect(open.clone(), "block")?;
        let mut depth = 1;
        while depth > 0 {
            let tok = self.advance().clone();
            if tok == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            } else if tok == open {
                depth += 1;
            } else if tok == close {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn parse_table(&mut self) -> Result<(Table, Vec<Ref>), ParseError> {
        let (schema, name) = self.parse_qualified_name()?;

        let mut alias = None;
        if self.check_ident("as") {
            self.advance();
            alias = Some(self.expect_name()?);
        }
        if *self.peek() == Token::LBracket {
            self.skip_balanced(Token::LBracket, Token::RBracket)?;
        }

        self.expect(Token::LBrace, "{ after table name")?;

        let mut fields = Vec::new();
        let mut refs = Vec::new();
        let mut note = None;

        while *self.peek() != Token::RBrace {
            if self.check_ident("indexes") && *self.peek_at(1) == Token::LBrace {
                self.advance();
                self.skip_balanced(Token::LBrace, Token::RBrace)?;
            } else if self.check_ident("note") && *self.peek_at(1) == Token::Colon {
                self.advance();
                self.advance();
                note = Some(self.expect_string()?);
            } else if self.check_ident("note") && *self.peek_at(1) == Token::LBrace {
                self.advance();
                self.expect(Token::LBrace, "{")?;
                note = Some(self.expect_string()?);
                self.expect(Token::RBrace, "}")?;
            } else if *self.peek() == Token::Eof {
                return Err(ParseError::UnexpectedEof);
            } else {
                let (field, inline) = self.parse_field(schema.as_deref(), &name)?;
                fields.push(field);
                refs.extend(inline);
            }
        }

        self.expect(Token::RBrace, "} after table body")?;

        Ok((
            Table {
                schema,
                name,
                alias,
                fields,
                note,
            },
            refs,
        ))
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Str(s) | Token::Quoted(s) => Ok(s),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "string")),
        }
    }

    fn parse_field(&mut self, schema: Option<&str>, table: &str) -> Result<(Field, Vec<Ref>), ParseError> {
        let name = self.expect_name()?;
        let typ = self.parse_type()?;
        let mut field = Field {
            name,
            typ,
            ..Default::default()
        };
        let mut refs = Vec::new();

        if *self.peek() == Token::LBracket {
            self.advance();
            loop {
                self.parse_field_setting(schema, table, &mut field, &mut refs)?;
                match self.advance().clone() {
                    Token::Comma => continue,
                    Token::RBracket => break,
                    Token::Eof => return Err(ParseError::UnexpectedEof),
                    tok => return Err(ParseError::Unexpected(tok, ", or ] in field settings")),
                }
            }
        }

        Ok((field, refs))
    }

    fn parse_type(&mut self) -> Result<String, ParseError> {
        let mut typ = self.parse_qualified_type_name()?;

        if *self.peek() == Token::LParen {
            self.advance();
            let mut args = Vec::new();
            loop {
                match self.advance().clone() {
                    Token::RParen => break,
                    Token::Comma => {}
                    Token::Num(n) | Token::Ident(n) => args.push(n),
                    Token::Str(s) => args.push(format!("'{}'", s)),
                    Token::Eof => return Err(ParseError::UnexpectedEof),
                    tok => return Err(ParseError::Unexpected(tok, "type argument")),
                }
            }
            typ.push('(');
            typ.push_str(&args.join(","));
            typ.push(')');
        }

        while *self.peek() == Token::LBracket && *self.peek_at(1) == Token::RBracket {
            self.advance();
            self.advance();
            typ.push_str("[]");
        }

        Ok(typ)
    }

    fn parse_qualified_type_name(&mut self) -> Result<String, ParseError> {
        let mut typ = self.expect_name()?;
        while *self.peek() == Token::Dot && Self::is_name(self.peek_at(1)) {
            self.advance();
            typ.push('.');
            typ.push_str(&self.expect_name()?);
        }
        Ok(typ)
    }

    fn parse_field_setting(
        &mut self,
        schema: Option<&str>,
        table: &str,
        field: &mut Field,
        refs: &mut Vec<Ref>,
    ) -> Result<(), ParseError> {
        if self.check_ident("pk") {
            self.advance();
            field.pk = true;
        } else if self.check_ident("primary") {
            self.advance();
            if self.check_ident("key") {
                self.advance();
            }
            field.pk = true;
        } else if self.check_ident("increment") {
            self.advance();
            field.increment = true;
        } else if self.check_ident("unique") {
            self.advance();
            field.unique = true;
        } else if self.check_ident("not") {
            self.advance();
            if self.check_ident("null") {
                self.advance();
            }
            field.not_null = true;
        } else if self.check_ident("null") {
            self.advance();
            field.not_null = false;
        } else if self.check_ident("default") {
            self.advance();
            self.expect(Token::Colon, ": after default")?;
            field.default = Some(self.parse_default_value()?);
        } else if self.check_ident("note") {
            self.advance();
            self.expect(Token::Colon, ": after note")?;
            field.note = Some(self.expect_string()?);
        } else if self.check_ident("ref") {
            self.advance();
            self.expect(Token::Colon, ": after ref")?;
            let (left, right) = self.parse_relation_op()?;
            let mut target = self.parse_endpoint(right)?;
            if target.fields.is_empty() {
                target.fields.push(field.name.clone());
            }
            refs.push(Ref {
                name: None,
                endpoints: [
                    Endpoint {
                        schema: schema.map(str::to_string),
                        table: table.to_string(),
                        fields: vec![field.name.clone()],
                        relation: left,
                    },
                    target,
                ],
            });
        } else {
            self.skip_setting()?;
        }
        Ok(())
    }

    /// Consumes an unknown setting up to the next `,` or `]`.
    fn skip_setting(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Token::Comma | Token::RBracket => return Ok(()),
                Token::Eof => return Err(ParseError::UnexpectedEof),
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_default_value(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Minus => match self.advance().clone() {
                Token::Num(n) => Ok(format!("-{}", n)),
                tok => Err(ParseError::Unexpected(tok, "number after -")),
            },
            Token::Num(n) => Ok(n),
            Token::Str(s) => Ok(s),
            Token::Expr(e) => Ok(e),
            Token::Ident(s) => Ok(s),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "default value")),
        }
    }

    /// Maps a relation operator to the (left, right) cardinalities.
    fn parse_relation_op(&mut self) -> Result<(Relation, Relation), ParseError> {
        match self.advance().clone() {
            Token::Gt => Ok((Relation::Many, Relation::One)),
            Token::Lt => Ok((Relation::One, Relation::Many)),
            Token::Minus => Ok((Relation::One, Relation::One)),
            Token::LtGt => Ok((Relation::Many, Relation::Many)),
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, "relation (>, <, -, <>)")),
        }
    }

    /// `table.field`, `schema.table.field` or `table.(a, b)`.
    fn parse_endpoint(&mut self, relation: Relation) -> Result<Endpoint, ParseError> {
        let mut parts = vec![self.expect_name()?];
        let mut fields = Vec::new();

        while *self.peek() == Token::Dot {
            self.advance();
            if *self.peek() == Token::LParen {
                self.advance();
                fields.push(self.expect_name()?);
                while *self.peek() == Token::Comma {
                    self.advance();
                    fields.push(self.expect_name()?);
                }
                self.expect(Token::RParen, ") after composite fields")?;
                break;
            }
            parts.push(self.expect_name()?);
        }

        if fields.is_empty() && parts.len() > 1 {
            fields.push(parts.pop().unwrap_or_default());
        }
        let table = parts.pop().unwrap_or_default();
        let schema = parts.pop();

        Ok(Endpoint {
            schema,
            table,
            fields,
            relation,
        })
    }

    fn parse_ref_decl(&mut self) -> Result<Vec<Ref>, ParseError> {
        let mut name = None;
        if Self::is_name(self.peek()) {
            name = Some(self.expect_name()?);
        }

        match self.advance().clone() {
            Token::Colon => Ok(vec![self.parse_ref_body(name)?]),
            Token::LBrace => {
                let mut refs = Vec::new();
                while *self.peek() != Token::RBrace {
                    if *self.peek() == Token::Eof {
                        return Err(ParseError::UnexpectedEof);
                    }
                    refs.push(self.parse_ref_body(name.clone())?);
                }
                self.advance();
                Ok(refs)
            }
            Token::Eof => Err(ParseError::UnexpectedEof),
            tok => Err(ParseError::Unexpected(tok, ": or { after Ref")),
        }
    }

    fn parse_ref_body(&mut self, name: Option<String>) -> Result<Ref, ParseError> {
        let mut left = self.parse_endpoint(Relation::One)?;
        let (left_rel, right_rel) = self.parse_relation_op()?;
        let right = self.parse_endpoint(right_rel)?;
        left.relation = left_rel;

        if *self.peek() == Token::LBracket {
            self.skip_balanced(Token::LBracket, Token::RBracket)?;
        }

        Ok(Ref {
            name,
            endpoints: [left, right],
        })
    }

    fn parse_enum(&mut self) -> Result<Enum, ParseError> {
        // Field types keep their prefix, so enum names do too.
        let name = match self.parse_qualified_name()? {
            (Some(schema), name) if schema != DEFAULT_SCHEMA => format!("{}.{}", schema, name),
            (_, name) => name,
        };
        self.expect(Token::LBrace, "{ after enum name")?;

        let mut values = Vec::new();
        while *self.peek() != Token::RBrace {
            values.push(self.expect_name()?);
            if *self.peek() == Token::LBracket {
                self.skip_balanced(Token::LBracket, Token::RBracket)?;
            }
        }

        self.expect(Token::RBrace, "} after enum values")?;
        Ok(Enum { name, values })
    }
}
