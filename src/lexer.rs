use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Quoted(String), // "double quoted identifier"
    Str(String),    // 'single quoted string'
    Expr(String),   // `backtick expression`
    Num(String),

    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :
    Dot,      // .
    Lt,       // <
    Gt,       // >
    LtGt,     // <>
    Minus,    // -

    Eof,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unterminated expression")]
    UnterminatedExpr,
    #[error("Unterminated comment")]
    UnterminatedComment,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek() {
                        Some('/') => {
                            while let Some(c) = self.chars.next() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            self.chars.next();
                            self.chars.next();
                            self.skip_block_comment()?;
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let mut prev = '\0';
        for c in self.chars.by_ref() {
            if prev == '*' && c == '/' {
                return Ok(());
            }
            prev = c;
        }
        Err(LexError::UnterminatedComment)
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_delimited(&mut self, quote: char) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(s),
                Some('\\') => {
                    if let Some(c) = self.chars.next() {
                        match c {
                            'n' => s.push('\n'),
                            't' => s.push('\t'),
                            'r' => s.push('\r'),
                            _ => s.push(c),
                        }
                    }
                }
                Some(c) => s.push(c),
                None => return Err(LexError::UnterminatedString),
            }
        }
    }

    /// Single quoted string, or `'''` multi-line string.
    fn read_string(&mut self) -> Result<String, LexError> {
        let mut ahead = self.chars.clone();
        if ahead.next() == Some('\'') && ahead.next() == Some('\'') {
            self.chars.next();
            self.chars.next();
            let mut s = String::new();
            let mut quotes = 0;
            for c in self.chars.by_ref() {
                if c == '\'' {
                    quotes += 1;
                    if quotes == 3 {
                        return Ok(s.trim().to_string());
                    }
                } else {
                    for _ in 0..quotes {
                        s.push('\'');
                    }
                    quotes = 0;
                    s.push(c);
                }
            }
            return Err(LexError::UnterminatedString);
        }
        self.read_delimited('\'')
    }

    fn read_expr(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        for c in self.chars.by_ref() {
            if c == '`' {
                return Ok(s);
            }
            s.push(c);
        }
        Err(LexError::UnterminatedExpr)
    }

    fn read_number(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let tok = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '.' => Token::Dot,
            '>' => Token::Gt,
            '-' => Token::Minus,
            '<' => {
                if self.chars.peek() == Some(&'>') {
                    self.chars.next();
                    Token::LtGt
                } else {
                    Token::Lt
                }
            }
            '"' => Token::Quoted(self.read_delimited('"')?),
            '\'' => Token::Str(self.read_string()?),
            '`' => Token::Expr(self.read_expr()?),
            '#' => Token::Ident(self.read_ident(c)), // #3498DB colors in settings
            c if c.is_ascii_digit() => Token::Num(self.read_number(c)),
            c if c.is_alphabetic() || c == '_' => Token::Ident(self.read_ident(c)),
            _ => return Err(LexError::UnexpectedChar(c)),
        };

        Ok(tok)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }
}
