use std::collections::VecDeque;

use super::error::QueryErr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // bare word: keyword, name or unquoted value
    Word(String),
    // quoted value, quotes stripped
    Text(String),
    Comma,  // ,
    Eq,     // =
    LParen, // (
    RParen, // )
}

/// A token plus whether whitespace preceded it. Values are rebuilt from
/// their tokens with one space wherever `spaced` is set, which is what
/// collapsing runs of whitespace would give.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub spaced: bool,
}

impl Lexeme {
    pub fn text(&self) -> &str {
        match &self.token {
            Token::Word(s) | Token::Text(s) => s,
            Token::Comma => ",",
            Token::Eq => "=",
            Token::LParen => "(",
            Token::RParen => ")",
        }
    }

    /// Case-insensitive keyword test. Quoted text is never a keyword.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.token, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

pub struct Lexer {
    src: VecDeque<char>,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
        }
    }

    fn is_delimiter(ch: char) -> bool {
        matches!(ch, ',' | '=' | '(' | ')')
    }

    fn is_quote(ch: char) -> bool {
        ch == '\'' || ch == '"'
    }

    fn curr(&self) -> Option<char> {
        self.src.front().copied()
    }

    fn walk(&mut self) -> Option<char> {
        self.src.pop_front()
    }

    fn skip_ws(&mut self) -> bool {
        let mut skipped = false;
        while let Some(ch) = self.curr()
            && ch.is_whitespace()
        {
            self.walk();
            skipped = true;
        }
        skipped
    }

    /// Next lexeme, or `None` at end of input.
    pub fn next(&mut self) -> Result<Option<Lexeme>, QueryErr> {
        let spaced = self.skip_ws();
        let Some(ch) = self.walk() else {
            return Ok(None);
        };
        let token = match ch {
            ',' => Token::Comma,
            '=' => Token::Eq,
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ if Self::is_quote(ch) => self.lex_text(ch)?,
            _ => self.lex_word(ch),
        };
        Ok(Some(Lexeme { token, spaced }))
    }

    pub fn tokenize(mut self) -> Result<Vec<Lexeme>, QueryErr> {
        let mut out = Vec::new();
        while let Some(lexeme) = self.next()? {
            out.push(lexeme);
        }
        Ok(out)
    }

    // A quote only opens text at the start of a token, so `O'Brien` stays
    // one word.
    fn lex_word(&mut self, start: char) -> Token {
        let mut out = String::from(start);
        while let Some(ch) = self.curr()
            && !ch.is_whitespace()
            && !Self::is_delimiter(ch)
        {
            out.push(ch);
            self.walk();
        }
        Token::Word(out)
    }

    fn lex_text(&mut self, quote: char) -> Result<Token, QueryErr> {
        let mut out = String::new();
        while let Some(ch) = self.walk() {
            if ch == quote {
                return Ok(Token::Text(out));
            } else if ch == '\\' {
                let esc = self.walk().ok_or(QueryErr::UnterminatedText)?;
                match esc {
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    _ => {
                        out.push(ch);
                        out.push(esc);
                    }
                }
            } else {
                out.push(ch);
            }
        }
        Err(QueryErr::UnterminatedText)
    }
}
