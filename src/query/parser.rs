use std::collections::VecDeque;

use super::Result;
use super::error::{
    AndSeparatorSnafu, EmptySnafu, MalformedConditionSnafu, TrailingInputSnafu,
    UnexpectedEofSnafu, UnexpectedTokenSnafu, UnknownActionSnafu,
};
use super::lexer::{Lexeme, Lexer, Token};
use crate::storage::Predicate;

/// One parsed command. Names are passed through as written; the engine
/// validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        table: String,
        columns: Vec<String>,
    },
    Insert {
        table: String,
        values: Vec<String>,
    },
    Update {
        table: String,
        assigns: Vec<(String, String)>,
        filter: Predicate,
    },
    Delete {
        table: String,
        filter: Predicate,
    },
    Get {
        table: String,
        filter: Predicate,
    },
}

// Where a value ends, besides `,` and end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    RParen,
    Where,
}

pub struct Parser {
    tokens: VecDeque<Lexeme>,
}

impl Parser {
    pub fn new(src: &str) -> Result<Self> {
        Ok(Self {
            tokens: Lexer::new(src).tokenize()?.into(),
        })
    }

    pub fn parse(mut self) -> Result<Command> {
        let Some(first) = self.walk() else {
            return EmptySnafu.fail();
        };
        let action = match &first.token {
            Token::Word(word) => word.to_ascii_lowercase(),
            _ => String::new(),
        };
        let command = match action.as_str() {
            "create" => self.parse_create()?,
            "insert" => self.parse_insert()?,
            "update" => self.parse_update()?,
            "delete" => self.parse_delete()?,
            "get" | "select" => self.parse_get()?,
            _ => {
                return UnknownActionSnafu {
                    action: first.text(),
                }
                .fail();
            }
        };
        self.finish()?;
        Ok(command)
    }

    // create table <name> has a, b, c
    // create table <name> (a, b, c)
    fn parse_create(&mut self) -> Result<Command> {
        self.keyword("table")?;
        let table = self.name()?;
        let columns = if self.eat(|l| l.is_keyword("has")) {
            self.list(Stop::End, "column names")?
        } else if self.eat(|l| l.token == Token::LParen) {
            let columns = self.list(Stop::RParen, "column names")?;
            if !self.eat(|l| l.token == Token::RParen) {
                return self.unexpected("')'");
            }
            columns
        } else {
            return self.unexpected("'has' or '('");
        };
        Ok(Command::Create { table, columns })
    }

    // insert to <name> v1, v2, ...
    fn parse_insert(&mut self) -> Result<Command> {
        if !self.eat(|l| l.is_keyword("to") || l.is_keyword("into")) {
            return self.unexpected("'to'");
        }
        let table = self.name()?;
        let values = self.list(Stop::End, "values")?;
        Ok(Command::Insert { table, values })
    }

    // update <name> set a=1, b=2 where c=3, d=4
    fn parse_update(&mut self) -> Result<Command> {
        let table = self.name()?;
        self.keyword("set")?;
        let assigns = self.pairs(Stop::Where, "assignments")?;
        self.keyword("where")?;
        let filter = self.pairs(Stop::End, "conditions")?.into_iter().collect();
        Ok(Command::Update {
            table,
            assigns,
            filter,
        })
    }

    // delete from <name> where c=3, d=4
    fn parse_delete(&mut self) -> Result<Command> {
        self.keyword("from")?;
        let table = self.name()?;
        self.keyword("where")?;
        let filter = self.pairs(Stop::End, "conditions")?.into_iter().collect();
        Ok(Command::Delete { table, filter })
    }

    // get from <name> [where c=3, d=4]
    fn parse_get(&mut self) -> Result<Command> {
        self.keyword("from")?;
        let table = self.name()?;
        let filter = if self.tokens.is_empty() {
            Predicate::all()
        } else {
            self.keyword("where")?;
            self.pairs(Stop::End, "conditions")?.into_iter().collect()
        };
        Ok(Command::Get { table, filter })
    }

    fn curr(&self) -> Option<&Lexeme> {
        self.tokens.front()
    }

    fn walk(&mut self) -> Option<Lexeme> {
        self.tokens.pop_front()
    }

    fn eat(&mut self, pred: impl Fn(&Lexeme) -> bool) -> bool {
        if self.curr().is_some_and(pred) {
            self.walk();
            true
        } else {
            false
        }
    }

    fn unexpected<T>(&self, expected: &str) -> Result<T> {
        match self.curr() {
            Some(lexeme) => UnexpectedTokenSnafu {
                expected,
                found: lexeme.text(),
            }
            .fail(),
            None => UnexpectedEofSnafu { expected }.fail(),
        }
    }

    fn keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat(|l| l.is_keyword(keyword)) {
            Ok(())
        } else {
            self.unexpected(&format!("'{keyword}'"))
        }
    }

    fn name(&mut self) -> Result<String> {
        match self.walk() {
            Some(Lexeme {
                token: Token::Word(word),
                ..
            }) => Ok(word),
            Some(other) => UnexpectedTokenSnafu {
                expected: "a table name",
                found: other.text(),
            }
            .fail(),
            None => UnexpectedEofSnafu {
                expected: "a table name",
            }
            .fail(),
        }
    }

    fn finish(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Ok(());
        }
        TrailingInputSnafu {
            fragment: join(&self.tokens),
        }
        .fail()
    }

    // `where=` is an assignment to a column named `where`, not the clause.
    fn at_stop(&self, stop: Stop) -> bool {
        let Some(lexeme) = self.curr() else {
            return true;
        };
        match stop {
            _ if lexeme.token == Token::Comma => true,
            Stop::End => false,
            Stop::RParen => lexeme.token == Token::RParen,
            Stop::Where => {
                lexeme.is_keyword("where")
                    && self.tokens.get(1).is_none_or(|next| next.token != Token::Eq)
            }
        }
    }

    /// Tokens of one value, up to `,`, end of input, or `stop`.
    fn value(&mut self, stop: Stop) -> Vec<Lexeme> {
        let mut pieces = Vec::new();
        while !self.at_stop(stop) {
            pieces.extend(self.walk());
        }
        pieces
    }

    fn require(&self, stop: Stop, expected: &str) -> Result<()> {
        if self.at_stop(stop) {
            return self.unexpected(expected);
        }
        Ok(())
    }

    fn list(&mut self, stop: Stop, expected: &str) -> Result<Vec<String>> {
        self.require(stop, expected)?;
        let mut items = vec![join(&self.value(stop))];
        while self.eat(|l| l.token == Token::Comma) {
            items.push(join(&self.value(stop)));
        }
        Ok(items)
    }

    fn pairs(&mut self, stop: Stop, expected: &str) -> Result<Vec<(String, String)>> {
        self.require(stop, expected)?;
        let mut pairs = vec![self.pair(stop)?];
        while self.eat(|l| l.token == Token::Comma) {
            pairs.push(self.pair(stop)?);
        }
        Ok(pairs)
    }

    // <column>=<value>, split on the first `=`.
    fn pair(&mut self, stop: Stop) -> Result<(String, String)> {
        let pieces = self.value(stop);
        let fragment = join(&pieces);
        let Some(eq) = pieces.iter().position(|l| l.token == Token::Eq) else {
            return MalformedConditionSnafu { fragment }.fail();
        };
        let (key, value) = (&pieces[..eq], &pieces[eq + 1..]);
        let [
            Lexeme {
                token: Token::Word(column),
                ..
            },
        ] = key
        else {
            return MalformedConditionSnafu { fragment }.fail();
        };
        if let Some(and) = value.iter().position(|l| l.is_keyword("and"))
            && value[and..].iter().any(|l| l.token == Token::Eq)
        {
            return AndSeparatorSnafu { fragment }.fail();
        }
        Ok((column.clone(), join(value)))
    }
}

/// Rebuilds source text from lexemes with whitespace collapsed to one space.
fn join<'a>(pieces: impl IntoIterator<Item = &'a Lexeme>) -> String {
    let mut out = String::new();
    for (i, lexeme) in pieces.into_iter().enumerate() {
        if i > 0 && lexeme.spaced {
            out.push(' ');
        }
        out.push_str(lexeme.text());
    }
    out
}
