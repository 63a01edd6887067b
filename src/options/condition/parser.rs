//! Shorthand condition parser
//!
//! Parses expressions like:
//! - `finish == 'gloss'`
//! - `sides != 1`
//! - `addons contains 'foil'`
//! - `truthy(rush)`
//! - `not truthy(rush) and (paper == 'matte' or paper == 'silk')`
//!
//! `not` binds tighter than `and`, which binds tighter than `or`. Chains of
//! the same connective flatten into a single `and`/`or` node. The bare words
//! `true` and `false` parse to an empty `and` and an empty `or`.

use super::ast::ConditionExpr;
use serde_json::{Number, Value};
use thiserror::Error;

/// Errors produced while parsing the shorthand
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected end of condition")]
    UnexpectedEnd,

    #[error("Unexpected '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("Unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Eq,
    NotEq,
    Str(String),
    Word(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Eq => "==".to_string(),
            Token::NotEq => "!=".to_string(),
            Token::Str(s) => format!("'{}'", s),
            Token::Word(w) => w.clone(),
        }
    }
}

/// Parse a shorthand condition string into an AST
pub fn parse(input: &str) -> Result<ConditionExpr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some((token, offset)) => Err(ParseError::UnexpectedToken {
            found: token.describe(),
            offset: *offset,
        }),
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((Token::LParen, offset));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, offset));
                i += 1;
            }
            '=' | '!' => {
                if chars.get(i + 1).map(|(_, n)| *n) != Some('=') {
                    return Err(ParseError::UnexpectedToken {
                        found: c.to_string(),
                        offset,
                    });
                }
                tokens.push((if c == '=' { Token::Eq } else { Token::NotEq }, offset));
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                let mut j = i + 1;
                loop {
                    match chars.get(j) {
                        None => return Err(ParseError::UnterminatedString(offset)),
                        Some((_, '\\')) => {
                            if let Some((_, escaped)) = chars.get(j + 1) {
                                text.push(*escaped);
                            }
                            j += 2;
                        }
                        Some((_, ch)) if *ch == quote => break,
                        Some((_, ch)) => {
                            text.push(*ch);
                            j += 1;
                        }
                    }
                }
                tokens.push((Token::Str(text), offset));
                i = j + 1;
            }
            _ => {
                let mut word = String::new();
                let mut j = i;
                while let Some((_, ch)) = chars.get(j) {
                    if ch.is_whitespace() || matches!(ch, '(' | ')' | '=' | '!' | '\'' | '"') {
                        break;
                    }
                    word.push(*ch);
                    j += 1;
                }
                tokens.push((Token::Word(word), offset));
                i = j;
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == word)
    }

    fn next(&mut self) -> Result<(Token, usize), ParseError> {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(item)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        let (token, offset) = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.describe(),
                offset,
            })
        }
    }

    fn parse_or(&mut self) -> Result<ConditionExpr, ParseError> {
        let mut args = vec![self.parse_and()?];
        while self.peek_word("or") {
            self.pos += 1;
            args.push(self.parse_and()?);
        }
        Ok(if args.len() == 1 {
            args.remove(0)
        } else {
            ConditionExpr::Or { args }
        })
    }

    fn parse_and(&mut self) -> Result<ConditionExpr, ParseError> {
        let mut args = vec![self.parse_unary()?];
        while self.peek_word("and") {
            self.pos += 1;
            args.push(self.parse_unary()?);
        }
        Ok(if args.len() == 1 {
            args.remove(0)
        } else {
            ConditionExpr::And { args }
        })
    }

    fn parse_unary(&mut self) -> Result<ConditionExpr, ParseError> {
        if self.peek_word("not") {
            self.pos += 1;
            return Ok(ConditionExpr::not(self.parse_unary()?));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ConditionExpr, ParseError> {
        let (token, offset) = self.next()?;
        match token {
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Word(w) if w == "true" => Ok(ConditionExpr::and(vec![])),
            Token::Word(w) if w == "false" => Ok(ConditionExpr::or(vec![])),
            Token::Word(w) if w == "truthy" => {
                self.expect(Token::LParen)?;
                let reference = self.parse_ref()?;
                self.expect(Token::RParen)?;
                Ok(ConditionExpr::truthy(reference))
            }
            Token::Word(reference) => self.parse_comparison(reference),
            other => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                offset,
            }),
        }
    }

    fn parse_ref(&mut self) -> Result<String, ParseError> {
        match self.next()? {
            (Token::Word(w), _) => Ok(w),
            (other, offset) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                offset,
            }),
        }
    }

    fn parse_comparison(&mut self, reference: String) -> Result<ConditionExpr, ParseError> {
        let build: fn(String, Value) -> ConditionExpr = match self.next()? {
            (Token::Eq, _) => |reference, value| ConditionExpr::Equals { reference, value },
            (Token::NotEq, _) => |reference, value| ConditionExpr::NotEquals { reference, value },
            (Token::Word(w), _) if w == "contains" => {
                |reference, value| ConditionExpr::Contains { reference, value }
            }
            (other, offset) => {
                return Err(ParseError::UnexpectedToken {
                    found: other.describe(),
                    offset,
                })
            }
        };
        let value = self.parse_literal()?;
        Ok(build(reference, value))
    }

    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        match self.next()? {
            (Token::Str(s), _) => Ok(Value::String(s)),
            (Token::Word(w), _) => parse_scalar(&w),
            (other, offset) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                offset,
            }),
        }
    }
}

fn parse_scalar(word: &str) -> Result<Value, ParseError> {
    match word {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if let Ok(n) = word.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    word.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ParseError::InvalidLiteral(word.to_string()))
}
