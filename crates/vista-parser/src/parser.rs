// File: src/parser.rs
// Purpose: Build the node tree from lexer tokens

use crate::ast::{Expr, Node, Parsed};
use crate::error::ParseError;
use crate::funcs::{is_known, FuncMap};
use crate::lexer::{self, Token, Word};

/// What ended a list of nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Eof,
    End,
    Else,
}

pub(crate) fn parse(source: &str, funcs: &FuncMap) -> Result<Parsed, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser {
        tokens: tokens.into_iter(),
        funcs,
        defines: Vec::new(),
        line: 1,
    };

    let (body, stop) = parser.nodes(true)?;
    match stop {
        Stop::Eof => Ok(Parsed {
            body,
            defines: parser.defines,
        }),
        Stop::End => Err(ParseError::new(parser.line, "unexpected {{end}}")),
        Stop::Else => Err(ParseError::new(parser.line, "unexpected {{else}}")),
    }
}

struct Parser<'f> {
    tokens: std::vec::IntoIter<Token>,
    funcs: &'f FuncMap,
    defines: Vec<(String, Vec<Node>)>,
    line: usize,
}

enum Operand {
    Ident(String),
    Expr(Expr),
}

impl<'f> Parser<'f> {
    fn nodes(&mut self, top: bool) -> Result<(Vec<Node>, Stop), ParseError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            let (body, line) = match token {
                Token::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Token::Action { body, line } => (body, line),
            };
            self.line = line;

            let words = lexer::words(&body, line)?;
            let (keyword, rest) = match words.split_first() {
                Some((Word::Ident(keyword), rest)) => (keyword.as_str(), rest),
                Some(_) => ("", words.as_slice()),
                None => return Err(ParseError::new(line, "missing value for command")),
            };

            match keyword {
                "end" => {
                    no_arguments("end", rest, line)?;
                    return Ok((nodes, Stop::End));
                }
                "else" => {
                    no_arguments("else", rest, line)?;
                    return Ok((nodes, Stop::Else));
                }
                "define" => {
                    if !top {
                        return Err(ParseError::new(line, "define is only allowed at top level"));
                    }
                    let name = template_name("define", rest, line)?;
                    no_arguments("define", &rest[1..], line)?;
                    let body = self.closed_body("define", line)?;
                    self.defines.push((name, body));
                }
                "block" => {
                    let name = template_name("block", rest, line)?;
                    let arg = self.optional_command(&rest[1..], line)?;
                    let body = self.closed_body("block", line)?;
                    self.defines.push((name.clone(), body));
                    nodes.push(Node::Template {
                        name,
                        arg: Some(arg.unwrap_or(Expr::Field(Vec::new()))),
                    });
                }
                "template" => {
                    let name = template_name("template", rest, line)?;
                    let arg = self.optional_command(&rest[1..], line)?;
                    nodes.push(Node::Template { name, arg });
                }
                "if" | "range" => {
                    let expr = self.command(rest, line)?;
                    let (then, otherwise) = self.branches(keyword, line)?;
                    nodes.push(if keyword == "if" {
                        Node::If {
                            cond: expr,
                            then,
                            otherwise,
                        }
                    } else {
                        Node::Range {
                            over: expr,
                            body: then,
                            otherwise,
                            line,
                        }
                    });
                }
                _ => nodes.push(Node::Output(self.command(&words, line)?)),
            }
        }

        Ok((nodes, Stop::Eof))
    }

    /// Body of `define`/`block`, which must be closed by `{{end}}`
    fn closed_body(&mut self, keyword: &str, line: usize) -> Result<Vec<Node>, ParseError> {
        match self.nodes(false)? {
            (body, Stop::End) => Ok(body),
            (_, Stop::Else) => Err(ParseError::new(
                self.line,
                format!("unexpected {{{{else}}}} in {}", keyword),
            )),
            (_, Stop::Eof) => Err(ParseError::new(line, format!("unexpected EOF in {}", keyword))),
        }
    }

    /// Bodies of `if`/`range` with an optional `{{else}}` branch
    fn branches(&mut self, keyword: &str, line: usize) -> Result<(Vec<Node>, Vec<Node>), ParseError> {
        let eof = || ParseError::new(line, format!("unexpected EOF in {}", keyword));

        match self.nodes(false)? {
            (then, Stop::End) => Ok((then, Vec::new())),
            (then, Stop::Else) => match self.nodes(false)? {
                (otherwise, Stop::End) => Ok((then, otherwise)),
                (_, Stop::Else) => Err(ParseError::new(
                    self.line,
                    format!("multiple {{{{else}}}} in {}", keyword),
                )),
                (_, Stop::Eof) => Err(eof()),
            },
            (_, Stop::Eof) => Err(eof()),
        }
    }

    fn optional_command(&self, words: &[Word], line: usize) -> Result<Option<Expr>, ParseError> {
        if words.is_empty() {
            Ok(None)
        } else {
            self.command(words, line).map(Some)
        }
    }

    fn command(&self, words: &[Word], line: usize) -> Result<Expr, ParseError> {
        let mut pos = 0;
        let expr = self.command_at(words, &mut pos, line, false)?;
        if pos < words.len() {
            return Err(ParseError::new(line, "unexpected right paren"));
        }
        Ok(expr)
    }

    fn command_at(
        &self,
        words: &[Word],
        pos: &mut usize,
        line: usize,
        nested: bool,
    ) -> Result<Expr, ParseError> {
        let mut operands = Vec::new();

        loop {
            let Some(word) = words.get(*pos) else {
                if nested {
                    return Err(ParseError::new(line, "unclosed left paren"));
                }
                break;
            };
            *pos += 1;

            match word {
                Word::Close if nested => break,
                Word::Close => {
                    *pos -= 1;
                    break;
                }
                Word::Open => operands.push(Operand::Expr(self.command_at(words, pos, line, true)?)),
                Word::Ident(name) => operands.push(Operand::Ident(name.clone())),
                Word::Field(path) => operands.push(Operand::Expr(Expr::Field(path.clone()))),
                Word::Root(path) => operands.push(Operand::Expr(Expr::Root(path.clone()))),
                Word::Literal(value) => operands.push(Operand::Expr(Expr::Literal(value.clone()))),
            }
        }

        let mut operands = operands.into_iter();
        match operands.next() {
            None => Err(ParseError::new(line, "missing value for command")),
            Some(Operand::Ident(name)) => {
                let args = operands
                    .map(|operand| match operand {
                        Operand::Ident(name) => self.call(name, Vec::new(), line),
                        Operand::Expr(expr) => Ok(expr),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, args, line)
            }
            Some(Operand::Expr(expr)) => match operands.next() {
                None => Ok(expr),
                Some(_) => Err(ParseError::new(line, "can't give argument to non-function")),
            },
        }
    }

    fn call(&self, name: String, args: Vec<Expr>, line: usize) -> Result<Expr, ParseError> {
        if !is_known(self.funcs, &name) {
            return Err(ParseError::new(line, format!("function {:?} not defined", name)));
        }
        Ok(Expr::Call { name, args, line })
    }
}

fn template_name(keyword: &str, rest: &[Word], line: usize) -> Result<String, ParseError> {
    match rest.first() {
        Some(Word::Literal(serde_json::Value::String(name))) => Ok(name.clone()),
        _ => Err(ParseError::new(
            line,
            format!("{} expects a quoted template name", keyword),
        )),
    }
}

fn no_arguments(keyword: &str, rest: &[Word], line: usize) -> Result<(), ParseError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ParseError::new(line, format!("unexpected arguments to {}", keyword)))
    }
}
