// File: src/exec.rs
// Purpose: Walk parsed nodes against a data value and write HTML

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::ast::{Expr, Node};
use crate::error::ExecError;
use crate::funcs::{builtin, display, truthy, FuncMap, SAFE};

pub(crate) const MAX_DEPTH: usize = 100;

/// Evaluated expression; `Html` is never escaped
enum Val {
    Json(Value),
    Html(String),
}

impl Val {
    fn into_value(self) -> Value {
        match self {
            Val::Json(value) => value,
            Val::Html(html) => Value::String(html),
        }
    }
}

pub(crate) struct Exec<'a> {
    pub funcs: &'a FuncMap,
    pub templates: &'a HashMap<String, Arc<Vec<Node>>>,
    pub root: &'a Value,
    pub out: &'a mut dyn Write,
    pub depth: usize,
}

impl<'a> Exec<'a> {
    pub fn run(&mut self, nodes: &[Node], dot: &Value) -> Result<(), ExecError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.write_all(text.as_bytes())?,
                Node::Output(expr) => match self.eval(expr, dot)? {
                    Val::Json(value) => self.out.write_all(escape(&display(&value)).as_bytes())?,
                    Val::Html(html) => self.out.write_all(html.as_bytes())?,
                },
                Node::Template { name, arg } => {
                    let arg = match arg {
                        Some(expr) => self.eval(expr, dot)?.into_value(),
                        None => Value::Null,
                    };
                    self.template(name, &arg)?;
                }
                Node::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    if truthy(&self.eval(cond, dot)?.into_value()) {
                        self.run(then, dot)?;
                    } else {
                        self.run(otherwise, dot)?;
                    }
                }
                Node::Range {
                    over,
                    body,
                    otherwise,
                    line,
                } => match self.eval(over, dot)?.into_value() {
                    Value::Array(items) if !items.is_empty() => {
                        for item in &items {
                            self.run(body, item)?;
                        }
                    }
                    Value::Object(map) if !map.is_empty() => {
                        for item in map.values() {
                            self.run(body, item)?;
                        }
                    }
                    Value::Array(_) | Value::Object(_) | Value::Null => self.run(otherwise, dot)?,
                    other => {
                        return Err(ExecError::NotIterable {
                            line: *line,
                            value: other.to_string(),
                        })
                    }
                },
            }
        }
        Ok(())
    }

    fn template(&mut self, name: &str, dot: &Value) -> Result<(), ExecError> {
        let nodes = self
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| ExecError::UnknownTemplate(name.to_string()))?;

        if self.depth >= MAX_DEPTH {
            return Err(ExecError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = self.run(&nodes, dot);
        self.depth -= 1;
        result
    }

    fn eval(&self, expr: &Expr, dot: &Value) -> Result<Val, ExecError> {
        match expr {
            Expr::Field(path) => Ok(Val::Json(lookup(dot, path))),
            Expr::Root(path) => Ok(Val::Json(lookup(self.root, path))),
            Expr::Literal(value) => Ok(Val::Json(value.clone())),
            Expr::Call { name, args, line } => self.call(name, args, dot, *line),
        }
    }

    fn call(&self, name: &str, args: &[Expr], dot: &Value, line: usize) -> Result<Val, ExecError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, dot)?);
        }

        let func_error = |message: String| ExecError::Func {
            name: name.to_string(),
            line,
            message,
        };

        if name == SAFE && !self.funcs.contains(SAFE) {
            let mut values = values.into_iter();
            return match (values.next(), values.next()) {
                (Some(Val::Html(html)), None) => Ok(Val::Html(html)),
                (Some(Val::Json(value)), None) => Ok(Val::Html(display(&value))),
                _ => Err(func_error("safe expects 1 argument".to_string())),
            };
        }

        let values: Vec<Value> = values.into_iter().map(Val::into_value).collect();
        let result = if let Some(func) = self.funcs.get(name) {
            func(self.root, &values)
        } else if let Some(func) = builtin(name) {
            func(&values)
        } else {
            return Err(func_error("function not defined".to_string()));
        };

        result.map(Val::Json).map_err(|err| func_error(err.0))
    }
}

fn lookup(value: &Value, path: &[String]) -> Value {
    let mut current = value;
    for key in path {
        let next = match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => current.get(key),
        };
        match next {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Escapes text for HTML element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
