// File: src/funcs.rs
// Purpose: Function map and built-in template functions

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::FuncError;

/// A template function
///
/// Receives the root data value of the current execution and the evaluated
/// arguments.
pub type Func = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, FuncError> + Send + Sync>;

/// Named functions callable from templates
#[derive(Clone, Default)]
pub struct FuncMap {
    funcs: HashMap<String, Func>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a function
    pub fn insert<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        self.funcs.insert(name.into(), Arc::new(func));
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        self.insert(name, func);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Func> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

impl fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncMap")
            .field("funcs", &self.names())
            .finish()
    }
}

/// Marks a value as trusted HTML; handled by the executor
pub(crate) const SAFE: &str = "safe";

type Builtin = fn(&[Value]) -> Result<Value, FuncError>;

/// Functions available in every namespace unless the function map overrides them
pub(crate) fn builtin(name: &str) -> Option<Builtin> {
    match name {
        "eq" => Some(eq),
        "not" => Some(not),
        "len" => Some(len),
        "default" => Some(default),
        "join" => Some(join),
        _ => None,
    }
}

pub(crate) fn is_known(funcs: &FuncMap, name: &str) -> bool {
    name == SAFE || funcs.contains(name) || builtin(name).is_some()
}

/// Template truthiness: null, false, 0, "" and empty collections are false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

/// Formats a value the way it is printed by a template (before escaping)
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), FuncError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(FuncError(format!(
            "{} expects {} arguments, got {}",
            name,
            expected,
            args.len()
        )))
    }
}

fn eq(args: &[Value]) -> Result<Value, FuncError> {
    arity("eq", args, 2)?;
    let same = match (&args[0], &args[1]) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    };
    Ok(Value::Bool(same))
}

fn not(args: &[Value]) -> Result<Value, FuncError> {
    arity("not", args, 1)?;
    Ok(Value::Bool(!truthy(&args[0])))
}

fn len(args: &[Value]) -> Result<Value, FuncError> {
    arity("len", args, 1)?;
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(arr) => arr.len(),
        Value::Object(obj) => obj.len(),
        Value::Null => 0,
        other => return Err(FuncError(format!("len of {}", other))),
    };
    Ok(Value::from(n))
}

fn default(args: &[Value]) -> Result<Value, FuncError> {
    arity("default", args, 2)?;
    if truthy(&args[1]) {
        Ok(args[1].clone())
    } else {
        Ok(args[0].clone())
    }
}

fn join(args: &[Value]) -> Result<Value, FuncError> {
    arity("join", args, 2)?;
    let sep = display(&args[0]);
    match &args[1] {
        Value::Array(items) => Ok(Value::String(
            items.iter().map(display).collect::<Vec<_>>().join(&sep),
        )),
        Value::Null => Ok(Value::String(String::new())),
        other => Err(FuncError(format!("join of {}", other))),
    }
}
