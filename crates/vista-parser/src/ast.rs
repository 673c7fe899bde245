use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Output(Expr),
    /// `{{ template "name" expr }}`, also emitted in place of a `block`
    Template {
        name: String,
        arg: Option<Expr>,
    },
    If {
        cond: Expr,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Range {
        over: Expr,
        body: Vec<Node>,
        otherwise: Vec<Node>,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Field(Vec<String>),
    Root(Vec<String>),
    Literal(Value),
    Call {
        name: String,
        args: Vec<Expr>,
        line: usize,
    },
}

/// Result of parsing one source text
#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub body: Vec<Node>,
    pub defines: Vec<(String, Vec<Node>)>,
}

impl Parsed {
    /// A body made only of whitespace (definitions are not part of the body)
    pub fn body_is_empty(&self) -> bool {
        self.body.iter().all(|node| match node {
            Node::Text(text) => text.trim().is_empty(),
            _ => false,
        })
    }
}
