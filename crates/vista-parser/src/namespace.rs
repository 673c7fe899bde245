// File: src/namespace.rs
// Purpose: A set of named templates built from one or more source texts

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::ast::Node;
use crate::error::{ExecError, ParseError};
use crate::exec::Exec;
use crate::funcs::FuncMap;
use crate::parser;

/// Parsed templates sharing one function map
///
/// Sources are parsed in order with [`parse_into`](Namespace::parse_into).
/// Each `define`/`block` adds or replaces a named template; a source whose
/// body contains more than whitespace replaces the main template. Parsing a
/// layout first and the page last therefore lets the page override blocks
/// the layout declares.
#[derive(Clone)]
pub struct Namespace {
    funcs: FuncMap,
    main: Option<Arc<Vec<Node>>>,
    templates: HashMap<String, Arc<Vec<Node>>>,
}

impl Namespace {
    pub fn new(funcs: FuncMap) -> Self {
        Self {
            funcs,
            main: None,
            templates: HashMap::new(),
        }
    }

    /// Parses `source` into this namespace
    ///
    /// Nothing is changed when parsing fails.
    pub fn parse_into(&mut self, source: &str) -> Result<(), ParseError> {
        let parsed = parser::parse(source, &self.funcs)?;

        if !parsed.body_is_empty() {
            self.main = Some(Arc::new(parsed.body));
        }
        for (name, body) in parsed.defines {
            self.templates.insert(name, Arc::new(body));
        }
        Ok(())
    }

    /// Builder form of [`parse_into`](Self::parse_into)
    pub fn parse(mut self, source: &str) -> Result<Self, ParseError> {
        self.parse_into(source)?;
        Ok(self)
    }

    /// Executes the main template
    pub fn execute(&self, data: &Value, out: &mut dyn Write) -> Result<(), ExecError> {
        let main = self.main.as_ref().ok_or(ExecError::Incomplete)?;
        self.exec(data, out).run(main, data)
    }

    /// Executes a named template
    pub fn execute_template(
        &self,
        name: &str,
        data: &Value,
        out: &mut dyn Write,
    ) -> Result<(), ExecError> {
        let nodes = self
            .templates
            .get(name)
            .ok_or_else(|| ExecError::UnknownTemplate(name.to_string()))?;
        self.exec(data, out).run(nodes, data)
    }

    /// Executes the main template into a string
    pub fn render(&self, data: &Value) -> Result<String, ExecError> {
        let mut buf = Vec::new();
        self.execute(data, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn has_main(&self) -> bool {
        self.main.is_some()
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn funcs(&self) -> &FuncMap {
        &self.funcs
    }

    fn exec<'a>(&'a self, root: &'a Value, out: &'a mut dyn Write) -> Exec<'a> {
        Exec {
            funcs: &self.funcs,
            templates: &self.templates,
            root,
            out,
            depth: 0,
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("main", &self.main.is_some())
            .field("templates", &self.template_names())
            .field("funcs", &self.funcs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn render(source: &str, data: Value) -> String {
        Namespace::new(FuncMap::new())
            .parse(source)
            .unwrap()
            .render(&data)
            .unwrap()
    }

    #[rstest]
    #[case("Hello {{ .name }}", json!({"name": "World"}), "Hello World")]
    #[case("{{ .a.b }}", json!({"a": {"b": 42}}), "42")]
    #[case("[{{ .missing }}]", json!({}), "[]")]
    #[case("{{ . }}", json!("dot"), "dot")]
    #[case("{{ .x }}", json!({"x": "<b>&</b>"}), "&lt;b&gt;&amp;&lt;/b&gt;")]
    #[case("{{ safe .x }}", json!({"x": "<b>"}), "<b>")]
    #[case("{{ if .ok }}y{{ else }}n{{ end }}", json!({"ok": false}), "n")]
    #[case("{{ range .xs }}<{{ . }}>{{ end }}", json!({"xs": [1, 2]}), "<1><2>")]
    #[case("{{ range .xs }}x{{ else }}none{{ end }}", json!({"xs": []}), "none")]
    #[case("{{ range .xs }}{{ $.sep }}{{ . }}{{ end }}", json!({"xs": ["a"], "sep": "-"}), "-a")]
    #[case("{{ len .xs }}", json!({"xs": [1, 2, 3]}), "3")]
    #[case("{{ default \"anon\" .user }}", json!({}), "anon")]
    #[case("{{ if not (eq .n 1) }}other{{ end }}", json!({"n": 2}), "other")]
    #[case("[{{ .xs.0 }}][{{ .xs.1.name }}]", json!({"xs": ["a", {"name": "b"}]}), "[a][b]")]
    #[case("[{{ .xs.5 }}]", json!({"xs": ["a"]}), "[]")]
    #[case("{{ default \"}}\" .x }}", json!({}), "}}")]
    fn test_render(#[case] source: &str, #[case] data: Value, #[case] expected: &str) {
        assert_eq!(render(source, data), expected);
    }

    #[test]
    fn test_later_source_overrides_blocks() {
        let mut ns = Namespace::new(FuncMap::new());
        ns.parse_into("<html>{{ block \"content\" . }}default{{ end }}</html>")
            .unwrap();
        assert_eq!(ns.render(&json!({})).unwrap(), "<html>default</html>");

        ns.parse_into("{{ define \"content\" }}page {{ .title }}{{ end }}")
            .unwrap();
        assert!(ns.has_main());
        assert_eq!(ns.render(&json!({"title": "A"})).unwrap(), "<html>page A</html>");
        assert_eq!(ns.template_names(), vec!["content"]);
    }

    #[test]
    fn test_nonempty_body_replaces_main() {
        let ns = Namespace::new(FuncMap::new())
            .parse("layout")
            .unwrap()
            .parse("page")
            .unwrap();
        assert_eq!(ns.render(&json!(null)).unwrap(), "page");
    }

    #[test]
    fn test_failed_parse_changes_nothing() {
        let mut ns = Namespace::new(FuncMap::new()).parse("ok").unwrap();
        assert!(ns.parse_into("{{ define \"x\" }}{{ nope }}{{ end }}bad").is_err());
        assert!(!ns.has_template("x"));
        assert_eq!(ns.render(&json!(null)).unwrap(), "ok");
    }

    #[test]
    fn test_incomplete() {
        let ns = Namespace::new(FuncMap::new())
            .parse("{{ define \"x\" }}x{{ end }}")
            .unwrap();
        assert!(matches!(ns.render(&json!(null)), Err(ExecError::Incomplete)));

        let mut out = Vec::new();
        ns.execute_template("x", &json!(null), &mut out).unwrap();
        assert_eq!(out, b"x");
        assert!(matches!(
            ns.execute_template("y", &json!(null), &mut out),
            Err(ExecError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_template_without_argument_gets_null() {
        let out = render(
            "{{ define \"t\" }}[{{ .name }}]{{ end }}{{ template \"t\" }}{{ template \"t\" . }}",
            json!({"name": "n"}),
        );
        assert_eq!(out, "[][n]");
    }

    #[test]
    fn test_user_functions_see_root() {
        let funcs = FuncMap::new().with("greet", |root, args| {
            let who = args.first().and_then(Value::as_str).unwrap_or("?");
            let path = root.get("path").and_then(Value::as_str).unwrap_or("");
            Ok(json!(format!("{} at {}", who, path)))
        });
        let ns = Namespace::new(funcs)
            .parse("{{ range .people }}{{ greet .name }};{{ end }}")
            .unwrap();
        let out = ns
            .render(&json!({"path": "/a", "people": [{"name": "x"}, {"name": "y"}]}))
            .unwrap();
        assert_eq!(out, "x at /a;y at /a;");
    }

    #[test]
    fn test_func_error() {
        let funcs = FuncMap::new().with("boom", |_, _| Err("kaboom".into()));
        let ns = Namespace::new(funcs).parse("a\n{{ boom }}").unwrap();
        let err = ns.render(&json!(null)).unwrap_err();
        assert_eq!(err.to_string(), "line 2: error calling boom: kaboom");
    }

    #[test]
    fn test_partial_output_before_error() {
        let funcs = FuncMap::new().with("boom", |_, _| Err("kaboom".into()));
        let ns = Namespace::new(funcs).parse("before {{ boom }} after").unwrap();
        let mut out = Vec::new();
        assert!(ns.execute(&json!(null), &mut out).is_err());
        assert_eq!(out, b"before ");
    }

    #[test]
    fn test_recursion_is_bounded() {
        let ns = Namespace::new(FuncMap::new())
            .parse("{{ define \"loop\" }}{{ template \"loop\" }}{{ end }}{{ template \"loop\" }}")
            .unwrap();
        assert!(matches!(ns.render(&json!(null)), Err(ExecError::TooDeep(_))));
    }

    #[test]
    fn test_range_over_scalar() {
        let ns = Namespace::new(FuncMap::new())
            .parse("{{ range .n }}{{ end }}")
            .unwrap();
        assert!(matches!(
            ns.render(&json!({"n": 3})),
            Err(ExecError::NotIterable { line: 1, .. })
        ));
    }
}
