// File: src/lexer.rs
// Purpose: Split template source into text runs and `{{ ... }}` actions

use serde_json::Value;

use crate::error::ParseError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Text(String),
    Action { body: String, line: usize },
}

/// Splits source into tokens, applying `{{-` / `-}}` whitespace trimming and
/// dropping `{{/* comments */}}`
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut trim_next = false;

    while let Some(start) = rest.find(OPEN) {
        line += newlines(&rest[..start]);
        let mut text = &rest[..start];
        if trim_next {
            text = text.trim_start();
        }

        let after_open = &rest[start + OPEN.len()..];
        let end = find_close(after_open).ok_or_else(|| ParseError::new(line, "unclosed action"))?;
        let mut body = &after_open[..end];

        if let Some(stripped) = trim_marker_left(body) {
            text = text.trim_end();
            body = stripped;
        }
        trim_next = false;
        if let Some(stripped) = trim_marker_right(body) {
            trim_next = true;
            body = stripped;
        }

        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }

        let trimmed = body.trim();
        if !is_comment(trimmed) {
            tokens.push(Token::Action {
                body: trimmed.to_string(),
                line,
            });
        }

        line += newlines(&after_open[..end]);
        rest = &after_open[end + CLOSE.len()..];
    }

    let text = if trim_next { rest.trim_start() } else { rest };
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_string()));
    }

    Ok(tokens)
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Offset of the `}}` ending an action, skipping quoted strings and comments
fn find_close(action: &str) -> Option<usize> {
    let lead = action.len() - action.trim_start_matches(|c: char| c == '-' || c.is_whitespace()).len();
    if action[lead..].starts_with("/*") {
        let comment_end = lead + action[lead..].find("*/")? + 2;
        return action[comment_end..].find(CLOSE).map(|i| comment_end + i);
    }

    let bytes = action.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'`' => quote = Some(b),
            None if bytes[i..].starts_with(CLOSE.as_bytes()) => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

fn trim_marker_left(body: &str) -> Option<&str> {
    let stripped = body.strip_prefix('-')?;
    stripped
        .starts_with(char::is_whitespace)
        .then_some(stripped)
}

fn trim_marker_right(body: &str) -> Option<&str> {
    let stripped = body.strip_suffix('-')?;
    stripped.ends_with(char::is_whitespace).then_some(stripped)
}

fn is_comment(body: &str) -> bool {
    body.starts_with("/*") && body.ends_with("*/")
}

/// A lexical item inside an action
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Word {
    Ident(String),
    /// `.a.b`, empty for `.`
    Field(Vec<String>),
    /// `$.a.b`, empty for `$`
    Root(Vec<String>),
    Literal(Value),
    Open,
    Close,
}

pub(crate) fn words(body: &str, line: usize) -> Result<Vec<Word>, ParseError> {
    let mut words = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some(&(idx, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                words.push(Word::Open);
            }
            ')' => {
                chars.next();
                words.push(Word::Close);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, 'n')) => s.push('\n'),
                            Some((_, 't')) => s.push('\t'),
                            Some((_, other)) => s.push(other),
                            None => return Err(ParseError::new(line, "unterminated quoted string")),
                        },
                        Some((_, other)) => s.push(other),
                        None => return Err(ParseError::new(line, "unterminated quoted string")),
                    }
                }
                words.push(Word::Literal(Value::String(s)));
            }
            '`' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '`')) => break,
                        Some((_, other)) => s.push(other),
                        None => return Err(ParseError::new(line, "unterminated raw string")),
                    }
                }
                words.push(Word::Literal(Value::String(s)));
            }
            _ => {
                let mut end = body.len();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                words.push(classify(&body[idx..end], line)?);
            }
        }
    }

    Ok(words)
}

fn classify(word: &str, line: usize) -> Result<Word, ParseError> {
    if let Some(path) = word.strip_prefix('$') {
        return field_path(path, line).map(Word::Root);
    }
    if word.starts_with('.') {
        return field_path(word, line).map(Word::Field);
    }

    match word {
        "true" => return Ok(Word::Literal(Value::Bool(true))),
        "false" => return Ok(Word::Literal(Value::Bool(false))),
        "null" | "nil" => return Ok(Word::Literal(Value::Null)),
        _ => {}
    }

    let numeric = word
        .trim_start_matches('-')
        .starts_with(|c: char| c.is_ascii_digit());
    if numeric {
        if let Ok(n) = word.parse::<i64>() {
            return Ok(Word::Literal(Value::from(n)));
        }
        return word
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(|n| Word::Literal(Value::Number(n)))
            .ok_or_else(|| ParseError::new(line, format!("bad number syntax: {}", word)));
    }

    if word.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Ok(Word::Ident(word.to_string()))
    } else {
        Err(ParseError::new(line, format!("unexpected {:?} in action", word)))
    }
}

/// `""` or `"."` → no keys; `".a.b"` → `["a", "b"]`
fn field_path(path: &str, line: usize) -> Result<Vec<String>, ParseError> {
    if path.is_empty() || path == "." {
        return Ok(Vec::new());
    }

    let keys = path
        .strip_prefix('.')
        .ok_or_else(|| ParseError::new(line, format!("bad field path: {}", path)))?;

    keys.split('.')
        .map(|key| {
            if key.is_empty() {
                Err(ParseError::new(line, format!("bad field path: {}", path)))
            } else {
                Ok(key.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn action(body: &str, line: usize) -> Token {
        Token::Action {
            body: body.to_string(),
            line,
        }
    }

    #[test]
    fn test_tokenize_text_and_actions() {
        let tokens = tokenize("<p>{{ .name }}</p>\n{{end}}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("<p>".into()),
                action(".name", 1),
                Token::Text("</p>\n".into()),
                action("end", 2),
            ]
        );
    }

    #[test]
    fn test_tokenize_trim_markers() {
        let tokens = tokenize("a  \n {{- .x -}} \n b").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Text("a".into()), action(".x", 2), Token::Text("b".into())]
        );
    }

    #[test]
    fn test_tokenize_skips_comments() {
        let tokens = tokenize("a{{/* note */}}b").unwrap();
        assert_eq!(tokens, vec![Token::Text("a".into()), Token::Text("b".into())]);
    }

    #[test]
    fn test_close_delimiter_inside_strings() {
        let tokens = tokenize(r#"{{ default "}}" .x }}|{{ join `}}` .xs }}|{{ "a\"}}" }}"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                action(r#"default "}}" .x"#, 1),
                Token::Text("|".into()),
                action("join `}}` .xs", 1),
                Token::Text("|".into()),
                action(r#""a\"}}""#, 1),
            ]
        );
    }

    #[test]
    fn test_lines_across_multiline_actions() {
        let tokens = tokenize("a\n{{ if\n.x }}\nb{{ end }}{{/* x\n*/}}{{ .y }}").unwrap();
        let lines: Vec<usize> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Action { line, .. } => Some(*line),
                Token::Text(_) => None,
            })
            .collect();
        assert_eq!(lines, vec![2, 4, 5]);
    }

    #[test]
    fn test_unclosed_action() {
        let err = tokenize("line\n{{ .x ").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(tokenize(r#"{{ "open }}"#).unwrap_err().message, "unclosed action");
    }

    #[test]
    fn test_words() {
        let words = words(r#"link "event" (len .items) 12 -1.5 $.user.name ."#, 1).unwrap();
        assert_eq!(
            words,
            vec![
                Word::Ident("link".into()),
                Word::Literal(Value::String("event".into())),
                Word::Open,
                Word::Ident("len".into()),
                Word::Field(vec!["items".into()]),
                Word::Close,
                Word::Literal(Value::from(12)),
                Word::Literal(Value::from(-1.5)),
                Word::Root(vec!["user".into(), "name".into()]),
                Word::Field(vec![]),
            ]
        );
    }

    #[test]
    fn test_bad_words() {
        assert!(words(".a..b", 1).is_err());
        assert!(words("\"open", 1).is_err());
        assert!(words("a-b", 1).is_err());
    }
}
