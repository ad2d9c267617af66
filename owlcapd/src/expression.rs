//! Compiles user expressions into the typed filter tree.
//!
//! `field op value` comparisons joined with `&&`, `||`, `!` and parens.
//! Values may be bare tokens, quoted strings, `[a, b]` lists, `$name`
//! lookup references, or the special `EXISTS!`. `*`/`?` in an equality
//! value turns it into a wildcard match.

use crate::app::AppState;
use owlcap_store::{Datastore, Filter};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Op(&'static str),
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Lookup(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut out = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            ')' => {
                out.push(Token::RParen);
                i += 1;
            }
            '[' => {
                out.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                out.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                out.push(Token::Comma);
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                out.push(Token::AndAnd);
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                out.push(Token::OrOr);
                i += 2;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                out.push(Token::Op("=="));
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                out.push(Token::Op("!="));
                i += 2;
            }
            '!' => {
                out.push(Token::Bang);
                i += 1;
            }
            '<' | '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Token::Op(if c == '<' { "<=" } else { ">=" }));
                    i += 2;
                } else {
                    out.push(Token::Op(if c == '<' { "<" } else { ">" }));
                    i += 1;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    s.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err("Unterminated string".to_string());
                }
                i += 1;
                out.push(Token::Str(s));
            }
            '$' => {
                let mut s = String::new();
                i += 1;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '-')
                {
                    s.push(chars[i]);
                    i += 1;
                }
                if s.is_empty() {
                    return Err("Empty lookup reference".to_string());
                }
                out.push(Token::Lookup(s));
            }
            _ if c.is_ascii_alphanumeric()
                || matches!(c, '.' | '_' | '-' | ':' | '/' | '*' | '?' | '@') =>
            {
                let mut s = String::new();
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric()
                        || matches!(chars[i], '.' | '_' | '-' | ':' | '/' | '*' | '?' | '@' | '!'))
                {
                    s.push(chars[i]);
                    i += 1;
                }
                out.push(Token::Ident(s));
            }
            other => return Err(format!("Unexpected character '{other}' in expression")),
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    lookups: HashMap<String, Vec<String>>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_or(&mut self) -> Result<Filter, String> {
        let mut parts = vec![self.parse_and()?];
        while self.peek() == Some(&Token::OrOr) {
            self.next();
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            Filter::Or(parts)
        })
    }

    fn parse_and(&mut self) -> Result<Filter, String> {
        let mut parts = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::AndAnd) {
            self.next();
            parts.push(self.parse_unary()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            Filter::And(parts)
        })
    }

    fn parse_unary(&mut self) -> Result<Filter, String> {
        match self.peek() {
            Some(Token::Bang) => {
                self.next();
                Ok(Filter::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::LParen) => {
                self.next();
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("Expected ')'".to_string()),
                }
            }
            _ => self.parse_comparison(),
        }
    }

    fn parse_comparison(&mut self) -> Result<Filter, String> {
        let field = match self.next() {
            Some(Token::Ident(f)) => f,
            other => return Err(format!("Expected a field name, got {other:?}")),
        };
        let op = match self.next() {
            Some(Token::Op(op)) => op,
            other => return Err(format!("Expected an operator after '{field}', got {other:?}")),
        };
        let values = self.parse_value()?;
        build_comparison(&field, op, values)
    }

    /// One or more raw value strings: a token, a quoted string, a list, or
    /// a resolved lookup.
    fn parse_value(&mut self) -> Result<Vec<String>, String> {
        match self.next() {
            Some(Token::Ident(v)) => Ok(vec![v]),
            Some(Token::Str(v)) => Ok(vec![v]),
            Some(Token::Lookup(name)) => self
                .lookups
                .get(&name)
                .cloned()
                .ok_or_else(|| format!("Unknown lookup ${name}")),
            Some(Token::LBracket) => {
                let mut values = Vec::new();
                loop {
                    match self.next() {
                        Some(Token::Ident(v)) | Some(Token::Str(v)) => values.push(v),
                        Some(Token::RBracket) if values.is_empty() => break,
                        other => return Err(format!("Bad list element: {other:?}")),
                    }
                    match self.next() {
                        Some(Token::Comma) => continue,
                        Some(Token::RBracket) => break,
                        other => return Err(format!("Expected ',' or ']', got {other:?}")),
                    }
                }
                Ok(values)
            }
            other => Err(format!("Expected a value, got {other:?}")),
        }
    }
}

/// The user-facing field names this compiler understands map onto document
/// fields; two of them fan out across both directions.
fn doc_fields(field: &str) -> Vec<&'static str> {
    match field {
        "ip.src" => vec!["srcIp"],
        "ip.dst" => vec!["dstIp"],
        "ip" => vec!["srcIp", "dstIp"],
        "port.src" => vec!["srcPort"],
        "port.dst" => vec!["dstPort"],
        "port" => vec!["srcPort", "dstPort"],
        _ => Vec::new(),
    }
}

fn build_comparison(field: &str, op: &str, values: Vec<String>) -> Result<Filter, String> {
    let mapped = doc_fields(field);
    let fields: Vec<String> = if mapped.is_empty() {
        vec![field.to_string()]
    } else {
        mapped.iter().map(|f| f.to_string()).collect()
    };

    let mut per_field = Vec::with_capacity(fields.len());
    for doc_field in &fields {
        per_field.push(single_comparison(doc_field, op, &values)?);
    }
    Ok(if per_field.len() == 1 {
        per_field.pop().unwrap()
    } else {
        Filter::Or(per_field)
    })
}

fn single_comparison(field: &str, op: &str, values: &[String]) -> Result<Filter, String> {
    match op {
        "==" | "!=" => {
            if values.is_empty() {
                return Err(format!("No value for '{field}'"));
            }
            let inner = if values.len() == 1 {
                let v = &values[0];
                if v == "EXISTS!" {
                    Filter::Exists {
                        field: field.to_string(),
                    }
                } else if v.contains('*') || v.contains('?') {
                    Filter::Wildcard {
                        field: field.to_string(),
                        pattern: v.clone(),
                    }
                } else {
                    Filter::Term {
                        field: field.to_string(),
                        value: scalar(v),
                    }
                }
            } else {
                Filter::Terms {
                    field: field.to_string(),
                    values: values.iter().map(|v| scalar(v)).collect(),
                }
            };
            Ok(if op == "!=" {
                Filter::Not(Box::new(inner))
            } else {
                inner
            })
        }
        "<" | "<=" | ">" | ">=" => {
            let n: i64 = values
                .first()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| format!("'{field} {op}' needs a numeric value"))?;
            let (gte, lt, lte) = match op {
                "<" => (None, Some(n), None),
                "<=" => (None, None, Some(n)),
                ">" => (Some(n + 1), None, None),
                _ => (Some(n), None, None),
            };
            Ok(Filter::Range {
                field: field.to_string(),
                gte,
                lt,
                lte,
            })
        }
        other => Err(format!("Unknown operator {other}")),
    }
}

/// Numbers stay numbers so range/term comparisons work either way.
fn scalar(v: &str) -> Value {
    if let Ok(n) = v.parse::<i64>() {
        json!(n)
    } else {
        json!(v)
    }
}

/// Compiles one expression. Lookup references (`$name`) resolve through
/// the cache, then the store.
pub async fn compile(expression: &str, state: &AppState) -> Result<Filter, String> {
    let tokens = tokenize(expression)?;

    let mut lookups = HashMap::new();
    for token in &tokens {
        if let Token::Lookup(name) = token {
            if lookups.contains_key(name) {
                continue;
            }
            let lookup = match state.auth.lookups.get(name) {
                Some(hit) => hit,
                None => {
                    let fetched = state
                        .stores
                        .db
                        .get_lookup(name)
                        .await
                        .map_err(|e| format!("Lookup ${name}: {e}"))?;
                    state.auth.lookups.put(fetched.clone());
                    fetched
                }
            };
            lookups.insert(name.clone(), lookup.values);
        }
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        lookups,
    };
    let filter = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err("Trailing tokens in expression".to_string());
    }
    Ok(filter)
}

/// A user's query: their expression ANDed with the forced expression their
/// account carries, if any.
pub async fn compile_with_forced(
    expression: Option<&str>,
    forced: Option<&str>,
    state: &AppState,
) -> Result<Filter, String> {
    let mut parts = Vec::new();
    if let Some(forced) = forced {
        if !forced.trim().is_empty() {
            parts.push(compile(forced, state).await?);
        }
    }
    if let Some(expression) = expression {
        if !expression.trim().is_empty() {
            parts.push(compile(expression, state).await?);
        }
    }
    Ok(match parts.len() {
        0 => Filter::MatchAll,
        1 => parts.pop().unwrap(),
        _ => Filter::And(parts),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use owlcap_config::Config;
    use owlcap_store::Lookup;
    use serde_json::json;

    fn test_state() -> std::sync::Arc<AppState> {
        let (state, _db) = AppState::for_tests(Config::default());
        state
    }

    #[tokio::test]
    async fn simple_comparisons() {
        let state = test_state();
        let f = compile("ip.src == 10.0.0.1", &state).await.unwrap();
        assert_eq!(
            f,
            Filter::Term {
                field: "srcIp".to_string(),
                value: json!("10.0.0.1"),
            }
        );

        let f = compile("port == 80", &state).await.unwrap();
        assert!(matches!(f, Filter::Or(ref parts) if parts.len() == 2));
        assert!(f.matches(&json!({ "srcPort": 1234, "dstPort": 80 })));
        assert!(!f.matches(&json!({ "srcPort": 1234, "dstPort": 443 })));
    }

    #[tokio::test]
    async fn boolean_structure_and_negation() {
        let state = test_state();
        let f = compile("ip.src == 10.0.0.1 && !(tags == noise || port.dst < 1024)", &state)
            .await
            .unwrap();
        assert!(f.matches(&json!({ "srcIp": "10.0.0.1", "tags": [], "dstPort": 8080 })));
        assert!(!f.matches(&json!({ "srcIp": "10.0.0.1", "tags": ["noise"], "dstPort": 8080 })));
        assert!(!f.matches(&json!({ "srcIp": "10.0.0.1", "tags": [], "dstPort": 80 })));
    }

    #[tokio::test]
    async fn wildcards_lists_and_exists() {
        let state = test_state();
        let f = compile("host.http == *.example.com", &state).await.unwrap();
        assert!(f.matches(&json!({ "host.http": "www.example.com" })));

        let f = compile("port.dst == [80, 443]", &state).await.unwrap();
        assert!(f.matches(&json!({ "dstPort": 443 })));

        let f = compile("scrubby == EXISTS!", &state).await.unwrap();
        assert!(f.matches(&json!({ "scrubby": "admin" })));
        assert!(!f.matches(&json!({})));
    }

    #[tokio::test]
    async fn lookup_references_resolve() {
        let (state, db) = AppState::for_tests(Config::default());
        db.create_lookup(&Lookup {
            name: "watched".to_string(),
            values: vec!["10.0.0.1".to_string(), "10.0.0.9".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
        let f = compile("ip.src == $watched", &state).await.unwrap();
        assert!(f.matches(&json!({ "srcIp": "10.0.0.9" })));
        assert!(!f.matches(&json!({ "srcIp": "10.0.0.2" })));
    }

    #[tokio::test]
    async fn compile_errors_are_descriptive() {
        let state = test_state();
        assert!(compile("ip.src ==", &state).await.is_err());
        assert!(compile("&& port == 80", &state).await.is_err());
        assert!(compile("ip.src == $missing", &state).await.is_err());
        assert!(compile("port.dst < banana", &state).await.is_err());
    }

    #[tokio::test]
    async fn forced_expression_is_anded_in() {
        let state = test_state();
        let f = compile_with_forced(Some("port == 80"), Some("node == capture01"), &state)
            .await
            .unwrap();
        assert!(f.matches(&json!({ "node": "capture01", "srcPort": 80, "dstPort": 555 })));
        assert!(!f.matches(&json!({ "node": "other", "srcPort": 80, "dstPort": 555 })));
    }
}
