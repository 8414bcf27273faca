use std::iter::Peekable;
use std::str::Chars;

use serde::{Deserialize, Serialize};

/// Connection metadata with secrets redacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub instance: Option<String>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Redact secrets from an ADO.NET-style connection string
/// (`Server=tcp:host,1433;Database=db;User Id=sa;Password=...`) while
/// extracting non-sensitive metadata.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let mut user = None;
    let mut host = None;
    let mut port = None;
    let mut instance = None;
    let mut database = None;
    let mut redacted_pairs = Vec::new();

    for (key, value) in split_pairs(conn) {
        let key = key.as_str();
        if is_sensitive_key(key) {
            redacted_pairs.push(format!("{key}=***"));
            continue;
        }
        redacted_pairs.push(format!("{key}={value}"));
        let value = unquote(&value);
        let value = value.as_str();

        match key.to_ascii_lowercase().as_str() {
            "server" | "data source" | "address" | "addr" => {
                let (parsed_host, parsed_instance, parsed_port) = parse_server(value);
                host = parsed_host;
                instance = parsed_instance;
                port = parsed_port;
            }
            "database" | "initial catalog" => {
                if !value.is_empty() {
                    database = Some(value.to_string());
                }
            }
            "user id" | "uid" | "user" | "username" => {
                if !value.is_empty() {
                    user = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    let engine = if host.is_some() {
        Some("mssql".to_string())
    } else {
        None
    };

    RedactedConnection {
        engine,
        user,
        host,
        port,
        instance,
        database,
        redacted: redacted_pairs.join(";"),
    }
}

/// Split a connection string into trimmed key/value pairs. Values wrapped in
/// `{...}`, `"..."` or `'...'` may contain `;`, and a doubled closing
/// delimiter inside them is an escape.
fn split_pairs(conn: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = conn.chars().peekable();
    while chars.peek().is_some() {
        let mut key = String::new();
        let mut has_value = false;
        for c in chars.by_ref() {
            match c {
                '=' => {
                    has_value = true;
                    break;
                }
                ';' => break,
                _ => key.push(c),
            }
        }
        let value = if has_value {
            read_value(&mut chars)
        } else {
            String::new()
        };
        let key = key.trim();
        if !key.is_empty() {
            pairs.push((key.to_string(), value));
        }
    }
    pairs
}

fn read_value(chars: &mut Peekable<Chars<'_>>) -> String {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}

    let mut value = String::new();
    let close = match chars.peek() {
        Some('{') => Some('}'),
        Some('"') => Some('"'),
        Some('\'') => Some('\''),
        _ => None,
    };
    if let Some(close) = close {
        if let Some(open) = chars.next() {
            value.push(open);
        }
        while let Some(c) = chars.next() {
            value.push(c);
            if c == close {
                if chars.next_if_eq(&close).is_some() {
                    value.push(close);
                    continue;
                }
                break;
            }
        }
    }
    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
        value.push(c);
    }
    value.trim().to_string()
}

/// Strip a wrapping delimiter pair and collapse its doubled escapes.
fn unquote(value: &str) -> String {
    for (open, close) in [('{', '}'), ('"', '"'), ('\'', '\'')] {
        if let Some(inner) = value
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            let doubled = format!("{close}{close}");
            return inner.replace(&doubled, &close.to_string());
        }
    }
    value.to_string()
}

fn parse_server(value: &str) -> (Option<String>, Option<String>, Option<u16>) {
    let value = value.strip_prefix("tcp:").unwrap_or(value);
    let (host_instance, port) = match value.split_once(',') {
        Some((left, right)) => (left, right.trim().parse::<u16>().ok()),
        None => (value, None),
    };
    let (host, instance) = match host_instance.split_once('\\') {
        Some((host, instance)) => (host, Some(instance.to_string())),
        None => (host_instance, None),
    };

    let host = host.trim();
    let host = if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    };
    (host, instance, port)
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pwd" | "pass" | "token" | "access token"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_and_extracts_metadata() {
        let conn = "Server=tcp:db.local,1433;Database=shop;User Id=sa;Password=secret;TrustServerCertificate=true";
        let redacted = redact_connection_string(conn);
        assert!(redacted.redacted.contains("Password=***"));
        assert!(!redacted.redacted.contains("secret"));
        assert!(redacted.redacted.contains("TrustServerCertificate=true"));
        assert_eq!(redacted.engine.as_deref(), Some("mssql"));
        assert_eq!(redacted.user.as_deref(), Some("sa"));
        assert_eq!(redacted.host.as_deref(), Some("db.local"));
        assert_eq!(redacted.port, Some(1433));
        assert_eq!(redacted.database.as_deref(), Some("shop"));
    }

    #[test]
    fn parses_named_instance() {
        let conn = "Data Source=localhost\\SQLEXPRESS;Initial Catalog=crm;PWD=hunter2";
        let redacted = redact_connection_string(conn);
        assert_eq!(redacted.host.as_deref(), Some("localhost"));
        assert_eq!(redacted.instance.as_deref(), Some("SQLEXPRESS"));
        assert_eq!(redacted.database.as_deref(), Some("crm"));
        assert!(redacted.redacted.contains("PWD=***"));
    }

    #[test]
    fn braced_password_with_separator_stays_hidden() {
        let conn = "Server=tcp:db,1433;Database=shop;User Id=sa;Password={hunter;2secret}";
        let redacted = redact_connection_string(conn);
        assert_eq!(
            redacted.redacted,
            "Server=tcp:db,1433;Database=shop;User Id=sa;Password=***"
        );
        assert!(!redacted.redacted.contains("2secret"));
    }

    #[test]
    fn delimited_values_honor_escapes() {
        let conn = "Pwd={a}};b};Server=db;Database='my;db';User Id=\"o\"\"neil\"";
        let redacted = redact_connection_string(conn);
        assert!(redacted.redacted.starts_with("Pwd=***;Server=db;"));
        assert!(!redacted.redacted.contains("b}"));
        assert_eq!(redacted.host.as_deref(), Some("db"));
        assert_eq!(redacted.database.as_deref(), Some("my;db"));
        assert_eq!(redacted.user.as_deref(), Some("o\"neil"));
    }
}
