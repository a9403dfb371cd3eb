//! `${VAR}` substitution in config string values.
//!
//! Names are uppercase `[A-Z_][A-Z0-9_]*`. A doubled dollar (`$${VAR}`) is an
//! escape and yields the literal text `${VAR}`. Unset and empty variables are
//! both treated as missing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Group 1 is the escaping `$`, group 2 the variable name.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$)?\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Resolve references against the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, MissingEnvVarError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Resolve references against `env` instead of the process environment.
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, MissingEnvVarError> {
    let mut path = Vec::new();
    walk(value, env, &mut path)
}

fn walk(
    value: &Value,
    env: &HashMap<String, String>,
    path: &mut Vec<String>,
) -> Result<Value, MissingEnvVarError> {
    Ok(match value {
        Value::String(s) => Value::String(expand(s, env, path)?),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(format!("[{i}]"));
                out.push(walk(item, env, path)?);
                path.pop();
            }
            Value::Array(out)
        }
        Value::Object(fields) => {
            let mut out = Map::new();
            for (key, field) in fields {
                path.push(key.clone());
                out.insert(key.clone(), walk(field, env, path)?);
                path.pop();
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn expand(s: &str, env: &HashMap<String, String>, path: &[String]) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let expanded = REFERENCE.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{name}}}");
        }
        match env.get(name).filter(|v| !v.is_empty()) {
            Some(v) => v.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(MissingEnvVarError {
            var_name,
            config_path: render_path(path),
        }),
        None => Ok(expanded.into_owned()),
    }
}

/// `["media", "fontPath"]` → `media.fontPath`; array indices attach directly.
fn render_path(path: &[String]) -> String {
    let mut out = String::new();
    for segment in path {
        if !out.is_empty() && !segment.starts_with('[') {
            out.push('.');
        }
        out.push_str(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_discord_token() {
        let v = json!({"discord": {"token": "${DISCORD_TOKEN}"}});
        let env = env(&[("DISCORD_TOKEN", "MTA.abc.def")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["discord"]["token"], "MTA.abc.def");
    }

    #[test]
    fn substitutes_inside_longer_strings() {
        let v = json!({"media": {"fontPath": "${ASSETS}/fonts/${FONT}.ttf"}});
        let env = env(&[("ASSETS", "/srv/gifsmith"), ("FONT", "impact")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["media"]["fontPath"], "/srv/gifsmith/fonts/impact.ttf");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"media": {"tempDir": "${GIFSMITH_TMP}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        assert_eq!(err.var_name, "GIFSMITH_TMP");
        assert_eq!(err.config_path, "media.tempDir");
    }

    #[test]
    fn empty_var_counts_as_missing() {
        let v = json!({"list": ["ok", "${EMPTY}"]});
        let err = resolve_env_vars_with(&v, &env(&[("EMPTY", "")])).unwrap_err();
        assert_eq!(err.config_path, "list[1]");
    }

    #[test]
    fn escaped_reference_is_kept_literal() {
        let v = json!({"k": "$${NOT_A_VAR}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["k"], "${NOT_A_VAR}");
    }

    #[test]
    fn passthrough_non_var_strings_and_numbers() {
        let v = json!({"key": "plain $HOME", "lower": "${home}", "n": 4});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "plain $HOME");
        assert_eq!(result["lower"], "${home}");
        assert_eq!(result["n"], 4);
    }
}
