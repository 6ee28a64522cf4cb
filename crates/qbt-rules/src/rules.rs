//! Rule set loading.
//!
//! The rules file is YAML:
//!
//! ```yaml
//! defaults:
//!   category: misc
//!   up_limit_kib: 100
//! rules:
//!   - match: tracker.example.com
//!     category: movies
//!     up_limit_kib: 500
//!   - match_regex: 'example\.org$'
//!     category: tv
//! ```
//!
//! Values are coerced on a best-effort basis: a field that cannot be coerced is treated as absent.

use std::{fs, io, path::Path};

use regex::Regex;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::{error::RulesError, hosts::normalize_hostname};

/// Regular expression condition of a rule.
#[derive(Debug, Clone)]
pub enum HostPattern {
    /// A compiled pattern, searched anywhere in the hostname.
    Valid(Regex),
    /// A pattern that failed to compile. It never matches.
    Invalid(String),
}

/// A single match condition and the settings it applies.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    /// Hostname compared for equality.
    pub host: Option<String>,
    /// Pattern searched in the hostname when `host` is absent or different.
    pub pattern: Option<HostPattern>,
    /// Category to assign.
    pub category: Option<String>,
    /// Upload limit in KiB/s.
    pub up_limit_kib: Option<i64>,
}

impl Rule {
    /// Returns true if the rule applies to `host`.
    pub fn matches(&self, host: &str) -> bool {
        if self.host.as_deref() == Some(host) {
            return true;
        }
        match &self.pattern {
            Some(HostPattern::Valid(regex)) => regex.is_match(host),
            Some(HostPattern::Invalid(_)) | None => false,
        }
    }

    fn from_value(value: &Value) -> Self {
        let pattern = string_field(value, "match_regex").map(|pattern| {
            match Regex::new(&pattern) {
                Ok(regex) => HostPattern::Valid(regex),
                Err(e) => {
                    warn!("Skipping rule with invalid regex {pattern:?}: {e}");
                    HostPattern::Invalid(pattern)
                }
            }
        });

        Self {
            host: string_field(value, "match").map(|host| normalize_hostname(&host)),
            pattern,
            category: string_field(value, "category"),
            up_limit_kib: value.get("up_limit_kib").and_then(coerce_int),
        }
    }
}

/// Settings applied when no rule matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    /// Fallback category.
    pub category: Option<String>,
    /// Fallback upload limit in KiB/s.
    pub up_limit_kib: Option<i64>,
}

/// Ordered rules plus fallback defaults. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    defaults: Defaults,
}

impl RuleSet {
    /// Builds a rule set from already coerced parts.
    pub fn new(rules: Vec<Rule>, defaults: Defaults) -> Self {
        Self { rules, defaults }
    }

    /// Reads and parses the rules file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RulesError::NotFound(path.to_path_buf()),
            _ => RulesError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let rule_set = Self::from_yaml(&data)?;
        debug!(
            "Loaded {} rules from {}",
            rule_set.rules.len(),
            path.display()
        );
        Ok(rule_set)
    }

    /// Parses a rules document. An empty document is an empty rule set.
    pub fn from_yaml(data: &str) -> Result<Self, RulesError> {
        if is_blank_document(data) {
            return Ok(Self::default());
        }
        let document: Value = serde_yaml::from_str(data)?;
        match document {
            Value::Null => Ok(Self::default()),
            Value::Mapping(_) => Ok(Self::from_document(&document)),
            _ => Err(RulesError::NotAMapping),
        }
    }

    fn from_document(document: &Value) -> Self {
        let defaults = match document.get("defaults") {
            Some(defaults @ Value::Mapping(_)) => Defaults {
                category: string_field(defaults, "category"),
                up_limit_kib: defaults.get("up_limit_kib").and_then(coerce_int),
            },
            Some(Value::Null) | None => Defaults::default(),
            Some(_) => {
                warn!("Ignoring `defaults`, expected a mapping");
                Defaults::default()
            }
        };

        let rules = match document.get("rules") {
            Some(Value::Sequence(rules)) => rules
                .iter()
                .enumerate()
                .filter_map(|(index, rule)| match rule {
                    Value::Mapping(_) => Some(Rule::from_value(rule)),
                    _ => {
                        warn!("Ignoring rule #{index}, expected a mapping");
                        None
                    }
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                warn!("Ignoring `rules`, expected a list");
                Vec::new()
            }
        };

        Self { rules, defaults }
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Fallback settings.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }
}

/// True when the document holds nothing but comments and markers.
fn is_blank_document(data: &str) -> bool {
    data.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Reads `key` as a non-empty string. Scalars are rendered to text.
fn string_field(value: &Value, key: &str) -> Option<String> {
    let text = match value.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => return string_field_of(&tagged.value),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_field_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Coerces a scalar to an integer: floats truncate, booleans are 0/1, strings are parsed.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Tagged(tagged) => coerce_int(&tagged.value),
        _ => None,
    }
}
