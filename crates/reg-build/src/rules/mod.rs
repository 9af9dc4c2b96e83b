//! Manifest lint rules.
//!
//! A rule inspects either the whole manifest or one item at a time and
//! returns messages. Its configured level decides what the messages mean:
//! `off` skips the rule, `warn` reports and continues, `error` fails the
//! build once every rule has run.

mod builtin;

use std::collections::BTreeMap;

use reg_manifest::{Manifest, ResolvedItem, RuleLevel, RuleSetting};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub use builtin::{builtin_rules, find_cycle, unused_items};

/// What a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Global,
    Item,
}

type GlobalCheck = fn(&Manifest, &RuleOptions) -> Vec<String>;
type ItemCheck = fn(&ResolvedItem, &Manifest, &RuleOptions) -> Vec<String>;

#[derive(Clone, Copy)]
enum Check {
    Global(GlobalCheck),
    Item(ItemCheck),
}

/// A named check with a default level.
#[derive(Clone)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
    pub default_level: RuleLevel,
    check: Check,
}

impl Rule {
    pub fn global(
        name: &'static str,
        description: &'static str,
        default_level: RuleLevel,
        check: GlobalCheck,
    ) -> Self {
        Self {
            name,
            description,
            default_level,
            check: Check::Global(check),
        }
    }

    pub fn item(
        name: &'static str,
        description: &'static str,
        default_level: RuleLevel,
        check: ItemCheck,
    ) -> Self {
        Self {
            name,
            description,
            default_level,
            check: Check::Item(check),
        }
    }

    pub fn scope(&self) -> RuleScope {
        match self.check {
            Check::Global(_) => RuleScope::Global,
            Check::Item(_) => RuleScope::Item,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("scope", &self.scope())
            .field("default_level", &self.default_level)
            .finish()
    }
}

/// Options passed to a rule from its configuration entry.
#[derive(Debug, Clone, Default)]
pub struct RuleOptions {
    values: Map<String, Value>,
}

impl RuleOptions {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.values
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }

    pub fn get_strings(&self, key: &str) -> Option<Vec<String>> {
        self.values.get(key).and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMessage {
    pub rule: String,
    pub item: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RuleMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.item {
            Some(item) => write!(f, "[{}] {}: {}", self.rule, item, self.message),
            None => write!(f, "[{}] {}", self.rule, self.message),
        }
    }
}

/// Messages accumulated over both passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleReport {
    pub warnings: Vec<RuleMessage>,
    pub errors: Vec<RuleMessage>,
}

impl RuleReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The warnings, or a validation error listing every error.
    pub fn into_result(self) -> Result<Vec<RuleMessage>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(Error::Validation {
                errors: self.errors.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

/// An ordered rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run every enabled rule: global rules first, then item rules for
    /// each item in manifest order.
    pub fn run(
        &self,
        manifest: &Manifest,
        settings: &BTreeMap<String, RuleSetting>,
    ) -> RuleReport {
        for name in settings.keys() {
            if !self.rules.iter().any(|r| r.name == name.as_str()) {
                tracing::warn!(rule = %name, "unknown rule in configuration");
            }
        }

        let enabled: Vec<(&Rule, RuleLevel, RuleOptions)> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let setting = settings.get(rule.name);
                let level = setting.map_or(rule.default_level, RuleSetting::level);
                if level == RuleLevel::Off {
                    return None;
                }
                let options = setting
                    .and_then(RuleSetting::options)
                    .cloned()
                    .map(RuleOptions::new)
                    .unwrap_or_default();
                Some((rule, level, options))
            })
            .collect();

        let mut report = RuleReport::default();

        for (rule, level, options) in &enabled {
            if let Check::Global(check) = rule.check {
                for message in check(manifest, options) {
                    push(&mut report, *level, rule.name, None, message);
                }
            }
        }

        for (rule, level, options) in &enabled {
            if let Check::Item(check) = rule.check {
                for item in &manifest.items {
                    for message in check(item, manifest, options) {
                        push(&mut report, *level, rule.name, Some(&item.name), message);
                    }
                }
            }
        }

        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }
        for error in &report.errors {
            tracing::error!("{}", error);
        }
        report
    }
}

fn push(
    report: &mut RuleReport,
    level: RuleLevel,
    rule: &str,
    item: Option<&str>,
    message: String,
) {
    let entry = RuleMessage {
        rule: rule.to_string(),
        item: item.map(str::to_string),
        message,
    };
    match level {
        RuleLevel::Error => report.errors.push(entry),
        RuleLevel::Warn => report.warnings.push(entry),
        RuleLevel::Off => {}
    }
}
