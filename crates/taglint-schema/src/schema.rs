//! Schema: a partial mapping from role name to per-role constraints.
//!
//! Schemas are static configuration. They can be assembled with
//! [`Schema::builder`] or deserialized (the [`RuleSpec`] map form derives
//! `serde::Deserialize`); either way [`Schema`] construction compiles all
//! child patterns and rejects rules that reference roles absent from the
//! schema, so configuration inconsistencies surface at load time instead of
//! mid-traversal.

use crate::pattern::{Pattern, PatternError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors detected while building a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("rule `{rule}`: invalid child pattern: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: PatternError,
    },
    #[error("rule `{rule}` references unknown role `{role}`{}", suggestion_suffix(.suggestion))]
    UnknownRoleReference {
        rule: String,
        role: String,
        suggestion: Option<String>,
    },
    #[error("rule `{rule}`: min_children ({min}) exceeds max_children ({max})")]
    MinExceedsMax { rule: String, min: usize, max: usize },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean `{s}`?)"))
        .unwrap_or_default()
}

/// Declarative constraints for one role, before compilation.
///
/// Absent fields are unconstrained. In YAML form:
///
/// ```yaml
/// L:
///   allowed_children: [Caption, LI]
///   child_pattern: "Caption? LI+"
///   min_children: 1
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default)]
    pub parent_must_be: Option<Vec<String>>,
    #[serde(default)]
    pub allowed_children: Option<Vec<String>>,
    #[serde(default)]
    pub min_children: Option<usize>,
    #[serde(default)]
    pub max_children: Option<usize>,
    #[serde(default)]
    pub child_pattern: Option<String>,
}

impl RuleSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parents<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_must_be = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn children<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_children = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn min(mut self, min: usize) -> Self {
        self.min_children = Some(min);
        self
    }

    #[must_use]
    pub const fn max(mut self, max: usize) -> Self {
        self.max_children = Some(max);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.child_pattern = Some(pattern.into());
        self
    }
}

/// Compiled constraints for one role.
#[derive(Debug, Clone)]
pub struct SchemaRule {
    parent_must_be: Option<HashSet<String>>,
    allowed_children: Option<HashSet<String>>,
    min_children: Option<usize>,
    max_children: Option<usize>,
    child_pattern: Option<Arc<Pattern>>,
}

impl SchemaRule {
    #[must_use]
    pub const fn parent_must_be(&self) -> Option<&HashSet<String>> {
        self.parent_must_be.as_ref()
    }

    #[must_use]
    pub const fn allowed_children(&self) -> Option<&HashSet<String>> {
        self.allowed_children.as_ref()
    }

    #[must_use]
    pub const fn min_children(&self) -> Option<usize> {
        self.min_children
    }

    #[must_use]
    pub const fn max_children(&self) -> Option<usize> {
        self.max_children
    }

    #[must_use]
    pub fn child_pattern(&self) -> Option<&Pattern> {
        self.child_pattern.as_deref()
    }

    /// True when a child with `role` is permitted by `allowed_children`.
    /// Unconstrained rules permit everything.
    #[must_use]
    pub fn permits_child(&self, role: &str) -> bool {
        self.allowed_children
            .as_ref()
            .is_none_or(|set| set.contains(role))
    }
}

/// Immutable role-to-rule mapping for one processing session.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: HashMap<String, SchemaRule>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build from a deserialized role-to-spec map, compiling patterns and
    /// validating role references.
    pub fn from_specs(specs: BTreeMap<String, RuleSpec>) -> Result<Self, SchemaError> {
        let mut builder = Self::builder();
        for (role, spec) in specs {
            builder = builder.rule(role, spec);
        }
        builder.build()
    }

    #[must_use]
    pub fn lookup(&self, role: &str) -> Option<&SchemaRule> {
        self.rules.get(role)
    }

    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.rules.contains_key(role)
    }

    /// All roles the schema knows about.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Closest known role to `role`, for "did you mean" messages.
    #[must_use]
    pub fn closest_role(&self, role: &str) -> Option<&str> {
        self.roles()
            .map(|known| (known, strsim::jaro_winkler(role, known)))
            .filter(|(_, score)| *score >= 0.8)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(known, _)| known)
    }

    /// Built-in schema covering the common document roles.
    ///
    /// Deliberately permissive outside of lists and tables; the point is to
    /// catch structural damage, not to re-implement a full conformance
    /// matrix.
    #[must_use]
    pub fn recommended() -> Self {
        let grouping = ["Part", "Sect", "H1", "H2", "H3", "P", "L", "Table", "Figure", "Link"];
        let inline = ["Span", "Link", "Figure"];
        Self::builder()
            .rule("Document", RuleSpec::new().children(grouping).min(1))
            .rule("Part", RuleSpec::new().children(grouping))
            .rule("Sect", RuleSpec::new().children(grouping))
            .rule("H1", RuleSpec::new().children(inline))
            .rule("H2", RuleSpec::new().children(inline))
            .rule("H3", RuleSpec::new().children(inline))
            .rule("P", RuleSpec::new().children(inline))
            .rule(
                "L",
                RuleSpec::new()
                    .children(["Caption", "LI"])
                    .pattern("Caption? LI+")
                    .min(1),
            )
            .rule(
                "LI",
                RuleSpec::new()
                    .parents(["L"])
                    .children(["Lbl", "LBody"])
                    .pattern("Lbl? LBody+"),
            )
            .rule("Lbl", RuleSpec::new().parents(["LI"]))
            .rule("LBody", RuleSpec::new().parents(["LI"]))
            .rule(
                "Table",
                RuleSpec::new()
                    .children(["Caption", "TR"])
                    .pattern("Caption? TR+")
                    .min(1),
            )
            .rule(
                "TR",
                RuleSpec::new()
                    .parents(["Table"])
                    .children(["TH", "TD"])
                    .pattern("(TH|TD)+")
                    .min(1),
            )
            .rule("TH", RuleSpec::new().parents(["TR"]))
            .rule("TD", RuleSpec::new().parents(["TR"]))
            .rule("Caption", RuleSpec::new().parents(["L", "Table", "Figure"]))
            .rule("Figure", RuleSpec::new())
            .rule("Link", RuleSpec::new())
            .rule("Span", RuleSpec::new())
            .build()
            .expect("recommended schema is statically valid")
    }
}

/// Incremental schema assembly; `build` compiles and validates.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    specs: Vec<(String, RuleSpec)>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn rule(mut self, role: impl Into<String>, spec: RuleSpec) -> Self {
        self.specs.push((role.into(), spec));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let keys: HashSet<String> = self.specs.iter().map(|(role, _)| role.clone()).collect();
        // Patterns are cached by source string; rules frequently share one.
        let mut pattern_cache: HashMap<String, Arc<Pattern>> = HashMap::new();
        let mut rules = HashMap::new();

        for (role, spec) in self.specs {
            if let (Some(min), Some(max)) = (spec.min_children, spec.max_children) {
                if min > max {
                    return Err(SchemaError::MinExceedsMax { rule: role, min, max });
                }
            }

            let child_pattern = match spec.child_pattern {
                Some(source) => Some(compile_cached(&mut pattern_cache, &role, source)?),
                None => None,
            };

            for referenced in spec
                .parent_must_be
                .iter()
                .flatten()
                .chain(spec.allowed_children.iter().flatten())
            {
                check_reference(&keys, &role, referenced)?;
            }
            if let Some(pattern) = &child_pattern {
                for literal in pattern.literals() {
                    check_reference(&keys, &role, literal)?;
                }
            }

            rules.insert(
                role,
                SchemaRule {
                    parent_must_be: spec.parent_must_be.map(|v| v.into_iter().collect()),
                    allowed_children: spec.allowed_children.map(|v| v.into_iter().collect()),
                    min_children: spec.min_children,
                    max_children: spec.max_children,
                    child_pattern,
                },
            );
        }

        Ok(Schema { rules })
    }
}

fn compile_cached(
    cache: &mut HashMap<String, Arc<Pattern>>,
    rule: &str,
    source: String,
) -> Result<Arc<Pattern>, SchemaError> {
    if let Some(compiled) = cache.get(&source) {
        return Ok(Arc::clone(compiled));
    }
    let compiled = Pattern::compile(&source).map_err(|e| SchemaError::Pattern {
        rule: rule.to_string(),
        source: e,
    })?;
    let compiled = Arc::new(compiled);
    cache.insert(source, Arc::clone(&compiled));
    Ok(compiled)
}

fn check_reference(keys: &HashSet<String>, rule: &str, role: &str) -> Result<(), SchemaError> {
    if keys.contains(role) {
        return Ok(());
    }
    let suggestion = keys
        .iter()
        .map(|known| (known, strsim::jaro_winkler(role, known)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(known, _)| known.clone());
    Err(SchemaError::UnknownRoleReference {
        rule: rule.to_string(),
        role: role.to_string(),
        suggestion,
    })
}
