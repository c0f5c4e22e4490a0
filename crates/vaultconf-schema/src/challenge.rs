//! Challenge rules: authentication-profile selection guarded by conditions.
//!
//! Tree shape:
//!
//! ```text
//! challenge_rule = [                      # ordered
//!   { authentication_profile_id = "p1",
//!     rule = {                            # unordered set
//!       { filter = "IpAddress", condition = "OpInCorpIpRange", value = "..." },
//!     } },
//! ]
//! ```
//!
//! Wire shape nests the conditions under each profile pairing and wraps the
//! whole list in a row-set envelope.

use crate::country::CountryLookup;
use crate::rules::RuleValidator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use vaultconf_kernel::{
    RecordBuilder, Result, SetIdentity, TransformError, TreeReader, ValidationError, Value,
};

pub const CHALLENGE_RULES_UNIQUE_KEY: &str = "Condition";
pub const CHALLENGE_RULES_TYPE: &str = "RowSet";

/// Identity fields of a rule condition.
pub const CONDITION_IDENTITY: [&str; 3] = ["filter", "condition", "value"];

pub fn condition_identity() -> SetIdentity {
    SetIdentity::fields(CONDITION_IDENTITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Filter {
    IpAddress,
    IdentityCookie,
    DayOfWeek,
    Date,
    DateRange,
    Time,
    DeviceOs,
    Browser,
    CountryCode,
    Zso,
}

impl Filter {
    pub const ALL: &'static [Filter] = &[
        Filter::IpAddress,
        Filter::IdentityCookie,
        Filter::DayOfWeek,
        Filter::Date,
        Filter::DateRange,
        Filter::Time,
        Filter::DeviceOs,
        Filter::Browser,
        Filter::CountryCode,
        Filter::Zso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::IpAddress => "IpAddress",
            Filter::IdentityCookie => "IdentityCookie",
            Filter::DayOfWeek => "DayOfWeek",
            Filter::Date => "Date",
            Filter::DateRange => "DateRange",
            Filter::Time => "Time",
            Filter::DeviceOs => "DeviceOs",
            Filter::Browser => "Browser",
            Filter::CountryCode => "CountryCode",
            Filter::Zso => "Zso",
        }
    }
}

impl FromStr for Filter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .iter()
            .copied()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownFilter(s.to_string()))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    OpInCorpIpRange,
    OpNotInCorpIpRange,
    OpExists,
    OpNotExists,
    OpIsDayOfWeek,
    OpLessThan,
    OpGreaterThan,
    OpBetween,
    OpEqual,
    OpNotEqual,
    OpIs,
    OpIsNot,
}

impl Condition {
    pub const ALL: &'static [Condition] = &[
        Condition::OpInCorpIpRange,
        Condition::OpNotInCorpIpRange,
        Condition::OpExists,
        Condition::OpNotExists,
        Condition::OpIsDayOfWeek,
        Condition::OpLessThan,
        Condition::OpGreaterThan,
        Condition::OpBetween,
        Condition::OpEqual,
        Condition::OpNotEqual,
        Condition::OpIs,
        Condition::OpIsNot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::OpInCorpIpRange => "OpInCorpIpRange",
            Condition::OpNotInCorpIpRange => "OpNotInCorpIpRange",
            Condition::OpExists => "OpExists",
            Condition::OpNotExists => "OpNotExists",
            Condition::OpIsDayOfWeek => "OpIsDayOfWeek",
            Condition::OpLessThan => "OpLessThan",
            Condition::OpGreaterThan => "OpGreaterThan",
            Condition::OpBetween => "OpBetween",
            Condition::OpEqual => "OpEqual",
            Condition::OpNotEqual => "OpNotEqual",
            Condition::OpIs => "OpIs",
            Condition::OpIsNot => "OpIsNot",
        }
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .iter()
            .copied()
            .find(|condition| condition.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCondition(s.to_string()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(filter, condition, value)` triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChallengeCondition {
    #[serde(rename = "Prop", alias = "Filter")]
    pub filter: Filter,
    #[serde(rename = "Op", alias = "Condition")]
    pub condition: Condition,
    #[serde(rename = "Val", alias = "Value", default)]
    pub value: String,
}

/// A profile selected when all of its conditions hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRule {
    #[serde(rename = "ProfileId", alias = "AuthProfileID", default)]
    pub auth_profile_id: String,
    #[serde(rename = "Conditions", alias = "ChallengeCondition", default)]
    pub conditions: BTreeSet<ChallengeCondition>,
}

/// Row-set envelope around an ordered list of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRules {
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,
    #[serde(rename = "_UniqueKey", default = "default_unique_key")]
    pub unique_key: String,
    #[serde(rename = "_Type", default = "default_rules_type")]
    pub value_type: String,
    #[serde(rename = "_Value", default)]
    pub rules: Vec<ChallengeRule>,
}

fn default_unique_key() -> String {
    CHALLENGE_RULES_UNIQUE_KEY.to_string()
}

fn default_rules_type() -> String {
    CHALLENGE_RULES_TYPE.to_string()
}

impl Default for ChallengeRules {
    fn default() -> Self {
        Self::from_rules(Vec::new())
    }
}

impl ChallengeRules {
    /// Envelope with structural metadata set; enabled when any rule exists.
    pub fn from_rules(rules: Vec<ChallengeRule>) -> Self {
        Self {
            enabled: !rules.is_empty(),
            unique_key: default_unique_key(),
            value_type: default_rules_type(),
            rules,
        }
    }
}

/// Expand a `challenge_rule` list, validating every condition.
///
/// Absent or empty yields `None`.
pub fn expand_challenge_rules(
    parent: &TreeReader<'_>,
    field: &str,
) -> Result<Option<ChallengeRules>> {
    expand_challenge_rules_with(parent, field, &RuleValidator::new())
}

/// [`expand_challenge_rules`] with a caller-supplied validator.
pub fn expand_challenge_rules_with<L: CountryLookup>(
    parent: &TreeReader<'_>,
    field: &str,
    validator: &RuleValidator<L>,
) -> Result<Option<ChallengeRules>> {
    let rules = parent.expand_blocks(field, |rule| expand_rule(rule, validator))?;
    if rules.is_empty() {
        return Ok(None);
    }
    Ok(Some(ChallengeRules::from_rules(rules)))
}

fn expand_rule<L: CountryLookup>(
    rule: &TreeReader<'_>,
    validator: &RuleValidator<L>,
) -> Result<ChallengeRule> {
    let auth_profile_id = rule.string("authentication_profile_id")?;
    let blocks = rule.blocks("rule")?;
    if blocks.is_empty() {
        return Err(TransformError::shape(
            &rule.field_path("rule"),
            "at least one rule condition is required",
        ));
    }

    let mut conditions = BTreeSet::new();
    for block in &blocks {
        let condition = expand_condition(block)?;
        validator
            .validate_condition(&condition)
            .map_err(|err| TransformError::validation(block.path(), err))?;
        conditions.insert(condition);
    }

    Ok(ChallengeRule {
        auth_profile_id,
        conditions,
    })
}

fn expand_condition(block: &TreeReader<'_>) -> Result<ChallengeCondition> {
    let filter = block
        .required_string("filter")?
        .parse()
        .map_err(|err| TransformError::validation(&block.field_path("filter"), err))?;
    let condition = block
        .required_string("condition")?
        .parse()
        .map_err(|err| TransformError::validation(&block.field_path("condition"), err))?;
    Ok(ChallengeCondition {
        filter,
        condition,
        value: block.string("value")?,
    })
}

/// Flatten rules back to the tree's `challenge_rule` list, promoting each
/// rule's conditions to its `rule` set.
pub fn flatten_challenge_rules(rules: &ChallengeRules) -> Vec<Value> {
    rules
        .rules
        .iter()
        .map(|rule| {
            let conditions = rule
                .conditions
                .iter()
                .map(|condition| {
                    Value::Map(
                        RecordBuilder::new()
                            .string("filter", condition.filter.as_str())
                            .string("condition", condition.condition.as_str())
                            .string("value", condition.value.clone())
                            .build(),
                    )
                })
                .collect();
            Value::Map(
                RecordBuilder::new()
                    .string("authentication_profile_id", rule.auth_profile_id.clone())
                    .set("rule", condition_identity(), conditions)
                    .build(),
            )
        })
        .collect()
}

/// Builder helper: write optional rules under `field`.
pub fn with_challenge_rules(
    builder: RecordBuilder,
    field: &str,
    rules: Option<&ChallengeRules>,
) -> RecordBuilder {
    match rules {
        Some(rules) => builder.list(field, flatten_challenge_rules(rules)),
        None => builder,
    }
}
