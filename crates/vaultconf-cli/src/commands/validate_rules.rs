use crate::support::{exit_input_error, exit_transform_error, print_json, read_json_or_exit};
use serde_json::json;
use std::path::PathBuf;
use vaultconf_kernel::{TreeReader, record_from_json};
use vaultconf_schema::{ChallengeRules, RuleValidator, expand_challenge_rules};

/// Wire input is recognized by its `_Value` row set; anything else is a
/// tree.
pub fn run(input: PathBuf, field: String) {
    let raw = read_json_or_exit(&input);

    let rules = if raw.get("_Value").is_some() {
        let rules: ChallengeRules = serde_json::from_value(raw)
            .unwrap_or_else(|e| exit_input_error(format!("invalid wire rules: {e}")));
        RuleValidator::new()
            .validate(&rules)
            .unwrap_or_else(|e| exit_input_error(e));
        Some(rules)
    } else {
        let tree = record_from_json(raw).unwrap_or_else(|| {
            exit_input_error(format!("{} must hold a JSON object", input.display()))
        });
        expand_challenge_rules(&TreeReader::new(&tree), &field)
            .unwrap_or_else(|e| exit_transform_error(e))
    };

    let (rule_count, condition_count) = rules.as_ref().map_or((0, 0), |rules| {
        let conditions = rules.rules.iter().map(|rule| rule.conditions.len()).sum();
        (rules.rules.len(), conditions)
    });
    print_json(&json!({
        "valid": true,
        "rules": rule_count,
        "conditions": condition_count,
    }));
}
