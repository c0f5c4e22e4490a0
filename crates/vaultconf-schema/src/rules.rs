//! Challenge rule validation.
//!
//! Each filter admits a closed set of conditions, and three filters further
//! constrain the value. The table below is the whole language; any pair
//! outside it is rejected.
//!
//! | filter         | conditions                           | value            |
//! |----------------|--------------------------------------|------------------|
//! | IpAddress      | OpInCorpIpRange, OpNotInCorpIpRange  | free-form        |
//! | IdentityCookie | OpExists, OpNotExists                | ignored          |
//! | DayOfWeek      | OpIsDayOfWeek                        | free-form        |
//! | Date           | OpLessThan, OpGreaterThan            | free-form        |
//! | DateRange      | OpBetween                            | free-form        |
//! | Time           | OpBetween                            | free-form        |
//! | DeviceOs       | OpEqual, OpNotEqual                  | device OS names  |
//! | Browser        | OpEqual, OpNotEqual                  | browser names    |
//! | CountryCode    | OpEqual, OpNotEqual                  | ISO-3166 alpha-2 |
//! | Zso            | OpIs, OpIsNot                        | free-form        |

use crate::challenge::{ChallengeCondition, ChallengeRules, Condition, Filter};
use crate::country::{CountryLookup, Iso3166};
use vaultconf_kernel::ValidationError;

pub const DEVICE_OS_VALUES: &[&str] =
    &["iOS", "Android", "WindowsMobile", "Mac", "Windows", "Linux"];

pub const BROWSER_VALUES: &[&str] =
    &["Other", "Chrome", "Firefox", "IE", "Safari", "MicrosoftEdge"];

/// Conditions a filter accepts.
pub fn allowed_conditions(filter: Filter) -> &'static [Condition] {
    match filter {
        Filter::IpAddress => &[Condition::OpInCorpIpRange, Condition::OpNotInCorpIpRange],
        Filter::IdentityCookie => &[Condition::OpExists, Condition::OpNotExists],
        Filter::DayOfWeek => &[Condition::OpIsDayOfWeek],
        Filter::Date => &[Condition::OpLessThan, Condition::OpGreaterThan],
        Filter::DateRange | Filter::Time => &[Condition::OpBetween],
        Filter::DeviceOs | Filter::Browser | Filter::CountryCode => {
            &[Condition::OpEqual, Condition::OpNotEqual]
        }
        Filter::Zso => &[Condition::OpIs, Condition::OpIsNot],
    }
}

/// Validates challenge conditions against the filter table.
#[derive(Debug, Clone, Default)]
pub struct RuleValidator<L = Iso3166> {
    countries: L,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: CountryLookup> RuleValidator<L> {
    pub fn with_lookup(countries: L) -> Self {
        Self { countries }
    }

    /// Check every condition of every rule; the first violation wins.
    pub fn validate(&self, rules: &ChallengeRules) -> Result<(), ValidationError> {
        rules
            .rules
            .iter()
            .flat_map(|rule| rule.conditions.iter())
            .try_for_each(|condition| self.validate_condition(condition))
    }

    pub fn validate_condition(
        &self,
        condition: &ChallengeCondition,
    ) -> Result<(), ValidationError> {
        let allowed = allowed_conditions(condition.filter);
        if !allowed.contains(&condition.condition) {
            return Err(ValidationError::UnsupportedCondition {
                filter: condition.filter.as_str().to_string(),
                condition: condition.condition.as_str().to_string(),
                expected: allowed.iter().map(|c| c.as_str().to_string()).collect(),
            });
        }

        match condition.filter {
            Filter::DeviceOs => require_one_of(condition, DEVICE_OS_VALUES),
            Filter::Browser => require_one_of(condition, BROWSER_VALUES),
            Filter::CountryCode => {
                let value = condition.value.as_str();
                if value.chars().count() == 2 && self.countries.by_name(value) {
                    Ok(())
                } else {
                    Err(ValidationError::ValueOutOfDomain {
                        filter: condition.filter.as_str().to_string(),
                        value: value.to_string(),
                        expected: "a 2-letter ISO-3166 country code".to_string(),
                    })
                }
            }
            _ => Ok(()),
        }
    }
}

fn require_one_of(condition: &ChallengeCondition, domain: &[&str]) -> Result<(), ValidationError> {
    if domain.contains(&condition.value.as_str()) {
        return Ok(());
    }
    Err(ValidationError::ValueOutOfDomain {
        filter: condition.filter.as_str().to_string(),
        value: condition.value.clone(),
        expected: format!("one of [{}]", domain.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeRule;
    use std::collections::BTreeSet;

    fn cond(filter: Filter, condition: Condition, value: &str) -> ChallengeCondition {
        ChallengeCondition {
            filter,
            condition,
            value: value.to_string(),
        }
    }

    fn in_domain_value(filter: Filter) -> &'static str {
        match filter {
            Filter::DeviceOs => "Android",
            Filter::Browser => "Chrome",
            Filter::CountryCode => "US",
            _ => "anything",
        }
    }

    #[test]
    fn accepts_every_listed_pair_with_in_domain_value() {
        let validator = RuleValidator::new();
        for filter in Filter::ALL {
            for condition in allowed_conditions(*filter) {
                let c = cond(*filter, *condition, in_domain_value(*filter));
                assert!(
                    validator.validate_condition(&c).is_ok(),
                    "{filter:?}/{condition:?} should be accepted"
                );
            }
        }
    }

    #[test]
    fn rejects_every_unlisted_pair() {
        let validator = RuleValidator::new();
        for filter in Filter::ALL {
            for condition in Condition::ALL {
                if allowed_conditions(*filter).contains(condition) {
                    continue;
                }
                let c = cond(*filter, *condition, in_domain_value(*filter));
                let err = validator.validate_condition(&c).unwrap_err();
                assert!(
                    matches!(err, ValidationError::UnsupportedCondition { .. }),
                    "{filter:?}/{condition:?} should be rejected"
                );
            }
        }
    }

    #[test]
    fn rejects_out_of_domain_device_os() {
        let err = RuleValidator::new()
            .validate_condition(&cond(Filter::DeviceOs, Condition::OpEqual, "PalmOS"))
            .unwrap_err();
        match err {
            ValidationError::ValueOutOfDomain { value, expected, .. } => {
                assert_eq!(value, "PalmOS");
                assert!(expected.contains("WindowsMobile"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn country_code_needs_two_recognized_letters() {
        let validator = RuleValidator::new();
        assert!(validator
            .validate_condition(&cond(Filter::CountryCode, Condition::OpEqual, "USA"))
            .is_err());
        assert!(validator
            .validate_condition(&cond(Filter::CountryCode, Condition::OpNotEqual, "ZZ"))
            .is_err());
        assert!(validator
            .validate_condition(&cond(Filter::CountryCode, Condition::OpNotEqual, "DE"))
            .is_ok());
    }

    #[test]
    fn identity_cookie_ignores_value() {
        assert!(RuleValidator::new()
            .validate_condition(&cond(Filter::IdentityCookie, Condition::OpExists, ""))
            .is_ok());
    }

    struct OnlyNordics;

    impl CountryLookup for OnlyNordics {
        fn by_name(&self, code: &str) -> bool {
            matches!(code, "NO" | "SE" | "FI" | "DK" | "IS")
        }
    }

    #[test]
    fn country_lookup_is_substitutable() {
        let validator = RuleValidator::with_lookup(OnlyNordics);
        assert!(validator
            .validate_condition(&cond(Filter::CountryCode, Condition::OpEqual, "SE"))
            .is_ok());
        assert!(validator
            .validate_condition(&cond(Filter::CountryCode, Condition::OpEqual, "US"))
            .is_err());
    }

    #[test]
    fn empty_rules_are_valid() {
        assert!(RuleValidator::new().validate(&ChallengeRules::default()).is_ok());
    }

    #[test]
    fn first_violation_wins() {
        let rules = ChallengeRules::from_rules(vec![ChallengeRule {
            auth_profile_id: "p1".into(),
            conditions: BTreeSet::from([
                cond(Filter::Browser, Condition::OpEqual, "Netscape"),
                cond(Filter::IpAddress, Condition::OpBetween, "x"),
            ]),
        }]);
        // Conditions are ordered by filter, so IpAddress is checked first.
        let err = RuleValidator::new().validate(&rules).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedCondition { .. }));
    }
}
