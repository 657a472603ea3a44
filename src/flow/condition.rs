// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conditions on cloud variable values.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::cloud::VariableValue;
use crate::error::FlowError;

/// The comparison a variable condition performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    /// The variable has a value.
    Known,
    /// Text contains the condition value.
    StringContains,
    /// Text equals the condition value.
    StringEquals,
    /// Boolean equals `true` or `false`.
    BooleanEquals,
    /// Number equals the condition value.
    NumberEquals,
    /// Text sorts after the condition value.
    StringAbove,
    /// Text sorts before the condition value.
    StringBelow,
    /// Number is greater than the condition value.
    NumberAbove,
    /// Number is less than the condition value.
    NumberBelow,
}

impl ConditionType {
    /// Every condition type, in the order offered to the user.
    pub const ALL: [Self; 9] = [
        Self::Known,
        Self::StringContains,
        Self::StringEquals,
        Self::BooleanEquals,
        Self::NumberEquals,
        Self::StringAbove,
        Self::StringBelow,
        Self::NumberAbove,
        Self::NumberBelow,
    ];

    /// Identifier used by the flow card.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Known => "known",
            Self::StringContains => "string.contains",
            Self::StringEquals => "string.equals",
            Self::BooleanEquals => "boolean.equals",
            Self::NumberEquals => "number.equals",
            Self::StringAbove => "string.above",
            Self::StringBelow => "string.below",
            Self::NumberAbove => "number.above",
            Self::NumberBelow => "number.below",
        }
    }

    /// Label shown in the condition list.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Known => "Is known",
            Self::StringContains => "Contains",
            Self::StringEquals => "Equals (string)",
            Self::BooleanEquals => "Equals (boolean)",
            Self::NumberEquals => "Equals (number)",
            Self::StringAbove => "Above (alphabetic)",
            Self::StringBelow => "Below (alphabetic)",
            Self::NumberAbove => "Above (number)",
            Self::NumberBelow => "Below (number)",
        }
    }

    const fn is_numeric(self) -> bool {
        matches!(self, Self::NumberEquals | Self::NumberAbove | Self::NumberBelow)
    }
}

impl FromStr for ConditionType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| FlowError::UnknownCondition(s.to_string()))
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A validated condition on a variable value.
///
/// The condition value is compared in lower case. Boolean and numeric
/// conditions check their value up front, so a bad argument is rejected
/// before the device is ever asked.
///
/// # Examples
///
/// ```
/// use particle_bridge::flow::VariableCondition;
/// use serde_json::json;
///
/// let above = VariableCondition::parse("number.above", "20").unwrap();
/// assert!(above.evaluate(Some(&json!(21.5))));
/// assert!(!above.evaluate(None));
///
/// let contains = VariableCondition::parse("string.contains", "OPEN").unwrap();
/// assert!(contains.evaluate(Some(&json!("Door Open"))));
///
/// assert!(VariableCondition::parse("boolean.equals", "yes").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VariableCondition {
    kind: ConditionType,
    value: String,
    number: Option<f64>,
}

impl VariableCondition {
    /// Builds and validates a condition.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidBoolean`] when a boolean condition is given
    /// anything but `true`/`false`, [`FlowError::InvalidNumber`] when a
    /// numeric condition is given a non-number.
    pub fn new(kind: ConditionType, value: &str) -> Result<Self, FlowError> {
        let value = value.to_lowercase();

        if kind == ConditionType::BooleanEquals && value != "true" && value != "false" {
            return Err(FlowError::InvalidBoolean(value));
        }

        let number = if kind.is_numeric() {
            match value.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => return Err(FlowError::InvalidNumber(value)),
            }
        } else {
            None
        };

        Ok(Self {
            kind,
            value,
            number,
        })
    }

    /// Parses the condition type id, then validates like [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// [`FlowError::UnknownCondition`] for an unknown id, otherwise as
    /// [`new`](Self::new).
    pub fn parse(id: &str, value: &str) -> Result<Self, FlowError> {
        Self::new(id.parse()?, value)
    }

    /// Condition type.
    #[must_use]
    pub fn kind(&self) -> ConditionType {
        self.kind
    }

    /// Lower-cased condition value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Evaluates the condition. An absent or null value never matches.
    #[must_use]
    pub fn evaluate(&self, variable: Option<&VariableValue>) -> bool {
        let Some(variable) = variable.filter(|v| !v.is_null()) else {
            return false;
        };

        match self.kind {
            ConditionType::Known => true,
            ConditionType::BooleanEquals => text(variable) == self.value,
            ConditionType::StringEquals => lower_text(variable) == self.value,
            ConditionType::StringContains => lower_text(variable).contains(&self.value),
            ConditionType::StringAbove => lower_text(variable) > self.value,
            ConditionType::StringBelow => lower_text(variable) < self.value,
            ConditionType::NumberEquals => self
                .compare(variable)
                .is_some_and(|(actual, expected)| (actual - expected).abs() < f64::EPSILON),
            ConditionType::NumberAbove => self
                .compare(variable)
                .is_some_and(|(actual, expected)| actual > expected),
            ConditionType::NumberBelow => self
                .compare(variable)
                .is_some_and(|(actual, expected)| actual < expected),
        }
    }

    fn compare(&self, variable: &VariableValue) -> Option<(f64, f64)> {
        Some((number(variable)?, self.number?))
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lower_text(value: &Value) -> String {
    text(value).to_lowercase()
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn check(id: &str, value: &str, variable: &Value) -> bool {
        VariableCondition::parse(id, value)
            .unwrap()
            .evaluate(Some(variable))
    }

    #[test]
    fn ids_round_trip() {
        for kind in ConditionType::ALL {
            assert_eq!(kind.id().parse::<ConditionType>().unwrap(), kind);
        }
        assert!(matches!(
            "string.startswith".parse::<ConditionType>(),
            Err(FlowError::UnknownCondition(_))
        ));
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(matches!(
            VariableCondition::parse("boolean.equals", "1"),
            Err(FlowError::InvalidBoolean(v)) if v == "1"
        ));
        assert!(matches!(
            VariableCondition::parse("number.below", "ten"),
            Err(FlowError::InvalidNumber(v)) if v == "ten"
        ));
        assert!(VariableCondition::parse("number.equals", "").is_err());
        assert!(VariableCondition::parse("boolean.equals", "TRUE").is_ok());
        assert!(VariableCondition::parse("string.equals", "").is_ok());
    }

    #[test]
    fn absent_values_never_match() {
        for kind in ConditionType::ALL {
            let value = if kind == ConditionType::BooleanEquals { "true" } else { "1" };
            let condition = VariableCondition::new(kind, value).unwrap();
            assert!(!condition.evaluate(None), "{kind}");
            assert!(!condition.evaluate(Some(&Value::Null)), "{kind}");
        }
    }

    #[test]
    fn known_matches_any_value() {
        assert!(check("known", "", &json!(0)));
        assert!(check("known", "", &json!("")));
    }

    #[test]
    fn string_conditions_ignore_case() {
        assert!(check("string.equals", "Open", &json!("OPEN")));
        assert!(check("string.contains", "door", &json!("Front Door open")));
        assert!(!check("string.contains", "window", &json!("Front Door open")));
        assert!(check("string.above", "apple", &json!("Banana")));
        assert!(check("string.below", "cherry", &json!("Banana")));
        assert!(check("string.equals", "21.5", &json!(21.5)));
    }

    #[test]
    fn boolean_condition_compares_text() {
        assert!(check("boolean.equals", "true", &json!(true)));
        assert!(check("boolean.equals", "False", &json!(false)));
        assert!(!check("boolean.equals", "true", &json!(1)));
        assert!(!check("boolean.equals", "true", &json!("TRUE")));
    }

    #[test]
    fn number_conditions() {
        assert!(check("number.equals", "21.5", &json!(21.5)));
        assert!(check("number.equals", "3", &json!("3")));
        assert!(check("number.above", "20", &json!(21)));
        assert!(!check("number.above", "21", &json!(21)));
        assert!(check("number.below", "-1", &json!(-5)));
        assert!(!check("number.below", "5", &json!("n/a")));
    }
}
