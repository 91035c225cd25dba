//! Reward table and per-step reward classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use wikicat_rl_core::{RLError, Result};

/// Named reward constants a step can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Attribute polled, musician has it
    AttributePositive,
    /// Attribute polled, musician lacks it
    AttributeNegative,
    /// Category polled, musician belongs to it
    CategoryPositive,
    /// Category polled, musician does not belong to it
    CategoryNegative,
    /// Action already taken earlier in the session
    RepeatedPoll,
    /// Session ended after at least one category was polled
    EndAction,
    /// Session ended without polling any category
    EndActionIfNoCategoryPredicted,
}

impl RewardKind {
    /// Every kind, in table order
    pub const ALL: [Self; 7] = [
        Self::AttributePositive,
        Self::AttributeNegative,
        Self::CategoryPositive,
        Self::CategoryNegative,
        Self::RepeatedPoll,
        Self::EndAction,
        Self::EndActionIfNoCategoryPredicted,
    ];

    /// Configuration name of this kind
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AttributePositive => "attribute_positive",
            Self::AttributeNegative => "attribute_negative",
            Self::CategoryPositive => "category_positive",
            Self::CategoryNegative => "category_negative",
            Self::RepeatedPoll => "repeated_poll",
            Self::EndAction => "end_action",
            Self::EndActionIfNoCategoryPredicted => "end_action_if_no_category_predicted",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RewardKind {
    type Err = RLError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| RLError::UnknownReward(s.to_string()))
    }
}

/// What a single step earns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardOutcome {
    /// One of the configured constants
    Scored(RewardKind),
    /// The session had already ended; always worth zero
    Inactive,
}

/// Scalar rewards for every outcome kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardTable {
    /// Reward for a positive attribute answer
    pub attribute_positive: f64,
    /// Reward for a negative attribute answer
    pub attribute_negative: f64,
    /// Reward for a positive category answer
    pub category_positive: f64,
    /// Reward for a negative category answer
    pub category_negative: f64,
    /// Reward for polling something twice
    pub repeated_poll: f64,
    /// Reward for ending after a category poll
    pub end_action: f64,
    /// Reward for ending without any category poll
    pub end_action_if_no_category_predicted: f64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            attribute_positive: 1.0,
            attribute_negative: -1.0,
            category_positive: 3.0,
            category_negative: -1.0,
            repeated_poll: -0.5,
            end_action: 0.0,
            end_action_if_no_category_predicted: 0.0,
        }
    }
}

impl RewardTable {
    /// Defaults with the named constants replaced
    pub fn from_overrides<I, K>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut table = Self::default();
        for (name, value) in overrides {
            table.set(name.as_ref(), value)?;
        }
        Ok(table)
    }

    /// Constant for `kind`
    #[must_use]
    pub fn kind_value(&self, kind: RewardKind) -> f64 {
        match kind {
            RewardKind::AttributePositive => self.attribute_positive,
            RewardKind::AttributeNegative => self.attribute_negative,
            RewardKind::CategoryPositive => self.category_positive,
            RewardKind::CategoryNegative => self.category_negative,
            RewardKind::RepeatedPoll => self.repeated_poll,
            RewardKind::EndAction => self.end_action,
            RewardKind::EndActionIfNoCategoryPredicted => self.end_action_if_no_category_predicted,
        }
    }

    fn slot_mut(&mut self, kind: RewardKind) -> &mut f64 {
        match kind {
            RewardKind::AttributePositive => &mut self.attribute_positive,
            RewardKind::AttributeNegative => &mut self.attribute_negative,
            RewardKind::CategoryPositive => &mut self.category_positive,
            RewardKind::CategoryNegative => &mut self.category_negative,
            RewardKind::RepeatedPoll => &mut self.repeated_poll,
            RewardKind::EndAction => &mut self.end_action,
            RewardKind::EndActionIfNoCategoryPredicted => {
                &mut self.end_action_if_no_category_predicted
            }
        }
    }

    /// Constant stored under `name`
    pub fn get(&self, name: &str) -> Result<f64> {
        Ok(self.kind_value(name.parse()?))
    }

    /// Replace the constant stored under `name`
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        *self.slot_mut(name.parse()?) = value;
        Ok(())
    }

    /// Scalar reward for an outcome
    #[must_use]
    pub fn value(&self, outcome: RewardOutcome) -> f64 {
        match outcome {
            RewardOutcome::Scored(kind) => self.kind_value(kind),
            RewardOutcome::Inactive => 0.0,
        }
    }
}

/// Everything the reward of one step depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepFacts {
    /// End flag was still clear before this step
    pub active: bool,
    /// Step ends the session, voluntarily or because it is the last one
    pub finished_now: bool,
    /// Action was taken earlier in the session
    pub tried_already: bool,
    /// Action targets a category rather than an attribute
    pub categorical: bool,
    /// Ground-truth answer for the polled fact
    pub response: bool,
    /// A category was polled before the session's end tick
    pub category_seen: bool,
}

impl StepFacts {
    /// Decide which constant this step earns.
    ///
    /// Precedence: inactive sessions earn nothing, then ending, then repeats,
    /// then the answer itself.
    #[must_use]
    pub fn outcome(&self) -> RewardOutcome {
        if !self.active {
            return RewardOutcome::Inactive;
        }

        let kind = if self.finished_now {
            if self.category_seen {
                RewardKind::EndAction
            } else {
                RewardKind::EndActionIfNoCategoryPredicted
            }
        } else if self.tried_already {
            RewardKind::RepeatedPoll
        } else {
            match (self.categorical, self.response) {
                (true, true) => RewardKind::CategoryPositive,
                (true, false) => RewardKind::CategoryNegative,
                (false, true) => RewardKind::AttributePositive,
                (false, false) => RewardKind::AttributeNegative,
            }
        };
        RewardOutcome::Scored(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fresh() -> StepFacts {
        StepFacts {
            active: true,
            ..StepFacts::default()
        }
    }

    #[test]
    fn test_defaults() {
        let table = RewardTable::default();
        assert_relative_eq!(table.get("attribute_positive").unwrap(), 1.0);
        assert_relative_eq!(table.get("attribute_negative").unwrap(), -1.0);
        assert_relative_eq!(table.get("category_positive").unwrap(), 3.0);
        assert_relative_eq!(table.get("category_negative").unwrap(), -1.0);
        assert_relative_eq!(table.get("repeated_poll").unwrap(), -0.5);
        assert_relative_eq!(table.get("end_action").unwrap(), 0.0);
        assert_relative_eq!(table.get("end_action_if_no_category_predicted").unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(matches!(
            RewardTable::default().get("bonus"),
            Err(RLError::UnknownReward(name)) if name == "bonus"
        ));
        assert!(RewardTable::from_overrides([("category_postive", 2.0)]).is_err());
    }

    #[test]
    fn test_overrides_keep_other_defaults() {
        let table =
            RewardTable::from_overrides([("repeated_poll", -2.0), ("end_action", 0.5)]).unwrap();
        assert_relative_eq!(table.repeated_poll, -2.0);
        assert_relative_eq!(table.end_action, 0.5);
        assert_relative_eq!(table.category_positive, 3.0);
    }

    #[test]
    fn test_partial_json_config() {
        let table: RewardTable =
            serde_json::from_str(r#"{ "end_action_if_no_category_predicted": -3 }"#).unwrap();
        assert_relative_eq!(table.end_action_if_no_category_predicted, -3.0);
        assert_relative_eq!(table.attribute_positive, 1.0);

        assert!(serde_json::from_str::<RewardTable>(r#"{ "typo": 1 }"#).is_err());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in RewardKind::ALL {
            assert_eq!(kind.name().parse::<RewardKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_outcome_answer() {
        let facts = StepFacts {
            categorical: true,
            response: true,
            ..fresh()
        };
        assert_eq!(facts.outcome(), RewardOutcome::Scored(RewardKind::CategoryPositive));

        let facts = StepFacts {
            response: false,
            ..fresh()
        };
        assert_eq!(facts.outcome(), RewardOutcome::Scored(RewardKind::AttributeNegative));
    }

    #[test]
    fn test_outcome_precedence() {
        let repeat = StepFacts {
            tried_already: true,
            response: true,
            categorical: true,
            ..fresh()
        };
        assert_eq!(repeat.outcome(), RewardOutcome::Scored(RewardKind::RepeatedPoll));

        let end = StepFacts {
            finished_now: true,
            ..repeat
        };
        assert_eq!(
            end.outcome(),
            RewardOutcome::Scored(RewardKind::EndActionIfNoCategoryPredicted)
        );

        let end_after_category = StepFacts {
            category_seen: true,
            ..end
        };
        assert_eq!(end_after_category.outcome(), RewardOutcome::Scored(RewardKind::EndAction));

        let inactive = StepFacts {
            active: false,
            ..end_after_category
        };
        assert_eq!(inactive.outcome(), RewardOutcome::Inactive);
        assert_relative_eq!(RewardTable::default().value(inactive.outcome()), 0.0);
    }
}
