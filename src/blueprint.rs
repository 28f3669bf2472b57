//! Blueprint module: the JSON "control behavior" record for decider combinators.
//!
//! The wire format names wildcards with reserved virtual signals
//! (`signal-anything`, `signal-each`, `signal-everything`). They are turned into
//! [`Operand`] variants here and nowhere else.

use crate::decider::{Comparator, Condition, DeciderConfig, Operand, ParseComparatorError};
use crate::signal::{SignalId, SignalType};
use serde::{Deserialize, Serialize};

const SIGNAL_ANYTHING: &str = "signal-anything";
const SIGNAL_EACH: &str = "signal-each";
const SIGNAL_EVERYTHING: &str = "signal-everything";

/// Decider settings as stored in a blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlBehavior {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_signal: Option<SignalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_signal: Option<SignalId>,
    /// `Some(None)` is a constant slot present without a value, read as 0.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub constant: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_signal: Option<SignalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_count_from_input: Option<bool>,
}

/// Errors reading a blueprint record.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error("malformed control behavior: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Comparator(#[from] ParseComparatorError),
}

// Only runs when the key exists, so `null` becomes `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

fn operand_from_signal(id: SignalId) -> Operand {
    if id.signal_type != SignalType::Virtual {
        return Operand::Named(id);
    }
    match id.name.as_str() {
        SIGNAL_ANYTHING => Operand::Any,
        SIGNAL_EACH => Operand::Each,
        SIGNAL_EVERYTHING => Operand::Every,
        _ => Operand::Named(id),
    }
}

fn signal_from_operand(operand: &Operand) -> Option<SignalId> {
    match operand {
        Operand::Named(id) => Some(id.clone()),
        Operand::Any => Some(SignalId::virtual_signal(SIGNAL_ANYTHING)),
        Operand::Each => Some(SignalId::virtual_signal(SIGNAL_EACH)),
        Operand::Every => Some(SignalId::virtual_signal(SIGNAL_EVERYTHING)),
        Operand::Constant(_) => None,
    }
}

impl TryFrom<ControlBehavior> for DeciderConfig {
    type Error = BlueprintError;

    /// Missing fields stay unset, so the combinator reports them as invalid.
    /// A second signal takes precedence over a constant.
    fn try_from(behavior: ControlBehavior) -> Result<Self, Self::Error> {
        let comparator = behavior
            .comparator
            .as_deref()
            .map(str::parse::<Comparator>)
            .transpose()?;
        let right = match (behavior.second_signal, behavior.constant) {
            (Some(id), _) => Some(operand_from_signal(id)),
            (None, Some(value)) => Some(Operand::Constant(value.unwrap_or(0))),
            (None, None) => None,
        };
        Ok(DeciderConfig {
            condition: Condition {
                left: behavior.first_signal.map(operand_from_signal),
                comparator,
                right,
            },
            output: behavior.output_signal.map(operand_from_signal),
            copy_count_from_input: behavior.copy_count_from_input,
        })
    }
}

impl From<&DeciderConfig> for ControlBehavior {
    /// Constants on the left or in the output have no blueprint form and are omitted.
    fn from(config: &DeciderConfig) -> Self {
        let (second_signal, constant) = match &config.condition.right {
            Some(Operand::Constant(value)) => (None, Some(Some(*value))),
            Some(other) => (signal_from_operand(other), None),
            None => (None, None),
        };
        ControlBehavior {
            first_signal: config.condition.left.as_ref().and_then(signal_from_operand),
            second_signal,
            constant,
            comparator: config.condition.comparator.map(|c| c.symbol().to_string()),
            output_signal: config.output.as_ref().and_then(signal_from_operand),
            copy_count_from_input: config.copy_count_from_input,
        }
    }
}

impl DeciderConfig {
    /// Read a configuration from a JSON control-behavior record.
    pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
        let behavior: ControlBehavior = serde_json::from_str(json)?;
        DeciderConfig::try_from(behavior)
    }

    /// Write this configuration as a JSON control-behavior record.
    pub fn to_json(&self) -> Result<String, BlueprintError> {
        Ok(serde_json::to_string(&ControlBehavior::from(self))?)
    }
}
