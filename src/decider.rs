//! Decider module: condition evaluation and the two-phase combinator.
//!
//! A [`DeciderCombinator`] holds an optional [`DeciderConfig`] and two output
//! buffers. [`DeciderCombinator::advance`] (the *tick*) computes a candidate
//! output into the pending buffer from the aggregated upstream signals;
//! [`DeciderCombinator::commit`] (the *tock*) publishes it. Only the committed
//! buffer is ever visible through [`Source`].
//!
//! Configuration problems never fail a step. A missing or illegal setting puts
//! the combinator in [`DeciderState::Invalid`] and the step produces nothing.
//! Callers that want the reason can call [`DeciderConfig::validate`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use crate::aggregate::aggregate_sources;
use crate::graph::NodeId;
use crate::invariant_ppt::{
    assert_invariant, COMMIT_PUBLISHES_PENDING, INVALID_FORCES_EMPTY, OUTPUT_NO_ZERO,
};
use crate::signal::{lookup, strip_zeros, Signal, SignalId, SignalSet};
use crate::source::Source;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An operand of a condition or the output selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A single named signal; absent signals read as 0.
    Named(SignalId),
    /// A literal value. Only legal on the right-hand side.
    Constant(i32),
    /// Matches when at least one input signal satisfies the comparison.
    Any,
    /// Compares every input signal on its own and keeps the ones that match.
    Each,
    /// Matches when all input signals satisfy the comparison; as output, re-emits all inputs.
    Every,
}

impl Operand {
    /// Shorthand for a named virtual signal operand.
    pub fn signal(name: impl Into<String>) -> Self {
        Operand::Named(SignalId::virtual_signal(name))
    }

    /// True for `Any`, `Each` and `Every`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Operand::Any | Operand::Each | Operand::Every)
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Neq,
}

impl Comparator {
    /// Apply the comparison.
    pub fn compare(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Comparator::Lt => lhs < rhs,
            Comparator::Lte => lhs <= rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Gte => lhs >= rhs,
            Comparator::Eq => lhs == rhs,
            Comparator::Neq => lhs != rhs,
        }
    }

    /// ASCII symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::Eq => "=",
            Comparator::Neq => "!=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unrecognized comparator text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown comparator '{0}'")]
pub struct ParseComparatorError(pub String);

impl FromStr for Comparator {
    type Err = ParseComparatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Comparator::Lt),
            "<=" | "≤" => Ok(Comparator::Lte),
            ">" => Ok(Comparator::Gt),
            ">=" | "≥" => Ok(Comparator::Gte),
            "=" | "==" => Ok(Comparator::Eq),
            "!=" | "≠" => Ok(Comparator::Neq),
            other => Err(ParseComparatorError(other.to_string())),
        }
    }
}

/// `left comparator right`. Unset parts make the configuration invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    /// Left operand.
    pub left: Option<Operand>,
    /// Comparison operator.
    pub comparator: Option<Comparator>,
    /// Right operand; must be a named signal or a constant.
    pub right: Option<Operand>,
}

/// Full configuration of a decider combinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeciderConfig {
    /// The condition to evaluate.
    pub condition: Condition,
    /// Output selector.
    pub output: Option<Operand>,
    /// Emit input values instead of 1.
    pub copy_count_from_input: Option<bool>,
}

/// Why a configuration is not runnable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No configuration at all.
    #[error("combinator has no configuration")]
    Unconfigured,
    /// Left operand unset.
    #[error("left operand is missing")]
    MissingLeft,
    /// Comparator unset.
    #[error("comparator is missing")]
    MissingComparator,
    /// Right operand unset.
    #[error("right operand is missing")]
    MissingRight,
    /// Output unset.
    #[error("output is missing")]
    MissingOutput,
    /// Copy-count flag unset.
    #[error("copy_count_from_input is not set")]
    MissingCopyCount,
    /// Right operand is a wildcard.
    #[error("right operand must be a signal or constant, got {0:?}")]
    WildcardRight(Operand),
    /// Left operand is a constant.
    #[error("left operand cannot be a constant")]
    ConstantLeft,
    /// Output is a constant.
    #[error("output cannot be a constant")]
    ConstantOutput,
    /// Output is `Any`.
    #[error("output cannot be Any")]
    AnyOutput,
    /// Output is `Each` without `Each` on the left.
    #[error("output can only be Each when the left operand is Each")]
    EachOutputWithoutEachInput,
    /// Output is `Every` with `Each` on the left.
    #[error("output cannot be Every when the left operand is Each")]
    EveryOutputWithEachInput,
}

/// Validity state, recomputed at the start of every advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeciderState {
    /// No configuration has been set.
    Uninitialized,
    /// Configuration present but unusable.
    Invalid(ConfigError),
    /// Configuration passes every check.
    Valid,
}

// Shapes a configuration can take once it has passed validation.
enum Gate<'a> {
    Signal(&'a SignalId),
    Any,
    Every,
}

enum GateOutput<'a> {
    Signal(&'a SignalId),
    Everything,
}

enum EachOutput<'a> {
    Each,
    Signal(&'a SignalId),
}

enum Rule<'a> {
    Gate { gate: Gate<'a>, output: GateOutput<'a> },
    PerSignal { output: EachOutput<'a> },
}

enum Rhs<'a> {
    Signal(&'a SignalId),
    Constant(i32),
}

struct Resolved<'a> {
    rule: Rule<'a>,
    comparator: Comparator,
    rhs: Rhs<'a>,
    copy_count: bool,
}

impl DeciderConfig {
    /// A fully specified configuration.
    pub fn new(
        left: Operand,
        comparator: Comparator,
        right: Operand,
        output: Operand,
        copy_count_from_input: bool,
    ) -> Self {
        Self {
            condition: Condition {
                left: Some(left),
                comparator: Some(comparator),
                right: Some(right),
            },
            output: Some(output),
            copy_count_from_input: Some(copy_count_from_input),
        }
    }

    /// Check every validity rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    fn resolve(&self) -> Result<Resolved<'_>, ConfigError> {
        let left = self.condition.left.as_ref().ok_or(ConfigError::MissingLeft)?;
        let comparator = self.condition.comparator.ok_or(ConfigError::MissingComparator)?;
        let right = self.condition.right.as_ref().ok_or(ConfigError::MissingRight)?;
        let output = self.output.as_ref().ok_or(ConfigError::MissingOutput)?;
        let copy_count = self.copy_count_from_input.ok_or(ConfigError::MissingCopyCount)?;

        let rhs = match right {
            Operand::Named(id) => Rhs::Signal(id),
            Operand::Constant(value) => Rhs::Constant(*value),
            wildcard => return Err(ConfigError::WildcardRight(wildcard.clone())),
        };

        let rule = match (left, output) {
            (Operand::Constant(_), _) => return Err(ConfigError::ConstantLeft),
            (_, Operand::Constant(_)) => return Err(ConfigError::ConstantOutput),
            (_, Operand::Any) => return Err(ConfigError::AnyOutput),
            (Operand::Each, Operand::Each) => Rule::PerSignal {
                output: EachOutput::Each,
            },
            (Operand::Each, Operand::Named(id)) => Rule::PerSignal {
                output: EachOutput::Signal(id),
            },
            (Operand::Each, Operand::Every) => {
                return Err(ConfigError::EveryOutputWithEachInput)
            }
            (_, Operand::Each) => return Err(ConfigError::EachOutputWithoutEachInput),
            (left, output) => {
                let gate = match left {
                    Operand::Named(id) => Gate::Signal(id),
                    Operand::Any => Gate::Any,
                    _ => Gate::Every,
                };
                let output = match output {
                    Operand::Named(id) => GateOutput::Signal(id),
                    _ => GateOutput::Everything,
                };
                Rule::Gate { gate, output }
            }
        };

        Ok(Resolved {
            rule,
            comparator,
            rhs,
            copy_count,
        })
    }
}

impl Resolved<'_> {
    fn evaluate(&self, input: &[Signal]) -> SignalSet {
        let rhs = match self.rhs {
            Rhs::Signal(id) => lookup(input, id),
            Rhs::Constant(value) => value,
        };
        let cmp = |value: i32| self.comparator.compare(value, rhs);
        let count = |value: i32| if self.copy_count { value } else { 1 };

        let out = match &self.rule {
            Rule::Gate { gate, output } => {
                let matched = match gate {
                    Gate::Signal(id) => cmp(lookup(input, id)),
                    Gate::Any => input.iter().any(|s| cmp(s.value)),
                    Gate::Every => input.iter().all(|s| cmp(s.value)),
                };
                if !matched {
                    Vec::new()
                } else {
                    match output {
                        GateOutput::Signal(id) => {
                            vec![Signal::new((*id).clone(), count(lookup(input, id)))]
                        }
                        GateOutput::Everything => input
                            .iter()
                            .map(|s| Signal::new(s.id.clone(), count(s.value)))
                            .collect(),
                    }
                }
            }
            Rule::PerSignal { output } => {
                let matching = input.iter().filter(|s| cmp(s.value));
                match output {
                    EachOutput::Each => matching
                        .map(|s| Signal::new(s.id.clone(), count(s.value)))
                        .collect(),
                    EachOutput::Signal(id) => {
                        let total = matching.fold(0i32, |acc, s| acc.wrapping_add(count(s.value)));
                        vec![Signal::new((*id).clone(), total)]
                    }
                }
            }
        };
        strip_zeros(out)
    }
}

/// Compute the output a configuration produces for an aggregated input.
///
/// Returns the reason when the configuration is not valid.
pub fn evaluate(config: &DeciderConfig, input: &[Signal]) -> Result<SignalSet, ConfigError> {
    Ok(config.resolve()?.evaluate(input))
}

/// A decider combinator with a pending/committed output pair.
#[derive(Debug, Clone)]
pub struct DeciderCombinator {
    connections: Vec<NodeId>,
    config: Option<DeciderConfig>,
    state: DeciderState,
    pending: SignalSet,
    committed: SignalSet,
}

impl DeciderCombinator {
    /// A fresh, unconfigured combinator.
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            config: None,
            state: DeciderState::Uninitialized,
            pending: Vec::new(),
            committed: Vec::new(),
        }
    }

    /// A combinator with a configuration already set.
    pub fn with_config(config: DeciderConfig) -> Self {
        let mut combinator = Self::new();
        combinator.config = Some(config);
        combinator
    }

    /// Current configuration, if any.
    pub fn config(&self) -> Option<&DeciderConfig> {
        self.config.as_ref()
    }

    /// Mutable configuration; a blank one is created when none is set.
    pub fn config_mut(&mut self) -> &mut DeciderConfig {
        self.config.get_or_insert_with(DeciderConfig::default)
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: DeciderConfig) {
        self.config = Some(config);
    }

    /// Remove the configuration, returning it.
    pub fn clear_config(&mut self) -> Option<DeciderConfig> {
        self.config.take()
    }

    /// Upstream handles this combinator reads from.
    pub fn connections(&self) -> &[NodeId] {
        &self.connections
    }

    pub(crate) fn connections_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.connections
    }

    /// State as of the last advance.
    pub fn state(&self) -> &DeciderState {
        &self.state
    }

    /// True if the last advance ran with a valid configuration.
    pub fn is_valid(&self) -> bool {
        self.state == DeciderState::Valid
    }

    /// Same check the next advance will perform, reported as a result.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config
            .as_ref()
            .ok_or(ConfigError::Unconfigured)?
            .validate()
    }

    /// Tick: evaluate against an aggregated input and stage the result.
    ///
    /// The committed output is untouched.
    pub fn advance(&mut self, input: &[Signal]) {
        let (state, pending) = match self.config.as_ref() {
            None => (DeciderState::Uninitialized, Vec::new()),
            Some(config) => match config.resolve() {
                Ok(resolved) => (DeciderState::Valid, resolved.evaluate(input)),
                Err(reason) => (DeciderState::Invalid(reason), Vec::new()),
            },
        };

        if state != self.state {
            match &state {
                DeciderState::Invalid(reason) => log::debug!("decider invalid: {}", reason),
                other => log::debug!("decider state -> {:?}", other),
            }
        }

        assert_invariant(
            OUTPUT_NO_ZERO,
            pending.iter().all(|s| s.value != 0),
            "Pending output holds a zero value",
            Some("advance"),
        );
        if state != DeciderState::Valid {
            assert_invariant(
                INVALID_FORCES_EMPTY,
                pending.is_empty(),
                "Non-valid combinator staged output",
                Some("advance"),
            );
        }

        self.state = state;
        self.pending = pending;
    }

    /// Aggregate `sources` and advance on the result.
    pub fn advance_from(&mut self, sources: &[&dyn Source]) {
        let input = aggregate_sources(sources);
        self.advance(&input);
    }

    /// Tock: publish the staged output.
    ///
    /// Without a preceding advance this republishes the last staged output.
    pub fn commit(&mut self) {
        self.committed.clone_from(&self.pending);
        assert_invariant(
            COMMIT_PUBLISHES_PENDING,
            self.committed == self.pending,
            "Committed output differs from pending",
            Some("commit"),
        );
    }

    /// Staged output of the last advance. Not visible to other combinators.
    pub fn pending(&self) -> &[Signal] {
        &self.pending
    }
}

impl Default for DeciderCombinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for DeciderCombinator {
    fn signals(&self) -> &[Signal] {
        &self.committed
    }
}
