//! Converter configuration.

use lt_core::{DEFAULT_CAPACITY, Error, Result};
use serde::{Deserialize, Serialize};

/// LHE status codes with a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Incoming particle (`-1`).
    Initial,
    /// Intermediate resonance (`2`).
    Intermediate,
    /// Outgoing final-state particle (`1`).
    Final,
}

impl Status {
    /// Status code as written in LHE files.
    pub fn code(self) -> i32 {
        match self {
            Status::Initial => -1,
            Status::Intermediate => 2,
            Status::Final => 1,
        }
    }

    /// Named status for a code, if any.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Status::Initial),
            2 => Some(Status::Intermediate),
            1 => Some(Status::Final),
            _ => None,
        }
    }

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Status::Initial => "initial",
            Status::Intermediate => "intermediate",
            Status::Final => "final",
        }
    }
}

/// What to do when a species bucket exceeds the row capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail the event with [`Error::CapacityExceeded`]; nothing is written for it.
    #[default]
    Reject,
    /// Keep the `capacity` highest-pT particles and warn.
    Truncate,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OverflowPolicy::Reject),
            "truncate" => Ok(OverflowPolicy::Truncate),
            other => Err(Error::Validation(format!(
                "unknown overflow policy '{other}' (expected 'reject' or 'truncate')"
            ))),
        }
    }
}

/// Settings of one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Status codes kept by the classifier, in the order given by the user.
    #[serde(default = "default_accepted_status")]
    pub accepted_status: Vec<i32>,

    /// Maximum particles per species per row.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Overflow handling.
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_accepted_status() -> Vec<i32> {
    vec![Status::Initial.code(), Status::Intermediate.code(), Status::Final.code()]
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            accepted_status: default_accepted_status(),
            capacity: default_capacity(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl ConverterConfig {
    /// Set the accepted status codes.
    pub fn accepted_status(mut self, codes: Vec<i32>) -> Self {
        self.accepted_status = codes;
        self
    }

    /// Set the per-species row capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the overflow policy.
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Validation("capacity must be at least 1".into()));
        }
        if self.accepted_status.is_empty() {
            return Err(Error::Validation("at least one accepted status is required".into()));
        }
        Ok(())
    }

    /// `true` if particles with this status are kept.
    pub fn accepts(&self, status: i32) -> bool {
        self.accepted_status.contains(&status)
    }

    /// Human-readable list such as `"initial, intermediate and final"`.
    pub fn describe_statuses(&self) -> String {
        let names: Vec<String> = self
            .accepted_status
            .iter()
            .map(|&c| {
                Status::from_code(c).map_or_else(|| format!("status {c}"), |s| s.name().to_string())
            })
            .collect();
        match names.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
        }
    }
}
