use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Identifier of one service counter, also used as the persistence key prefix.
///
/// Rules:
/// - Must be non-empty
/// - Only alphanumeric, underscore and hyphen (no `.`, which separates key fields)
/// - Max length 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CounterId(String);

impl CounterId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(DomainError::InvalidCounterId(
                "Counter ID cannot be empty".to_string(),
            ));
        }

        if id.len() > 64 {
            return Err(DomainError::InvalidCounterId(format!(
                "Counter ID too long: {} chars (max 64)",
                id.len()
            )));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::InvalidCounterId(format!(
                "Counter ID {id} must contain only alphanumeric, underscore and hyphen"
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Persistence key of the current sequence value, e.g. `counter1.current`
    pub fn current_key(&self) -> String {
        format!("{}.current", self.0)
    }

    /// Persistence key of the last printed value, e.g. `counter1.last`
    pub fn last_key(&self) -> String {
        format!("{}.last", self.0)
    }
}

impl std::fmt::Display for CounterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CounterId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CounterId> for String {
    fn from(id: CounterId) -> Self {
        id.0
    }
}

/// Static description of a counter: its key and the label printed on tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSpec {
    pub id: CounterId,
    pub label: String,
}

impl CounterSpec {
    pub fn new(id: CounterId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// The two counters of a single stall: `counter1` / `C1` and `counter2` / `C2`
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(CounterId(String::from("counter1")), "C1"),
            Self::new(CounterId(String::from("counter2")), "C2"),
        ]
    }
}

/// Sequence state of one counter.
///
/// Invariant: `last_printed <= current`. Transitions return a new value so
/// the caller can persist it before committing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    id: CounterId,
    current: u32,
    last_printed: u32,
}

impl Counter {
    pub fn new(id: CounterId) -> Self {
        Self {
            id,
            current: 0,
            last_printed: 0,
        }
    }

    /// Rebuild from persisted values. A `last_printed` above `current`
    /// can only come from a tampered store and is clamped.
    pub fn restore(id: CounterId, current: u32, last_printed: u32) -> Self {
        Self {
            id,
            current,
            last_printed: last_printed.min(current),
        }
    }

    pub fn id(&self) -> &CounterId {
        &self.id
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn last_printed(&self) -> u32 {
        self.last_printed
    }

    /// Next state after issuing a number
    pub fn advanced(&self) -> Self {
        let next = self.current.saturating_add(1);
        Self {
            id: self.id.clone(),
            current: next,
            last_printed: next,
        }
    }

    /// State after a reset: both fields back to zero
    pub fn cleared(&self) -> Self {
        Self::new(self.id.clone())
    }

    pub fn reprint_target(&self) -> Result<u32> {
        if self.last_printed > 0 {
            Ok(self.last_printed)
        } else {
            Err(DomainError::NoNumberYet)
        }
    }

    /// Accepts only numbers that were already issued: `1 <= requested <= current`
    pub fn pick(&self, requested: i64) -> Result<u32> {
        if requested >= 1 && requested <= i64::from(self.current) {
            Ok(requested as u32)
        } else {
            Err(DomainError::OutOfRange {
                requested,
                issued: self.current,
            })
        }
    }

    /// Range offered to a number picker
    pub fn pick_range(&self) -> Result<std::ops::RangeInclusive<u32>> {
        if self.current == 0 {
            return Err(DomainError::OutOfRange {
                requested: 0,
                issued: 0,
            });
        }
        Ok(1..=self.current)
    }
}
