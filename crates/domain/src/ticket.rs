use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Fixed text parts of a printed ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketLayout {
    pub separator: String,
    pub venue: String,
    pub number_prefix: String,
    pub notice: String,
}

impl Default for TicketLayout {
    fn default() -> Self {
        Self {
            separator: "====================".to_string(),
            venue: "KB Carnival Stall 29".to_string(),
            number_prefix: "KB".to_string(),
            notice: "Please wait within 15 min".to_string(),
        }
    }
}

/// One issued queue number about to be printed. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub counter_label: String,
    pub number: u32,
    /// Wall-clock time in the local timezone
    pub issued_at: NaiveDateTime,
}

impl Ticket {
    pub fn new(counter_label: impl Into<String>, number: u32, issued_at: NaiveDateTime) -> Self {
        Self {
            counter_label: counter_label.into(),
            number,
            issued_at,
        }
    }

    pub fn issued_now(counter_label: impl Into<String>, number: u32) -> Self {
        Self::new(counter_label, number, Local::now().naive_local())
    }
}
