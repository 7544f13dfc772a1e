//! Meal resolution and one-shot state transitions.
//!
//! # Responsibility
//! - Decide, per person, whether a meal slot is served on a date and what is
//!   served.
//! - Rewrite one-shot fields so a consumed instruction never repeats.
//!
//! # Invariants
//! - Exactly one `Resolution` applies per (person, slot, cycle).
//! - Serving list order equals input record order.
//! - An active future skip leaves the record byte-for-byte unchanged.
//! - `skip_until` is only written by the `-N` command and never cleared here.
//! - Malformed values never fail a cycle; they fall through to literal use.

use crate::model::meal::{normalize_cell, MealSlot, PersonMealRecord};
use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static NUMERIC_SKIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-([0-9]+)$").expect("valid numeric skip regex"));

const LITERAL_SKIP_TOKENS: [&str; 2] = ["-", "no"];

/// Where a served meal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSource {
    /// Standing order.
    Default,
    /// One-shot substitute from the today field, cleared after serving.
    Override,
}

/// Outcome of resolving one person for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Served { meal: String, source: MealSource },
    /// Suppressed by a skip window still open after the cycle date.
    SkipActive { until: NaiveDate },
    /// `-N` consumed: suppressed now and a skip window was installed.
    SkipInstalled { until: NaiveDate },
    /// `-` or `no` consumed: suppressed for this cycle only.
    SkippedToday,
    /// Neither a default nor an override exists.
    NoOrder,
}

impl Resolution {
    pub fn is_served(&self) -> bool {
        matches!(self, Self::Served { .. })
    }

    /// Returns whether a skip rule kept this person off the list.
    pub fn is_suppressed(&self) -> bool {
        matches!(
            self,
            Self::SkipActive { .. } | Self::SkipInstalled { .. } | Self::SkippedToday
        )
    }

    /// Returns whether resolving rewrote the record.
    pub fn mutated(&self) -> bool {
        match self {
            Self::Served { source, .. } => *source == MealSource::Override,
            Self::SkipInstalled { .. } | Self::SkippedToday => true,
            Self::SkipActive { .. } | Self::NoOrder => false,
        }
    }
}

/// Ordered "who gets what" lines for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServingList {
    lines: Vec<String>,
}

impl ServingList {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for ServingList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Result of one resolution cycle.
///
/// `records` is the full input set with mutations applied; the caller owns
/// persisting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCycle {
    pub slot: MealSlot,
    pub date: NaiveDate,
    pub serving_list: ServingList,
    pub records: Vec<PersonMealRecord>,
    /// One entry per record, in record order.
    pub outcomes: Vec<Resolution>,
}

impl ResolvedCycle {
    pub fn mutated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.mutated())
            .count()
    }
}

/// Resolves `slot` on `today` for every record.
///
/// Records are consumed and handed back mutated inside the returned cycle.
pub fn resolve(slot: MealSlot, today: NaiveDate, records: Vec<PersonMealRecord>) -> ResolvedCycle {
    let mut records = records;
    let mut lines = Vec::new();
    let mut outcomes = Vec::with_capacity(records.len());

    for record in &mut records {
        let outcome = resolve_record(slot, today, record);
        if let Resolution::Served { meal, .. } = &outcome {
            lines.push(format!("{} ({}) -> {}", record.name, record.address, meal));
        }
        outcomes.push(outcome);
    }

    ResolvedCycle {
        slot,
        date: today,
        serving_list: ServingList { lines },
        records,
        outcomes,
    }
}

/// Resolves a single record in place. First matching rule wins.
pub fn resolve_record(
    slot: MealSlot,
    today: NaiveDate,
    record: &mut PersonMealRecord,
) -> Resolution {
    let order = record.slot_mut(slot);
    let today_value = normalize_cell(&order.today_order);
    let default_value = normalize_cell(&order.default_order);

    if let Some(until) = order.active_skip(today) {
        return Resolution::SkipActive { until };
    }

    if let Some(days) = parse_numeric_skip(&today_value) {
        let until = today
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        order.skip_until = Some(until);
        order.today_order.clear();
        return Resolution::SkipInstalled { until };
    }

    // Case-sensitive: "No" or "NO" is a literal dish name.
    if LITERAL_SKIP_TOKENS.contains(&today_value.as_str()) {
        order.today_order.clear();
        return Resolution::SkippedToday;
    }

    if !today_value.is_empty() {
        order.today_order.clear();
        return Resolution::Served {
            meal: today_value,
            source: MealSource::Override,
        };
    }

    if !default_value.is_empty() {
        return Resolution::Served {
            meal: default_value,
            source: MealSource::Default,
        };
    }

    Resolution::NoOrder
}

/// Parses the `-N` command. Digit runs beyond `u64` saturate.
fn parse_numeric_skip(value: &str) -> Option<u64> {
    let captures = NUMERIC_SKIP_RE.captures(value)?;
    let digits = captures.get(1)?.as_str();
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}
