//! Meal slot and person record model.
//!
//! # Responsibility
//! - Define the three meal slots and their configurable column labels.
//! - Define the per-person record with default/today/skip-until per slot.
//!
//! # Invariants
//! - `SlotOrder::today_order` is a one-shot field; only the resolver and
//!   explicit edits change it.
//! - `SlotOrder::skip_until` is absent unless a valid calendar date was given.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Date format used for skip-until cells in every store.
pub const SKIP_DATE_FORMAT: &str = "%Y-%m-%d";

const NULL_CELL_TOKENS: [&str; 2] = ["nan", "none"];

/// Independent scheduling axis of a person's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// All slots in column layout order.
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Stable lowercase name used by SQLite storage and CLI parsing.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    /// Parses a canonical slot name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }
}

impl Display for MealSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-chosen label vocabulary for slot columns.
///
/// The labels only affect tabular column names and user input parsing; the
/// resolver works on [`MealSlot`] directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotLabels {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

impl Default for SlotLabels {
    fn default() -> Self {
        Self {
            breakfast: "BF".to_string(),
            lunch: "Lunch".to_string(),
            dinner: "Dinner".to_string(),
        }
    }
}

impl SlotLabels {
    pub fn label(&self, slot: MealSlot) -> &str {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn default_column(&self, slot: MealSlot) -> String {
        format!("Default {}", self.label(slot))
    }

    pub fn today_column(&self, slot: MealSlot) -> String {
        format!("Today {}", self.label(slot))
    }

    pub fn skip_column(&self, slot: MealSlot) -> String {
        format!("Skip {} Until", self.label(slot))
    }

    /// Parses user input as either a configured label or a canonical slot
    /// name. Both comparisons ignore ASCII case.
    pub fn parse_slot(&self, value: &str) -> Option<MealSlot> {
        let trimmed = value.trim();
        MealSlot::ALL
            .into_iter()
            .find(|slot| self.label(*slot).eq_ignore_ascii_case(trimmed))
            .or_else(|| MealSlot::parse(trimmed))
    }

    /// Returns every column name in sheet layout order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["Name".to_string(), "Address".to_string()];
        for slot in MealSlot::ALL {
            columns.push(self.default_column(slot));
            columns.push(self.today_column(slot));
            columns.push(self.skip_column(slot));
        }
        columns
    }
}

/// Ordering state of one meal slot for one person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOrder {
    /// Standing order; blank means none.
    pub default_order: String,
    /// One-shot instruction for the next resolution cycle; blank means none.
    pub today_order: String,
    /// Slot is suppressed while this date is strictly after the cycle date.
    pub skip_until: Option<NaiveDate>,
}

impl SlotOrder {
    /// Returns the skip date when the window is still open on `today`.
    pub fn active_skip(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.skip_until.filter(|until| *until > today)
    }
}

/// One row of the record store: a person and their three meal slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonMealRecord {
    pub name: String,
    pub address: String,
    pub breakfast: SlotOrder,
    pub lunch: SlotOrder,
    pub dinner: SlotOrder,
}

impl PersonMealRecord {
    /// Creates a record with blank slots.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn slot(&self, slot: MealSlot) -> &SlotOrder {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut SlotOrder {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Human-facing identity used by search and edits: `"{name} ({address})"`.
    pub fn display_key(&self) -> String {
        format!("{} ({})", self.name, self.address)
    }
}

/// Normalizes a raw text cell: trims surrounding whitespace and blanks
/// null-serialization tokens (`nan`, `none`, any case).
pub fn normalize_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_null_token(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Returns whether a trimmed cell is a null-serialization token.
pub fn is_null_token(value: &str) -> bool {
    NULL_CELL_TOKENS
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

/// Parses a stored skip-until cell.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time component separated by
/// a space or `T`. Blank, null-token and unparseable values yield `None`.
pub fn parse_skip_date(raw: &str) -> Option<NaiveDate> {
    let value = normalize_cell(raw);
    if value.is_empty() {
        return None;
    }
    let date_part = value
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(date_part, SKIP_DATE_FORMAT).ok()
}

/// Formats a skip-until date for storage; absent dates become blank.
pub fn format_skip_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format(SKIP_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
