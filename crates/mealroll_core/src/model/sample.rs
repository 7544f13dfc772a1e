//! Sample record set covering every one-shot command form.
//!
//! Used by `mealroll seed` to bootstrap an empty store for manual trials.

use crate::model::meal::{PersonMealRecord, SlotOrder};
use chrono::{Days, NaiveDate};

struct SampleRow {
    name: &'static str,
    address: &'static str,
    // (default, today, skip-until offset in days) per breakfast/lunch/dinner.
    slots: [(&'static str, &'static str, Option<u64>); 3],
}

const SAMPLE_ROWS: &[SampleRow] = &[
    SampleRow {
        name: "Alice",
        address: "Addr1",
        slots: [("Idli", "", None), ("Rice", "", None), ("Soup", "-1", None)],
    },
    SampleRow {
        name: "Bob",
        address: "Addr2",
        slots: [("Dosa", "-", None), ("Dal", "Burger", None), ("Chole", "", None)],
    },
    SampleRow {
        name: "Charlie",
        address: "Addr3",
        slots: [("Upma", "-2", None), ("Curry", "", None), ("Pizza", "Tacos", None)],
    },
    SampleRow {
        name: "Diana",
        address: "Addr4",
        slots: [("Poha", "Pancakes", None), ("Roti", "-", None), ("Samosa", "no", None)],
    },
    SampleRow {
        name: "Eve",
        address: "Addr5",
        slots: [("Paratha", "no", None), ("Biryani", "-3", None), ("Rajma", "", Some(3))],
    },
    SampleRow {
        name: "Frank",
        address: "Addr6",
        slots: [("Bread", "-1", None), ("Khichdi", "", Some(2)), ("Noodles", "", None)],
    },
    SampleRow {
        name: "Grace",
        address: "Addr7",
        slots: [("Oats", "", Some(1)), ("Pasta", "", None), ("Salad", "", None)],
    },
];

/// Builds the sample records with skip windows relative to `today`.
pub fn sample_records(today: NaiveDate) -> Vec<PersonMealRecord> {
    SAMPLE_ROWS
        .iter()
        .map(|row| {
            let [breakfast, lunch, dinner] = row.slots.map(|(default, today_order, offset)| {
                SlotOrder {
                    default_order: default.to_string(),
                    today_order: today_order.to_string(),
                    skip_until: offset.and_then(|days| today.checked_add_days(Days::new(days))),
                }
            });
            PersonMealRecord {
                name: row.name.to_string(),
                address: row.address.to_string(),
                breakfast,
                lunch,
                dinner,
            }
        })
        .collect()
}
