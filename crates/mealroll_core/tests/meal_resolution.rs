use chrono::NaiveDate;
use mealroll_core::{
    resolve, resolve_record, MealSlot, MealSource, PersonMealRecord, Resolution, SlotOrder,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn person(name: &str, address: &str, slot: MealSlot, order: SlotOrder) -> PersonMealRecord {
    let mut record = PersonMealRecord::new(name, address);
    *record.slot_mut(slot) = order;
    record
}

fn order(default: &str, today: &str) -> SlotOrder {
    SlotOrder {
        default_order: default.to_string(),
        today_order: today.to_string(),
        skip_until: None,
    }
}

#[test]
fn blank_default_and_today_yields_no_entry_and_no_mutation() {
    let records = vec![person("Alice", "Addr1", MealSlot::Lunch, order("", ""))];
    let cycle = resolve(MealSlot::Lunch, date(2024, 1, 10), records.clone());

    assert!(cycle.serving_list.is_empty());
    assert_eq!(cycle.records, records);
    assert_eq!(cycle.outcomes, vec![Resolution::NoOrder]);
}

#[test]
fn future_skip_leaves_record_untouched_regardless_of_fields() {
    let mut pending = order("Idli", "-3");
    pending.skip_until = Some(date(2024, 1, 11));
    let records = vec![person("Grace", "Addr7", MealSlot::Breakfast, pending)];

    let cycle = resolve(MealSlot::Breakfast, date(2024, 1, 10), records.clone());

    assert!(cycle.serving_list.is_empty());
    assert_eq!(cycle.records, records);
    assert_eq!(
        cycle.outcomes,
        vec![Resolution::SkipActive {
            until: date(2024, 1, 11)
        }]
    );
}

#[test]
fn pending_today_applies_once_skip_window_elapses() {
    let mut pending = order("Idli", "Pancakes");
    pending.skip_until = Some(date(2024, 1, 11));
    let records = vec![person("Grace", "Addr7", MealSlot::Breakfast, pending)];

    let held = resolve(MealSlot::Breakfast, date(2024, 1, 10), records);
    assert!(held.serving_list.is_empty());

    let released = resolve(MealSlot::Breakfast, date(2024, 1, 11), held.records);
    assert_eq!(
        released.serving_list.lines(),
        ["Grace (Addr7) -> Pancakes".to_string()]
    );
    assert_eq!(released.records[0].breakfast.today_order, "");
    assert_eq!(
        released.records[0].breakfast.skip_until,
        Some(date(2024, 1, 11))
    );
}

#[test]
fn numeric_skip_installs_future_date_and_clears_today() {
    let records = vec![person("Eve", "Addr5", MealSlot::Lunch, order("Biryani", "-3"))];

    let first = resolve(MealSlot::Lunch, date(2024, 1, 10), records);
    assert!(first.serving_list.is_empty());
    assert_eq!(first.records[0].lunch.skip_until, Some(date(2024, 1, 13)));
    assert_eq!(first.records[0].lunch.today_order, "");
    assert_eq!(
        first.outcomes,
        vec![Resolution::SkipInstalled {
            until: date(2024, 1, 13)
        }]
    );

    let second = resolve(MealSlot::Lunch, date(2024, 1, 10), first.records.clone());
    assert!(second.serving_list.is_empty());
    assert_eq!(second.records, first.records);
    assert!(matches!(second.outcomes[0], Resolution::SkipActive { .. }));
}

#[test]
fn numeric_skip_window_ends_on_the_installed_date() {
    let records = vec![person("Eve", "Addr5", MealSlot::Lunch, order("Biryani", "-3"))];
    let installed = resolve(MealSlot::Lunch, date(2024, 1, 10), records);

    let still_skipped = resolve(MealSlot::Lunch, date(2024, 1, 12), installed.records.clone());
    assert!(still_skipped.serving_list.is_empty());

    let served = resolve(MealSlot::Lunch, date(2024, 1, 13), installed.records);
    assert_eq!(
        served.serving_list.lines(),
        ["Eve (Addr5) -> Biryani".to_string()]
    );
}

#[test]
fn zero_day_skip_suppresses_only_the_current_cycle() {
    let records = vec![person("Ann", "Addr0", MealSlot::Dinner, order("Soup", "-0"))];
    let today = date(2024, 5, 1);

    let first = resolve(MealSlot::Dinner, today, records);
    assert!(first.serving_list.is_empty());
    assert_eq!(first.records[0].dinner.skip_until, Some(today));

    let next = resolve(MealSlot::Dinner, today, first.records);
    assert_eq!(next.serving_list.lines(), ["Ann (Addr0) -> Soup".to_string()]);
}

#[test]
fn literal_skip_tokens_suppress_default_and_clear_today() {
    for token in ["no", "-"] {
        let records = vec![person("Diana", "Addr4", MealSlot::Dinner, order("Samosa", token))];
        let cycle = resolve(MealSlot::Dinner, date(2024, 1, 10), records);

        assert!(cycle.serving_list.is_empty(), "token {token} should skip");
        assert_eq!(cycle.records[0].dinner.today_order, "");
        assert_eq!(cycle.records[0].dinner.skip_until, None);
        assert_eq!(cycle.outcomes, vec![Resolution::SkippedToday]);
    }
}

#[test]
fn literal_skip_comparison_is_case_sensitive() {
    let records = vec![person("Diana", "Addr4", MealSlot::Dinner, order("Samosa", "No"))];
    let cycle = resolve(MealSlot::Dinner, date(2024, 1, 10), records);

    assert_eq!(
        cycle.serving_list.lines(),
        ["Diana (Addr4) -> No".to_string()]
    );
    assert_eq!(cycle.records[0].dinner.today_order, "");
}

#[test]
fn override_is_served_once_then_default_returns() {
    let records = vec![person(
        "Diana",
        "Addr4",
        MealSlot::Breakfast,
        order("Idli", "Pancakes"),
    )];
    let today = date(2024, 1, 10);

    let first = resolve(MealSlot::Breakfast, today, records);
    assert_eq!(
        first.serving_list.lines(),
        ["Diana (Addr4) -> Pancakes".to_string()]
    );
    assert_eq!(first.records[0].breakfast.today_order, "");
    assert_eq!(
        first.outcomes,
        vec![Resolution::Served {
            meal: "Pancakes".to_string(),
            source: MealSource::Override,
        }]
    );

    let second = resolve(MealSlot::Breakfast, today, first.records);
    assert_eq!(
        second.serving_list.lines(),
        ["Diana (Addr4) -> Idli".to_string()]
    );
}

#[test]
fn malformed_numeric_skip_is_served_as_literal_override() {
    let records = vec![person("Bob", "Addr2", MealSlot::Lunch, order("Dal", "-2days"))];
    let cycle = resolve(MealSlot::Lunch, date(2024, 1, 10), records);

    assert_eq!(
        cycle.serving_list.lines(),
        ["Bob (Addr2) -> -2days".to_string()]
    );
    assert_eq!(cycle.records[0].lunch.today_order, "");
    assert_eq!(cycle.records[0].lunch.skip_until, None);
}

#[test]
fn null_tokens_are_treated_as_blank() {
    let records = vec![
        person("Frank", "Addr6", MealSlot::Lunch, order("NaN", "none")),
        person("Gina", "Addr8", MealSlot::Lunch, order("Khichdi", "nan")),
    ];
    let cycle = resolve(MealSlot::Lunch, date(2024, 1, 10), records);

    assert_eq!(
        cycle.serving_list.lines(),
        ["Gina (Addr8) -> Khichdi".to_string()]
    );
    assert_eq!(cycle.outcomes[0], Resolution::NoOrder);
}

#[test]
fn huge_skip_count_saturates_instead_of_failing() {
    let mut record = person("Zed", "Addr9", MealSlot::Dinner, order("Rajma", "-99999999999"));
    let outcome = resolve_record(MealSlot::Dinner, date(2024, 1, 10), &mut record);

    assert_eq!(
        outcome,
        Resolution::SkipInstalled {
            until: NaiveDate::MAX
        }
    );
    assert_eq!(record.dinner.skip_until, Some(NaiveDate::MAX));
}

#[test]
fn serving_list_keeps_record_order_and_other_slots_untouched() {
    let mut zara = person("Zara", "Zeta", MealSlot::Lunch, order("Pasta", ""));
    zara.dinner = order("Salad", "Tacos");
    let records = vec![
        zara,
        person("Adam", "Alpha", MealSlot::Lunch, order("Rice", "Burger")),
        person("Mia", "Mu", MealSlot::Lunch, order("Roti", "")),
    ];

    let cycle = resolve(MealSlot::Lunch, date(2024, 1, 10), records);

    assert_eq!(
        cycle.serving_list.to_string(),
        "Zara (Zeta) -> Pasta\nAdam (Alpha) -> Burger\nMia (Mu) -> Roti"
    );
    assert_eq!(cycle.records[0].dinner.today_order, "Tacos");
    assert_eq!(cycle.mutated_count(), 1);
}
