use chrono::NaiveDate;
use mealroll_core::db::open_db_in_memory;
use mealroll_core::{
    sample_records, MealSlot, PersonMealRecord, RecordStore, RepoError, SheetFileStore,
    SlotLabels, SlotOrder, SqliteRecordStore,
};
use serde_json::Value;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_write_then_load_preserves_order_and_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let records = sample_records(date(2024, 1, 10));

    store.write_all(&records).unwrap();
    let loaded = store.load_all().unwrap();

    assert_eq!(loaded, records);
}

#[test]
fn sqlite_write_all_replaces_previous_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    store.write_all(&sample_records(date(2024, 1, 10))).unwrap();

    let replacement = vec![PersonMealRecord::new("Solo", "Only Street")];
    store.write_all(&replacement).unwrap();

    assert_eq!(store.load_all().unwrap(), replacement);
}

#[test]
fn sqlite_find_person_matches_display_key() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    store.write_all(&sample_records(date(2024, 1, 10))).unwrap();

    let eve = store.find_person("Eve (Addr5)").unwrap().unwrap();
    assert_eq!(eve.lunch.today_order, "-3");
    assert_eq!(eve.dinner.skip_until, Some(date(2024, 1, 13)));

    assert!(store.find_person("Eve (Elsewhere)").unwrap().is_none());
}

#[test]
fn sqlite_unparseable_skip_date_loads_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    store
        .write_all(&[PersonMealRecord::new("Alice", "Addr1")])
        .unwrap();
    conn.execute(
        "UPDATE meal_slots SET skip_until = 'next tuesday', today_order = 'nan' WHERE slot = 'lunch';",
        [],
    )
    .unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded[0].lunch.skip_until, None);
    assert_eq!(loaded[0].lunch.today_order, "");
}

#[test]
fn sqlite_failed_write_keeps_previous_state() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let original = sample_records(date(2024, 1, 10));
    store.write_all(&original).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER reject_mallory BEFORE INSERT ON people
         WHEN NEW.name = 'Mallory'
         BEGIN
             SELECT RAISE(ABORT, 'rejected');
         END;",
    )
    .unwrap();

    let mut replacement = original.clone();
    replacement[0].breakfast.today_order = "Changed".to_string();
    replacement.push(PersonMealRecord::new("Mallory", "Nowhere"));

    let err = store.write_all(&replacement).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(store.load_all().unwrap(), original);
}

#[test]
fn sheet_round_trip_preserves_records_and_column_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meals.json");
    let store = SheetFileStore::new(&path, SlotLabels::default());
    let records = sample_records(date(2024, 1, 10));

    store.write_all(&records).unwrap();
    assert_eq!(store.load_all().unwrap(), records);

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first_row = document.as_array().unwrap()[0].as_object().unwrap();
    let columns = first_row.keys().cloned().collect::<Vec<_>>();
    assert_eq!(columns, SlotLabels::default().columns());
    assert_eq!(first_row["Skip BF Until"], Value::from(""));
}

#[test]
fn sheet_load_tolerates_informal_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meals.json");
    std::fs::write(
        &path,
        r#"[
            {
                "Name": "Alice",
                "Address": null,
                "Default BF": "Idli",
                "Today BF": "nan",
                "Skip BF Until": "2024-01-12 00:00:00",
                "Default Lunch": 7,
                "Skip Lunch Until": "soon",
                "Extra": "ignored"
            }
        ]"#,
    )
    .unwrap();

    let store = SheetFileStore::new(&path, SlotLabels::default());
    let loaded = store.load_all().unwrap();

    assert_eq!(loaded.len(), 1);
    let alice = &loaded[0];
    assert_eq!(alice.address, "");
    assert_eq!(alice.breakfast.default_order, "Idli");
    assert_eq!(alice.breakfast.today_order, "");
    assert_eq!(alice.breakfast.skip_until, Some(date(2024, 1, 12)));
    assert_eq!(alice.lunch.default_order, "7");
    assert_eq!(alice.lunch.skip_until, None);
    assert_eq!(alice.dinner, SlotOrder::default());
}

#[test]
fn sheet_uses_configured_slot_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meals.json");
    let labels = SlotLabels {
        breakfast: "Morning".to_string(),
        lunch: "Noon".to_string(),
        dinner: "Evening".to_string(),
    };
    std::fs::write(
        &path,
        r#"[{"Name": "Bob", "Address": "Addr2", "Default Noon": "Dal", "Default BF": "Dosa"}]"#,
    )
    .unwrap();

    let loaded = SheetFileStore::new(&path, labels).load_all().unwrap();
    assert_eq!(loaded[0].slot(MealSlot::Lunch).default_order, "Dal");
    assert_eq!(loaded[0].slot(MealSlot::Breakfast).default_order, "");
}

#[test]
fn sheet_rejects_rows_without_name_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meals.json");
    std::fs::write(&path, r#"[{"Person": "Alice"}]"#).unwrap();

    let err = SheetFileStore::new(&path, SlotLabels::default())
        .load_all()
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn sheet_failed_write_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meals.json");
    let store = SheetFileStore::new(&path, SlotLabels::default());
    let original = sample_records(date(2024, 1, 10));
    store.write_all(&original).unwrap();

    // A directory squatting on the target name makes the final rename fail
    // after the temp file was staged next to it.
    let blocked_path = dir.path().join("blocked.json");
    std::fs::create_dir(&blocked_path).unwrap();
    std::fs::write(blocked_path.join("keep.txt"), "occupied").unwrap();
    let blocked = SheetFileStore::new(&blocked_path, SlotLabels::default());
    let err = blocked.write_all(&original).unwrap_err();
    assert!(matches!(err, RepoError::Io { .. }));

    assert_eq!(store.load_all().unwrap(), original);
    assert!(blocked_path.is_dir());
    let mut entries = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    entries.sort();
    assert_eq!(
        entries,
        vec!["blocked.json".to_string(), "meals.json".to_string()],
        "staged temp file must not be left behind"
    );
}
