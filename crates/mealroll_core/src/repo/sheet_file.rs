//! Tabular sheet file store.
//!
//! # Responsibility
//! - Read and write the sheet layout (`Name`, `Address`, then
//!   `Default/Today/Skip {label} Until` per slot) as a JSON array of rows.
//! - Tolerate informal cell content (nulls, numbers, `nan`).
//!
//! # Invariants
//! - Writes go to a sibling temporary file that is renamed over the target,
//!   so readers never observe a half-written sheet.
//! - Columns are emitted in layout order on every write.

use crate::model::meal::{
    format_skip_date, normalize_cell, parse_skip_date, MealSlot, PersonMealRecord, SlotLabels,
};
use crate::repo::record_repo::{RecordStore, RepoError, RepoResult};
use log::{info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const NAME_COLUMN: &str = "Name";
const ADDRESS_COLUMN: &str = "Address";

/// Record store backed by one sheet file on disk.
#[derive(Debug, Clone)]
pub struct SheetFileStore {
    path: PathBuf,
    labels: SlotLabels,
}

impl SheetFileStore {
    pub fn new(path: impl Into<PathBuf>, labels: SlotLabels) -> Self {
        Self {
            path: path.into(),
            labels,
        }
    }

    fn io_error(&self, source: std::io::Error) -> RepoError {
        RepoError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn parse_row(&self, index: usize, row: &Value) -> RepoResult<(PersonMealRecord, usize)> {
        let cells = row
            .as_object()
            .ok_or_else(|| RepoError::InvalidData(format!("sheet row {index} is not an object")))?;
        if !cells.contains_key(NAME_COLUMN) {
            return Err(RepoError::InvalidData(format!(
                "sheet row {index} has no `{NAME_COLUMN}` column"
            )));
        }

        let mut record = PersonMealRecord::new(
            text_cell(cells.get(NAME_COLUMN)),
            text_cell(cells.get(ADDRESS_COLUMN)),
        );
        let mut unparsed_dates = 0;

        for slot in MealSlot::ALL {
            let skip_cell = cells.get(&self.labels.skip_column(slot));
            let skip_until = skip_cell.and_then(date_cell);
            if skip_until.is_none() && !text_cell(skip_cell).is_empty() {
                unparsed_dates += 1;
            }

            let order = record.slot_mut(slot);
            order.default_order = text_cell(cells.get(&self.labels.default_column(slot)));
            order.today_order = text_cell(cells.get(&self.labels.today_column(slot)));
            order.skip_until = skip_until;
        }

        Ok((record, unparsed_dates))
    }

    fn render_row(&self, record: &PersonMealRecord) -> Value {
        let mut cells = Map::new();
        cells.insert(NAME_COLUMN.to_string(), Value::from(record.name.as_str()));
        cells.insert(
            ADDRESS_COLUMN.to_string(),
            Value::from(record.address.as_str()),
        );
        for slot in MealSlot::ALL {
            let order = record.slot(slot);
            cells.insert(
                self.labels.default_column(slot),
                Value::from(order.default_order.as_str()),
            );
            cells.insert(
                self.labels.today_column(slot),
                Value::from(order.today_order.as_str()),
            );
            cells.insert(
                self.labels.skip_column(slot),
                Value::from(format_skip_date(order.skip_until)),
            );
        }
        Value::Object(cells)
    }
}

impl RecordStore for SheetFileStore {
    fn load_all(&self) -> RepoResult<Vec<PersonMealRecord>> {
        let raw = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let document: Value = serde_json::from_str(&raw)
            .map_err(|err| RepoError::InvalidData(format!("sheet is not valid JSON: {err}")))?;
        let rows = document.as_array().ok_or_else(|| {
            RepoError::InvalidData("sheet root must be an array of rows".to_string())
        })?;

        let mut records = Vec::with_capacity(rows.len());
        let mut unparsed_dates = 0;
        for (index, row) in rows.iter().enumerate() {
            let (record, unparsed) = self.parse_row(index, row)?;
            unparsed_dates += unparsed;
            records.push(record);
        }

        if unparsed_dates > 0 {
            warn!(
                "event=records_load module=repo store=sheet status=degraded unparsed_skip_dates={unparsed_dates}"
            );
        }
        info!(
            "event=records_load module=repo store=sheet status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    fn write_all(&self, records: &[PersonMealRecord]) -> RepoResult<()> {
        let rows = records
            .iter()
            .map(|record| self.render_row(record))
            .collect::<Vec<_>>();
        let body = serde_json::to_string_pretty(&Value::Array(rows))
            .map_err(|err| RepoError::InvalidData(format!("failed to encode sheet: {err}")))?;

        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let staged = stage_sheet(parent, &body).map_err(|err| self.io_error(err))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        info!(
            "event=records_write module=repo store=sheet status=ok count={}",
            records.len()
        );
        Ok(())
    }
}

fn stage_sheet(dir: &Path, body: &str) -> std::io::Result<NamedTempFile> {
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(body.as_bytes())?;
    staged.write_all(b"\n")?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

fn text_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => normalize_cell(text),
        Some(other) => normalize_cell(&other.to_string()),
    }
}

fn date_cell(value: &Value) -> Option<chrono::NaiveDate> {
    value.as_str().and_then(parse_skip_date)
}
