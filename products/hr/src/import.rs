//! Spreadsheet import: first worksheet, header in row 1, one employee per row.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDate;
use entity::employees;
use sea_orm::{NotSet, Set};
use tracing::debug;

use crate::{
    coerce,
    error::{ImportError, ImportResult},
};

const NAME_COLUMN: u32 = 0;
const DEPARTMENT_COLUMN: u32 = 1;
const HIRE_DATE_COLUMN: u32 = 2;
const SALARY_COLUMN: u32 = 3;

static EMPTY: Data = Data::Empty;

/// An employee row that has been read but not yet stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    pub salary_cents: i64,
}

impl NewEmployee {
    pub fn into_active_model(self) -> employees::ActiveModel {
        employees::ActiveModel {
            id: NotSet,
            full_name: Set(self.full_name),
            department: Set(self.department),
            hire_date: Set(self.hire_date),
            salary_cents: Set(self.salary_cents),
        }
    }
}

/// Records read from one worksheet.
#[derive(Clone, Debug, Default)]
pub struct ParsedSheet {
    pub records: Vec<NewEmployee>,
    pub rows_scanned: usize,
    pub rows_skipped: usize,
}

impl ParsedSheet {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Parse an uploaded workbook. Fails with [`ImportError::NoRecords`] when no
/// row carries a name.
pub fn parse_workbook(bytes: &[u8]) -> ImportResult<ParsedSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)??;
    let parsed = parse_range(&range);
    if parsed.records.is_empty() {
        return Err(ImportError::NoRecords);
    }
    Ok(parsed)
}

/// Read every data row of `range`. Positions are absolute sheet coordinates,
/// so row 0 is always the header even when the used range starts lower.
pub fn parse_range(range: &Range<Data>) -> ParsedSheet {
    let mut parsed = ParsedSheet::default();
    let Some((last_row, _)) = range.end() else {
        return parsed;
    };
    let cell = |row: u32, col: u32| range.get_value((row, col)).unwrap_or(&EMPTY);

    for row in 1..=last_row {
        parsed.rows_scanned += 1;
        let name = cell(row, NAME_COLUMN);
        if is_blank(name) {
            debug!(row = row + 1, "skipping row without a name");
            parsed.rows_skipped += 1;
            continue;
        }
        parsed.records.push(NewEmployee {
            full_name: cell_text(name),
            department: cell_text(cell(row, DEPARTMENT_COLUMN)),
            hire_date: coerce::hire_date(cell(row, HIRE_DATE_COLUMN)),
            salary_cents: coerce::salary_cents(cell(row, SALARY_COLUMN)),
        });
    }
    parsed
}

/// Only a cell with no value at all skips its row; whitespace still counts.
fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(text) => text.is_empty(),
        _ => false,
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(text) => text.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}
