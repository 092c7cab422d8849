use std::io::{Cursor, Write};

use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect_url};
use rust_xlsxwriter::{Format, Workbook};

pub(crate) const HEADERS: [&str; 4] = ["Full Name", "Department", "Hire Date", "Salary"];

pub(crate) enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// Serial number rendered with a date format, read back as a native date.
    Date(f64),
    Blank,
}

/// Build an `.xlsx` in memory: the header row followed by `rows`.
pub(crate) fn workbook_bytes(rows: &[Vec<Cell<'_>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(excel_row, col, *text).unwrap();
                }
                Cell::Number(value) => {
                    sheet.write_number(excel_row, col, *value).unwrap();
                }
                Cell::Date(serial) => {
                    sheet
                        .write_number_with_format(excel_row, col, *serial, &date_format)
                        .unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

const NO_SHEET_PARTS: [(&str, &str); 3] = [
    (
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
    ),
    (
        "xl/workbook.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets/></workbook>"#,
    ),
    (
        "xl/_rels/workbook.xml.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
    ),
];

/// A valid `.xlsx` package whose workbook lists no worksheets.
pub(crate) fn workbook_without_sheets() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, body) in NO_SHEET_PARTS {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Fresh in-memory SQLite database with the schema applied.
pub(crate) async fn memory_db() -> DbPool {
    let db = connect_url(&DatabaseSettings::default(), "sqlite::memory:")
        .await
        .unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}
