use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::types::{ParsedUpload, RawRow};
use crate::error::AppError;

const NOT_ENOUGH_LINES: &str = "CSV file must contain at least a header row and one data row";

/// Splits uploaded CSV text into headers and rows.
///
/// Cells are split on every comma and stripped of `"` characters, so a quoted
/// value containing a comma ends up in two cells. Blank lines are ignored.
pub fn parse(text: &str) -> Result<ParsedUpload, AppError> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();

    if lines.len() < 2 {
        return Err(AppError::Format(NOT_ENOUGH_LINES.to_string()));
    }

    let headers = split_line(lines[0]);
    let rows = lines[1..]
        .iter()
        .map(|line| to_row(&headers, split_line(line)))
        .collect::<Vec<_>>();

    tracing::info!("Parsed CSV upload: {} columns, {} rows", headers.len(), rows.len());
    Ok(ParsedUpload { headers, rows })
}

fn split_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| cell.trim().replace('"', ""))
        .collect()
}

/// Missing trailing cells become empty strings; surplus cells are dropped.
fn to_row(headers: &[String], cells: Vec<String>) -> RawRow {
    let mut cells = cells.into_iter();
    headers
        .iter()
        .map(|header| (header.clone(), cells.next().unwrap_or_default()))
        .collect()
}

/// Reads the first worksheet of an `.xlsx` upload into the same shape as
/// [`parse`].
pub fn parse_workbook(file_data: Bytes) -> Result<ParsedUpload, AppError> {
    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e| {
        tracing::error!("Failed to open workbook: {}", e);
        AppError::Spreadsheet(format!("Failed to open workbook: {}", e))
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Format("No sheets found in workbook".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let lines: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect();

    if lines.len() < 2 {
        return Err(AppError::Format(NOT_ENOUGH_LINES.to_string()));
    }

    let mut lines = lines.into_iter();
    let headers = lines.next().unwrap_or_default();
    let rows = lines.map(|cells| to_row(&headers, cells)).collect::<Vec<_>>();

    tracing::info!(
        "Parsed worksheet {}: {} columns, {} rows",
        sheet_name,
        headers.len(),
        rows.len()
    );
    Ok(ParsedUpload { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        _ => cell.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[test]
    fn parses_header_and_rows() {
        let parsed = parse("Name,Email,Company\nAlice,alice@x.com,Acme\n").unwrap();
        assert_eq!(parsed.headers, vec!["Name", "Email", "Company"]);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0]["Name"], "Alice");
        assert_eq!(parsed.rows[0]["Company"], "Acme");
    }

    #[test]
    fn fewer_than_two_non_blank_lines_is_a_format_error() {
        for text in ["", "\n\n", "Name,Email", "Name,Email\n   \n\n"] {
            let err = assert_err!(parse(text));
            assert!(matches!(err, AppError::Format(_)), "{:?}", text);
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let parsed = parse("Name,Email\n\nA,a@x.com\n  \nB,b@x.com").unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1]["Name"], "B");
    }

    #[test]
    fn quotes_are_stripped_and_cells_trimmed() {
        let parsed = parse("\"Name\", \"Email\"\r\n \"Bob\" ,bob@x.com\r\n").unwrap();
        assert_eq!(parsed.headers, vec!["Name", "Email"]);
        assert_eq!(parsed.rows[0]["Name"], "Bob");
        assert_eq!(parsed.rows[0]["Email"], "bob@x.com");
    }

    #[test]
    fn missing_trailing_cells_default_to_empty() {
        let parsed = parse("Name,Email,Phone\nCara,cara@x.com").unwrap();
        assert_eq!(parsed.rows[0]["Phone"], "");
    }

    #[test]
    fn quoted_commas_are_split() {
        let parsed = parse("Name,Company\n\"Doe, Jane\",Acme").unwrap();
        assert_eq!(parsed.rows[0]["Name"], "Doe");
        assert_eq!(parsed.rows[0]["Company"], "Jane");
    }

    const CONTACTS_XLSX: &[u8] = include_bytes!("fixtures/contacts.xlsx");
    const HEADER_ONLY_XLSX: &[u8] = include_bytes!("fixtures/header_only.xlsx");

    #[test]
    fn first_worksheet_row_is_the_header() {
        let parsed = parse_workbook(Bytes::from_static(CONTACTS_XLSX)).unwrap();
        assert_eq!(parsed.headers, vec!["Name", "Email", "Phone", "Company"]);
    }

    #[test]
    fn workbook_cells_are_trimmed_and_blank_rows_dropped() {
        let parsed = parse_workbook(Bytes::from_static(CONTACTS_XLSX)).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0]["Name"], "Ada Lovelace");
        assert_eq!(parsed.rows[1]["Name"], "Grace Hopper");
        assert_eq!(parsed.rows[1]["Phone"], "");
    }

    #[test]
    fn whole_numbers_have_no_decimal_suffix() {
        let parsed = parse_workbook(Bytes::from_static(CONTACTS_XLSX)).unwrap();
        assert_eq!(parsed.rows[0]["Phone"], "5551234");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn header_only_sheet_is_a_format_error() {
        let err = assert_err!(parse_workbook(Bytes::from_static(HEADER_ONLY_XLSX)));
        assert!(matches!(err, AppError::Format(_)));
    }

    #[test]
    fn invalid_workbook_bytes_are_rejected() {
        let err = assert_err!(parse_workbook(Bytes::from_static(b"not a workbook")));
        assert!(matches!(err, AppError::Spreadsheet(_)));
    }
}
