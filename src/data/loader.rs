use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use super::headers::{missing_fields, normalize_record};
use super::model::{CellValue, RawRecord};
use crate::error::IngestError;

// ---------------------------------------------------------------------------
// Source format
// ---------------------------------------------------------------------------

/// How the raw bytes of an upload should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (`.csv`, `.tsv`, `.txt`).
    Delimited,
    /// Spreadsheet workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
    Spreadsheet,
}

/// Extensions offered by the file dialog.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["csv", "tsv", "txt", "xlsx", "xlsm", "xlsb", "xls", "ods"];

impl SourceFormat {
    /// Pick the format from a file name's extension.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            other => Err(IngestError::UnsupportedExtension(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and ingest a file from disk. Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_bytes(&bytes, format)
}

/// Ingest in-memory file content. Returned records carry canonical
/// (trimmed, upper-cased) column names.
///
/// Any structural problem fails the whole batch; nothing partial is returned.
pub fn load_bytes(bytes: &[u8], format: SourceFormat) -> Result<Vec<RawRecord>, IngestError> {
    let records = match format {
        SourceFormat::Delimited => load_delimited(bytes)?,
        SourceFormat::Spreadsheet => load_spreadsheet(bytes)?,
    };

    let records: Vec<RawRecord> = records.into_iter().map(normalize_record).collect();

    if let Some(first) = records.first() {
        let missing = missing_fields(first.columns());
        if !missing.is_empty() {
            log::warn!("No column found for {missing:?}");
        }
    }
    log::info!("Ingested {} rows ({format:?})", records.len());

    Ok(records)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Header row first, blank lines skipped, cell types guessed from text.
/// Text is decoded lossily so stray Latin-1 bytes do not abort the upload.
fn load_delimited(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let text = String::from_utf8_lossy(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.clone(), guess_cell_type(value)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

/// Choose the delimiter that occurs most often on the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    [b',', b';', b'\t', b'|']
        .into_iter()
        .map(|d| (d, header_line.bytes().filter(|&b| b == d).count()))
        .filter(|&(_, count)| count > 0)
        .max_by_key(|&(d, count)| (count, d == b','))
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn guess_cell_type(s: &str) -> CellValue {
    let t = s.trim();
    if t.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    match t {
        "true" | "TRUE" | "True" => CellValue::Bool(true),
        "false" | "FALSE" | "False" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet workbooks
// ---------------------------------------------------------------------------

/// First sheet only; its first row is the header. Empty cells are left out
/// of the record and fully empty rows are dropped.
fn load_spreadsheet(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptyWorkbook)??;
    Ok(records_from_range(&range))
}

fn records_from_range(range: &Range<Data>) -> Vec<RawRecord> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| {
            let name = cell.to_string();
            (!name.trim().is_empty()).then_some(name)
        })
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .filter_map(|(header, cell)| {
                let header = header.as_ref()?;
                let value = spreadsheet_cell(cell);
                (!value.is_blank()).then(|| (header.clone(), value))
            })
            .collect();
        if record.columns().next().is_some() {
            records.push(record);
        }
    }
    records
}

/// Date cells become their serial number so they go through the same
/// serial-date path as numeric dates typed into a CSV.
fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::String(s.clone())
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_csv(text: &str) -> Vec<RawRecord> {
        load_bytes(text.as_bytes(), SourceFormat::Delimited).unwrap()
    }

    #[test]
    fn csv_headers_are_normalized_and_types_guessed() {
        let records = load_csv(" Animal ,Data,Peso,sexo\nA1,01/01/2024,100.5,m\n");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.get("ANIMAL"), Some(&CellValue::String("A1".into())));
        assert_eq!(r.get("DATA"), Some(&CellValue::String("01/01/2024".into())));
        assert_eq!(r.get("PESO"), Some(&CellValue::Float(100.5)));
        assert_eq!(r.get("SEXO"), Some(&CellValue::String("m".into())));
    }

    #[test]
    fn csv_blank_lines_are_skipped() {
        let records = load_csv("ANIMAL,PESO\nA,1\n\n,\nB,2\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("PESO"), Some(&CellValue::Integer(2)));
    }

    #[test]
    fn csv_semicolon_delimiter_is_detected() {
        let records = load_csv("ANIMAL;DATA;PESO\nA;2024-01-01;100\n");
        assert_eq!(records[0].get("PESO"), Some(&CellValue::Integer(100)));
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn csv_ragged_rows_abort_ingestion() {
        let err = load_bytes(b"ANIMAL,PESO\nA,1,extra\n", SourceFormat::Delimited).unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }

    #[test]
    fn csv_latin1_bytes_do_not_abort() {
        let bytes = b"ANIMAL,LOCAL\nA,Pasto S\xe3o Jo\xe3o\n";
        let records = load_bytes(bytes, SourceFormat::Delimited).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("pesagens.CSV")).unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("pesagens.xlsx")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("pesagens.pdf")),
            Err(IngestError::UnsupportedExtension(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn garbage_spreadsheet_is_an_error() {
        let err = load_bytes(b"definitely not a workbook", SourceFormat::Spreadsheet).unwrap_err();
        assert!(matches!(err, IngestError::Spreadsheet(_)));
    }

    #[test]
    fn first_sheet_rows_become_records() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let mut range: Range<Data> = Range::new((0, 0), (3, 3));
        range.set_value((0, 0), Data::String("Animal".into()));
        range.set_value((0, 2), Data::String("Data".into()));
        range.set_value((0, 3), Data::String("Peso".into()));
        range.set_value((1, 0), Data::String("A".into()));
        range.set_value((1, 1), Data::String("under a blank header".into()));
        range.set_value(
            (1, 2),
            Data::DateTime(ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, false)),
        );
        range.set_value((1, 3), Data::Float(100.5));
        // Row 2 stays empty.
        range.set_value((3, 0), Data::String("B".into()));
        range.set_value((3, 2), Data::Int(45001));
        range.set_value((3, 3), Data::Int(200));

        let records = records_from_range(&range);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.columns().collect::<Vec<_>>(), ["Animal", "Data", "Peso"]);
        assert_eq!(first.get("Data"), Some(&CellValue::Float(45000.0)));
        assert_eq!(first.get("Peso"), Some(&CellValue::Float(100.5)));

        let second = &records[1];
        assert_eq!(second.get("Animal"), Some(&CellValue::String("B".into())));
        assert_eq!(second.get("Data"), Some(&CellValue::Integer(45001)));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "ANIMAL,DATA,PESO\nA,2024-01-01,100").unwrap();
        let records = load_file(file.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/nonexistent/pesagens.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
