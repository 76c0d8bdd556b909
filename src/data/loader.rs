use std::collections::HashMap;
use std::path::Path;

use crate::error::LoadError;

use super::encoding;
use super::model::{Column, ColumnKind, Dataset, Value};

/// Cell contents treated as missing.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a CSV file into a [`Dataset`].
///
/// The byte encoding is sniffed first (see [`encoding::detect_encoding`]),
/// then the decoded text is parsed with a header row. An input with a
/// header but no data rows is reported as [`LoadError::Empty`].
pub fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, used) = encoding::decode(&bytes);

    let dataset = parse_csv(&text)?;
    log::info!(
        "Loaded {} rows x {} columns from {} ({})",
        dataset.len(),
        dataset.column_count(),
        path.display(),
        used.name()
    );
    if dataset.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(dataset)
}

/// Parse decoded CSV text. Does not reject an empty body; see [`load_csv`].
pub fn parse_csv(text: &str) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_headers = reader.headers()?.clone();
    if raw_headers.is_empty() {
        return Err(LoadError::Parse("No columns to parse from file".to_string()));
    }
    let headers = dedupe_headers(raw_headers.iter());
    let n_cols = headers.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];
    for result in reader.records() {
        let record = result?;
        if record.len() > n_cols {
            let line = record.position().map_or(0, |p| p.line());
            return Err(LoadError::Parse(format!(
                "Error tokenizing data. Expected {n_cols} fields in line {line}, saw {}",
                record.len()
            )));
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            let cell = record.get(idx).filter(|s| !NULL_MARKERS.contains(s));
            column.push(cell.map(str::to_string));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| build_column(name, raw))
        .collect();
    Ok(Dataset::new(columns))
}

/// Settle the column kind from the raw strings, then type each cell.
/// Text columns keep the cell text exactly as it appeared in the file.
fn build_column(name: String, raw: Vec<Option<String>>) -> Column {
    let present = || raw.iter().flatten().map(|s| s.trim());
    let kind = if present().all(|s| s.parse::<i64>().is_ok()) && present().next().is_some() {
        ColumnKind::Integer
    } else if present().all(|s| s.parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else if present().all(|s| parse_bool(s).is_some()) {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    };

    let values = raw
        .into_iter()
        .map(|cell| match cell {
            None => Value::Null,
            Some(s) => typed_value(kind, s),
        })
        .collect();
    Column { name, kind, values }
}

fn typed_value(kind: ColumnKind, s: String) -> Value {
    let t = s.trim();
    match kind {
        ColumnKind::Integer => t.parse().map_or(Value::Null, Value::Integer),
        ColumnKind::Float => t.parse().map_or(Value::Null, Value::Float),
        ColumnKind::Boolean => parse_bool(t).map_or(Value::Null, Value::Bool),
        ColumnKind::Text => Value::Text(s),
    }
}

fn parse_bool(t: &str) -> Option<bool> {
    if t.eq_ignore_ascii_case("true") {
        Some(true)
    } else if t.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Make header names unique: repeats get `.1`, `.2`, ... and blank names
/// become `Unnamed: <index>`.
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();

    for (idx, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        while let Some(n) = seen.get(&candidate).copied() {
            seen.insert(candidate.clone(), n + 1);
            candidate = format!("{base}.{}", n + 1);
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}
