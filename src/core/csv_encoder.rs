use crate::domain::model::{FlatRow, HeaderPolicy};
use crate::utils::error::{Result, ScrapeError};
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Column names for `rows` under `policy`.
pub fn header_for(rows: &[FlatRow], policy: HeaderPolicy) -> Vec<String> {
    match policy {
        HeaderPolicy::FirstRow => rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default(),
        HeaderPolicy::Union => {
            let mut header: Vec<String> = Vec::new();
            for column in rows.iter().flat_map(FlatRow::columns) {
                if !header.iter().any(|existing| existing == column) {
                    header.push(column.to_string());
                }
            }
            header
        }
    }
}

/// Encodes rows as comma-separated text with `\n` record terminators.
///
/// A field is quoted when it contains a comma, a double quote or a line
/// break; embedded quotes are doubled. Columns absent from a row are
/// written as empty fields. Returns `None` when there are no rows.
pub fn encode_rows(rows: &[FlatRow], policy: HeaderPolicy) -> Result<Option<String>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let header = header_for(rows, policy);
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&header)?;
    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|column| row.get(column).map(ToString::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScrapeError::IoError(e.into_error()))?;
    let text = String::from_utf8(bytes).map_err(|e| ScrapeError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })?;

    Ok(Some(text))
}
