use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use super::model::{Dataset, DatasetMeta};
use super::source::Format;
use crate::config::IngestOptions;
use crate::error::{Error, Result};

/// Serialize a dataset in `format` so that [`super::loader::ingest`] with the
/// same options reads back an identical dataset.
pub fn write_dataset(dataset: &Dataset, format: Format, options: &IngestOptions) -> Result<Vec<u8>> {
    let delimiter = options.delimiter_for(format)?;
    let mut out = preamble(&dataset.meta).into_bytes();

    // A leading '#' would otherwise read back as a comment line.
    let quote_style = if starts_with_hash(dataset) {
        QuoteStyle::NonNumeric
    } else {
        QuoteStyle::Necessary
    };

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(quote_style)
        .has_headers(false)
        .from_writer(&mut out);

    if dataset.has_header() {
        writer.write_record(dataset.columns()).map_err(write_err)?;
    }
    for row in dataset.rows() {
        writer
            .write_record(row.iter().map(|c| c.to_field()))
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| Error::malformed(format!("flushing {format} output: {e}")))?;
    drop(writer);

    Ok(out)
}

/// Write a dataset to `path`, picking the format from its extension.
pub fn save_dataset(dataset: &Dataset, path: &Path, options: &IngestOptions) -> Result<()> {
    let format = Format::from_path(path)?;
    let bytes = write_dataset(dataset, format, options)?;
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))?;
    log::info!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

fn preamble(meta: &DatasetMeta) -> String {
    let mut text = String::new();
    for key in DatasetMeta::KEYS {
        if let Some(value) = meta.get(key) {
            let value = value.replace(|c: char| c == '\r' || c == '\n', " ");
            text.push_str(&format!("# {key}: {}\n", value.trim()));
        }
    }
    text
}

fn starts_with_hash(dataset: &Dataset) -> bool {
    let header = dataset.has_header() && dataset.columns()[0].starts_with('#');
    header
        || dataset
            .rows()
            .iter()
            .any(|row| row[0].to_field().starts_with('#'))
}

fn write_err(e: csv::Error) -> Error {
    Error::malformed(format!("writing record: {e}"))
}
