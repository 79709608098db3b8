use csv::{ReaderBuilder, StringRecord, Trim};

use super::model::{Cell, Dataset, DatasetMeta};
use super::source::{Format, Source};
use crate::config::{FetchOptions, HeaderMode, IngestOptions};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file or URL. Dispatch by extension.
///
/// The extension is checked before any bytes are read, so an unsupported
/// source never touches the disk or the network.
pub fn load(source: &Source, ingest_opts: &IngestOptions, fetch: &FetchOptions) -> Result<Dataset> {
    let format = source.format()?;
    log::debug!("Loading {source} as {format}");
    let bytes = source.read_bytes(fetch)?;
    let dataset = ingest(&bytes, format, ingest_opts)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.width(),
        source.display_name()
    );
    Ok(dataset)
}

/// Like [`ingest`], with the format given as a tag (`"csv"` / `"tdf"`).
pub fn ingest_tagged(bytes: &[u8], tag: &str, options: &IngestOptions) -> Result<Dataset> {
    let format = Format::from_tag(tag)?;
    ingest(bytes, format, options)
}

/// Parse a byte stream into a rectangular [`Dataset`].
///
/// Layout accepted for both formats:
/// ```text
/// # title: Muon decay          <- optional directives (title, x_label, y_label)
/// # any other comment          <- ignored
/// t,n                          <- optional header (see HeaderMode)
/// 0,100
/// 1,50
/// ```
/// Only the delimiter differs: `,` for csv, tab for tdf (both configurable).
pub fn ingest(bytes: &[u8], format: Format, options: &IngestOptions) -> Result<Dataset> {
    if bytes.is_empty() {
        return Err(Error::malformed("input is empty"));
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::malformed(format!("input is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let delimiter = options.delimiter_for(format)?;
    let meta = parse_preamble(text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut records: Vec<(u64, StringRecord)> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::malformed(format!("{format} parse error: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push((line, record));
    }

    // Whitespace-only lines come back as a single empty field; they only
    // count as data in single-column tables.
    let widest = records.iter().map(|(_, r)| r.len()).max().unwrap_or(0);
    if widest > 1 {
        records.retain(|(_, r)| !(r.len() == 1 && r[0].is_empty()));
    }

    let width = records
        .first()
        .map(|(_, r)| r.len())
        .ok_or_else(|| Error::malformed("no rows found"))?;

    for (line, record) in &records {
        if record.len() != width {
            return Err(Error::malformed(format!(
                "line {line}: expected {width} fields, found {}",
                record.len()
            )));
        }
    }

    let has_header = match options.header {
        HeaderMode::Auto => records[0].1.iter().any(|f| Cell::infer(f).is_text()),
        HeaderMode::Present => true,
        HeaderMode::Absent => false,
    };

    let (columns, body): (Vec<String>, &[(u64, StringRecord)]) = if has_header {
        let names = records[0]
            .1
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if name.is_empty() {
                    positional_name(i)
                } else {
                    name.to_string()
                }
            })
            .collect();
        (names, &records[1..])
    } else {
        ((0..width).map(positional_name).collect(), &records[..])
    };

    if body.is_empty() {
        return Err(Error::malformed("header row found but no data rows"));
    }

    let rows: Vec<Vec<Cell>> = body
        .iter()
        .map(|(_, record)| record.iter().map(Cell::infer).collect())
        .collect();

    log::debug!(
        "Parsed {format}: {} rows, {width} columns, header: {has_header}",
        rows.len()
    );
    Ok(Dataset::new(columns, rows, has_header)?.with_meta(meta))
}

/// Name given to column `index` (0-based) when the file has no header.
pub fn positional_name(index: usize) -> String {
    format!("column_{}", index + 1)
}

/// Collect `# key: value` directives from the leading comment block.
///
/// Like the reader, only a `#` in the first column starts a comment.
fn parse_preamble(text: &str) -> DatasetMeta {
    let mut meta = DatasetMeta::default();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(comment) = line.strip_prefix('#') else {
            break;
        };
        if let Some((key, value)) = comment.split_once(':') {
            let (key, value) = (key.trim(), value.trim());
            if !meta.set(key, value) {
                log::debug!("Ignoring unknown directive '{key}'");
            }
        }
    }
    meta
}
