use lifetime_viewer::config::IngestOptions;
use lifetime_viewer::data::loader::{ingest, load, positional_name};
use lifetime_viewer::data::model::{Cell, Dataset, DatasetMeta};
use lifetime_viewer::data::source::{Format, Source};
use lifetime_viewer::data::writer::write_dataset;
use lifetime_viewer::Error;
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("must not parse as a number", |s| s.parse::<f64>().is_err())
}

/// Free text that may hold delimiters, quotes, line breaks or a leading `#`.
/// Outer whitespace is excluded because fields are trimmed on read.
fn printable() -> impl Strategy<Value = String> {
    "[ -~\t\n]{1,12}".prop_filter("trimmed and not a number", |s| {
        s.trim() == s && s.parse::<f64>().is_err()
    })
}

fn meta_value() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[!-~][ -~]{0,10}[!-~]")
}

fn numeric_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        any::<i64>().prop_map(Cell::Integer),
        (-1e6f64..1e6f64).prop_map(Cell::Float),
    ]
}

fn any_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        3 => numeric_cell(),
        1 => Just(Cell::Empty),
        2 => printable().prop_map(Cell::Text),
    ]
}

fn headerless_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![4 => numeric_cell(), 1 => Just(Cell::Empty)]
}

fn numeric_rows(width: usize) -> impl Strategy<Value = Vec<Vec<Cell>>> {
    prop::collection::vec(prop::collection::vec(numeric_cell(), width), 1..20)
}

fn dataset() -> impl Strategy<Value = Dataset> {
    (1usize..6, any::<bool>())
        .prop_flat_map(|(width, has_header)| {
            let cell = if has_header {
                any_cell().boxed()
            } else {
                headerless_cell().boxed()
            };
            (
                prop::collection::vec(printable(), width),
                prop::collection::vec(prop::collection::vec(cell, width), 1..20),
                Just(has_header),
                (meta_value(), meta_value(), meta_value()),
            )
        })
        .prop_map(|(names, rows, has_header, (title, x_label, y_label))| {
            let columns = if has_header {
                names
            } else {
                (0..names.len()).map(positional_name).collect()
            };
            let meta = DatasetMeta {
                title,
                x_label,
                y_label,
            };
            Dataset::new(columns, rows, has_header)
                .expect("generated table is rectangular")
                .with_meta(meta)
        })
}

fn render(header: Option<&[String]>, rows: &[Vec<Cell>], delimiter: &str) -> String {
    let mut text = String::new();
    if let Some(names) = header {
        text.push_str(&names.join(delimiter));
        text.push('\n');
    }
    for row in rows {
        let fields: Vec<String> = row.iter().map(|c| c.to_field()).collect();
        text.push_str(&fields.join(delimiter));
        text.push('\n');
    }
    text
}

proptest! {
    #[test]
    fn csv_with_header_keeps_shape(
        (names, rows) in (1usize..8).prop_flat_map(|w| (prop::collection::vec(text(), w), numeric_rows(w)))
    ) {
        let input = render(Some(&names), &rows, ",");
        let ds = ingest(input.as_bytes(), Format::Csv, &IngestOptions::default()).unwrap();
        prop_assert_eq!(ds.width(), names.len());
        prop_assert_eq!(ds.len(), rows.len());
        prop_assert_eq!(ds.columns(), names.as_slice());
    }

    #[test]
    fn headerless_tdf_keeps_every_line(rows in (1usize..8).prop_flat_map(numeric_rows)) {
        let input = render(None, &rows, "\t");
        let ds = ingest(input.as_bytes(), Format::Tdf, &IngestOptions::default()).unwrap();
        prop_assert!(!ds.has_header());
        prop_assert_eq!(ds.len(), rows.len());
        prop_assert_eq!(ds.rows(), rows.as_slice());
    }

    #[test]
    fn ragged_rows_are_malformed(
        (names, mut rows, pick, widen) in (2usize..6)
            .prop_flat_map(|w| (prop::collection::vec(text(), w), numeric_rows(w), any::<prop::sample::Index>(), any::<bool>()))
    ) {
        let i = pick.index(rows.len());
        if widen {
            rows[i].push(Cell::Integer(1));
        } else {
            rows[i].pop();
        }
        let input = render(Some(&names), &rows, ",");
        let result = ingest(input.as_bytes(), Format::Csv, &IngestOptions::default());
        prop_assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn other_extensions_rejected_before_reading(ext in "[a-z]{1,5}") {
        prop_assume!(ext != "csv" && ext != "tdf");
        // The file does not exist, so an Io error would mean it was read first.
        let src = Source::parse(&format!("/nonexistent/lifetime.{ext}"));
        let result = load(&src, &IngestOptions::default(), &Default::default());
        prop_assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn round_trip_is_identity(ds in dataset(), tdf in any::<bool>()) {
        let format = if tdf { Format::Tdf } else { Format::Csv };
        let options = IngestOptions::default();
        let bytes = write_dataset(&ds, format, &options).unwrap();
        let back = ingest(&bytes, format, &options).unwrap();
        prop_assert_eq!(back, ds);
    }
}
