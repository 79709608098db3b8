/// Data layer: sources, ingestion, serialization, and window selection.
///
/// Architecture:
/// ```text
///  path / URL  (.csv | .tdf)
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  extension → Format, read / fetch bytes
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  bytes → Dataset  (rectangular, non-empty)
///   └──────────┘
///        │                    ▲
///        ▼                    │
///   ┌──────────┐        ┌──────────┐
///   │  Dataset  │ ─────► │  writer   │  Dataset → bytes (export, round trip)
///   └──────────┘        └──────────┘
///        │ xy(x_col, y_col)
///        ▼
///   ┌──────────┐
///   │ selection │  ViewWindow → points inside the plot window
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod selection;
pub mod source;
pub mod writer;
