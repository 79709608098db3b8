use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::FetchOptions;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Format – the two supported tabular encodings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Comma-separated values.
    Csv,
    /// Tab-delimited table with optional `#` directives.
    Tdf,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Csv, Format::Tdf];

    /// Resolve a format tag such as `"csv"` or `"TDF"`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "tdf" => Ok(Format::Tdf),
            "" => Err(Error::UnsupportedFormat(
                "missing extension, expected .csv or .tdf".into(),
            )),
            other => Err(Error::UnsupportedFormat(format!(
                ".{other} (expected .csv or .tdf)"
            ))),
        }
    }

    /// Resolve from the extension of a path-like string.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_tag(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Tdf => "tdf",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// Source – where the bytes come from
// ---------------------------------------------------------------------------

/// One user-selected input, consumed once per load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Url(String),
}

impl Source {
    /// `http(s)://` inputs are URLs; everything else is a local path.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(input.to_string())
        } else {
            Source::Local(PathBuf::from(input))
        }
    }

    /// The declared format, checked before anything is read or fetched.
    pub fn format(&self) -> Result<Format> {
        match self {
            Source::Local(path) => Format::from_path(path),
            Source::Url(url) => Format::from_path(Path::new(url_path(url))),
        }
    }

    /// Short name for status lines and window titles.
    pub fn display_name(&self) -> String {
        match self {
            Source::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Source::Url(url) => url.clone(),
        }
    }

    /// Read the raw bytes from disk or over HTTP.
    pub fn read_bytes(&self, fetch: &FetchOptions) -> Result<Vec<u8>> {
        match self {
            Source::Local(path) => std::fs::read(path).map_err(|e| Error::io(path, e)),
            Source::Url(url) => fetch_url(url, fetch),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// The URL with query string and fragment removed.
fn url_path(url: &str) -> &str {
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    &url[..end]
}

fn fetch_url(url: &str, fetch: &FetchOptions) -> Result<Vec<u8>> {
    log::debug!("Fetching {url}");
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch(format!("{url}: HTTP {status}")));
    }
    let bytes = response.bytes()?;
    log::debug!("Fetched {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Answer a single HTTP request on a loopback port; returns the base URL.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_format_from_tag() {
        assert_eq!(Format::from_tag("csv").unwrap(), Format::Csv);
        assert_eq!(Format::from_tag(".TDF").unwrap(), Format::Tdf);
        assert!(matches!(
            Format::from_tag("json"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(Format::from_tag(""), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.org/decay.csv"),
            Source::Url("https://example.org/decay.csv".into())
        );
        assert_eq!(
            Source::parse("  data/decay.tdf "),
            Source::Local(PathBuf::from("data/decay.tdf"))
        );
    }

    #[test]
    fn test_url_format_ignores_query_and_fragment() {
        let src = Source::parse("https://example.org/runs/muon.TDF?rev=3#top");
        assert_eq!(src.format().unwrap(), Format::Tdf);

        let src = Source::parse("https://example.org/runs/muon.csv.gz");
        assert!(matches!(src.format(), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_local_without_extension_unsupported() {
        let src = Source::parse("/tmp/decay");
        assert!(matches!(src.format(), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_read_missing_local_file_is_io_error() {
        let src = Source::parse("/nonexistent/dir/decay.csv");
        assert!(matches!(
            src.read_bytes(&FetchOptions::default()),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_fetch_returns_body() {
        let base = serve_once("200 OK", "t,n\n0,100\n");
        let src = Source::parse(&format!("{base}/runs/decay.csv"));
        let bytes = src.read_bytes(&FetchOptions::default()).unwrap();
        assert_eq!(bytes, b"t,n\n0,100\n");
    }

    #[test]
    fn test_fetch_error_status() {
        let base = serve_once("404 Not Found", "missing");
        let src = Source::parse(&format!("{base}/runs/decay.csv"));
        match src.read_bytes(&FetchOptions::default()) {
            Err(Error::Fetch(msg)) => assert!(msg.contains("404"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_display_name_is_file_name() {
        let src = Source::parse("/data/runs/decay.csv");
        assert_eq!(src.display_name(), "decay.csv");
    }
}
