use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use tracing::debug;

use crate::error::FeedError;
use crate::feed::CandleFeed;
use crate::model::{Candle, TimeFrame};

/// Reads candle histories from `<dir>/<PAIR>_<timeframe>.json`, where each
/// file holds a JSON array of `{open, high, low, close}` objects, oldest
/// first. A missing file means the pair has no recorded history.
pub struct FileFeed {
    dir: PathBuf,
}

impl FileFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pair: &str, timeframe: TimeFrame) -> PathBuf {
        let pair: String = pair
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        self.dir.join(format!("{pair}_{timeframe}.json"))
    }
}

impl CandleFeed for FileFeed {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self, pair: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, Report<FeedError>> {
        let path = self.path_for(pair, timeframe);
        let source_name = path.display().to_string();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %source_name, "no candle file, treating as empty history");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Report::new(e).change_context(FeedError::Read { source_name }));
            }
        };

        parse_candles(&content, &path)
    }
}

/// The document must be a JSON array. Records that do not decode as a
/// candle are skipped.
fn parse_candles(content: &str, path: &Path) -> Result<Vec<Candle>, Report<FeedError>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(content).change_context(FeedError::Parse {
            source_name: path.display().to_string(),
        })?;

    let total = records.len();
    let candles: Vec<Candle> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(candle) => Some(candle),
            Err(e) => {
                debug!(path = %path.display(), index, error = %e, "skipping bad candle record");
                None
            }
        })
        .collect();

    debug!(
        path = %path.display(),
        fetched = candles.len(),
        skipped = total - candles.len(),
        "candle file loaded"
    );
    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pair-signal-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn path_strips_separators() {
        let feed = FileFeed::new("/data");
        assert_eq!(
            feed.path_for("eur/usd", TimeFrame::Min5),
            PathBuf::from("/data/EURUSD_5m.json")
        );
    }

    #[test]
    fn missing_file_is_empty_history() {
        let feed = FileFeed::new(temp_dir("missing"));
        assert!(feed.fetch("GBP/JPY", TimeFrame::Sec15).unwrap().is_empty());
    }

    #[test]
    fn reads_candle_array() {
        let dir = temp_dir("reads");
        std::fs::write(
            dir.join("GBPJPY_1m.json"),
            r#"[{"open":1.0,"high":1.2,"low":0.9,"close":1.1},
                {"open":1.1,"high":1.3,"low":1.0,"close":1.2}]"#,
        )
        .unwrap();

        let candles = FileFeed::new(&dir).fetch("GBP/JPY", TimeFrame::Min1).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, 1.2);
    }

    #[test]
    fn bad_records_are_skipped() {
        let dir = temp_dir("bad-record");
        std::fs::write(
            dir.join("XAUUSD_5m.json"),
            r#"[{"open":1.0,"high":1.2,"low":0.9,"close":1.1},
                {"open":1.0,"high":1.2},
                "garbage",
                {"open":1.1,"high":1.3,"low":1.0,"close":1.2}]"#,
        )
        .unwrap();

        let candles = FileFeed::new(&dir).fetch("XAU/USD", TimeFrame::Min5).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 1.1);
        assert_eq!(candles[1].close, 1.2);
    }

    #[test]
    fn non_array_document_is_parse_error() {
        let dir = temp_dir("object");
        std::fs::write(dir.join("XAUUSD_15m.json"), r#"{"open":1.0}"#).unwrap();

        let err = FileFeed::new(&dir)
            .fetch("XAU/USD", TimeFrame::Min15)
            .unwrap_err();
        assert!(matches!(err.current_context(), FeedError::Parse { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = temp_dir("malformed");
        std::fs::write(dir.join("GBPJPY_3m.json"), "not json").unwrap();

        let err = FileFeed::new(&dir)
            .fetch("GBP/JPY", TimeFrame::Min3)
            .unwrap_err();
        assert!(matches!(err.current_context(), FeedError::Parse { .. }));
    }
}
