//! CSV file data adapter.
//!
//! One file per series, `<base>/<symbol>_<interval>.csv`, with the header
//! `timestamp,open,high,low,close,volume`.

use crate::domain::candle::Candle;
use crate::domain::error::SigbenchError;
use crate::ports::data_port::{HistoricalDataPort, TimeRange};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }
}

/// Parse an RFC 3339, `%Y-%m-%d %H:%M:%S` or `%Y-%m-%d` timestamp.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SigbenchError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SigbenchError::Data {
            reason: format!("invalid timestamp '{}'", value),
        })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, SigbenchError> {
    record.get(index).ok_or_else(|| SigbenchError::Data {
        reason: format!("missing {} column", name),
    })
}

fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SigbenchError> {
    field(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| SigbenchError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_candles<R: io::Read>(reader: R) -> Result<Vec<Candle>, SigbenchError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut candles = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| SigbenchError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;
        candles.push(Candle {
            timestamp: parse_timestamp(field(&record, 0, "timestamp")?)?,
            open: number(&record, 1, "open")?,
            high: number(&record, 2, "high")?,
            low: number(&record, 3, "low")?,
            close: number(&record, 4, "close")?,
            volume: number(&record, 5, "volume")?,
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

/// Read every candle from a CSV file, oldest first.
pub fn read_csv(path: &Path) -> Result<Vec<Candle>, SigbenchError> {
    let file = fs::File::open(path).map_err(|e| SigbenchError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    parse_candles(io::BufReader::new(file))
}

/// Write candles to a CSV file, replacing it.
pub fn write_csv(path: &Path, candles: &[Candle]) -> Result<(), SigbenchError> {
    let to_data_err = |e: csv::Error| SigbenchError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    };
    let mut wtr = csv::Writer::from_path(path).map_err(to_data_err)?;
    wtr.write_record(HEADER).map_err(to_data_err)?;
    for c in candles {
        wtr.write_record([
            c.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.volume.to_string(),
        ])
        .map_err(to_data_err)?;
    }
    wtr.flush()?;
    Ok(())
}

impl HistoricalDataPort for CsvAdapter {
    fn get(
        &self,
        symbol: &str,
        interval: &str,
        range: TimeRange,
    ) -> Result<Vec<Candle>, SigbenchError> {
        let path = self.csv_path(symbol, interval);
        if !path.exists() {
            return Err(SigbenchError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            });
        }
        let mut candles = read_csv(&path)?;
        candles.retain(|c| range.contains(c.timestamp));
        Ok(candles)
    }

    fn put(&self, symbol: &str, interval: &str, candles: &[Candle]) -> Result<(), SigbenchError> {
        fs::create_dir_all(&self.base_path)?;
        write_csv(&self.csv_path(symbol, interval), candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16 09:30:00,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17T00:00:00Z,110.0,120.0,105.0,115.0,55000.5\n";

        fs::write(path.join("BHP_1d.csv"), csv_content).unwrap();
        fs::write(path.join("CBA_1d.csv"), "timestamp,open,high,low,close,volume\n").unwrap();

        (dir, path)
    }

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn get_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.get("BHP", "1d", TimeRange::all()).unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].timestamp, day(15));
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 110.0);
        assert_eq!(candles[0].low, 90.0);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 50000.0);
        assert_eq!(candles[2].volume, 55000.5);
    }

    #[test]
    fn get_filters_by_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter
            .get("BHP", "1d", TimeRange::new(day(16), day(16) + chrono::Duration::hours(23)))
            .unwrap();

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 110.0);
    }

    #[test]
    fn get_missing_series_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.get("XYZ", "1d", TimeRange::all());
        assert!(matches!(result, Err(SigbenchError::NoData { .. })));
    }

    #[test]
    fn get_empty_file_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.get("CBA", "1d", TimeRange::all()).unwrap().is_empty());
    }

    #[test]
    fn put_then_get() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().join("nested"));
        let candles = vec![
            Candle {
                timestamp: day(2),
                open: 1.5,
                high: 2.0,
                low: 1.0,
                close: 1.75,
                volume: 10.0,
            },
            Candle {
                timestamp: day(3) + chrono::Duration::minutes(90),
                open: 1.75,
                high: 2.5,
                low: 1.5,
                close: 2.25,
                volume: 0.0,
            },
        ];
        adapter.put("ETH", "1h", &candles).unwrap();
        assert_eq!(adapter.get("ETH", "1h", TimeRange::all()).unwrap(), candles);
    }

    #[test]
    fn rejects_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "timestamp,open,high,low,close,volume\n2024-01-01,abc,1,1,1,1\n").unwrap();
        assert!(matches!(read_csv(&path), Err(SigbenchError::Data { .. })));

        fs::write(&path, "timestamp,open,high,low,close,volume\nyesterday,1,1,1,1,1\n").unwrap();
        assert!(matches!(read_csv(&path), Err(SigbenchError::Data { .. })));
    }
}
