//! Streaming reader for bulk files: one JSON array, decoded one element at a time.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::ControlFlow;
use std::path::PathBuf;

use serde::Deserializer as _;
use serde::de::{Error as _, SeqAccess, Visitor};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

/// Records buffered between the parser thread and the importer.
pub const RECORD_CHANNEL_CAPACITY: usize = 64;

const READ_BUFFER_SIZE: usize = 256 * 1024;

struct RecordVisitor<'a, F> {
    on_record: &'a mut F,
    forwarded: &'a mut usize,
    stopped: &'a mut bool,
}

impl<'de, F> Visitor<'de> for RecordVisitor<'_, F>
where
    F: FnMut(Value) -> ControlFlow<()>,
{
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON array of records")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(record) = seq.next_element::<Value>()? {
            *self.forwarded += 1;
            if (self.on_record)(record).is_break() {
                *self.stopped = true;
                return Err(A::Error::custom("record consumer stopped"));
            }
        }
        Ok(())
    }
}

/// Hands each element of a top-level JSON array to `on_record`, in order.
///
/// Only the element being decoded is held in memory. Elements of any JSON
/// type are forwarded; filtering is the caller's job. Records handed over
/// before a syntax error stay valid. Returning `Break` from `on_record` stops
/// reading without an error. Returns the number of records forwarded.
pub fn for_each_record<R, F>(reader: R, mut on_record: F) -> Result<usize>
where
    R: Read,
    F: FnMut(Value) -> ControlFlow<()>,
{
    let mut forwarded = 0;
    let mut stopped = false;
    let mut deserializer = serde_json::Deserializer::from_reader(reader);

    let result = (&mut deserializer).deserialize_seq(RecordVisitor {
        on_record: &mut on_record,
        forwarded: &mut forwarded,
        stopped: &mut stopped,
    });
    if stopped {
        return Ok(forwarded);
    }
    result?;
    deserializer.end()?;

    Ok(forwarded)
}

/// Parses `path` on a blocking thread, handing records over a bounded channel.
///
/// The parser stops after the first error it sends, or as soon as the
/// receiver is dropped.
pub fn spawn_record_stream(path: PathBuf) -> mpsc::Receiver<Result<Value>> {
    let (tx, rx) = mpsc::channel(RECORD_CHANNEL_CAPACITY);

    tokio::task::spawn_blocking(move || {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                let _ = tx.blocking_send(Err(e.into()));
                return;
            }
        };

        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let result = for_each_record(reader, |record| {
            if tx.blocking_send(Ok(record)).is_err() {
                tracing::debug!("Record receiver dropped, stopping parser");
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });

        if let Err(e) = result {
            let _ = tx.blocking_send(Err(e));
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImporterError;
    use std::io::{Cursor, Write};

    fn parse(input: &str) -> (Vec<Value>, Result<usize>) {
        let mut records = Vec::new();
        let result = for_each_record(Cursor::new(input.as_bytes()), |record| {
            records.push(record);
            ControlFlow::Continue(())
        });
        (records, result)
    }

    #[test]
    fn test_yields_each_element() {
        let (records, result) = parse(r#"[{"id": "a"}, {"id": "b"},{"id":"c"}]"#);
        let ids: Vec<&str> = records.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_empty_array_yields_nothing() {
        assert_eq!(parse("[]").1.unwrap(), 0);
        assert_eq!(parse(" \n[ \n ]\n").1.unwrap(), 0);
    }

    #[test]
    fn test_scalar_elements_do_not_break_the_stream() {
        let (records, result) = parse(
            r#"[1, {"object": "card", "id": "a"}, -2.5e3, "note", null, true,{"object":"card","id":"b"}]"#,
        );
        assert_eq!(result.unwrap(), 7);
        assert_eq!(records[0], 1);
        assert_eq!(records[1]["id"], "a");
        assert_eq!(records[2], -2500.0);
        assert_eq!(records[6]["id"], "b");
    }

    #[test]
    fn test_handles_elements_spanning_buffer_boundaries() {
        let input = format!(
            "[{}]",
            (0..50)
                .map(|i| format!(r#"{{"id": "{}", "oracle_text": "{}"}}"#, i, "x".repeat(40)))
                .collect::<Vec<_>>()
                .join(",\n")
        );
        let reader = BufReader::with_capacity(16, Cursor::new(input.into_bytes()));
        let mut records = Vec::new();
        for_each_record(reader, |record| {
            records.push(record);
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(records.len(), 50);
        assert_eq!(records[49]["id"], "49");
    }

    #[test]
    fn test_malformed_input_fails_after_valid_prefix() {
        let (records, result) = parse(r#"[{"id": "a"}, {"id": "b", }]"#);
        assert_eq!(records.len(), 1);
        assert!(matches!(result, Err(ImporterError::ParseError(_))));
    }

    #[test]
    fn test_missing_array_is_a_parse_error() {
        assert!(matches!(
            parse(r#"{"id": "a"}"#).1,
            Err(ImporterError::ParseError(_))
        ));
        assert!(matches!(parse("").1, Err(ImporterError::ParseError(_))));
    }

    #[test]
    fn test_trailing_characters_are_a_parse_error() {
        let (records, result) = parse(r#"[{"id": "a"}] x"#);
        assert_eq!(records.len(), 1);
        assert!(matches!(result, Err(ImporterError::ParseError(_))));
    }

    #[test]
    fn test_truncated_file_is_a_parse_error() {
        let (records, result) = parse(r#"[{"id": "a"},"#);
        assert_eq!(records.len(), 1);
        assert!(matches!(result, Err(ImporterError::ParseError(_))));
    }

    #[test]
    fn test_break_stops_reading_without_error() {
        let mut seen = 0;
        let result = for_each_record(Cursor::new(r#"[1, 2, 3, 4]"#), |_| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result.unwrap(), 2);
        assert_eq!(seen, 2);
    }

    #[tokio::test]
    async fn test_spawned_stream_delivers_records_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a"}}, 7, {{"id": "b"}}]"#).unwrap();

        let mut rx = spawn_record_stream(file.path().to_path_buf());
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record.unwrap());
        }
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], "a");
        assert_eq!(records[1], 7);
        assert_eq!(records[2]["id"], "b");
    }

    #[tokio::test]
    async fn test_spawned_stream_reports_missing_file() {
        let mut rx = spawn_record_stream(PathBuf::from("/nonexistent/bulk.json"));
        assert!(matches!(
            rx.recv().await,
            Some(Err(ImporterError::IoError(_)))
        ));
        assert!(rx.recv().await.is_none());
    }
}
