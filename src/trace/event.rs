use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::error::TraceError;

/// One record of a Chrome JSON trace. Only the fields used to identify
/// processes are kept.
///
/// Deserialization never fails on an event's shape: a `pid` that is not a
/// `u32` or an `args.name` that is not a string reads as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceEvent {
    pub pid: Option<u32>,
    pub args: Option<EventArgs>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventArgs {
    pub name: Option<String>,
}

impl TraceEvent {
    pub fn name_label(&self) -> Option<&str> {
        self.args.as_ref()?.name.as_deref()
    }

    fn from_value(value: &Value) -> Self {
        // first usable of `pid`, `processId`
        let pid = ["pid", "processId"].iter().find_map(|key| {
            let pid = value.get(key).and_then(Value::as_u64)?;
            u32::try_from(pid).ok()
        });
        let args = value.get("args").filter(|args| args.is_object()).map(|args| EventArgs {
            name: args.get("name").and_then(Value::as_str).map(str::to_string),
        });
        TraceEvent { pid, args }
    }
}

impl<'de> Deserialize<'de> for TraceEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(TraceEvent::from_value(&value))
    }
}

/// Chrome writes either an object with a `traceEvents` array or a bare array.
struct TraceFile(Vec<TraceEvent>);

impl<'de> Deserialize<'de> for TraceFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TraceFileVisitor)
    }
}

struct TraceFileVisitor;

impl<'de> Visitor<'de> for TraceFileVisitor {
    type Value = TraceFile;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of trace events or an object with a `traceEvents` array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TraceFile, A::Error> {
        let mut events = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(event) = seq.next_element()? {
            events.push(event);
        }
        Ok(TraceFile(events))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TraceFile, A::Error> {
        let mut events = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "traceEvents" {
                events = Some(map.next_value::<Vec<TraceEvent>>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        events
            .map(TraceFile)
            .ok_or_else(|| de::Error::missing_field("traceEvents"))
    }
}

pub fn parse_trace(json: &str) -> Result<Vec<TraceEvent>, serde_json::Error> {
    let TraceFile(events) = serde_json::from_str(json)?;
    Ok(events)
}

/// Read and parse the whole trace file. The file is fully consumed before
/// returning.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEvent>, TraceError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| TraceError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&content).map_err(|source| TraceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_object_form() {
        let events = parse_trace(
            r#"{"traceEvents": [
                {"pid": 7, "ph": "M", "name": "thread_name", "args": {"name": "CrBrowserMain"}},
                {"pid": 7, "ph": "X", "ts": 10, "dur": 3}
            ], "metadata": {}}"#,
        )
        .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pid, Some(7));
        assert_eq!(events[0].name_label(), Some("CrBrowserMain"));
        assert_eq!(events[1].name_label(), None);
    }

    #[test]
    fn parses_bare_array_and_process_id_alias() {
        let events =
            parse_trace(r#"[{"processId": 3, "args": {"name": "CrGpuMain"}}, {}]"#).unwrap();
        assert_eq!(events[0].pid, Some(3));
        assert_eq!(events[1], TraceEvent::default());
    }

    #[test]
    fn args_without_name() {
        let events = parse_trace(r#"[{"pid": 1, "args": {"data": {"frame": "x"}}}]"#).unwrap();
        assert_eq!(events[0].name_label(), None);
    }

    fn browser_with(extra: &str) -> String {
        format!(
            r#"{{"traceEvents": [
                {extra},
                {{"pid": 10, "ph": "M", "name": "thread_name", "args": {{"name": "CrBrowserMain"}}}}
            ]}}"#
        )
    }

    #[test]
    fn odd_pid_shapes_do_not_fail_the_trace() {
        for extra in [
            r#"{"pid": "gpu-helper", "args": {"name": "CrGpuMain"}}"#,
            r#"{"pid": -1, "ph": "X"}"#,
            r#"{"pid": 5000000000, "ph": "X"}"#,
            r#"{"pid": 1.5}"#,
        ] {
            let events = parse_trace(&browser_with(extra)).unwrap();
            assert_eq!(events.len(), 2, "{extra}");
            assert_eq!(events[0].pid, None, "{extra}");
            assert_eq!(events[1].pid, Some(10));
        }
    }

    #[test]
    fn non_string_name_reads_as_none() {
        let extra = r#"{"pid": 4, "args": {"name": {"frame": "x"}}}"#;
        let events = parse_trace(&browser_with(extra)).unwrap();
        assert_eq!(events[0].pid, Some(4));
        assert_eq!(events[0].name_label(), None);

        let events = parse_trace(r#"[{"pid": 4, "args": "CrGpuMain"}, 17, null]"#).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.name_label().is_none()));
    }

    #[test]
    fn pid_and_process_id_together() {
        let events = parse_trace(&browser_with(r#"{"pid": 8, "processId": 9}"#)).unwrap();
        assert_eq!(events[0].pid, Some(8));

        let events = parse_trace(r#"[{"pid": "x", "processId": 9}]"#).unwrap();
        assert_eq!(events[0].pid, Some(9));
    }

    #[test]
    fn syntax_errors_keep_their_position() {
        let json = "{\"traceEvents\": [\n  {\"pid\": 1},\n  {\"pid\": }\n]}";
        let err = parse_trace(json).unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn object_without_events_is_rejected() {
        let err = parse_trace(r#"{"metadata": {}}"#).unwrap_err();
        assert!(err.to_string().contains("traceEvents"));
        assert!(parse_trace("42").is_err());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_trace("/nonexistent/trace.json").unwrap_err();
        assert!(matches!(err, TraceError::Unreadable { .. }));
    }

    #[test]
    fn garbage_file_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = load_trace(file.path()).unwrap_err();
        assert!(matches!(err, TraceError::Malformed { .. }));
    }
}
