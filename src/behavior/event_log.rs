use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::Result;
use crate::processing::running::PositionSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCode {
    Position,
    Lick,
    VisualStimulus,
    Shock,
    Reward,
}

impl EventCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCode::Position => "P",
            EventCode::Lick => "L",
            EventCode::VisualStimulus => "V",
            EventCode::Shock => "S",
            EventCode::Reward => "R",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: f64,
    pub event: String,
    pub value: Option<f64>,
}

/// Rows of a behavior rig's `timestamp event value` text log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub entries: Vec<LogEntry>,
    /// Rows that could not be parsed and were left out.
    pub skipped: usize,
}

impl EventLog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let event_log = Self::from_reader(File::open(path.as_ref())?);
        log::info!(
            "Event log {}: {} rows ({} skipped)",
            path.as_ref().display(),
            event_log.entries.len(),
            event_log.skipped
        );
        Ok(event_log)
    }

    /// Parses space separated rows; blank lines are ignored and malformed rows
    /// are counted in `skipped` instead of failing the whole file.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b' ')
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut parsed = EventLog::default();
        for result in rdr.records() {
            let entry = match result {
                Ok(record) => {
                    let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
                    if fields.is_empty() {
                        continue;
                    }
                    parse_entry(&fields)
                }
                Err(_) => None,
            };
            match entry {
                Some(entry) => parsed.entries.push(entry),
                None => parsed.skipped += 1,
            }
        }

        if parsed.skipped > 0 {
            log::warn!("Skipped {} malformed event log rows", parsed.skipped);
        }
        parsed
    }

    pub fn entries_for(&self, code: EventCode) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.event == code.as_str())
    }

    pub fn times(&self, code: EventCode) -> Vec<f64> {
        self.entries_for(code).map(|e| e.timestamp).collect()
    }

    /// Wheel encoder readings; position rows without a value are ignored.
    pub fn positions(&self) -> Vec<PositionSample> {
        self.entries_for(EventCode::Position)
            .filter_map(|e| {
                e.value.map(|value| PositionSample {
                    timestamp: e.timestamp,
                    value,
                })
            })
            .collect()
    }
}

fn parse_entry(fields: &[&str]) -> Option<LogEntry> {
    let (timestamp, event, rest) = match fields {
        [timestamp, event, rest @ ..] if rest.len() <= 1 => (timestamp, event, rest),
        _ => return None,
    };
    let value = match rest.first() {
        Some(raw) => Some(raw.parse::<f64>().ok()?),
        None => None,
    };
    Some(LogEntry {
        timestamp: timestamp.parse().ok()?,
        event: event.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "0 P 0\n\
                       40 P 2\n\
                       55 L 1\n\
                       120 V 1\n\
                       130 P 6\n\
                       garbage\n\
                       140 P notanumber\n\
                       200 S 1 extra\n\
                       \n\
                       250 R 1\n\
                       260 L\n";

    #[test]
    fn splits_rows_by_event_code() {
        let log = EventLog::from_reader(LOG.as_bytes());
        assert_eq!(log.entries.len(), 7);
        assert_eq!(log.skipped, 3);
        assert_eq!(log.times(EventCode::Lick), vec![55.0, 260.0]);
        assert_eq!(log.times(EventCode::VisualStimulus), vec![120.0]);
        assert!(log.times(EventCode::Shock).is_empty());
        assert_eq!(log.times(EventCode::Reward), vec![250.0]);
    }

    #[test]
    fn position_rows_become_samples() {
        let log = EventLog::from_reader(LOG.as_bytes());
        let positions = log.positions();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[2], PositionSample { timestamp: 130.0, value: 6.0 });
    }

    #[test]
    fn repeated_spaces_are_tolerated() {
        let log = EventLog::from_reader("10  P   4\n".as_bytes());
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].value, Some(4.0));
    }
}
