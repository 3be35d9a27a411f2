use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::behavior::event_log::EventLog;
use crate::behavior::rig::{BehaviorEvents, Rig, EPHYS_RUNNING_DURATION};
use crate::behavior::trials::{condition_label, TrialSummary, TrialTable};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::processing::conditioning::condition_recording;
use crate::processing::recording::Recording;
use crate::processing::running::RunningTrack;
use crate::processing::signal_processor::SyncProcessor;
use crate::session::naming::Resolver;
use crate::session::{Experiment, FileKind, SessionCatalog, SessionKey};

/// Writes one CSV row per item, with a header taken from the field names.
pub fn export_csv<T, I, P>(rows: I, path: P) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `<dir>/<stem>-<label>.csv` next to `input`.
pub fn sibling_path(input: &Path, label: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}-{}.csv", stem, label))
}

/// Detects edges on every channel of a recording CSV and writes one table per
/// channel. Returns the tables written; failed channels are logged and skipped.
pub fn run_edges(input: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let mut recording = Recording::from_csv(input)?;
    condition_recording(&mut recording, &config.conditioning);

    let processor = SyncProcessor::new(config.edges.clone());
    let mut written = Vec::new();
    for result in processor.detect_all(&recording) {
        let Ok(edges) = result else {
            continue;
        };
        if let Some(report) = &edges.outliers {
            log::info!(
                "{}: {} long pulses removed (cutoff {:.4})",
                edges.channel(),
                report.removed.len(),
                report.cutoff
            );
        }
        let path = sibling_path(input, &format!("{}-edges", edges.channel()));
        export_csv(&edges.table.events, &path)?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Builds the running track from an event log's wheel rows and exports it.
pub fn run_running(input: &Path, config: &Config) -> Result<PathBuf> {
    let event_log = EventLog::from_path(input)?;
    let track = RunningTrack::from_positions(&event_log.positions(), &config.wheel)?;

    let path = sibling_path(input, "running");
    export_csv(track.rows(), &path)?;
    log::info!("{} running samples written to {}", track.len(), path.display());
    Ok(path)
}

pub fn run_trials(input: &Path, key: SessionKey) -> Result<TrialSummary> {
    let table = TrialTable::from_csv(key, input)?;
    let summary = table.summary();

    for (condition, counts) in &summary.by_condition {
        let label = condition_label(*condition).unwrap_or("unknown");
        match counts.hit_rate() {
            Some(rate) => log::info!(
                "Condition {} ({}): {} trials, hit rate {:.1}%",
                condition,
                label,
                counts.total(),
                rate * 100.0
            ),
            None => log::info!("Condition {} ({}): {} trials", condition, label, counts.total()),
        }
    }
    Ok(summary)
}

/// Reports which of a session's files exist under the configured base directory.
pub fn run_locate(key: &SessionKey, config: &Config) -> Result<SessionCatalog> {
    let resolver = Resolver::new(&config.session.base_dir)?;
    let experiment = Experiment::new(key.mouse.clone(), vec![key.date.clone()], vec![key.run]);
    Ok(experiment.catalog(&resolver, &FileKind::ALL))
}

#[derive(Debug, Deserialize)]
struct RecordedRunningRow {
    position: f64,
    speed: f64,
}

fn load_recorded_running(path: &Path) -> Result<RunningTrack> {
    let mut rdr = csv::Reader::from_reader(File::open(path)?);
    let mut positions = Vec::new();
    let mut speeds = Vec::new();
    for result in rdr.deserialize() {
        let row: RecordedRunningRow = result?;
        positions.push(row.position);
        speeds.push(row.speed);
    }
    RunningTrack::from_recorded(positions, speeds, EPHYS_RUNNING_DURATION)
}

/// Assembles a session's behavioral events the way its rig records them.
///
/// Event-log rigs read everything from `input`. The ephys rig reads its sync
/// recording from `input` and needs the precomputed running trace as well.
pub fn run_events(
    rig: Rig,
    input: &Path,
    running: Option<&Path>,
    config: &Config,
) -> Result<BehaviorEvents> {
    let events = match rig {
        Rig::EventLog => BehaviorEvents::from_event_log(&EventLog::from_path(input)?, &config.wheel)?,
        Rig::Ephys => {
            let running = running.ok_or_else(|| AnalysisError::InvalidParameter {
                name: "running",
                reason: "the ephys rig needs a position,speed CSV".to_string(),
            })?;
            let recording = Recording::from_csv(input)?;
            BehaviorEvents::from_ephys(&recording, load_recorded_running(running)?, &config.ephys)?
        }
    };

    log::info!(
        "{} running samples, {} licks, {} visual stimuli, {} shocks, {} rewards",
        events.running.len(),
        events.licks.len(),
        events.visual_stimuli.len(),
        events.shocks.len(),
        events.rewards.len()
    );
    Ok(events)
}
