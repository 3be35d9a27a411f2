use std::path::Path;

use behavior_sync::behavior::rig::Rig;
use behavior_sync::config::{load_config, Config};
use behavior_sync::error::{AnalysisError, Result};
use behavior_sync::local::process_file;
use behavior_sync::session::SessionKey;
use behavior_sync::utils::log::init_logging;

const USAGE: &str = "Usage:
  behavior-sync edges <recording.csv> [config.yaml]
  behavior-sync running <events.txt> [config.yaml]
  behavior-sync trials <trials.csv> <mouse> <date> <run>
  behavior-sync locate <mouse> <date> <run> [config.yaml]
  behavior-sync events <rig> <file> [running.csv] [config.yaml]";

fn config_from(path: Option<&String>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

fn parse_key(mouse: &str, date: &str, run: &str) -> Result<SessionKey> {
    let run = run.parse().map_err(|_| AnalysisError::InvalidParameter {
        name: "run",
        reason: format!("expected a run number, got {}", run),
    })?;
    Ok(SessionKey::new(mouse, date, run))
}

fn run(args: &[String]) -> Result<bool> {
    match args.get(1).map(String::as_str) {
        Some("edges") if args.len() >= 3 => {
            let config = config_from(args.get(3))?;
            init_logging(config.verbose);
            let written = process_file::run_edges(Path::new(&args[2]), &config)?;
            log::info!("{} edge tables written", written.len());
        }
        Some("running") if args.len() >= 3 => {
            let config = config_from(args.get(3))?;
            init_logging(config.verbose);
            process_file::run_running(Path::new(&args[2]), &config)?;
        }
        Some("trials") if args.len() >= 6 => {
            init_logging(false);
            let key = parse_key(&args[3], &args[4], &args[5])?;
            let summary = process_file::run_trials(Path::new(&args[2]), key)?;
            log::info!(
                "{} trials, {} hits, {} misses",
                summary.overall.total(),
                summary.overall.hits,
                summary.overall.misses
            );
        }
        Some("locate") if args.len() >= 5 => {
            let config = config_from(args.get(5))?;
            init_logging(config.verbose);
            let key = parse_key(&args[2], &args[3], &args[4])?;
            let catalog = process_file::run_locate(&key, &config)?;
            for (key, kind) in catalog.missing() {
                println!("missing {} {}", key, kind);
            }
        }
        Some("events") if args.len() >= 4 => {
            let rig: Rig = args[2].parse()?;
            // The ephys rig takes the running trace before the optional config.
            let (running, config_path) = match rig {
                Rig::Ephys => (args.get(4).map(Path::new), args.get(5)),
                Rig::EventLog => (None, args.get(4)),
            };
            let config = config_from(config_path)?;
            init_logging(config.verbose);
            process_file::run_events(rig, Path::new(&args[3]), running, &config)?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        Err(e) => {
            init_logging(false);
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
