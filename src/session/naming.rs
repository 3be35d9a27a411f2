use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{FileKind, SessionKey};
use crate::error::{AnalysisError, Result};

// NAMING CONVENTIONS ----------------------------------------------------------

/// One way the rigs have named a directory or file over the years.
pub trait NamingConvention: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidate name for this session, or `None` when the convention cannot
    /// express it (e.g. a date that does not parse).
    fn candidate(&self, key: &SessionKey) -> Option<String>;
}

/// `<date>_<mouse>_<Run|run><run><suffix>`
pub struct DateMouseRun {
    pub run_label: &'static str,
    pub suffix: &'static str,
}

impl NamingConvention for DateMouseRun {
    fn name(&self) -> &'static str {
        "date_mouse_run"
    }

    fn candidate(&self, key: &SessionKey) -> Option<String> {
        Some(format!(
            "{}_{}_{}{}{}",
            key.date, key.mouse, self.run_label, key.run, self.suffix
        ))
    }
}

/// `<mouse>-<date>-00<run>-<kind>.mat`, written by the nidaq acquisition code.
pub struct MouseDateRun {
    pub kind: FileKind,
}

impl NamingConvention for MouseDateRun {
    fn name(&self) -> &'static str {
        "mouse_date_run"
    }

    fn candidate(&self, key: &SessionKey) -> Option<String> {
        Some(format!(
            "{}-{}-00{}-{}.mat",
            key.mouse,
            key.date,
            key.run,
            self.kind.as_str()
        ))
    }
}

/// `Experiment-<mouse>-<MM>-<DD>-<YYYY>-Run<run><suffix>`, the MonkeyLogic default.
pub struct ExperimentDate {
    pub suffix: &'static str,
}

impl NamingConvention for ExperimentDate {
    fn name(&self) -> &'static str {
        "experiment_date"
    }

    fn candidate(&self, key: &SessionKey) -> Option<String> {
        let date = NaiveDate::parse_from_str(&key.date, "%y%m%d").ok()?;
        Some(format!(
            "Experiment-{}-{}-Run{}{}",
            key.mouse,
            date.format("%m-%d-%Y"),
            key.run,
            self.suffix
        ))
    }
}

fn default_run_dirs() -> Vec<Box<dyn NamingConvention>> {
    vec![
        Box::new(DateMouseRun { run_label: "run", suffix: "" }),
        Box::new(DateMouseRun { run_label: "Run", suffix: "" }),
    ]
}

fn default_file_conventions(kind: FileKind) -> Vec<Box<dyn NamingConvention>> {
    match kind {
        FileKind::Bhv => vec![
            Box::new(DateMouseRun { run_label: "Run", suffix: "-bhv.mat" }),
            Box::new(DateMouseRun { run_label: "run", suffix: "-bhv.mat" }),
            Box::new(ExperimentDate { suffix: "-bhv.mat" }),
        ],
        FileKind::Nidaq | FileKind::Running | FileKind::Eye | FileKind::Cam => {
            vec![Box::new(MouseDateRun { kind })]
        }
        FileKind::Txt => vec![
            Box::new(DateMouseRun { run_label: "Run", suffix: ".txt" }),
            Box::new(DateMouseRun { run_label: "run", suffix: ".txt" }),
        ],
    }
}

// RESOLUTION ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Present(PathBuf),
    Absent { tried: Vec<PathBuf> },
}

impl Resolution {
    pub fn is_present(&self) -> bool {
        matches!(self, Resolution::Present(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Present(path) => Some(path),
            Resolution::Absent { .. } => None,
        }
    }
}

// RESOLVER --------------------------------------------------------------------

/// Finds a session's files under a base directory by trying each naming
/// convention in order.
pub struct Resolver {
    base_dir: PathBuf,
    run_dirs: Vec<Box<dyn NamingConvention>>,
    files: BTreeMap<FileKind, Vec<Box<dyn NamingConvention>>>,
}

impl Resolver {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        if !base_dir.is_dir() {
            return Err(AnalysisError::DirectoryNotFound(base_dir));
        }
        log::info!("Base directory is set to {}", base_dir.display());

        let files = FileKind::ALL
            .iter()
            .map(|&kind| (kind, default_file_conventions(kind)))
            .collect();

        Ok(Self {
            base_dir,
            run_dirs: default_run_dirs(),
            files,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Appends a convention tried after the built-in ones for `kind`.
    pub fn add_file_convention(&mut self, kind: FileKind, convention: Box<dyn NamingConvention>) {
        self.files.entry(kind).or_default().push(convention);
    }

    /// `<base>/<mouse>/<date>_<mouse>`
    pub fn session_dir(&self, key: &SessionKey) -> PathBuf {
        self.base_dir
            .join(&key.mouse)
            .join(format!("{}_{}", key.date, key.mouse))
    }

    /// First run directory that exists; the last convention's path otherwise.
    pub fn run_dir(&self, key: &SessionKey) -> PathBuf {
        let session_dir = self.session_dir(key);
        let candidates: Vec<PathBuf> = self
            .run_dirs
            .iter()
            .filter_map(|c| c.candidate(key))
            .map(|name| session_dir.join(name))
            .collect();

        candidates
            .iter()
            .find(|path| path.is_dir())
            .or_else(|| candidates.last())
            .cloned()
            .unwrap_or(session_dir)
    }

    pub fn resolve(&self, key: &SessionKey, kind: FileKind) -> Resolution {
        let run_dir = self.run_dir(key);
        let mut tried = Vec::new();

        for convention in self.files.get(&kind).into_iter().flatten() {
            let Some(name) = convention.candidate(key) else {
                continue;
            };
            let path = run_dir.join(name);
            if path.is_file() {
                log::debug!("{} {}: matched {} naming", key, kind, convention.name());
                return Resolution::Present(path);
            }
            tried.push(path);
        }

        Resolution::Absent { tried }
    }

    /// Where derived tables and figures for a run are written; creates the
    /// `Figures` directory on first use.
    pub fn output_path(&self, key: &SessionKey, label: &str, extension: &str) -> Result<PathBuf> {
        let figures = self.session_dir(key).join("Figures");
        fs::create_dir_all(&figures)?;
        Ok(figures.join(format!(
            "{}-{}-Run{}-{}.{}",
            key.mouse, key.date, key.run, label, extension
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "behavior_sync_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn key() -> SessionKey {
        SessionKey::new("LR8", "180801", 2)
    }

    #[test]
    fn missing_base_dir_is_rejected() {
        let missing = std::env::temp_dir().join("behavior_sync_does_not_exist_7f3a");
        assert!(matches!(
            Resolver::new(&missing),
            Err(AnalysisError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn experiment_convention_reorders_date() {
        let name = ExperimentDate { suffix: "-bhv.mat" }.candidate(&key()).unwrap();
        assert_eq!(name, "Experiment-LR8-08-01-2018-Run2-bhv.mat");

        let bad_date = SessionKey::new("LR8", "18-08", 2);
        assert!(ExperimentDate { suffix: "-bhv.mat" }.candidate(&bad_date).is_none());
    }

    #[test]
    fn run_dir_prefers_lowercase_when_present() {
        let base = scratch_dir("run_dir");
        let resolver = Resolver::new(&base).unwrap();
        let session = base.join("LR8").join("180801_LR8");

        assert_eq!(resolver.run_dir(&key()), session.join("180801_LR8_Run2"));

        fs::create_dir_all(session.join("180801_LR8_run2")).unwrap();
        assert_eq!(resolver.run_dir(&key()), session.join("180801_LR8_run2"));

        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn bhv_falls_back_through_conventions() {
        let base = scratch_dir("bhv_fallback");
        let resolver = Resolver::new(&base).unwrap();
        let run_dir = base.join("LR8/180801_LR8/180801_LR8_Run2");

        match resolver.resolve(&key(), FileKind::Bhv) {
            Resolution::Absent { tried } => {
                assert_eq!(tried.len(), 3);
                assert_eq!(tried[0], run_dir.join("180801_LR8_Run2-bhv.mat"));
                assert_eq!(tried[2], run_dir.join("Experiment-LR8-08-01-2018-Run2-bhv.mat"));
            }
            other => panic!("expected absent, got {:?}", other),
        }

        let experiment_file = run_dir.join("Experiment-LR8-08-01-2018-Run2-bhv.mat");
        touch(&experiment_file);
        assert_eq!(
            resolver.resolve(&key(), FileKind::Bhv),
            Resolution::Present(experiment_file)
        );

        let lower = run_dir.join("180801_LR8_run2-bhv.mat");
        touch(&lower);
        assert_eq!(resolver.resolve(&key(), FileKind::Bhv).path(), Some(lower.as_path()));

        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn nidaq_uses_acquisition_naming() {
        let base = scratch_dir("nidaq");
        let resolver = Resolver::new(&base).unwrap();
        let path = base.join("LR8/180801_LR8/180801_LR8_Run2/LR8-180801-002-nidaq.mat");
        touch(&path);

        assert_eq!(resolver.resolve(&key(), FileKind::Nidaq), Resolution::Present(path));
        assert!(!resolver.resolve(&key(), FileKind::Running).is_present());

        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn custom_convention_is_tried_last() {
        struct Flat;
        impl NamingConvention for Flat {
            fn name(&self) -> &'static str {
                "flat"
            }
            fn candidate(&self, key: &SessionKey) -> Option<String> {
                Some(format!("{}_{}.txt", key.mouse, key.run))
            }
        }

        let base = scratch_dir("custom");
        let mut resolver = Resolver::new(&base).unwrap();
        resolver.add_file_convention(FileKind::Txt, Box::new(Flat));
        let path = base.join("LR8/180801_LR8/180801_LR8_Run2/LR8_2.txt");
        touch(&path);

        assert_eq!(resolver.resolve(&key(), FileKind::Txt), Resolution::Present(path));

        fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn output_path_creates_figures_dir() {
        let base = scratch_dir("output");
        let resolver = Resolver::new(&base).unwrap();

        let path = resolver.output_path(&key(), "running", "csv").unwrap();

        assert_eq!(path, base.join("LR8/180801_LR8/Figures/LR8-180801-Run2-running.csv"));
        assert!(path.parent().unwrap().is_dir());

        fs::remove_dir_all(&base).ok();
    }
}
