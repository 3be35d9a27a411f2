pub mod naming;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::naming::{Resolution, Resolver};
use crate::error::AnalysisError;

/// Identifies one run of one mouse on one day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub mouse: String,
    /// `YYMMDD`, as used in the rig's directory names.
    pub date: String,
    pub run: u32,
}

impl SessionKey {
    pub fn new(mouse: impl Into<String>, date: impl Into<String>, run: u32) -> Self {
        Self {
            mouse: mouse.into(),
            date: date.into(),
            run,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.mouse, self.date, self.run)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// MonkeyLogic behavior file.
    Bhv,
    Nidaq,
    Running,
    Eye,
    Cam,
    /// Plain-text event log from the behavior-only rigs.
    Txt,
}

impl FileKind {
    pub const ALL: [FileKind; 6] = [
        FileKind::Bhv,
        FileKind::Nidaq,
        FileKind::Running,
        FileKind::Eye,
        FileKind::Cam,
        FileKind::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Bhv => "bhv",
            FileKind::Nidaq => "nidaq",
            FileKind::Running => "running",
            FileKind::Eye => "eye",
            FileKind::Cam => "cam",
            FileKind::Txt => "txt",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AnalysisError::UnsupportedOption {
                kind: "file type",
                value: s.to_string(),
                expected: "bhv, nidaq, running, eye, cam, txt",
            })
    }
}

/// A mouse and the dates and runs to analyse for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    pub mouse: String,
    pub dates: Vec<String>,
    pub runs: Vec<u32>,
}

impl Experiment {
    pub fn new(mouse: impl Into<String>, dates: Vec<String>, runs: Vec<u32>) -> Self {
        Self {
            mouse: mouse.into(),
            dates,
            runs,
        }
    }

    /// Every (date, run) combination, dates outermost.
    pub fn keys(&self) -> impl Iterator<Item = SessionKey> + '_ {
        self.dates.iter().flat_map(move |date| {
            self.runs
                .iter()
                .map(move |&run| SessionKey::new(self.mouse.clone(), date.clone(), run))
        })
    }

    /// Looks up every requested file kind for every session.
    pub fn catalog(&self, resolver: &Resolver, kinds: &[FileKind]) -> SessionCatalog {
        let mut catalog = SessionCatalog::default();
        for key in self.keys() {
            log::info!("Locating data for {}, run {} of {}...", key.mouse, key.run, key.date);
            for &kind in kinds {
                let resolution = resolver.resolve(&key, kind);
                match resolution.path() {
                    Some(path) => log::info!("{} found: {}", kind, path.display()),
                    None => log::warn!("Data not found: {} for {}", kind, key),
                }
                catalog.insert(key.clone(), kind, resolution);
            }
        }
        catalog
    }
}

/// File lookup results for many sessions, keyed by session.
#[derive(Debug, Clone, Default)]
pub struct SessionCatalog {
    entries: BTreeMap<SessionKey, BTreeMap<FileKind, Resolution>>,
}

impl SessionCatalog {
    pub fn insert(&mut self, key: SessionKey, kind: FileKind, resolution: Resolution) {
        self.entries.entry(key).or_default().insert(kind, resolution);
    }

    pub fn get(&self, key: &SessionKey, kind: FileKind) -> Option<&Resolution> {
        self.entries.get(key).and_then(|files| files.get(&kind))
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SessionKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sessions where `kind` was found, with its path.
    pub fn present(&self, kind: FileKind) -> Vec<(&SessionKey, &std::path::Path)> {
        self.entries
            .iter()
            .filter_map(|(key, files)| {
                files
                    .get(&kind)
                    .and_then(Resolution::path)
                    .map(|path| (key, path))
            })
            .collect()
    }

    pub fn missing(&self) -> Vec<(&SessionKey, FileKind)> {
        self.entries
            .iter()
            .flat_map(|(key, files)| {
                files
                    .iter()
                    .filter(|(_, resolution)| !resolution.is_present())
                    .map(move |(&kind, _)| (key, kind))
            })
            .collect()
    }
}
