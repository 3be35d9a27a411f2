use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::session::SessionKey;

/// Human-readable name of a MonkeyLogic condition code.
pub fn condition_label(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("Pavlovian_CSp_2s"),
        2 => Some("CSmix_cond_2s_end"),
        3 => Some("Pavlovian_CSm_shock"),
        4 => Some("Blank_2s"),
        5 => Some("Lick_reward"),
        6 => Some("Unconditional_reward"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
    Other,
}

impl Outcome {
    /// MonkeyLogic trial error 0 is a correct response, 1 a missed one.
    pub fn from_trial_error(code: u32) -> Self {
        match code {
            0 => Outcome::Hit,
            1 => Outcome::Miss,
            _ => Outcome::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub trial_number: usize,
    pub condition: u32,
    pub trial_error: u32,
    pub block_number: u32,
}

impl Trial {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_trial_error(self.trial_error)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeCounts {
    pub hits: usize,
    pub misses: usize,
    pub other: usize,
}

impl OutcomeCounts {
    fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Hit => self.hits += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::Other => self.other += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hits + self.misses + self.other
    }

    /// `hits / (hits + misses)`; trials with other outcomes are ignored.
    pub fn hit_rate(&self) -> Option<f64> {
        let scored = self.hits + self.misses;
        if scored == 0 {
            None
        } else {
            Some(self.hits as f64 / scored as f64)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialSummary {
    pub overall: OutcomeCounts,
    pub by_condition: BTreeMap<u32, OutcomeCounts>,
}

/// All trials of one session.
#[derive(Debug, Clone)]
pub struct TrialTable {
    pub key: SessionKey,
    pub trials: Vec<Trial>,
}

#[derive(Debug, Deserialize)]
struct TrialCsvRow {
    conditions: u32,
    trialerrors: u32,
    blocknumber: u32,
}

impl TrialTable {
    /// Builds the table from the three per-trial columns of a behavior file.
    pub fn from_columns(
        key: SessionKey,
        conditions: &[u32],
        trial_errors: &[u32],
        block_numbers: &[u32],
    ) -> Result<Self> {
        for (what, len) in [("trialerrors", trial_errors.len()), ("blocknumber", block_numbers.len())] {
            if len != conditions.len() {
                return Err(AnalysisError::LengthMismatch {
                    what: what.to_string(),
                    expected: conditions.len(),
                    actual: len,
                });
            }
        }

        let trials = conditions
            .iter()
            .zip(trial_errors)
            .zip(block_numbers)
            .enumerate()
            .map(|(i, ((&condition, &trial_error), &block_number))| Trial {
                trial_number: i + 1,
                condition,
                trial_error,
                block_number,
            })
            .collect();

        Ok(Self { key, trials })
    }

    /// Reads a CSV export with `conditions,trialerrors,blocknumber` columns.
    pub fn from_csv<P: AsRef<Path>>(key: SessionKey, path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(File::open(path.as_ref())?);
        let mut trials = Vec::new();
        for (i, result) in rdr.deserialize().enumerate() {
            let row: TrialCsvRow = result?;
            trials.push(Trial {
                trial_number: i + 1,
                condition: row.conditions,
                trial_error: row.trialerrors,
                block_number: row.blocknumber,
            });
        }
        log::info!("{}: {} trials loaded", key, trials.len());
        Ok(Self { key, trials })
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn summary(&self) -> TrialSummary {
        let mut summary = TrialSummary::default();
        for trial in &self.trials {
            let outcome = trial.outcome();
            summary.overall.add(outcome);
            summary
                .by_condition
                .entry(trial.condition)
                .or_default()
                .add(outcome);
        }
        summary
    }
}
