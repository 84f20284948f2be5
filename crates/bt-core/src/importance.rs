//! Important-biomarker selection over a fixed lookback window.
//!
//! A biomarker is important for test `i` when it is out of range in test `i`
//! or in any of the up-to-[`LOOKBACK_WINDOW`] tests strictly before it. The
//! same window drives [`ImportanceWindow::history_for`], so the history shown
//! for an important biomarker always covers exactly the tests that made it
//! important.
//!
//! Tests must be in chronological order. Nothing here sorts them.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use bt_model::{HistoryPoint, LabTest};

use crate::range::reading_out_of_range;

/// Number of prior tests considered.
pub const LOOKBACK_WINDOW: usize = 3;

/// Lookback window shared by importance and history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportanceWindow {
    lookback: usize,
}

impl Default for ImportanceWindow {
    fn default() -> Self {
        Self::new(LOOKBACK_WINDOW)
    }
}

/// Important biomarkers for one test plus their prior values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportanceContext {
    pub important: BTreeSet<String>,
    /// Most-recent-first history per important biomarker. Biomarkers with no
    /// prior values are absent.
    pub history: BTreeMap<String, Vec<HistoryPoint>>,
}

impl ImportanceContext {
    pub fn is_important(&self, name: &str) -> bool {
        self.important.contains(name)
    }
}

impl ImportanceWindow {
    pub const fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    pub const fn lookback(&self) -> usize {
        self.lookback
    }

    /// Indices of the prior tests for `index`, clamped to the sequence.
    fn prior_range(&self, len: usize, index: usize) -> Range<usize> {
        let end = index.min(len);
        let start = index.saturating_sub(self.lookback).min(end);
        start..end
    }

    /// Names out of range in `tests[index]` or in the window before it.
    ///
    /// An index past the end yields an empty set.
    pub fn important_biomarkers(&self, tests: &[LabTest], index: usize) -> BTreeSet<String> {
        let mut important = BTreeSet::new();
        let Some(current) = tests.get(index) else {
            return important;
        };
        let window = &tests[self.prior_range(tests.len(), index)];
        for test in std::iter::once(current).chain(window) {
            for reading in &test.biomarkers {
                if reading_out_of_range(reading) {
                    important.insert(reading.name.clone());
                }
            }
        }
        important
    }

    /// Prior values of `name`, most recent first.
    ///
    /// Each test contributes its first matching reading; tests without the
    /// biomarker contribute nothing. An index past the end has no history.
    pub fn history_for(&self, tests: &[LabTest], index: usize, name: &str) -> Vec<HistoryPoint> {
        if index >= tests.len() {
            return Vec::new();
        }
        tests[self.prior_range(tests.len(), index)]
            .iter()
            .rev()
            .filter_map(|test| {
                test.reading(name).map(|reading| HistoryPoint {
                    date: test.date.clone(),
                    value: reading.value.clone(),
                })
            })
            .collect()
    }

    /// Importance and history computed over the same window.
    pub fn context(&self, tests: &[LabTest], index: usize) -> ImportanceContext {
        let important = self.important_biomarkers(tests, index);
        let history = important
            .iter()
            .filter_map(|name| {
                let points = self.history_for(tests, index, name);
                (!points.is_empty()).then(|| (name.clone(), points))
            })
            .collect();
        ImportanceContext { important, history }
    }
}

/// [`ImportanceWindow::important_biomarkers`] with the default window.
pub fn important_biomarkers(tests: &[LabTest], index: usize) -> BTreeSet<String> {
    ImportanceWindow::default().important_biomarkers(tests, index)
}

/// [`ImportanceWindow::history_for`] with the default window.
pub fn history_for(tests: &[LabTest], index: usize, name: &str) -> Vec<HistoryPoint> {
    ImportanceWindow::default().history_for(tests, index, name)
}
