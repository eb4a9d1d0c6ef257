//! Session reports: a text rendering for reading in test output and a JSON
//! rendering for tooling.

use std::fmt;

use edit_ops::CommandKind;
use geom_types::Dimension;
use serde::Serialize;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;
use crate::workflow::ModelBuilder;

/// A complete report of a scripted session.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub steps: Vec<StepEntry>,
    /// Live cells per dimension, vertices first.
    pub live_counts: [usize; 4],
    pub oracle_results: Vec<OracleVerdict>,
}

/// One command of the session.
#[derive(Debug, Clone, Serialize)]
pub struct StepEntry {
    pub index: usize,
    pub name: String,
    pub command: CommandKind,
    pub created: [usize; 4],
    pub removed: usize,
    pub replaced: usize,
    pub warnings: Vec<String>,
}

impl ModelReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &OracleVerdict> {
        self.oracle_results.iter().filter(|v| !v.passed)
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Complex Report ===\n\n");

        out.push_str(&format!("History ({} commands):\n", self.steps.len()));
        for step in &self.steps {
            out.push_str(&format!(
                "  [{}] {:?} \"{}\"\n",
                step.index, step.command, step.name
            ));
            let [v, c, s, vol] = step.created;
            out.push_str(&format!(
                "      created V={} C={} S={} Vol={} | removed {} | replaced {}\n",
                v, c, s, vol, step.removed, step.replaced,
            ));
            for w in &step.warnings {
                out.push_str(&format!("      warning: {}\n", w));
            }
        }

        let [v, c, s, vol] = self.live_counts;
        out.push_str(&format!(
            "\nLive Cells: V={} C={} S={} Vol={}\n",
            v, c, s, vol
        ));

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }
        out
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl ModelBuilder {
    /// Generate a report of every command so far plus the current checks.
    pub fn report(&self) -> ModelReport {
        let steps = self
            .history()
            .iter()
            .enumerate()
            .map(|(index, (name, r))| StepEntry {
                index,
                name: name.clone(),
                command: r.command,
                created: Dimension::ALL.map(|d| r.created_in(d).len()),
                removed: r.removed().len(),
                replaced: r.outcome.replaced_by.len(),
                warnings: r
                    .outcome
                    .diagnostics
                    .warnings
                    .iter()
                    .map(|w| w.to_string())
                    .collect(),
            })
            .collect();
        ModelReport {
            steps,
            live_counts: self.live_counts(),
            oracle_results: self.check_all(),
        }
    }
}
