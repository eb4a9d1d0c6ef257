//! Non-fatal findings of a pass. Each is logged when recorded and handed
//! back to the caller with the result.

use std::fmt;

use geom_types::Dimension;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Several cells (or sub-shapes) could claim the same identity; the one
    /// listed first won.
    AmbiguousIdentity {
        dimension: Dimension,
        candidates: Vec<String>,
        position: [f64; 3],
    },
    /// Newly created cells left without adjacency and discarded.
    OrphanCleanup { dimension: Dimension, count: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AmbiguousIdentity {
                dimension,
                candidates,
                position,
            } => write!(
                f,
                "ambiguous {dimension} identity at ({:.6}, {:.6}, {:.6}): {}",
                position[0],
                position[1],
                position[2],
                candidates.join(", ")
            ),
            Diagnostic::OrphanCleanup { dimension, count } => {
                write!(f, "{count} orphan {dimension} cell(s) discarded")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.warnings.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn ambiguities(&self) -> impl Iterator<Item = &Diagnostic> {
        self.warnings
            .iter()
            .filter(|d| matches!(d, Diagnostic::AmbiguousIdentity { .. }))
    }

    /// Total orphan cells discarded, all dimensions.
    pub fn orphans_discarded(&self) -> usize {
        self.warnings
            .iter()
            .map(|d| match d {
                Diagnostic::OrphanCleanup { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_candidates() {
        let d = Diagnostic::AmbiguousIdentity {
            dimension: Dimension::Vertex,
            candidates: vec!["Pt0001".into(), "Pt0009".into()],
            position: [1.0, 0.0, 0.5],
        };
        let text = d.to_string();
        assert!(text.contains("Pt0001, Pt0009"));
        assert!(text.contains("1.000000"));
    }

    #[test]
    fn orphan_count_sums_dimensions() {
        let mut diags = Diagnostics::default();
        diags.push(Diagnostic::OrphanCleanup {
            dimension: Dimension::Vertex,
            count: 2,
        });
        diags.push(Diagnostic::OrphanCleanup {
            dimension: Dimension::Curve,
            count: 1,
        });
        assert_eq!(diags.orphans_discarded(), 3);
        assert_eq!(diags.ambiguities().count(), 0);
    }
}
