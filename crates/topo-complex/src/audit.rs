use crate::cell::CellId;
use crate::complex::Complex;

// ─── Complex Audit ───────────────────────────────────────────────────────────

/// Result of a consistency check over the whole complex.
#[derive(Debug, Clone)]
pub struct ComplexAudit {
    pub symmetric: bool,
    pub no_dangling: bool,
    pub no_duplicates: bool,
    pub dimensions_consistent: bool,
    pub errors: Vec<AdjacencyError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdjacencyError {
    /// `from` lists `to` but `to` does not list `from` back.
    Asymmetric { from: CellId, to: CellId },
    /// `from` lists a cell that is missing or retired.
    Dangling { from: CellId, to: CellId },
    /// A retired cell still holds adjacency.
    RetiredWithLinks { cell: CellId },
    /// `from` lists `to` more than once.
    Duplicate { from: CellId, to: CellId },
    /// `from` lists a cell whose dimension is not one step away.
    DimensionMismatch { from: CellId, to: CellId },
}

impl ComplexAudit {
    pub fn all_valid(&self) -> bool {
        self.symmetric && self.no_dangling && self.no_duplicates && self.dimensions_consistent
    }
}

/// Check adjacency symmetry, dangling references, duplicates and dimension
/// steps for every cell.
pub fn audit_complex(complex: &Complex) -> ComplexAudit {
    let mut errors = Vec::new();

    for (id, cell) in complex.iter() {
        if cell.retired {
            if cell.has_adjacency() {
                errors.push(AdjacencyError::RetiredWithLinks { cell: id });
            }
            continue;
        }
        let dim = cell.dimension();
        let lists = [(cell.down(), dim.lower()), (cell.up(), dim.higher())];
        for (list, expected) in lists {
            for (i, &other) in list.iter().enumerate() {
                if list[..i].contains(&other) {
                    errors.push(AdjacencyError::Duplicate { from: id, to: other });
                    continue;
                }
                let Some(target) = complex.get(other).filter(|c| !c.retired) else {
                    errors.push(AdjacencyError::Dangling { from: id, to: other });
                    continue;
                };
                if Some(target.dimension()) != expected {
                    errors.push(AdjacencyError::DimensionMismatch { from: id, to: other });
                    continue;
                }
                let back = if target.dimension() < dim {
                    target.up()
                } else {
                    target.down()
                };
                if !back.contains(&id) {
                    errors.push(AdjacencyError::Asymmetric { from: id, to: other });
                }
            }
        }
    }

    let has = |pred: fn(&AdjacencyError) -> bool| errors.iter().any(pred);
    ComplexAudit {
        symmetric: !has(|e| matches!(e, AdjacencyError::Asymmetric { .. })),
        no_dangling: !has(|e| {
            matches!(
                e,
                AdjacencyError::Dangling { .. } | AdjacencyError::RetiredWithLinks { .. }
            )
        }),
        no_duplicates: !has(|e| matches!(e, AdjacencyError::Duplicate { .. })),
        dimensions_consistent: !has(|e| matches!(e, AdjacencyError::DimensionMismatch { .. })),
        errors,
    }
}
