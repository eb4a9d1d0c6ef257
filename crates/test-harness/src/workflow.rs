//! ModelBuilder: fluent API for scripting editing sessions in tests.
//!
//! Drives the real `edit_ops` commands against a `MockKernel`. Cells are
//! addressed by string names; a name follows its cell through single
//! replacements so that scripts stay readable across commands.

use std::collections::HashMap;

use edit_ops::{
    execute_cut, execute_fuse, execute_glue_all, execute_import, execute_new_box,
    execute_new_segment, execute_remove, execute_section, execute_split_curve, EditResult, Tool,
};
use geom_kernel::{MockKernel, Side};
use geom_types::{Axis, Dimension, Tolerance};
use topo_complex::{CellId, Complex};

use crate::helpers::*;
use crate::oracle::{self, OracleVerdict};

/// A fluent builder for constructing and verifying complexes in tests.
pub struct ModelBuilder {
    pub(crate) complex: Complex,
    pub(crate) kernel: MockKernel,
    named_cells: HashMap<String, CellId>,
    history: Vec<(String, EditResult)>,
    auto_check: bool,
    tolerance: Tolerance,
}

impl ModelBuilder {
    /// Empty complex over a fresh MockKernel.
    pub fn mock() -> Self {
        Self {
            complex: Complex::new(),
            kernel: MockKernel::new(),
            named_cells: HashMap::new(),
            history: Vec::new(),
            auto_check: false,
            tolerance: Tolerance::default(),
        }
    }

    /// Enable auto-checking: after every command, run every oracle and fail
    /// on the first verdict that does not pass.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    // ── Creation ────────────────────────────────────────────────────────

    /// Add a box and name its volume.
    pub fn new_box(
        &mut self,
        name: &str,
        min: [f64; 3],
        max: [f64; 3],
    ) -> Result<CellId, HarnessError> {
        self.check_name_available(name)?;
        let r = execute_new_box(&mut self.complex, &mut self.kernel, point(min), point(max))?;
        let vol = first_created(&r, Dimension::Volume, name)?;
        self.record(name, r)?;
        self.named_cells.insert(name.to_string(), vol);
        Ok(vol)
    }

    /// Add a segment and name its curve.
    pub fn new_segment(
        &mut self,
        name: &str,
        start: [f64; 3],
        end: [f64; 3],
    ) -> Result<CellId, HarnessError> {
        self.check_name_available(name)?;
        let r = execute_new_segment(&mut self.complex, &mut self.kernel, point(start), point(end))?;
        let curve = first_created(&r, Dimension::Curve, name)?;
        self.record(name, r)?;
        self.named_cells.insert(name.to_string(), curve);
        Ok(curve)
    }

    /// Import boxes sewn together, naming each volume in order.
    pub fn sewn_boxes(
        &mut self,
        names: &[&str],
        boxes: &[([f64; 3], [f64; 3])],
    ) -> Result<&mut Self, HarnessError> {
        for name in names {
            self.check_name_available(name)?;
        }
        let shape = sewn_boxes(&mut self.kernel, boxes)?;
        let r = execute_import(&mut self.complex, &mut self.kernel, shape)?;
        self.record("import", r)?;
        for (name, (min, _)) in names.iter().zip(boxes) {
            let vol =
                cell_with_min_corner(&self.complex, &self.kernel, Dimension::Volume, *min)
                    .ok_or_else(|| HarnessError::CellNotFound {
                        name: name.to_string(),
                    })?;
            self.named_cells.insert(name.to_string(), vol);
        }
        Ok(self)
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Fuse two named volumes; the result takes `name`.
    pub fn fuse(&mut self, name: &str, a: &str, b: &str) -> Result<CellId, HarnessError> {
        self.check_name_available(name)?;
        let inputs = [self.cell(a)?, self.cell(b)?];
        let r = execute_fuse(&mut self.complex, &mut self.kernel, &inputs)?;
        let vol = first_created(&r, Dimension::Volume, name)?;
        self.record(name, r)?;
        self.named_cells.insert(name.to_string(), vol);
        Ok(vol)
    }

    /// Cut a named volume by the half-space on `side` of `axis = offset`.
    pub fn cut_half_space(
        &mut self,
        target: &str,
        axis: Axis,
        offset: f64,
        side: Side,
    ) -> Result<&mut Self, HarnessError> {
        let id = self.cell(target)?;
        let tool = Tool::HalfSpace { axis, offset, side };
        let r = execute_cut(&mut self.complex, &mut self.kernel, &[id], &tool)?;
        self.record(&format!("cut {target}"), r)?;
        Ok(self)
    }

    /// Section a named cell by a plane. Returns the pieces it was split into.
    pub fn section(
        &mut self,
        target: &str,
        axis: Axis,
        offset: f64,
    ) -> Result<Vec<CellId>, HarnessError> {
        let id = self.cell(target)?;
        let r = execute_section(&mut self.complex, &mut self.kernel, &[id], axis, offset)?;
        let pieces = r.successors(id).to_vec();
        self.record(&format!("section {target}"), r)?;
        Ok(pieces)
    }

    /// Split a named curve at an interior point.
    pub fn split_curve(&mut self, target: &str, at: [f64; 3]) -> Result<Vec<CellId>, HarnessError> {
        let id = self.cell(target)?;
        let r = execute_split_curve(&mut self.complex, &mut self.kernel, id, point(at))?;
        let pieces = r.successors(id).to_vec();
        self.record(&format!("split {target}"), r)?;
        Ok(pieces)
    }

    pub fn glue_all(&mut self) -> Result<&mut Self, HarnessError> {
        let r = execute_glue_all(&mut self.complex, &mut self.kernel)?;
        self.record("glue", r)?;
        Ok(self)
    }

    pub fn remove(&mut self, target: &str, propagate_down: bool) -> Result<&mut Self, HarnessError> {
        let id = self.cell(target)?;
        let r = execute_remove(&mut self.complex, &[id], propagate_down)?;
        self.record(&format!("remove {target}"), r)?;
        Ok(self)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// The live cell currently carrying `name`.
    pub fn cell(&self, name: &str) -> Result<CellId, HarnessError> {
        self.named_cells
            .get(name)
            .copied()
            .filter(|id| self.complex.is_live(*id))
            .ok_or_else(|| HarnessError::CellNotFound {
                name: name.to_string(),
            })
    }

    pub fn complex(&self) -> &Complex {
        &self.complex
    }

    pub fn kernel(&self) -> &MockKernel {
        &self.kernel
    }

    pub fn history(&self) -> &[(String, EditResult)] {
        &self.history
    }

    pub fn last_result(&self) -> Option<&EditResult> {
        self.history.last().map(|(_, r)| r)
    }

    pub fn live_counts(&self) -> [usize; 4] {
        live_counts(&self.complex)
    }

    // ── Verification ────────────────────────────────────────────────────

    /// Every oracle against the current complex and the last command.
    pub fn check_all(&self) -> Vec<OracleVerdict> {
        let tol = self.tolerance.coincidence;
        match self.last_result() {
            Some(r) => oracle::run_all_checks(&self.complex, &self.kernel, &r.outcome, tol),
            None => oracle::run_complex_checks(&self.complex, &self.kernel, tol),
        }
    }

    pub fn assert_live_counts(&self, expected: [usize; 4]) -> Result<&Self, HarnessError> {
        crate::assertions::assert_live_counts(&self.complex, expected, self.context())?;
        Ok(self)
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.named_cells.contains_key(name) {
            return Err(HarnessError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn context(&self) -> &str {
        self.history.last().map(|(n, _)| n.as_str()).unwrap_or("empty")
    }

    /// Store a result, move names onto single successors, then auto-check.
    fn record(&mut self, step: &str, result: EditResult) -> Result<(), HarnessError> {
        for id in self.named_cells.values_mut() {
            if let [next] = result.successors(*id) {
                *id = *next;
            }
        }
        self.history.push((step.to_string(), result));
        if self.auto_check {
            crate::assertions::assert_all_pass(&self.check_all(), step)?;
        }
        Ok(())
    }
}

fn first_created(r: &EditResult, dim: Dimension, name: &str) -> Result<CellId, HarnessError> {
    r.created_in(dim)
        .first()
        .copied()
        .ok_or_else(|| HarnessError::AssertionFailed {
            detail: format!("[{name}] command created no {dim}"),
        })
}
