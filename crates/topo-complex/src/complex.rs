use std::ops::Index;

use geom_kernel::ShapeHandle;
use geom_types::Dimension;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::debug;

use crate::audit::{audit_complex, ComplexAudit};
use crate::cell::{Cell, CellId, CellKind};

/// Errors from complex mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComplexError {
    #[error("unknown cell: {id:?}")]
    UnknownCell { id: CellId },

    #[error("cell {name} is retired")]
    Retired { name: String },

    #[error("cannot link {from} to {to}: dimensions must differ by one")]
    DimensionMismatch { from: String, to: String },

    #[error("invalid representation for {name}: {reason}")]
    InvalidRepresentation { name: String, reason: String },
}

// ─── Complex ─────────────────────────────────────────────────────────────────

/// Arena-owned registry of cells for one document. Sole creator and destroyer
/// of cells; adjacency is stored as ids on both ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Complex {
    cells: SlotMap<CellId, Cell>,
    next_serial: u64,
}

impl Complex {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Factory ──────────────────────────────────────────────────────────

    /// Create a cell of `dim` wrapping `shapes`.
    pub fn create_cell(
        &mut self,
        dim: Dimension,
        shapes: Vec<ShapeHandle>,
    ) -> Result<CellId, ComplexError> {
        let kind = CellKind::empty(dim, shapes).ok_or_else(|| {
            ComplexError::InvalidRepresentation {
                name: format!("new {dim}"),
                reason: "no shape given".to_string(),
            }
        })?;
        self.next_serial += 1;
        let id = self.cells.insert(Cell {
            serial: self.next_serial,
            kind,
            groups: Vec::new(),
            retired: false,
        });
        debug!(name = %self.cells[id].name(), "cell created");
        Ok(id)
    }

    pub fn add_vertex(&mut self, shape: ShapeHandle) -> CellId {
        self.insert_single(Dimension::Vertex, shape)
    }

    pub fn add_curve(&mut self, shape: ShapeHandle) -> CellId {
        self.insert_single(Dimension::Curve, shape)
    }

    pub fn add_surface(&mut self, shape: ShapeHandle) -> CellId {
        self.insert_single(Dimension::Surface, shape)
    }

    pub fn add_volume(&mut self, shape: ShapeHandle) -> CellId {
        self.insert_single(Dimension::Volume, shape)
    }

    fn insert_single(&mut self, dim: Dimension, shape: ShapeHandle) -> CellId {
        self.next_serial += 1;
        let kind = match dim {
            Dimension::Vertex => CellKind::Vertex {
                shape,
                curves: Vec::new(),
            },
            Dimension::Curve => CellKind::Curve {
                shapes: vec![shape],
                vertices: Vec::new(),
                surfaces: Vec::new(),
            },
            Dimension::Surface => CellKind::Surface {
                shapes: vec![shape],
                curves: Vec::new(),
                volumes: Vec::new(),
            },
            Dimension::Volume => CellKind::Volume {
                shape,
                surfaces: Vec::new(),
            },
        };
        self.cells.insert(Cell {
            serial: self.next_serial,
            kind,
            groups: Vec::new(),
            retired: false,
        })
    }

    // ── Lookup ───────────────────────────────────────────────────────────

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(id)
    }

    /// Present and not retired.
    pub fn is_live(&self, id: CellId) -> bool {
        self.cells.get(id).map(|c| !c.retired).unwrap_or(false)
    }

    pub fn name(&self, id: CellId) -> String {
        self.cells
            .get(id)
            .map(Cell::name)
            .unwrap_or_else(|| format!("{id:?}"))
    }

    pub fn dimension(&self, id: CellId) -> Dimension {
        self[id].dimension()
    }

    pub fn serial(&self, id: CellId) -> u64 {
        self[id].serial
    }

    /// Live cells of one dimension, ordered by serial.
    pub fn cells(&self, dim: Dimension) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(_, c)| !c.retired && c.dimension() == dim)
            .map(|(id, _)| id)
            .collect();
        self.sort_by_serial(&mut ids);
        ids
    }

    /// Every cell in the arena, retired ones included.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells.iter()
    }

    pub fn live_count(&self, dim: Dimension) -> usize {
        self.cells
            .values()
            .filter(|c| !c.retired && c.dimension() == dim)
            .count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sort ids by serial and drop duplicates.
    pub fn sort_by_serial(&self, ids: &mut Vec<CellId>) {
        ids.sort_by_key(|id| self[*id].serial);
        ids.dedup();
    }

    // ── Adjacency ────────────────────────────────────────────────────────

    pub fn down(&self, id: CellId) -> &[CellId] {
        self[id].down()
    }

    pub fn up(&self, id: CellId) -> &[CellId] {
        self[id].up()
    }

    pub fn neighbors(&self, id: CellId) -> Vec<CellId> {
        let cell = &self[id];
        cell.down().iter().chain(cell.up()).copied().collect()
    }

    /// Add the bidirectional edge between two cells whose dimensions differ
    /// by one. Returns `false` when the edge already existed.
    pub fn link(&mut self, a: CellId, b: CellId) -> Result<bool, ComplexError> {
        let (lower, upper) = self.ordered_pair(a, b)?;
        for id in [lower, upper] {
            if self[id].retired {
                return Err(ComplexError::Retired { name: self.name(id) });
            }
        }
        if self[upper].down().contains(&lower) {
            return Ok(false);
        }
        if let Some(list) = self.cells[upper].down_mut() {
            list.push(lower);
        }
        if let Some(list) = self.cells[lower].up_mut() {
            if !list.contains(&upper) {
                list.push(upper);
            }
        }
        Ok(true)
    }

    /// Remove the edge between two cells, if present.
    pub fn unlink(&mut self, a: CellId, b: CellId) -> Result<bool, ComplexError> {
        let (lower, upper) = self.ordered_pair(a, b)?;
        let mut removed = false;
        if let Some(list) = self.cells[upper].down_mut() {
            let before = list.len();
            list.retain(|x| *x != lower);
            removed |= list.len() != before;
        }
        if let Some(list) = self.cells[lower].up_mut() {
            let before = list.len();
            list.retain(|x| *x != upper);
            removed |= list.len() != before;
        }
        Ok(removed)
    }

    fn ordered_pair(&self, a: CellId, b: CellId) -> Result<(CellId, CellId), ComplexError> {
        for id in [a, b] {
            if !self.contains(id) {
                return Err(ComplexError::UnknownCell { id });
            }
        }
        let (da, db) = (self[a].dimension(), self[b].dimension());
        if da.higher() == Some(db) {
            Ok((a, b))
        } else if db.higher() == Some(da) {
            Ok((b, a))
        } else {
            Err(ComplexError::DimensionMismatch {
                from: self.name(a),
                to: self.name(b),
            })
        }
    }

    /// Detach a cell from all of its neighbours.
    pub fn detach(&mut self, id: CellId) {
        for other in self.neighbors(id) {
            // Neighbours always differ by one dimension, so this cannot fail.
            let _ = self.unlink(id, other);
        }
    }

    /// Every cell reachable through down-adjacency, excluding `id` itself,
    /// ordered by serial.
    pub fn down_closure(&self, id: CellId) -> Vec<CellId> {
        self.closure(id, Cell::down)
    }

    /// Every cell reachable through up-adjacency, excluding `id` itself,
    /// ordered by serial.
    pub fn up_closure(&self, id: CellId) -> Vec<CellId> {
        self.closure(id, Cell::up)
    }

    fn closure(&self, id: CellId, step: fn(&Cell) -> &[CellId]) -> Vec<CellId> {
        let mut out = Vec::new();
        let mut stack: Vec<CellId> = step(&self[id]).to_vec();
        while let Some(next) = stack.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            stack.extend_from_slice(step(&self[next]));
        }
        self.sort_by_serial(&mut out);
        out
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Detach and drop a cell for good. Used for speculative garbage that no
    /// caller has seen yet.
    pub fn destroy(&mut self, id: CellId) -> Option<Cell> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        let cell = self.cells.remove(id);
        if let Some(c) = &cell {
            debug!(name = %c.name(), "cell destroyed");
        }
        cell
    }

    /// Tombstone a cell: detach it and mark it retired.
    pub fn retire(&mut self, id: CellId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);
        self.cells[id].retired = true;
        debug!(name = %self.cells[id].name(), "cell retired");
    }

    /// Drop every retired cell. Returns how many were dropped.
    pub fn purge_retired(&mut self) -> usize {
        let before = self.cells.len();
        self.cells.retain(|_, c| !c.retired);
        before - self.cells.len()
    }

    pub fn set_representation(
        &mut self,
        id: CellId,
        shapes: Vec<ShapeHandle>,
    ) -> Result<(), ComplexError> {
        let cell = self
            .cells
            .get_mut(id)
            .ok_or(ComplexError::UnknownCell { id })?;
        if cell.set_shapes(shapes) {
            Ok(())
        } else {
            Err(ComplexError::InvalidRepresentation {
                name: cell.name(),
                reason: "wrong number of shapes".to_string(),
            })
        }
    }

    // ── Groups ───────────────────────────────────────────────────────────

    pub fn add_to_group(&mut self, id: CellId, group: &str) {
        if let Some(cell) = self.cells.get_mut(id) {
            if !cell.groups.iter().any(|g| g == group) {
                cell.groups.push(group.to_string());
            }
        }
    }

    pub fn remove_from_group(&mut self, id: CellId, group: &str) {
        if let Some(cell) = self.cells.get_mut(id) {
            cell.groups.retain(|g| g != group);
        }
    }

    pub fn groups(&self, id: CellId) -> &[String] {
        &self[id].groups
    }

    /// Live cells in a group, ordered by serial.
    pub fn group_members(&self, group: &str) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(_, c)| !c.retired && c.groups.iter().any(|g| g == group))
            .map(|(id, _)| id)
            .collect();
        self.sort_by_serial(&mut ids);
        ids
    }

    // ── Snapshots ────────────────────────────────────────────────────────

    /// Copy of the whole registry, to be restored if a command fails.
    pub fn snapshot(&self) -> Complex {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: Complex) {
        *self = snapshot;
    }

    pub fn audit(&self) -> ComplexAudit {
        audit_complex(self)
    }
}

impl Index<CellId> for Complex {
    type Output = Cell;

    /// Panics on an id that does not belong to this complex.
    fn index(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }
}
