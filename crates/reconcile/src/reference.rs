use geom_types::Dimension;
use topo_complex::{CellId, Complex};
use tracing::debug;

// ─── Reference Set ───────────────────────────────────────────────────────────

/// Cells an operation consumes (the reference closure) and the cells that
/// touch them from above without being consumed (the adjacent set).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    pub inputs: Vec<CellId>,
    /// Inputs plus their down-closure, per dimension, serial-ordered.
    pub reference: [Vec<CellId>; 4],
    /// Up-closure of the references minus the references, per dimension.
    pub adjacent: [Vec<CellId>; 4],
}

impl ReferenceSet {
    /// Gather the reference closure of `inputs` and its adjacent cells.
    /// Retired inputs are skipped.
    pub fn collect(complex: &Complex, inputs: &[CellId]) -> Self {
        let mut set = ReferenceSet {
            inputs: inputs.iter().copied().filter(|id| complex.is_live(*id)).collect(),
            ..Default::default()
        };
        for &input in &set.inputs.clone() {
            set.insert_reference(complex, input);
            for id in complex.down_closure(input) {
                set.insert_reference(complex, id);
            }
        }
        set.refresh_adjacent(complex);
        set.sort(complex);
        debug!(
            references = set.reference_count(),
            adjacent = set.adjacent_count(),
            "reference set collected"
        );
        set
    }

    /// Every live cell is a reference; nothing is adjacent.
    pub fn collect_all(complex: &Complex) -> Self {
        let mut set = ReferenceSet::default();
        for dim in Dimension::ALL {
            set.reference[dim.index()] = complex.cells(dim);
        }
        set.inputs = set.reference[Dimension::Volume.index()].clone();
        set
    }

    pub fn is_reference(&self, complex: &Complex, id: CellId) -> bool {
        self.reference[complex.dimension(id).index()].contains(&id)
    }

    pub fn is_adjacent(&self, complex: &Complex, id: CellId) -> bool {
        self.adjacent[complex.dimension(id).index()].contains(&id)
    }

    pub fn references(&self, dim: Dimension) -> &[CellId] {
        &self.reference[dim.index()]
    }

    pub fn adjacents(&self, dim: Dimension) -> &[CellId] {
        &self.adjacent[dim.index()]
    }

    pub fn reference_count(&self) -> usize {
        self.reference.iter().map(Vec::len).sum()
    }

    pub fn adjacent_count(&self) -> usize {
        self.adjacent.iter().map(Vec::len).sum()
    }

    /// All references, lowest dimension first.
    pub fn all_references(&self) -> Vec<CellId> {
        self.reference.iter().flatten().copied().collect()
    }

    /// Pull `id` and its down-closure into the references. The cells stay
    /// listed as adjacent too.
    pub fn extend_with(&mut self, complex: &Complex, id: CellId) {
        self.insert_reference(complex, id);
        for below in complex.down_closure(id) {
            self.insert_reference(complex, below);
        }
        self.sort(complex);
    }

    fn insert_reference(&mut self, complex: &Complex, id: CellId) {
        let list = &mut self.reference[complex.dimension(id).index()];
        if !list.contains(&id) {
            list.push(id);
        }
    }

    fn refresh_adjacent(&mut self, complex: &Complex) {
        for id in self.all_references() {
            for above in complex.up_closure(id) {
                if self.is_reference(complex, above) {
                    continue;
                }
                let list = &mut self.adjacent[complex.dimension(above).index()];
                if !list.contains(&above) {
                    list.push(above);
                }
            }
        }
    }

    fn sort(&mut self, complex: &Complex) {
        for list in self.reference.iter_mut().chain(self.adjacent.iter_mut()) {
            complex.sort_by_serial(list);
        }
    }
}

/// Remove every link between two cells of `cells`. Links to cells outside
/// the slice are left alone.
pub fn strip_internal_links(complex: &mut Complex, cells: &[CellId]) -> usize {
    let mut stripped = 0;
    for &id in cells {
        if !complex.is_live(id) {
            continue;
        }
        let below: Vec<CellId> = complex
            .down(id)
            .iter()
            .copied()
            .filter(|d| cells.contains(d))
            .collect();
        for d in below {
            if matches!(complex.unlink(id, d), Ok(true)) {
                stripped += 1;
            }
        }
    }
    debug!(stripped, "internal links stripped");
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom_kernel::ShapeHandle;

    /// Two segments sharing a vertex, plus a face on the first segment.
    fn fan() -> (Complex, [CellId; 6]) {
        let mut c = Complex::new();
        let v0 = c.add_vertex(ShapeHandle(1));
        let v1 = c.add_vertex(ShapeHandle(2));
        let v2 = c.add_vertex(ShapeHandle(3));
        let e0 = c.add_curve(ShapeHandle(4));
        let e1 = c.add_curve(ShapeHandle(5));
        let f = c.add_surface(ShapeHandle(6));
        c.link(v0, e0).unwrap();
        c.link(v1, e0).unwrap();
        c.link(v1, e1).unwrap();
        c.link(v2, e1).unwrap();
        c.link(e0, f).unwrap();
        (c, [v0, v1, v2, e0, e1, f])
    }

    #[test]
    fn collect_builds_closure_and_adjacency() {
        let (c, [v0, v1, _v2, e0, e1, f]) = fan();
        let set = ReferenceSet::collect(&c, &[e0]);
        assert_eq!(set.references(Dimension::Vertex), &[v0, v1]);
        assert_eq!(set.references(Dimension::Curve), &[e0]);
        // e1 touches the shared vertex from above; f sits on e0.
        assert_eq!(set.adjacents(Dimension::Curve), &[e1]);
        assert_eq!(set.adjacents(Dimension::Surface), &[f]);
        assert!(set.is_reference(&c, v1));
        assert!(!set.is_adjacent(&c, v1));
    }

    #[test]
    fn collect_all_has_no_adjacency() {
        let (c, _) = fan();
        let set = ReferenceSet::collect_all(&c);
        assert_eq!(set.reference_count(), 6);
        assert_eq!(set.adjacent_count(), 0);
    }

    #[test]
    fn strip_keeps_outside_links() {
        let (mut c, [v0, v1, _v2, e0, e1, f]) = fan();
        let refs = [v0, v1, e0];
        assert_eq!(strip_internal_links(&mut c, &refs), 2);
        assert!(c.down(e0).is_empty());
        assert_eq!(c.up(e0), &[f]);
        assert_eq!(c.up(v1), &[e1]);
    }

    #[test]
    fn extend_with_adds_closure() {
        let (c, [v0, v1, v2, e0, e1, _f]) = fan();
        let mut set = ReferenceSet::collect(&c, &[e0]);
        set.extend_with(&c, e1);
        assert_eq!(set.references(Dimension::Vertex), &[v0, v1, v2]);
        assert_eq!(set.references(Dimension::Curve), &[e0, e1]);
        assert!(set.is_adjacent(&c, e1));
    }
}
