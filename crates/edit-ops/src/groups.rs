use reconcile::ReconcileResult;
use topo_complex::Complex;
use tracing::debug;

/// Copy the group names of every replaced cell onto its successors.
/// Returns the number of memberships added.
pub fn transfer_groups(complex: &mut Complex, outcome: &ReconcileResult) -> usize {
    let mut added = 0;
    for (old, successors) in &outcome.replaced_by {
        let groups = complex.groups(*old).to_vec();
        for succ in successors {
            for group in &groups {
                if !complex.groups(*succ).contains(group) {
                    complex.add_to_group(*succ, group);
                    added += 1;
                }
            }
        }
    }
    debug!(added, "group memberships transferred");
    added
}
