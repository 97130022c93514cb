//! Topological sequencer: one valid order for a pool of steps.
//!
//! [`sequence`] is the primitive the generator leans on: hand it a step
//! pool in *some* order plus a set of must-come-before constraints and it
//! returns one total order consistent with all of them. It is
//! order-preserving -- among the steps that are ready, the earliest one in
//! the input always goes next -- so feeding it uniformly shuffled input
//! yields a uniformly randomized valid order. The randomization itself is
//! the caller's job; this module is deterministic.
//!
//! Constraints whose endpoints are not in the pool are ignored. The pools
//! here are tiny (around ten steps), so the quadratic ready-scan is not
//! worth improving on.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;

/// Error when the constraints admit no valid total order.
///
/// A cycle among the constraints is a configuration bug, never a runtime
/// condition to recover from. `remaining` holds the steps that could not be
/// placed, i.e. the part of the pool the cycle runs through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicConstraints<T> {
    pub remaining: Vec<T>,
}

/// Order `items` so that every `(before, after)` constraint holds.
///
/// Kahn's algorithm over the constraint graph, restricted to constraints
/// with both endpoints present in `items`. Ties are broken by input
/// position, which makes the output a deterministic function of the input
/// order.
///
/// # Errors
///
/// Returns [`CyclicConstraints`] with the unplaced remainder if the
/// applicable constraints contain a cycle.
pub fn sequence<T>(items: &[T], constraints: &[(T, T)]) -> Result<Vec<T>, CyclicConstraints<T>>
where
    T: Eq + Hash + Clone + Debug,
{
    let mut in_degree: HashMap<&T, usize> = items.iter().map(|item| (item, 0)).collect();

    // Only constraints fully inside the pool count.
    let applicable: Vec<&(T, T)> = constraints
        .iter()
        .filter(|(before, after)| in_degree.contains_key(before) && in_degree.contains_key(after))
        .collect();

    for (_, after) in &applicable {
        if let Some(degree) = in_degree.get_mut(after) {
            *degree += 1;
        }
    }

    let mut ordered: Vec<T> = Vec::with_capacity(items.len());
    let mut placed: Vec<bool> = alloc::vec![false; items.len()];

    while ordered.len() < items.len() {
        let ready = items.iter().enumerate().find(|(i, item)| {
            !placed[*i] && in_degree.get(item).is_some_and(|degree| *degree == 0)
        });

        let Some((i, item)) = ready else {
            let remaining: Vec<T> = items
                .iter()
                .enumerate()
                .filter(|(i, _)| !placed[*i])
                .map(|(_, item)| item.clone())
                .collect();
            tracing::debug!(?remaining, "constraint cycle, no step is ready");
            return Err(CyclicConstraints { remaining });
        };

        placed[i] = true;
        in_degree.remove(item);
        for (before, after) in &applicable {
            if before == item {
                if let Some(degree) = in_degree.get_mut(after) {
                    *degree -= 1;
                }
            }
        }
        ordered.push(item.clone());
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_constraints() {
        let items = ["w", "r", "a"];
        let constraints = [("r", "a"), ("a", "w")];
        let order = sequence(&items, &constraints).unwrap();
        assert_eq!(order, ["r", "a", "w"]);
    }

    #[test]
    fn preserves_input_order_without_constraints() {
        let items = [3_u64, 1, 2];
        let order = sequence(&items, &[]).unwrap();
        assert_eq!(order, [3, 1, 2]);
    }

    #[test]
    fn ignores_constraints_on_absent_items() {
        let items = ["r", "w"];
        let constraints = [("r", "w"), ("w", "rollback")];
        let order = sequence(&items, &constraints).unwrap();
        assert_eq!(order, ["r", "w"]);
    }

    #[test]
    fn reports_cycle_with_remaining_items() {
        let items = ["r", "w", "x"];
        let constraints = [("r", "w"), ("w", "r")];
        let err = sequence(&items, &constraints).unwrap_err();
        assert_eq!(err.remaining, alloc::vec!["r", "w"]);
    }
}
