//! Work partitioning
//!
//! Splits the ordered command list into balanced chunks and maps chunks to
//! nodes in capacity order.

use rand::seq::SliceRandom;

use crate::capacity::NodeContribution;

/// A contiguous slice of the original command sequence, assigned to
/// exactly one submission slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The commands this slot carries
    pub commands: Vec<String>,
}

/// Slots assigned to one node by the greedy fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAssignment {
    /// Node hostname
    pub node: String,

    /// Partition the node belongs to
    pub partition: String,

    /// Number of consecutive slots this node takes
    pub slots: u32,
}

/// Split commands into at most `pool_size` balanced chunks
///
/// The pool is clamped to the command count so no chunk is ever empty.
/// With `k, m = divmod(len, pool)`, the first `m` chunks carry `k + 1`
/// commands and the rest carry `k`; concatenating the chunks in order
/// reconstructs the input exactly. Shuffling permutes the commands first
/// and explicitly trades that determinism for load diversity.
pub fn partition(mut commands: Vec<String>, pool_size: u32, shuffle: bool) -> Vec<Chunk> {
    if commands.is_empty() || pool_size == 0 {
        return Vec::new();
    }
    if shuffle {
        commands.shuffle(&mut rand::thread_rng());
    }

    let pool = (pool_size as usize).min(commands.len());
    let k = commands.len() / pool;
    let m = commands.len() % pool;

    (0..pool)
        .map(|i| {
            let start = i * k + i.min(m);
            let end = (i + 1) * k + (i + 1).min(m);
            Chunk {
                commands: commands[start..end].to_vec(),
            }
        })
        .collect()
}

/// Map pool slots onto nodes in canonical load order
///
/// Walks the contributions in order, giving each node its full
/// contribution until the running total reaches `pool_size`; the last
/// node is trimmed so the grand total is exact, and later nodes receive
/// nothing. Chunk *i* pairs with the *i*-th slot of the flattened
/// assignment sequence.
pub fn assign(contributions: &[NodeContribution], pool_size: u32) -> Vec<NodeAssignment> {
    let mut assignments = Vec::new();
    let mut registered = 0u32;

    for contribution in contributions {
        if registered >= pool_size {
            break;
        }
        let slots = contribution.slots.min(pool_size - registered);
        if slots == 0 {
            continue;
        }
        registered += slots;
        assignments.push(NodeAssignment {
            node: contribution.node.clone(),
            partition: contribution.partition.clone(),
            slots,
        });
    }

    assignments
}
