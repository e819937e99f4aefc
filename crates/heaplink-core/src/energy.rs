//! Access-energy aggregation over node lists

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// Aggregated access metrics for a set of nodes. The size dimensions are
/// counter×size products, not sums of a stored field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEnergy {
    pub read_counter: u64,
    pub write_counter: u64,
    pub read_size: u64,
    pub write_size: u64,
}

/// Signed per-dimension difference (modified − baseline). Negative values
/// denote improvements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEnergyDelta {
    pub read_counter_diff: i64,
    pub write_counter_diff: i64,
    pub read_size_diff: i64,
    pub write_size_diff: i64,
}

/// Sum the access metrics of `nodes`, skipping nodes without energy.
pub fn access_energy<'a, I>(nodes: I) -> AccessEnergy
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut total = AccessEnergy::default();
    for node in nodes {
        let Some(energy) = &node.energy else {
            continue;
        };
        total.read_counter += energy.read_counter;
        total.write_counter += energy.write_counter;
        total.read_size += energy.read_counter * energy.size;
        total.write_size += energy.write_counter * energy.size;
    }
    total
}

/// Difference of aggregated access metrics between two node sets.
pub fn access_energy_difference<'a, 'b, I, J>(baseline: I, modified: J) -> AccessEnergyDelta
where
    I: IntoIterator<Item = &'a Node>,
    J: IntoIterator<Item = &'b Node>,
{
    let base = access_energy(baseline);
    let modif = access_energy(modified);
    AccessEnergyDelta {
        read_counter_diff: modif.read_counter as i64 - base.read_counter as i64,
        write_counter_diff: modif.write_counter as i64 - base.write_counter as i64,
        read_size_diff: modif.read_size as i64 - base.read_size as i64,
        write_size_diff: modif.write_size as i64 - base.write_size as i64,
    }
}
