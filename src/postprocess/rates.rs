//! Conduit and node rates
//!
//! Sign conventions:
//!
//! - conduit rate `g·(x[a] − x[b])` is positive when transport goes from the
//!   first endpoint `a` to the second `b`
//! - node rate `Σ g·(x[i] − x[j])` is the net outflow of node `i` into its
//!   conduits
//! - the rate of a node set is the net outflow through the conduits crossing
//!   its boundary

use nalgebra::DVector;

use crate::error::ConfigurationError;
use crate::network::Topology;
use crate::physics::Conductances;

/// Rate through every conduit
pub fn conduit_rates(topology: &Topology, conductances: &Conductances, solution: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        topology.conduit_count(),
        topology
            .conduits()
            .iter()
            .enumerate()
            .map(|(conduit, &[a, b])| conductances.get(conduit) * (solution[a] - solution[b])),
    )
}

/// Net outflow of every node
///
/// At steady state this equals the injected flux (Neumann) plus the source
/// rate at free nodes, and the reaction force at Dirichlet nodes.
pub fn node_rates(topology: &Topology, conductances: &Conductances, solution: &DVector<f64>) -> DVector<f64> {
    let mut rates = DVector::zeros(topology.node_count());
    for (conduit, &[a, b]) in topology.conduits().iter().enumerate() {
        let q = conductances.get(conduit) * (solution[a] - solution[b]);
        rates[a] += q;
        rates[b] -= q;
    }
    rates
}

/// Net outflow of a node set
///
/// Sums `g·(x_in − x_out)` over conduits with exactly one endpoint in
/// `nodes`. Repeated ids are ignored.
///
/// # Errors
///
/// [`ConfigurationError::InvalidNode`] for ids outside the topology.
pub fn net_rate(
    topology: &Topology,
    conductances: &Conductances,
    solution: &DVector<f64>,
    nodes: &[usize],
) -> Result<f64, ConfigurationError> {
    topology.check_nodes(nodes)?;

    let mut inside = vec![false; topology.node_count()];
    for &node in nodes {
        inside[node] = true;
    }

    let rate: f64 = topology
        .conduits()
        .iter()
        .enumerate()
        .filter(|&(_, &[a, b])| inside[a] != inside[b])
        .map(|(conduit, &[a, b])| {
            let (inner, outer) = if inside[a] { (a, b) } else { (b, a) };
            conductances.get(conduit) * (solution[inner] - solution[outer])
        })
        .sum();
    Ok(rate)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_chain() -> (Topology, Conductances, DVector<f64>) {
        let topology = Topology::chain(5, 1.0);
        let conductances = Conductances::uniform(&topology, 1.0).unwrap();
        let solution = DVector::from_vec(vec![1.0, 0.75, 0.5, 0.25, 0.0]);
        (topology, conductances, solution)
    }

    #[test]
    fn test_conduit_rates() {
        let (topology, conductances, solution) = linear_chain();
        let rates = conduit_rates(&topology, &conductances, &solution);
        for rate in rates.iter() {
            assert_relative_eq!(*rate, 0.25);
        }
    }

    #[test]
    fn test_node_rates_balance_interior() {
        let (topology, conductances, solution) = linear_chain();
        let rates = node_rates(&topology, &conductances, &solution);
        assert_relative_eq!(rates[0], 0.25);
        assert_relative_eq!(rates[2], 0.0);
        assert_relative_eq!(rates[4], -0.25);
        assert_relative_eq!(rates.sum(), 0.0);
    }

    #[test]
    fn test_net_rate_of_sets() {
        let (topology, conductances, solution) = linear_chain();
        assert_relative_eq!(net_rate(&topology, &conductances, &solution, &[0]).unwrap(), 0.25);
        assert_relative_eq!(net_rate(&topology, &conductances, &solution, &[4]).unwrap(), -0.25);
        // internal conduits cancel
        assert_relative_eq!(net_rate(&topology, &conductances, &solution, &[0, 1, 2, 1]).unwrap(), 0.25);
        assert_relative_eq!(net_rate(&topology, &conductances, &solution, &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_net_rate_invalid_node() {
        let (topology, conductances, solution) = linear_chain();
        assert_eq!(
            net_rate(&topology, &conductances, &solution, &[9]),
            Err(ConfigurationError::InvalidNode { node: 9, node_count: 5 })
        );
    }
}
