//! Per-conduit conductance table
//!
//! [`Conductances`] is the only physics input of the assembler. It is built
//! either from raw values or by evaluating a [`ConductanceModel`] on every
//! conduit, and is validated once: one finite, non-negative value per conduit.

use log::{debug, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{ConfigurationError, PropertyError, TransportResult};
use crate::network::{PropertyTable, Topology};
use crate::physics::ConductanceModel;
use crate::solver::parallel_threshold;

/// What to do when a conductance model reports a missing property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPropertyPolicy {
    /// Treat the conduit as an open circuit (`g = 0`) and record it
    #[default]
    OpenCircuit,
    /// Propagate the first [`PropertyError`]
    Abort,
}

/// Validated conductance of every conduit
///
/// # Example
///
/// ```rust
/// use pnm_rs::network::Topology;
/// use pnm_rs::physics::Conductances;
///
/// let topology = Topology::chain(3, 1.0);
/// let conductances = Conductances::from_values(&topology, vec![1.0, 2.0]).unwrap();
///
/// assert_eq!(conductances.get(1), 2.0);
/// assert!(conductances.open_circuit().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Conductances {
    values: DVector<f64>,
    open_circuit: Vec<usize>,
}

impl Conductances {
    /// Wrap precomputed values
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::SizeMismatch`] if `values.len()` differs from the conduit count
    /// - [`ConfigurationError::InvalidValue`] for negative or non-finite entries
    pub fn from_values(topology: &Topology, values: Vec<f64>) -> Result<Self, ConfigurationError> {
        if values.len() != topology.conduit_count() {
            return Err(ConfigurationError::SizeMismatch {
                name: "throat.conductance".to_string(),
                expected: topology.conduit_count(),
                actual: values.len(),
            });
        }
        check_values(&values)?;

        Ok(Self {
            values: DVector::from_vec(values),
            open_circuit: Vec::new(),
        })
    }

    /// Same conductance on every conduit
    pub fn uniform(topology: &Topology, value: f64) -> Result<Self, ConfigurationError> {
        Self::from_values(topology, vec![value; topology.conduit_count()])
    }

    /// Evaluate a model on every conduit
    ///
    /// Evaluation runs on the rayon pool when the conduit count exceeds
    /// [`parallel_threshold`] and the `parallel` feature is enabled. Missing
    /// properties are handled according to `policy`; model outputs are
    /// validated like [`from_values`](Self::from_values).
    pub fn compute(
        model: &dyn ConductanceModel,
        topology: &Topology,
        properties: &PropertyTable,
        policy: MissingPropertyPolicy,
    ) -> TransportResult<Self> {
        let count = topology.conduit_count();
        let evaluate = |conduit: usize| model.conductance(conduit, topology, properties);

        let raw: Vec<Result<f64, PropertyError>> = if count > parallel_threshold() {
            #[cfg(feature = "parallel")]
            {
                (0..count).into_par_iter().map(evaluate).collect()
            }
            #[cfg(not(feature = "parallel"))]
            {
                (0..count).map(evaluate).collect()
            }
        } else {
            (0..count).map(evaluate).collect()
        };

        let mut values = Vec::with_capacity(count);
        let mut open_circuit = Vec::new();

        for outcome in raw {
            match outcome {
                Ok(g) => values.push(g),
                Err(error) => match policy {
                    MissingPropertyPolicy::Abort => return Err(error.into()),
                    MissingPropertyPolicy::OpenCircuit => {
                        warn!("{}: {}, treating as open circuit", model.name(), error);
                        open_circuit.push(error.conduit());
                        values.push(0.0);
                    }
                },
            }
        }
        check_values(&values)?;

        debug!(
            "{}: computed {} conductance(s), {} open circuit(s)",
            model.name(),
            count,
            open_circuit.len()
        );

        Ok(Self {
            values: DVector::from_vec(values),
            open_circuit,
        })
    }

    /// Conductance of one conduit
    pub fn get(&self, conduit: usize) -> f64 {
        self.values[conduit]
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Conduits zeroed because of missing properties, in ascending order
    pub fn open_circuit(&self) -> &[usize] {
        &self.open_circuit
    }

    /// Whether the conduit carries any flow
    pub fn is_active(&self, conduit: usize) -> bool {
        self.values[conduit] > 0.0
    }
}

fn check_values(values: &[f64]) -> Result<(), ConfigurationError> {
    match values.iter().position(|g| !g.is_finite() || *g < 0.0) {
        Some(index) => Err(ConfigurationError::InvalidValue {
            name: "throat.conductance".to_string(),
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
