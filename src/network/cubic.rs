//! Regular cubic lattice networks
//!
//! Pores sit on a `nx × ny × nz` grid with centers at `(i + 0.5)·spacing`,
//! throats connect face-adjacent pores. Node ids run x-fastest:
//! `id = i + nx·(j + ny·k)`.

use crate::error::ConfigurationError;
use crate::network::{Face, Topology};

/// Cubic lattice description
///
/// # Example
///
/// ```rust
/// use pnm_rs::network::{Cubic, Face};
///
/// let lattice = Cubic::new([3, 3, 1], 1e-4).unwrap();
/// let topology = lattice.topology();
///
/// assert_eq!(topology.node_count(), 9);
/// assert_eq!(topology.conduit_count(), 12);
/// assert_eq!(lattice.face(Face::XMin), vec![0, 3, 6]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    shape: [usize; 3],
    spacing: f64,
}

impl Cubic {
    /// Create a lattice description
    ///
    /// # Errors
    ///
    /// Fails if any dimension is zero or the spacing is not strictly positive.
    pub fn new(shape: [usize; 3], spacing: f64) -> Result<Self, ConfigurationError> {
        if let Some(axis) = shape.iter().position(|&n| n == 0) {
            return Err(ConfigurationError::InvalidValue {
                name: "cubic.shape".to_string(),
                index: axis,
                value: 0.0,
            });
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ConfigurationError::InvalidValue {
                name: "cubic.spacing".to_string(),
                index: 0,
                value: spacing,
            });
        }
        Ok(Self { shape, spacing })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn node_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Node id of grid position `(i, j, k)`
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.shape;
        i + nx * (j + ny * k)
    }

    /// Build the topology: x-throats first, then y, then z
    pub fn topology(&self) -> Topology {
        let [nx, ny, nz] = self.shape;
        let mut conduits = Vec::with_capacity(3 * self.node_count());

        for (axis, step) in [(0, [1, 0, 0]), (1, [0, 1, 0]), (2, [0, 0, 1])] {
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let next = [i + step[0], j + step[1], k + step[2]];
                        if next[axis] >= self.shape[axis] {
                            continue;
                        }
                        conduits.push([self.index(i, j, k), self.index(next[0], next[1], next[2])]);
                    }
                }
            }
        }

        let coordinates = (0..nz)
            .flat_map(|k| (0..ny).flat_map(move |j| (0..nx).map(move |i| [i, j, k])))
            .map(|cell| cell.map(|c| (c as f64 + 0.5) * self.spacing))
            .collect();

        // Endpoints are in range by construction and coordinates match the node count.
        Topology::from_parts(self.node_count(), conduits, coordinates).with_lattice_spacing([self.spacing; 3])
    }

    /// Node ids on a face, in ascending order
    pub fn face(&self, face: Face) -> Vec<usize> {
        let [nx, ny, nz] = self.shape;
        let axis = face.axis();
        let layer = if face.is_upper() { self.shape[axis] - 1 } else { 0 };

        let mut nodes = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    if [i, j, k][axis] == layer {
                        nodes.push(self.index(i, j, k));
                    }
                }
            }
        }
        nodes
    }
}

// =================================================================================================
// Tests
// =================================================================================================
