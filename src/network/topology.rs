//! Network topology
//!
//! Read-only adjacency structure of a pore network: the node (pore) count,
//! the conduit (throat) list as node-index pairs, the incident conduits of
//! each node and, optionally, pore center coordinates.

use std::collections::VecDeque;
use std::fmt;

use crate::error::ConfigurationError;

// =================================================================================================
// Faces and Extents
// =================================================================================================

/// Axis-aligned face of the network bounding box
///
/// Used to select inlet/outlet pores on networks carrying coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Lower x bound
    XMin,
    /// Upper x bound
    XMax,
    /// Lower y bound
    YMin,
    /// Upper y bound
    YMax,
    /// Lower z bound
    ZMin,
    /// Upper z bound
    ZMax,
}

impl Face {
    /// Axis index (0 = x, 1 = y, 2 = z)
    pub fn axis(&self) -> usize {
        match self {
            Face::XMin | Face::XMax => 0,
            Face::YMin | Face::YMax => 1,
            Face::ZMin | Face::ZMax => 2,
        }
    }

    /// Whether the face sits on the upper bound of its axis
    pub fn is_upper(&self) -> bool {
        matches!(self, Face::XMax | Face::YMax | Face::ZMax)
    }

    /// Face on the other side of the domain
    pub fn opposite(&self) -> Face {
        match self {
            Face::XMin => Face::XMax,
            Face::XMax => Face::XMin,
            Face::YMin => Face::YMax,
            Face::YMax => Face::YMin,
            Face::ZMin => Face::ZMax,
            Face::ZMax => Face::ZMin,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Face::XMin => write!(f, "x-min"),
            Face::XMax => write!(f, "x-max"),
            Face::YMin => write!(f, "y-min"),
            Face::YMax => write!(f, "y-max"),
            Face::ZMin => write!(f, "z-min"),
            Face::ZMax => write!(f, "z-max"),
        }
    }
}

/// Geometric extent of the domain between two opposing faces
///
/// `length` is measured along the transport direction, `area` is the
/// cross-section normal to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainExtent {
    /// Distance between the faces
    pub length: f64,
    /// Cross-sectional area
    pub area: f64,
}

impl DomainExtent {
    /// Create an extent from explicit values
    pub fn new(length: f64, area: f64) -> Self {
        Self { length, area }
    }

    /// Check both dimensions are finite and strictly positive
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(ConfigurationError::InvalidExtent(format!(
                "length must be positive, got {}",
                self.length
            )));
        }
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(ConfigurationError::InvalidExtent(format!(
                "area must be positive, got {}",
                self.area
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// Topology
// =================================================================================================

/// Pore network topology
///
/// # Invariants
///
/// - every conduit references two valid node ids
/// - the two endpoints of a conduit are distinct
///
/// Both are checked once by [`Topology::new`]; afterwards the structure is
/// immutable, so every solver component can borrow it freely.
///
/// # Example
///
/// ```rust
/// use pnm_rs::network::Topology;
///
/// // 0 -- 1 -- 2
/// let topology = Topology::new(3, vec![[0, 1], [1, 2]]).unwrap();
///
/// assert_eq!(topology.node_count(), 3);
/// assert_eq!(topology.conduit_endpoints(1), (1, 2));
/// assert_eq!(topology.neighbor_conduits(1), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Topology {
    /// Number of pores
    node_count: usize,

    /// Conduit endpoints, indexed by conduit id
    conduits: Vec<[usize; 2]>,

    /// Incident conduit ids, indexed by node id
    incidence: Vec<Vec<usize>>,

    /// Pore center coordinates
    coordinates: Option<Vec<[f64; 3]>>,

    /// Lattice pitch along each axis, when the network is a regular lattice
    lattice_spacing: Option<[f64; 3]>,
}

impl Topology {
    /// Create a topology from a node count and a conduit list
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::InvalidConduitEndpoint`] if a conduit
    ///   references a node outside `[0, node_count)`
    /// - [`ConfigurationError::SelfLoop`] if a conduit connects a node to itself
    pub fn new(node_count: usize, conduits: Vec<[usize; 2]>) -> Result<Self, ConfigurationError> {
        let mut incidence = vec![Vec::new(); node_count];

        for (conduit, &[a, b]) in conduits.iter().enumerate() {
            for node in [a, b] {
                if node >= node_count {
                    return Err(ConfigurationError::InvalidConduitEndpoint {
                        conduit,
                        node,
                        node_count,
                    });
                }
            }
            if a == b {
                return Err(ConfigurationError::SelfLoop { conduit, node: a });
            }
            incidence[a].push(conduit);
            incidence[b].push(conduit);
        }

        Ok(Self {
            node_count,
            conduits,
            incidence,
            coordinates: None,
            lattice_spacing: None,
        })
    }

    /// Attach pore center coordinates
    ///
    /// # Errors
    ///
    /// Fails when the number of coordinates differs from the node count or a
    /// coordinate is not finite.
    pub fn with_coordinates(mut self, coordinates: Vec<[f64; 3]>) -> Result<Self, ConfigurationError> {
        if coordinates.len() != self.node_count {
            return Err(ConfigurationError::SizeMismatch {
                name: "pore.coords".to_string(),
                expected: self.node_count,
                actual: coordinates.len(),
            });
        }
        for (index, point) in coordinates.iter().enumerate() {
            if let Some(value) = point.iter().find(|v| !v.is_finite()) {
                return Err(ConfigurationError::InvalidValue {
                    name: "pore.coords".to_string(),
                    index,
                    value: *value,
                });
            }
        }
        self.coordinates = Some(coordinates);
        Ok(self)
    }

    /// Record the lattice pitch of a regular network
    ///
    /// With a known pitch, [`bounding_extent`](Self::bounding_extent) counts
    /// the full cell width of the outermost pores in the cross-section.
    pub fn with_lattice_spacing(mut self, spacing: [f64; 3]) -> Self {
        self.lattice_spacing = Some(spacing);
        self
    }

    /// 1-D chain `0 -- 1 -- ... -- n-1` with pores `spacing` apart along x
    pub fn chain(node_count: usize, spacing: f64) -> Self {
        let conduits = (1..node_count).map(|i| [i - 1, i]).collect();
        let coordinates = (0..node_count)
            .map(|i| [(i as f64 + 0.5) * spacing, 0.5 * spacing, 0.5 * spacing])
            .collect();

        Self::from_parts(node_count, conduits, coordinates).with_lattice_spacing([spacing; 3])
    }

    /// Assemble a topology from generator output that is valid by construction
    pub(crate) fn from_parts(node_count: usize, conduits: Vec<[usize; 2]>, coordinates: Vec<[f64; 3]>) -> Self {
        let mut incidence = vec![Vec::new(); node_count];
        for (conduit, &[a, b]) in conduits.iter().enumerate() {
            incidence[a].push(conduit);
            incidence[b].push(conduit);
        }

        Self {
            node_count,
            conduits,
            incidence,
            coordinates: Some(coordinates),
            lattice_spacing: None,
        }
    }

    // ===================================== Query methods =========================================

    /// Number of pores
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of throats
    pub fn conduit_count(&self) -> usize {
        self.conduits.len()
    }

    /// Endpoints of a conduit
    ///
    /// # Panics
    ///
    /// Panics if `conduit >= conduit_count()`.
    pub fn conduit_endpoints(&self, conduit: usize) -> (usize, usize) {
        let [a, b] = self.conduits[conduit];
        (a, b)
    }

    /// All conduits as node pairs
    pub fn conduits(&self) -> &[[usize; 2]] {
        &self.conduits
    }

    /// Conduits incident to a node
    ///
    /// # Panics
    ///
    /// Panics if `node >= node_count()`.
    pub fn neighbor_conduits(&self, node: usize) -> &[usize] {
        &self.incidence[node]
    }

    /// Nodes adjacent to a node (one entry per incident conduit)
    pub fn neighbor_nodes(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.incidence[node].iter().map(move |&conduit| {
            let [a, b] = self.conduits[conduit];
            if a == node { b } else { a }
        })
    }

    /// Number of incident conduits
    pub fn degree(&self, node: usize) -> usize {
        self.incidence[node].len()
    }

    /// Pore coordinates, if any
    pub fn coordinates(&self) -> Option<&[[f64; 3]]> {
        self.coordinates.as_deref()
    }

    /// Lattice pitch, if the network is a regular lattice
    pub fn lattice_spacing(&self) -> Option<[f64; 3]> {
        self.lattice_spacing
    }

    /// Check that a node id is valid
    pub fn check_node(&self, node: usize) -> Result<(), ConfigurationError> {
        if node >= self.node_count {
            return Err(ConfigurationError::InvalidNode { node, node_count: self.node_count });
        }
        Ok(())
    }

    /// Check that every node of a set is valid
    pub fn check_nodes(&self, nodes: &[usize]) -> Result<(), ConfigurationError> {
        nodes.iter().try_for_each(|&node| self.check_node(node))
    }

    // =================================== Connectivity ============================================

    /// Label connected components
    ///
    /// Only conduits for which `active(conduit)` is true connect nodes. Returns
    /// one label per node (labels are `0..count`, numbered in order of their
    /// smallest node) and the number of components.
    pub fn connected_components<F>(&self, active: F) -> (Vec<usize>, usize)
    where
        F: Fn(usize) -> bool,
    {
        let mut labels = vec![usize::MAX; self.node_count];
        let mut count = 0;
        let mut queue = VecDeque::new();

        for start in 0..self.node_count {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = count;
            queue.push_back(start);

            while let Some(node) = queue.pop_front() {
                for &conduit in &self.incidence[node] {
                    if !active(conduit) {
                        continue;
                    }
                    let [a, b] = self.conduits[conduit];
                    let other = if a == node { b } else { a };
                    if labels[other] == usize::MAX {
                        labels[other] = count;
                        queue.push_back(other);
                    }
                }
            }
            count += 1;
        }

        (labels, count)
    }

    // ===================================== Geometry ==============================================

    /// Pores lying on a face of the bounding box
    ///
    /// A pore belongs to the face when its coordinate along the face axis is
    /// within a relative tolerance of the extreme value.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingCoordinates`] when the topology carries no
    /// coordinates.
    pub fn face(&self, face: Face) -> Result<Vec<usize>, ConfigurationError> {
        let coordinates = self.coordinates.as_ref().ok_or(ConfigurationError::MissingCoordinates)?;
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        let axis = face.axis();
        let (min, max) = coordinates.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        let target = if face.is_upper() { max } else { min };
        let tolerance = 1e-9 * (max - min).abs().max(1.0);

        Ok(coordinates
            .iter()
            .enumerate()
            .filter(|(_, p)| (p[axis] - target).abs() <= tolerance)
            .map(|(node, _)| node)
            .collect())
    }

    /// Length and cross-section of the domain between two node sets
    ///
    /// The transport axis is the coordinate axis along which the face
    /// centroids are furthest apart. `length` is the centroid distance along
    /// that axis; `area` is the product of the transverse spans of both faces.
    /// When the lattice pitch is known, each transverse span is widened by one
    /// pitch so that the outermost pores contribute their full cell.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingCoordinates`] without coordinates
    /// - [`ConfigurationError::InvalidExtent`] if a face is empty, the faces
    ///   coincide, or the cross-section is degenerate (pass an explicit
    ///   [`DomainExtent`] in that case)
    pub fn bounding_extent(&self, face_a: &[usize], face_b: &[usize]) -> Result<DomainExtent, ConfigurationError> {
        let coordinates = self.coordinates.as_ref().ok_or(ConfigurationError::MissingCoordinates)?;
        if face_a.is_empty() || face_b.is_empty() {
            return Err(ConfigurationError::InvalidExtent("faces must not be empty".to_string()));
        }
        self.check_nodes(face_a)?;
        self.check_nodes(face_b)?;

        let centroid = |nodes: &[usize]| -> [f64; 3] {
            let mut sum = [0.0; 3];
            for &node in nodes {
                for (axis, value) in sum.iter_mut().enumerate() {
                    *value += coordinates[node][axis];
                }
            }
            sum.map(|value| value / nodes.len() as f64)
        };

        let (ca, cb) = (centroid(face_a), centroid(face_b));
        let axis = (0..3)
            .max_by(|&i, &j| (ca[i] - cb[i]).abs().total_cmp(&(ca[j] - cb[j]).abs()))
            .unwrap_or(0);
        let length = (ca[axis] - cb[axis]).abs();
        if length == 0.0 {
            return Err(ConfigurationError::InvalidExtent("faces share the same centroid".to_string()));
        }

        let mut area = 1.0;
        for transverse in (0..3).filter(|&i| i != axis) {
            let (lo, hi) = face_a
                .iter()
                .chain(face_b.iter())
                .map(|&node| coordinates[node][transverse])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
            let pitch = self.lattice_spacing.map(|s| s[transverse]).unwrap_or(0.0);
            area *= hi - lo + pitch;
        }

        let extent = DomainExtent::new(length, area);
        extent.validate()?;
        Ok(extent)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
