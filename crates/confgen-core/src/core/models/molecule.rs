use super::atom::{Atom, Hybridization};
use super::element::Element;
use super::stereo::{AtomStereoDescriptor, BondStereoDescriptor};
use super::topology::{Bond, BondOrder};
use std::collections::{HashSet, VecDeque};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Atom index {index} is out of range for a molecule with {count} atoms")]
    AtomIndexOutOfRange { index: usize, count: usize },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
    #[error("Invalid stereo descriptor: {0}")]
    InvalidStereo(String),
}

/// Topological distance reported for atoms in different connected components.
pub const DISCONNECTED: usize = usize::MAX;

/// Read-only molecular graph consumed by the structure generator.
///
/// Atoms and bonds are addressed by dense indices that are aligned with the coordinate
/// arrays produced by the embedder. Ring perception runs lazily on first query and is
/// invalidated by any structural change.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    /// Atoms in insertion order.
    atoms: Vec<Atom>,
    /// Bonds in insertion order.
    bonds: Vec<Bond>,
    /// Adjacency list of `(neighbor, bond index)` pairs per atom.
    adjacency: Vec<Vec<(usize, usize)>>,
    /// Tetrahedral stereocentres known from the input.
    atom_stereo: Vec<AtomStereoDescriptor>,
    /// Double-bond stereocentres known from the input.
    bond_stereo: Vec<BondStereoDescriptor>,
    /// Smallest set of smallest rings, each as a cyclically ordered list of atoms.
    rings: OnceLock<Vec<Vec<usize>>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.rings = OnceLock::new();
        self.atoms.len() - 1
    }

    /// Connects two existing atoms and returns the new bond's index.
    pub fn add_bond(
        &mut self,
        begin: usize,
        end: usize,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        self.check_index(begin)?;
        self.check_index(end)?;
        if begin == end {
            return Err(MoleculeError::SelfBond(begin));
        }
        if self.bond_between(begin, end).is_some() {
            return Err(MoleculeError::DuplicateBond(begin, end));
        }
        let idx = self.bonds.len();
        self.bonds.push(Bond::new(begin, end, order));
        self.adjacency[begin].push((end, idx));
        self.adjacency[end].push((begin, idx));
        self.rings = OnceLock::new();
        Ok(idx)
    }

    pub fn add_atom_stereo(&mut self, desc: AtomStereoDescriptor) -> Result<(), MoleculeError> {
        self.check_index(desc.center)?;
        for &r in &desc.reference_atoms {
            self.check_index(r)?;
            if r != desc.center && self.bond_between(desc.center, r).is_none() {
                return Err(MoleculeError::InvalidStereo(format!(
                    "reference atom {} is not bonded to centre {}",
                    r, desc.center
                )));
            }
        }
        let unique: HashSet<usize> = desc.reference_atoms.iter().copied().collect();
        if unique.len() != 4 {
            return Err(MoleculeError::InvalidStereo(format!(
                "reference atoms of centre {} are not distinct",
                desc.center
            )));
        }
        self.atom_stereo.push(desc);
        Ok(())
    }

    pub fn add_bond_stereo(&mut self, desc: BondStereoDescriptor) -> Result<(), MoleculeError> {
        let [a, b, c, d] = desc.reference_atoms;
        for idx in desc.reference_atoms {
            self.check_index(idx)?;
        }
        let chain_ok = self.bond_between(a, b).is_some()
            && self.bond_between(b, c).is_some()
            && self.bond_between(c, d).is_some()
            && a != c
            && d != b
            && a != d;
        if !chain_ok {
            return Err(MoleculeError::InvalidStereo(format!(
                "atoms {:?} do not form a bonded chain",
                desc.reference_atoms
            )));
        }
        self.bond_stereo.push(desc);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), MoleculeError> {
        if index < self.atoms.len() {
            Ok(())
        } else {
            Err(MoleculeError::AtomIndexOutOfRange {
                index,
                count: self.atoms.len(),
            })
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bond(&self, index: usize) -> &Bond {
        &self.bonds[index]
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn element(&self, index: usize) -> Element {
        self.atoms[index].element
    }

    pub fn atom_stereo_descriptors(&self) -> &[AtomStereoDescriptor] {
        &self.atom_stereo
    }

    pub fn bond_stereo_descriptors(&self) -> &[BondStereoDescriptor] {
        &self.bond_stereo
    }

    /// `(neighbor, bond index)` pairs of an atom.
    pub fn bonded(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom].iter().map(|&(n, _)| n)
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    pub fn heavy_degree(&self, atom: usize) -> usize {
        self.neighbors(atom)
            .filter(|&n| !self.atoms[n].is_hydrogen())
            .count()
    }

    pub fn hydrogen_count(&self, atom: usize) -> usize {
        self.degree(atom) - self.heavy_degree(atom)
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| bond)
    }

    /// A hydrogen with exactly one neighbour that is not itself a hydrogen.
    pub fn is_terminal_hydrogen(&self, atom: usize) -> bool {
        self.atoms[atom].is_hydrogen()
            && self.adjacency[atom].len() == 1
            && !self.atoms[self.adjacency[atom][0].0].is_hydrogen()
    }

    pub fn hybridization(&self, atom: usize) -> Hybridization {
        if let Some(h) = self.atoms[atom].hybridization {
            return h;
        }
        let mut doubles = 0;
        let mut triples = 0;
        let mut aromatic = 0;
        for &(_, bond) in &self.adjacency[atom] {
            match self.bonds[bond].order {
                BondOrder::Double => doubles += 1,
                BondOrder::Triple => triples += 1,
                BondOrder::Aromatic => aromatic += 1,
                BondOrder::Single => {}
            }
        }
        if triples > 0 || doubles >= 2 {
            return Hybridization::Sp;
        }
        if doubles == 1 || aromatic > 0 || self.atoms[atom].aromatic {
            return Hybridization::Sp2;
        }
        // Lone-pair donors next to a pi system conjugate with it.
        let donor_degree = match self.atoms[atom].element {
            Element::N => 3,
            Element::O => 2,
            _ => 0,
        };
        let conjugated_donor = donor_degree > 0
            && self.degree(atom) == donor_degree
            && self.neighbors(atom).any(|n| self.has_pi_bond(n));
        if conjugated_donor {
            Hybridization::Sp2
        } else {
            Hybridization::Sp3
        }
    }

    fn has_pi_bond(&self, atom: usize) -> bool {
        self.adjacency[atom].iter().any(|&(_, b)| {
            matches!(
                self.bonds[b].order,
                BondOrder::Double | BondOrder::Aromatic
            )
        })
    }

    /// Smallest set of smallest rings.
    pub fn rings(&self) -> &[Vec<usize>] {
        self.rings.get_or_init(|| perceive_rings(self))
    }

    pub fn is_in_ring(&self, atom: usize) -> bool {
        self.rings().iter().any(|r| r.contains(&atom))
    }

    pub fn is_ring_bond(&self, bond: usize) -> bool {
        let b = &self.bonds[bond];
        self.smallest_ring_containing_path(&[b.begin, b.end]).is_some()
    }

    /// Smallest perceived ring in which `path` appears as consecutive ring members
    /// (in either direction).
    pub fn smallest_ring_containing_path(&self, path: &[usize]) -> Option<&[usize]> {
        self.rings()
            .iter()
            .filter(|ring| ring_contains_path(ring, path))
            .min_by_key(|ring| ring.len())
            .map(|ring| ring.as_slice())
    }

    /// Size of the smallest perceived ring containing the bond `a-b`.
    pub fn smallest_ring_size_containing(&self, a: usize, b: usize) -> Option<usize> {
        self.smallest_ring_size_containing_path(&[a, b])
    }

    pub fn smallest_ring_size_containing_path(&self, path: &[usize]) -> Option<usize> {
        self.smallest_ring_containing_path(path).map(|r| r.len())
    }

    /// All-pairs shortest path lengths in bonds; [`DISCONNECTED`] between components.
    pub fn topological_distances(&self) -> Vec<Vec<usize>> {
        let n = self.atoms.len();
        let mut result = vec![vec![DISCONNECTED; n]; n];
        let mut queue = VecDeque::new();
        for (start, row) in result.iter_mut().enumerate() {
            row[start] = 0;
            queue.clear();
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                let dist = row[current];
                for &(next, _) in &self.adjacency[current] {
                    if row[next] == DISCONNECTED {
                        row[next] = dist + 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        result
    }

    /// Number of connected components of the graph.
    pub fn component_count(&self) -> usize {
        let n = self.atoms.len();
        let mut seen = vec![false; n];
        let mut components = 0;
        let mut stack = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            seen[start] = true;
            stack.push(start);
            while let Some(current) = stack.pop() {
                for &(next, _) in &self.adjacency[current] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }
}

fn ring_contains_path(ring: &[usize], path: &[usize]) -> bool {
    let n = ring.len();
    if path.is_empty() || path.len() > n {
        return false;
    }
    let Some(start) = ring.iter().position(|&a| a == path[0]) else {
        return false;
    };
    let forward = path
        .iter()
        .enumerate()
        .all(|(k, &a)| ring[(start + k) % n] == a);
    let backward = path
        .iter()
        .enumerate()
        .all(|(k, &a)| ring[(start + n - k % n) % n] == a);
    forward || backward
}

/// Shortest cycle through each bond, kept when linearly independent (over GF(2)) of the
/// smaller cycles already accepted, until the cycle rank is reached.
fn perceive_rings(mol: &Molecule) -> Vec<Vec<usize>> {
    let n_bonds = mol.bonds.len();
    let cycle_rank = (n_bonds + mol.component_count()).saturating_sub(mol.atoms.len());
    if cycle_rank == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Vec<usize>> = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    for (bond_idx, bond) in mol.bonds.iter().enumerate() {
        if let Some(path) = shortest_path_avoiding(mol, bond.begin, bond.end, bond_idx) {
            let mut key = path.clone();
            key.sort_unstable();
            if seen.insert(key) {
                candidates.push(path);
            }
        }
    }
    candidates.sort_by_key(|c| c.len());

    let mut basis: Vec<Vec<bool>> = Vec::new();
    let mut rings = Vec::new();
    for ring in candidates {
        let mut vector = vec![false; n_bonds];
        for k in 0..ring.len() {
            if let Some(b) = mol.bond_between(ring[k], ring[(k + 1) % ring.len()]) {
                vector[b] = true;
            }
        }
        if reduce_against(&basis, &mut vector) {
            basis.push(vector);
            rings.push(ring);
            if rings.len() == cycle_rank {
                break;
            }
        }
    }
    rings
}

/// Gaussian elimination step; returns true if `vector` is independent of `basis`.
fn reduce_against(basis: &[Vec<bool>], vector: &mut [bool]) -> bool {
    for row in basis {
        let Some(pivot) = row.iter().position(|&b| b) else {
            continue;
        };
        if vector[pivot] {
            for (v, &r) in vector.iter_mut().zip(row) {
                *v ^= r;
            }
        }
    }
    vector.iter().any(|&b| b)
}

fn shortest_path_avoiding(
    mol: &Molecule,
    from: usize,
    to: usize,
    skip_bond: usize,
) -> Option<Vec<usize>> {
    let mut parent = vec![usize::MAX; mol.atoms.len()];
    let mut visited = vec![false; mol.atoms.len()];
    let mut queue = VecDeque::from([from]);
    visited[from] = true;
    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut node = to;
            while node != from {
                node = parent[node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }
        for &(next, bond) in &mol.adjacency[current] {
            if bond == skip_bond || visited[next] {
                continue;
            }
            visited[next] = true;
            parent[next] = current;
            queue.push_back(next);
        }
    }
    None
}
