//! Local molecular descriptors, computed with RDKit.
//!
//! Most columns come straight from RDKit's property registry
//! (`Properties::compute_properties`). The rest are derived from the
//! sanitized molecule's atoms the same way RDKit's Python `Descriptors`,
//! `Lipinski` and `Fragments` modules derive them.

use rdkit::{Properties, ROMol};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Average weight of hydrogen as used by RDKit's periodic table.
const HYDROGEN_WEIGHT: f64 = 1.008;

/// Column names of the local descriptor fragment, in feature-row order.
pub const LOCAL_COLUMNS: [&str; 21] = [
    "ExactMolWt",
    "HeavyAtomMolWt",
    "NumValenceElectrons",
    "HeavyAtomCount",
    "NHOHCount",
    "NOCount",
    "NumAliphaticCarbocycles",
    "NumAliphaticHeterocycles",
    "NumAliphaticRings",
    "NumAromaticCarbocycles",
    "NumAromaticHeterocycles",
    "NumAromaticRings",
    "NumHAcceptors",
    "NumHDonors",
    "NumHeteroatoms",
    "NumRotatableBonds",
    "NumSaturatedCarbocycles",
    "NumSaturatedHeterocycles",
    "NumSaturatedRings",
    "RingCount",
    "Halogens",
];

#[derive(Debug, Error)]
pub enum ChemError {
    #[error("RDKit rejected SMILES {smiles:?}: {message}")]
    Parse { smiles: String, message: String },

    #[error("SMILES {0:?} contains no atoms")]
    Empty(String),

    #[error("RDKit did not report {0}")]
    MissingProperty(&'static str),
}

/// Descriptors computed in-process from the molecular graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalDescriptors {
    pub exact_mol_wt: f64,
    pub heavy_atom_mol_wt: f64,
    pub num_valence_electrons: u32,
    pub heavy_atom_count: u32,
    pub nhoh_count: u32,
    pub no_count: u32,
    pub num_aliphatic_carbocycles: u32,
    pub num_aliphatic_heterocycles: u32,
    pub num_aliphatic_rings: u32,
    pub num_aromatic_carbocycles: u32,
    pub num_aromatic_heterocycles: u32,
    pub num_aromatic_rings: u32,
    pub num_h_acceptors: u32,
    pub num_h_donors: u32,
    pub num_heteroatoms: u32,
    pub num_rotatable_bonds: u32,
    pub num_saturated_carbocycles: u32,
    pub num_saturated_heterocycles: u32,
    pub num_saturated_rings: u32,
    pub ring_count: u32,
    pub halogens: u32,
}

impl LocalDescriptors {
    /// Values in [`LOCAL_COLUMNS`] order.
    pub fn values(&self) -> [f64; 21] {
        [
            self.exact_mol_wt,
            self.heavy_atom_mol_wt,
            f64::from(self.num_valence_electrons),
            f64::from(self.heavy_atom_count),
            f64::from(self.nhoh_count),
            f64::from(self.no_count),
            f64::from(self.num_aliphatic_carbocycles),
            f64::from(self.num_aliphatic_heterocycles),
            f64::from(self.num_aliphatic_rings),
            f64::from(self.num_aromatic_carbocycles),
            f64::from(self.num_aromatic_heterocycles),
            f64::from(self.num_aromatic_rings),
            f64::from(self.num_h_acceptors),
            f64::from(self.num_h_donors),
            f64::from(self.num_heteroatoms),
            f64::from(self.num_rotatable_bonds),
            f64::from(self.num_saturated_carbocycles),
            f64::from(self.num_saturated_heterocycles),
            f64::from(self.num_saturated_rings),
            f64::from(self.ring_count),
            f64::from(self.halogens),
        ]
    }
}

/// Per-atom tallies RDKit's property registry does not provide.
#[derive(Debug, Default)]
struct AtomTotals {
    valence_electrons: i64,
    hydrogens: u32,
    halogens: u32,
}

/// Electrons in the outer shell, by atomic number. Transition metals count
/// their group number, except group 12 which counts its two s electrons.
fn outer_electrons(z: i32) -> i64 {
    // (first atomic number of the period, period length)
    let (start, len) = match z {
        1..=2 => return i64::from(z),
        3..=10 => (3, 8),
        11..=18 => (11, 8),
        19..=36 => (19, 18),
        37..=54 => (37, 18),
        55..=86 => (55, 32),
        87..=118 => (87, 32),
        _ => return 0,
    };
    let k = i64::from(z - start + 1);
    match (len, k) {
        (_, 1 | 2) => k,
        (8, _) => k,
        (18, 3..=11) => k,
        (18, 12) => 2,
        (18, _) => k - 10,
        // Lanthanides and actinides
        (_, 3..=17) => 3,
        (_, 18..=25) => k - 14,
        (_, 26) => 2,
        (_, _) => k - 24,
    }
}

fn atom_totals(mol: &mut ROMol) -> AtomTotals {
    let mut totals = AtomTotals::default();
    for idx in 0..mol.num_atoms(true) {
        let atom = mol.atom_with_idx(idx);
        let z = atom.get_atomic_num();
        let hs = atom.get_total_num_hs();
        totals.valence_electrons += outer_electrons(z) - i64::from(atom.get_formal_charge()) + i64::from(hs);
        totals.hydrogens += hs;
        // A hydrogen kept as a graph atom is not in any neighbour's H count
        if z == 1 {
            totals.hydrogens += 1;
        }
        if matches!(z, 9 | 17 | 35 | 53) {
            totals.halogens += 1;
        }
    }
    totals
}

fn lookup(props: &HashMap<String, f64>, name: &'static str) -> Result<f64, ChemError> {
    props.get(name).copied().ok_or(ChemError::MissingProperty(name))
}

fn count(props: &HashMap<String, f64>, name: &'static str) -> Result<u32, ChemError> {
    lookup(props, name).map(|v| v.round().max(0.0) as u32)
}

/// Parse `smiles` with RDKit (sanitizing it) and compute every local descriptor.
pub fn compute(smiles: &str) -> Result<LocalDescriptors, ChemError> {
    let mut mol = ROMol::from_smiles(smiles).map_err(|e| ChemError::Parse {
        smiles: smiles.to_string(),
        message: e.to_string(),
    })?;
    if mol.num_atoms(true) == 0 {
        return Err(ChemError::Empty(smiles.to_string()));
    }

    let props = Properties::new().compute_properties(&mol);
    let atoms = atom_totals(&mut mol);

    let aromatic_rings = count(&props, "NumAromaticRings")?;
    let aromatic_hetero = count(&props, "NumAromaticHeterocycles")?;
    let aliphatic_rings = count(&props, "NumAliphaticRings")?;
    let aliphatic_hetero = count(&props, "NumAliphaticHeterocycles")?;
    let saturated_rings = count(&props, "NumSaturatedRings")?;
    let saturated_hetero = count(&props, "NumSaturatedHeterocycles")?;

    Ok(LocalDescriptors {
        exact_mol_wt: lookup(&props, "exactmw")?,
        // MolWt(onlyHeavy=True): average weight without the implicit and
        // removed explicit hydrogens
        heavy_atom_mol_wt: lookup(&props, "amw")? - f64::from(atoms.hydrogens) * HYDROGEN_WEIGHT,
        num_valence_electrons: u32::try_from(atoms.valence_electrons.max(0)).unwrap_or(u32::MAX),
        heavy_atom_count: count(&props, "NumHeavyAtoms")?,
        nhoh_count: count(&props, "lipinskiHBD")?,
        no_count: count(&props, "lipinskiHBA")?,
        num_aliphatic_carbocycles: aliphatic_rings.saturating_sub(aliphatic_hetero),
        num_aliphatic_heterocycles: aliphatic_hetero,
        num_aliphatic_rings: aliphatic_rings,
        num_aromatic_carbocycles: aromatic_rings.saturating_sub(aromatic_hetero),
        num_aromatic_heterocycles: aromatic_hetero,
        num_aromatic_rings: aromatic_rings,
        num_h_acceptors: count(&props, "NumHBA")?,
        num_h_donors: count(&props, "NumHBD")?,
        num_heteroatoms: count(&props, "NumHeteroatoms")?,
        num_rotatable_bonds: count(&props, "NumRotatableBonds")?,
        num_saturated_carbocycles: saturated_rings.saturating_sub(saturated_hetero),
        num_saturated_heterocycles: saturated_hetero,
        num_saturated_rings: saturated_rings,
        ring_count: count(&props, "NumRings")?,
        halogens: atoms.halogens,
    })
}
