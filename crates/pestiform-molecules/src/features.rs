//! Feature row assembly: local descriptors plus PubChem 2-D and 3-D properties.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::descriptors::{self, ChemError, LOCAL_COLUMNS};
use crate::pubchem::{PropertySource, PubChemError, PROPERTIES_2D, PROPERTIES_3D};

/// Number of columns in a feature row.
pub const FEATURE_COUNT: usize = LOCAL_COLUMNS.len() + PROPERTIES_2D.len() + PROPERTIES_3D.len();

/// The full column schema: local, then 2-D, then 3-D.
pub fn feature_columns() -> Vec<&'static str> {
    LOCAL_COLUMNS
        .iter()
        .chain(PROPERTIES_2D.iter())
        .chain(PROPERTIES_3D.iter())
        .copied()
        .collect()
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error(transparent)]
    Chem(#[from] ChemError),

    #[error(transparent)]
    Remote(#[from] PubChemError),

    #[error("2-D and 3-D records disagree on CID ({cid_2d} vs {cid_3d})")]
    CidMismatch { cid_2d: u64, cid_3d: u64 },
}

/// One compound's descriptors in [`feature_columns`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub cid: u64,
    pub values: Vec<f64>,
}

impl FeatureRow {
    /// `(column, value)` pairs in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        feature_columns().into_iter().zip(self.values.iter().copied())
    }
}

/// Builds feature rows from SMILES.
#[derive(Clone)]
pub struct DescriptorAssembler {
    properties: Arc<dyn PropertySource>,
}

impl DescriptorAssembler {
    pub fn new(properties: Arc<dyn PropertySource>) -> Self {
        Self { properties }
    }

    #[instrument(skip(self))]
    pub async fn assemble(&self, smiles: &str) -> Result<FeatureRow, DescriptorError> {
        // The RDKit molecule never lives across an await
        let local = descriptors::compute(smiles)?;
        debug!(
            heavy_atoms = local.heavy_atom_count,
            rings = local.ring_count,
            "Computed local descriptors"
        );

        let (props_2d, props_3d) = tokio::try_join!(
            self.properties.properties(smiles, &PROPERTIES_2D),
            self.properties.properties(smiles, &PROPERTIES_3D),
        )?;
        if props_2d.cid != props_3d.cid {
            return Err(DescriptorError::CidMismatch { cid_2d: props_2d.cid, cid_3d: props_3d.cid });
        }

        let mut values = Vec::with_capacity(FEATURE_COUNT);
        values.extend(local.values());
        values.extend(props_2d.values.iter().map(|(_, v)| *v));
        values.extend(props_3d.values.iter().map(|(_, v)| *v));
        debug!(cid = props_2d.cid, width = values.len(), "Assembled feature row");

        Ok(FeatureRow { cid: props_2d.cid, values })
    }
}
