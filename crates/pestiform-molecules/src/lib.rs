//! Pestiform Molecules - from a chemical name to a tolerability verdict.
//!
//! 1. Resolve the name to SMILES (NCI/CADD Chemical Identifier Resolver)
//! 2. Parse and sanitize the SMILES with RDKit, compute local descriptors
//! 3. Fetch PubChem 2-D and 3-D properties
//! 4. Classify the assembled feature row

pub mod descriptors;
pub mod resolver;
pub mod pubchem;
pub mod features;
pub mod pipeline;

pub use features::{feature_columns, DescriptorAssembler, FeatureRow, FEATURE_COUNT};
pub use pipeline::{ErrorKind, PipelineError, PredictionPipeline, Verdict};
pub use pubchem::{PropertySource, PubChemClient};
pub use resolver::{CactusResolver, StructureResolver};
