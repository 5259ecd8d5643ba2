//! Orchestrator: identifier → SMILES → feature row → verdict.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use pestiform_model::{Classifier, ModelError};

use crate::descriptors::ChemError;
use crate::features::{DescriptorAssembler, DescriptorError};
use crate::pubchem::PropertySource;
use crate::resolver::{ResolveError, StructureResolver};

/// Outcome of a prediction, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Tolerable,
    NotTolerable,
    Invalid,
}

impl Verdict {
    /// Map a raw classifier label. Anything other than 1 or 2 is invalid.
    pub fn from_label(label: i64) -> Self {
        match label {
            2 => Verdict::Tolerable,
            1 => Verdict::NotTolerable,
            _ => Verdict::Invalid,
        }
    }

    /// Numeric label; failures report the sentinel 3.
    pub fn label(self) -> i64 {
        match self {
            Verdict::Tolerable => 2,
            Verdict::NotTolerable => 1,
            Verdict::Invalid => 3,
        }
    }

    pub fn result_text(self) -> &'static str {
        match self {
            Verdict::Tolerable => "The compound is a tolerable pesticide.",
            Verdict::NotTolerable => "The compound is not a tolerable pesticide.",
            Verdict::Invalid => "Invalid compound.",
        }
    }
}

/// Coarse failure category, stable enough to expose over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Resolution,
    Parse,
    Remote,
    Descriptor,
    Classification,
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Resolution => "resolution",
            ErrorKind::Parse => "parse",
            ErrorKind::Remote => "remote",
            ErrorKind::Descriptor => "descriptor",
            ErrorKind::Classification => "classification",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not resolve identifier: {0}")]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("classification failed: {0}")]
    Classification(#[from] ModelError),

    #[error("prediction exceeded {0:?}")]
    Timeout(Duration),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Resolution(_) => ErrorKind::Resolution,
            PipelineError::Descriptor(DescriptorError::Chem(ChemError::MissingProperty(_))) => ErrorKind::Descriptor,
            PipelineError::Descriptor(DescriptorError::Chem(_)) => ErrorKind::Parse,
            PipelineError::Descriptor(DescriptorError::Remote(_)) => ErrorKind::Remote,
            PipelineError::Descriptor(DescriptorError::CidMismatch { .. }) => ErrorKind::Descriptor,
            PipelineError::Classification(_) => ErrorKind::Classification,
            PipelineError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// Resolve, describe and classify one chemical identifier.
#[derive(Clone)]
pub struct PredictionPipeline {
    resolver: Arc<dyn StructureResolver>,
    assembler: DescriptorAssembler,
    classifier: Arc<dyn Classifier>,
    deadline: Duration,
}

impl PredictionPipeline {
    pub fn new(
        resolver: Arc<dyn StructureResolver>,
        properties: Arc<dyn PropertySource>,
        classifier: Arc<dyn Classifier>,
        deadline: Duration,
    ) -> Self {
        Self {
            resolver,
            assembler: DescriptorAssembler::new(properties),
            classifier,
            deadline,
        }
    }

    /// The shared model every request is evaluated against.
    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    #[instrument(skip(self))]
    pub async fn predict(&self, chemical: &str) -> Result<Verdict, PipelineError> {
        let outcome = tokio::time::timeout(self.deadline, self.run(chemical))
            .await
            .map_err(|_| PipelineError::Timeout(self.deadline))
            .and_then(|r| r);

        match &outcome {
            Ok(verdict) => info!(?verdict, "Prediction complete"),
            Err(e) => warn!(kind = %e.kind(), error = %e, "Prediction failed"),
        }
        outcome
    }

    async fn run(&self, chemical: &str) -> Result<Verdict, PipelineError> {
        let smiles = self.resolver.resolve(chemical).await?;
        let row = self.assembler.assemble(&smiles).await?;
        let label = self.classifier.predict(&row.values)?;
        Ok(Verdict::from_label(label))
    }
}
