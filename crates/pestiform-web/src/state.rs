//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use minijinja::Environment;
use pestiform_common::{PestiformConfig, SandboxClient};
use pestiform_model::{Classifier, DecisionTree};
use pestiform_molecules::{feature_columns, CactusResolver, PredictionPipeline, PubChemClient};
use serde::Serialize;
use tracing::info;

const MAIN_TEMPLATE: &str = "main.html";

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    templates: Environment<'static>,
}

#[derive(Serialize)]
struct OriginalInput<'a> {
    chemical: &'a str,
}

impl AppState {
    pub fn new(pipeline: PredictionPipeline) -> Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_template(MAIN_TEMPLATE, include_str!("../templates/main.html"))?;
        Ok(Self { pipeline: Arc::new(pipeline), templates })
    }

    /// Wire the live resolver, PubChem client and on-disk model.
    /// The model is read once here and shared by every request.
    pub fn from_config(config: &PestiformConfig) -> anyhow::Result<Self> {
        let model = DecisionTree::load(&config.model_path)
            .with_context(|| format!("loading model from {}", config.model_path.display()))?;
        model
            .check_feature_names(&feature_columns())
            .context("model was trained on a different feature layout")?;
        info!(features = model.n_features(), "Classifier ready");

        let client = SandboxClient::from_config(config)?;
        let services = &config.services;
        let pipeline = PredictionPipeline::new(
            Arc::new(CactusResolver::new(client.clone(), services.resolver_url.clone())),
            Arc::new(PubChemClient::new(client, services.pubchem_url.clone())),
            Arc::new(model),
            Duration::from_secs(services.pipeline_deadline_secs),
        );
        Ok(Self::new(pipeline)?)
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        self.pipeline.classifier()
    }

    /// Render the form, optionally echoing the submitted name and its result.
    pub fn render_main(&self, chemical: Option<&str>, result: Option<&str>) -> Result<String, minijinja::Error> {
        let tmpl = self.templates.get_template(MAIN_TEMPLATE)?;
        tmpl.render(minijinja::context! {
            original_input => chemical.map(|chemical| OriginalInput { chemical }),
            result => result,
        })
    }
}

pub type SharedState = Arc<AppState>;
