//! PubChem PUG-REST property client.
//!
//! Property tables are looked up by SMILES:
//!   POST {base}/compound/smiles/property/{names}/JSON   body: smiles=...
//!
//! The SMILES travels in the form body rather than the path because `/`,
//! `#` and `\` are all legal SMILES characters.
//!
//! Response shape:
//!   { "PropertyTable": { "Properties": [ { "CID": 2244, "XLogP": 1.2, ... } ] } }

use async_trait::async_trait;
use pestiform_common::{PestiformError, SandboxClient};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

/// Two-dimensional computed properties, in feature-row order.
pub const PROPERTIES_2D: [&str; 18] = [
    "MolecularWeight",
    "XLogP",
    "ExactMass",
    "TPSA",
    "Complexity",
    "Charge",
    "HBondDonorCount",
    "HBondAcceptorCount",
    "RotatableBondCount",
    "HeavyAtomCount",
    "IsotopeAtomCount",
    "AtomStereoCount",
    "DefinedAtomStereoCount",
    "UndefinedAtomStereoCount",
    "BondStereoCount",
    "DefinedBondStereoCount",
    "UndefinedBondStereoCount",
    "CovalentUnitCount",
];

/// Three-dimensional conformer properties, in feature-row order.
pub const PROPERTIES_3D: [&str; 14] = [
    "Volume3D",
    "XStericQuadrupole3D",
    "YStericQuadrupole3D",
    "ZStericQuadrupole3D",
    "FeatureCount3D",
    "FeatureAcceptorCount3D",
    "FeatureDonorCount3D",
    "FeatureAnionCount3D",
    "FeatureCationCount3D",
    "FeatureRingCount3D",
    "FeatureHydrophobeCount3D",
    "ConformerModelRMSD3D",
    "EffectiveRotorCount3D",
    "ConformerCount3D",
];

#[derive(Debug, Error)]
pub enum PubChemError {
    #[error("PubChem returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("PubChem request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed PubChem response: {0}")]
    Malformed(String),

    #[error("expected exactly one PubChem record, got {0}")]
    Cardinality(usize),

    #[error("PubChem record for CID {cid} has no {property}")]
    MissingProperty { cid: u64, property: String },

    #[error(transparent)]
    Client(#[from] PestiformError),
}

/// One compound's values for a requested property list.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub cid: u64,
    /// `(property name, value)` in the order requested
    pub values: Vec<(String, f64)>,
}

/// A remote table of per-compound properties keyed by SMILES.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Fetch `properties` for the single compound matching `smiles`.
    async fn properties(&self, smiles: &str, properties: &[&str]) -> Result<PropertyRecord, PubChemError>;
}

#[derive(Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    table: PropertyTable,
}

#[derive(Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties")]
    properties: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
struct FaultResponse {
    #[serde(rename = "Fault")]
    fault: Fault,
}

#[derive(Deserialize)]
struct Fault {
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Details", default)]
    details: Vec<String>,
}

/// PubChem client for computed compound properties.
#[derive(Debug, Clone)]
pub struct PubChemClient {
    client: SandboxClient,
    base_url: String,
}

impl PubChemClient {
    pub fn new(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    pub fn property_url(&self, properties: &[&str]) -> String {
        format!(
            "{}/compound/smiles/property/{}/JSON",
            self.base_url.trim_end_matches('/'),
            properties.join(",")
        )
    }
}

#[async_trait]
impl PropertySource for PubChemClient {
    #[instrument(skip(self, properties), fields(n = properties.len()))]
    async fn properties(&self, smiles: &str, properties: &[&str]) -> Result<PropertyRecord, PubChemError> {
        let url = self.property_url(properties);
        debug!(%url, "Fetching PubChem properties");

        let resp = self.client.post(&url)?.form(&[("smiles", smiles)]).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<FaultResponse>(&body)
                .map(|f| {
                    let mut m = f.fault.message;
                    if !f.fault.details.is_empty() {
                        m = format!("{} ({})", m, f.fault.details.join("; "));
                    }
                    m
                })
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(PubChemError::Status { status: status.as_u16(), message });
        }

        parse_property_table(&body, properties)
    }
}

/// Numbers arrive either as JSON numbers or as decimal strings
/// (`"MolecularWeight": "180.16"`).
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a PUG-REST property table holding exactly one record.
pub fn parse_property_table(body: &str, properties: &[&str]) -> Result<PropertyRecord, PubChemError> {
    let parsed: PropertyResponse =
        serde_json::from_str(body).map_err(|e| PubChemError::Malformed(e.to_string()))?;

    let mut rows = parsed.table.properties;
    if rows.len() != 1 {
        return Err(PubChemError::Cardinality(rows.len()));
    }
    let row = rows.remove(0);

    let cid = row
        .get("CID")
        .and_then(Value::as_u64)
        .filter(|&cid| cid > 0)
        .ok_or_else(|| PubChemError::Malformed("record has no CID".to_string()))?;

    let values = properties
        .iter()
        .map(|&name| {
            row.get(name)
                .and_then(numeric)
                .map(|v| (name.to_string(), v))
                .ok_or_else(|| PubChemError::MissingProperty { cid, property: name.to_string() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PropertyRecord { cid, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPIRIN_2D: &str = r#"{"PropertyTable":{"Properties":[{"CID":2244,
        "MolecularWeight":"180.16","XLogP":1.2,"ExactMass":"180.04225873","TPSA":63.6,
        "Complexity":212,"Charge":0,"HBondDonorCount":1,"HBondAcceptorCount":4,
        "RotatableBondCount":3,"HeavyAtomCount":13,"IsotopeAtomCount":0,"AtomStereoCount":0,
        "DefinedAtomStereoCount":0,"UndefinedAtomStereoCount":0,"BondStereoCount":0,
        "DefinedBondStereoCount":0,"UndefinedBondStereoCount":0,"CovalentUnitCount":1}]}}"#;

    #[test]
    fn test_parse_2d_table() {
        let rec = parse_property_table(ASPIRIN_2D, &PROPERTIES_2D).unwrap();
        assert_eq!(rec.cid, 2244);
        assert_eq!(rec.values.len(), 18);
        assert_eq!(rec.values[0], ("MolecularWeight".to_string(), 180.16));
        assert_eq!(rec.values[1], ("XLogP".to_string(), 1.2));
        assert_eq!(rec.values[17], ("CovalentUnitCount".to_string(), 1.0));
    }

    #[test]
    fn test_missing_property() {
        let body = r#"{"PropertyTable":{"Properties":[{"CID":5,"MolecularWeight":"1.0"}]}}"#;
        let err = parse_property_table(body, &["MolecularWeight", "XLogP"]).unwrap_err();
        assert!(matches!(err, PubChemError::MissingProperty { cid: 5, ref property } if property == "XLogP"));
    }

    #[test]
    fn test_cardinality() {
        let none = r#"{"PropertyTable":{"Properties":[]}}"#;
        assert!(matches!(parse_property_table(none, &[]).unwrap_err(), PubChemError::Cardinality(0)));

        let two = r#"{"PropertyTable":{"Properties":[{"CID":1},{"CID":2}]}}"#;
        assert!(matches!(parse_property_table(two, &[]).unwrap_err(), PubChemError::Cardinality(2)));
    }

    #[test]
    fn test_zero_cid_is_malformed() {
        // PubChem answers unknown structures with CID 0
        let body = r#"{"PropertyTable":{"Properties":[{"CID":0}]}}"#;
        assert!(matches!(parse_property_table(body, &[]).unwrap_err(), PubChemError::Malformed(_)));
    }

    #[test]
    fn test_garbage_body() {
        assert!(matches!(parse_property_table("<html>", &[]).unwrap_err(), PubChemError::Malformed(_)));
    }

    #[test]
    fn test_property_url() {
        let client = SandboxClient::new(["pubchem.ncbi.nlm.nih.gov"], std::time::Duration::from_secs(5)).unwrap();
        let pc = PubChemClient::new(client, "https://pubchem.ncbi.nlm.nih.gov/rest/pug/");
        assert_eq!(
            pc.property_url(&["XLogP", "TPSA"]),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/smiles/property/XLogP,TPSA/JSON"
        );
    }
}
