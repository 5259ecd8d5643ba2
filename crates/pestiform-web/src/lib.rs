//! pestiform-web: web front end for the pesticide tolerability classifier.
//!   - HTML form at `/`
//!   - JSON prediction API at `/api/predict`
//!   - Liveness check at `/health`

pub mod router;
pub mod handlers;
pub mod state;
