//! ClarificatION: ESG bond explorer core.
//!
//! Loads the company dataset, maps letter ratings, re-scores edited ESG
//! sub-scores with the pre-trained model, and requests analyst commentary
//! from a chat-completion endpoint. The `explorer` module owns the
//! per-session interaction workflow and its HTTP surface.

pub mod config;
pub mod error;
pub mod explorer;
pub mod telemetry;
