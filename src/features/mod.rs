//! Feature Extraction
//!
//! Reduces a finished session into the fixed-schema vector the inference
//! service consumes, plus the rule-based estimate used when it is unreachable.

pub mod aggregator;
pub mod fallback;
pub mod ssrt;
pub mod vector;

pub use aggregator::{build_feature_set, compute_features, session_fallback_features};
pub use fallback::{rule_based_probability, RiskBand, RiskIndicators};
pub use ssrt::{integration_ssrt, SsrtInputs};
pub use vector::{FeatureMode, FeatureSet, FeatureVector, FEATURE_NAMES};
