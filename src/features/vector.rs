//! Fixed-schema feature vector sent to the inference service

use crate::trials::Coherence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire names of every feature, in model column order
pub const FEATURE_NAMES: [&str; 15] = [
    "vel_max_nogo10coh",
    "acc_max_nogo10coh",
    "total_dist_nogo10coh",
    "vel_max_nogo50coh",
    "acc_max_nogo50coh",
    "total_dist_nogo50coh",
    "vel_max_nogo80coh",
    "acc_max_nogo80coh",
    "total_dist_nogo80coh",
    "ssrt_integ",
    "IN",
    "vol",
    "go_acc",
    "meanmt",
    "experiment_staircase_SSD",
];

/// No-go kinematics for one coherence level
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoGoKinematics {
    pub vel_max: f64,
    pub acc_max: f64,
    pub total_dist: f64,
}

/// The model's input row. Serializes to a flat JSON object keyed by
/// [`FEATURE_NAMES`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub vel_max_nogo10coh: f64,
    pub acc_max_nogo10coh: f64,
    pub total_dist_nogo10coh: f64,
    pub vel_max_nogo50coh: f64,
    pub acc_max_nogo50coh: f64,
    pub total_dist_nogo50coh: f64,
    pub vel_max_nogo80coh: f64,
    pub acc_max_nogo80coh: f64,
    pub total_dist_nogo80coh: f64,
    /// Stop-signal reaction time, integration method (ms)
    pub ssrt_integ: f64,
    /// Successful inhibitions
    #[serde(rename = "IN")]
    pub inhibitions: f64,
    /// Violations (stop trials with movement)
    #[serde(rename = "vol")]
    pub violations: f64,
    /// Fraction of go trials with movement
    pub go_acc: f64,
    /// Mean movement onset on go trials (ms)
    #[serde(rename = "meanmt")]
    pub mean_movement_time: f64,
    /// One-hot experiment indicator
    #[serde(rename = "experiment_staircase_SSD")]
    pub experiment_staircase_ssd: u8,
}

impl FeatureVector {
    /// Set the three no-go features of one coherence level
    pub fn set_nogo(&mut self, coherence: Coherence, kinematics: NoGoKinematics) {
        let (vel, acc, dist) = match coherence {
            Coherence::Low => (
                &mut self.vel_max_nogo10coh,
                &mut self.acc_max_nogo10coh,
                &mut self.total_dist_nogo10coh,
            ),
            Coherence::Medium => (
                &mut self.vel_max_nogo50coh,
                &mut self.acc_max_nogo50coh,
                &mut self.total_dist_nogo50coh,
            ),
            Coherence::High => (
                &mut self.vel_max_nogo80coh,
                &mut self.acc_max_nogo80coh,
                &mut self.total_dist_nogo80coh,
            ),
        };
        *vel = kinematics.vel_max;
        *acc = kinematics.acc_max;
        *dist = kinematics.total_dist;
    }

    /// Flat name → value view, keyed by [`FEATURE_NAMES`]
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        FEATURE_NAMES.iter().copied().zip(self.values()).collect()
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn values(&self) -> [f64; 15] {
        [
            self.vel_max_nogo10coh,
            self.acc_max_nogo10coh,
            self.total_dist_nogo10coh,
            self.vel_max_nogo50coh,
            self.acc_max_nogo50coh,
            self.total_dist_nogo50coh,
            self.vel_max_nogo80coh,
            self.acc_max_nogo80coh,
            self.total_dist_nogo80coh,
            self.ssrt_integ,
            self.inhibitions,
            self.violations,
            self.go_acc,
            self.mean_movement_time,
            f64::from(self.experiment_staircase_ssd),
        ]
    }
}

/// How a feature vector was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// Reduced from recorded go/no-go trials
    Trials,
    /// Degraded approximation scaled from whole-session analytics
    SessionFallback,
}

impl FeatureMode {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FeatureMode::SessionFallback)
    }
}

/// A feature vector labeled with its derivation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub mode: FeatureMode,
    pub vector: FeatureVector,
}
