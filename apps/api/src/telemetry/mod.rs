// Simulated gaze / face / head-pose telemetry.
// The simulator produces samples per session; summary folds them into averages and classes.

pub mod simulator;
pub mod summary;

pub use simulator::TelemetrySimulator;
