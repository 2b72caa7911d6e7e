pub mod evaluation;
pub mod report;
pub mod session;
pub mod telemetry;
