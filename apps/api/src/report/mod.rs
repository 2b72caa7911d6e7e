// Final report: aggregation over a session's answers and the coaching rules applied
// on top of it.

pub mod aggregator;
pub mod recommendations;

pub use aggregator::finalize;
