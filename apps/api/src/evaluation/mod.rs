// Answer evaluation: semantic rating from the LLM, adjusted by locally computed
// linguistic and sentiment metrics. Rating calls go through llm_client only.

pub mod evaluator;
pub mod linguistics;
pub mod prompts;
pub mod rating;
pub mod sentiment;

pub use evaluator::AnswerEvaluator;
