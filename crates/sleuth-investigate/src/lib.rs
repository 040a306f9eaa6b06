//! # sleuth-investigate
//!
//! The investigation pipeline:
//!
//! 1. [`SampleSelector`] reduces a dataset to a payload under the token budget.
//! 2. [`ScriptGenerator`] asks the text-generation capability for a script.
//! 3. The execution capability runs the script against the payload.
//! 4. [`OutputParser`] pulls the result record out of the console text.
//!
//! [`InvestigationRunner`] drives one hypothesis through those steps with
//! stage timeouts and retries. [`InvestigationOrchestrator`] runs a batch of
//! them under a concurrency ceiling and reports total failure as a
//! [`BatchError`], after which callers typically fall back to
//! [`BasicHeuristics`].

pub mod error;
pub mod heuristics;
pub mod orchestrator;
pub mod parser;
pub mod runner;
pub mod sampling;
pub mod script;

pub use error::BatchError;
pub use heuristics::{BasicHeuristics, apply_heuristics};
pub use orchestrator::InvestigationOrchestrator;
pub use parser::{OutputParser, ParseFailure};
pub use runner::{InvestigationRunner, RunnerSettings};
pub use sampling::{Sample, SampleSelector};
pub use script::ScriptGenerator;
