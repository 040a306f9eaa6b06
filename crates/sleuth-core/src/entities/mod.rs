//! Entity structs for the investigation pipeline.
//!
//! Entities that cross the boundary to the frontend serialize in camelCase
//! (`affectedColumns`, `durationMs`). All boundary structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod hypothesis;
mod investigation;
mod issue;
mod outcome;
mod sample;
mod script;

pub use hypothesis::Hypothesis;
pub use investigation::Investigation;
pub use issue::Issue;
pub use outcome::ExecutionOutcome;
pub use sample::SampleDescriptor;
pub use script::GeneratedScript;
