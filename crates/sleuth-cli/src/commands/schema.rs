use schemars::schema_for;
use sleuth_core::entities::{Hypothesis, Investigation, Issue, SampleDescriptor};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `sleuth schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::Issue => schema_for!(Issue),
        SchemaType::Hypothesis => schema_for!(Hypothesis),
        SchemaType::Investigation => schema_for!(Investigation),
        SchemaType::Sample => schema_for!(SampleDescriptor),
    };
    output(&schema, flags.format)
}
