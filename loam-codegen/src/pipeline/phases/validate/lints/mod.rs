//! Built-in lints for manifest validation.

mod advisory;
mod configuration;
mod duplicates;
mod field_rules;
mod naming;
mod relations;

pub use advisory::AdvisoryLint;
pub use configuration::ConfigurationLint;
pub use duplicates::DuplicatesLint;
pub use field_rules::FieldRulesLint;
pub use naming::NamingLint;
pub use relations::RelationsLint;
