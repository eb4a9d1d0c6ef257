//! Test harness for scripting editing sessions over a cellular complex.
//!
//! Provides programmatic tools for running multi-step command sequences,
//! verifying the complex after every step, and generating diagnostic output.
//!
//! # Key Components
//!
//! - [`ModelBuilder`]: fluent API for building and verifying complexes
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`report`]: text and JSON summaries of a session
//! - [`helpers`]: error type and fixture builders
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::ModelReport;
pub use workflow::ModelBuilder;
