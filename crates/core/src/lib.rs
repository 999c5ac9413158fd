//! Shared task contract for relik workers.
//!
//! Everything a worker task needs to talk to the task-queue runtime and
//! the rest of the pipeline lives here: resolving input files from an
//! upstream result, allocating output files, encoding the task result,
//! declaring the task's configuration schema, and running external
//! command-line tools.

pub mod error;
pub mod input;
pub mod output;
pub mod process;
pub mod task_config;
pub mod task_metadata;
pub mod task_result;
