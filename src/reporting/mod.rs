//! Report output

pub mod report_writer;

pub use report_writer::{
    escape_path, format_outcome, write_diagnostics, write_duplicate_report, write_report,
};
