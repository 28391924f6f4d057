//! Line-stream duplicate scanning and file collection

pub mod duplicate_detector;
pub mod file_scanner;

pub use duplicate_detector::{find_duplicates, find_duplicates_in_file, SeenCounter};
pub use file_scanner::collect_files;
