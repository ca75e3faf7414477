pub mod report;

// Re-export commonly used types/functions for the binary
pub use report::{emit, load_source, render_catalog, AsmReport, WordRow};
