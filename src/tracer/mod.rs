//! Include graph traversal for device-tree sources.
//!
//! `include_line` classifies source lines, `include_tracer` walks the graph
//! depth-first and `report` renders what was visited.

mod include_line;
mod include_tracer;
mod report;

pub use include_line::{DEFAULT_INCLUDE_MARKER, DEFAULT_REFERENCE_MARKER, IncludeMatcher};
pub use include_tracer::{IncludeTracer, TraceError};
pub use report::{DEFAULT_INDENT, ReportWriter};
