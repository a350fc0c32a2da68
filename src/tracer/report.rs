use std::io::{self, Write};

use colored::Colorize;
use derive_more::Display;

pub const DEFAULT_INDENT: &str = "|  ";

/// One step of the traversal.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{path} (depth {depth})")]
pub struct Visit {
    pub path: String,
    pub depth: usize,
}

/// Every visit of a finished traversal, in pre-order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    visits: Vec<Visit>,
}

impl Trace {
    pub(super) fn push(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn sorted_listing(&self) -> Vec<&str> {
        let mut listing = self
            .visits
            .iter()
            .map(|visit| visit.path.as_str())
            .collect::<Vec<_>>();
        listing.sort_unstable();
        listing
    }
}

/// Receives visits while the traversal is still running.
pub trait TraceSink {
    fn visit(&mut self, visit: &Visit) -> io::Result<()>;
}

/// Writes the traversal report and the sorted listing.
pub struct ReportWriter<W: Write> {
    out: W,
    indent: String,
    colorize: bool,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, indent: impl Into<String>, colorize: bool) -> Self {
        Self {
            out,
            indent: indent.into(),
            colorize,
        }
    }

    /// Blank separator line followed by every visited path, sorted.
    pub fn write_listing(&mut self, trace: &Trace) -> io::Result<()> {
        writeln!(self.out)?;
        for path in trace.sorted_listing() {
            writeln!(self.out, "{path}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for ReportWriter<W> {
    fn visit(&mut self, visit: &Visit) -> io::Result<()> {
        let indent = self.indent.repeat(visit.depth);
        if self.colorize && !indent.is_empty() {
            write!(self.out, "{}", indent.dimmed())?;
        } else {
            write!(self.out, "{indent}")?;
        }
        writeln!(self.out, "{}", visit.path)?;
        self.out.flush()
    }
}
