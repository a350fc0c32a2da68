use std::path::PathBuf;
use std::string::FromUtf8Error;

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, trace};

use crate::ext::BestEffortPathExt;
use crate::tracer::include_line::{IncludeMatcher, Reference};
use crate::tracer::report::{Trace, TraceSink, Visit};

/// Work item of the depth-first walk.
#[derive(Debug)]
enum Pending {
    Include {
        path: String,
        depth: usize,
    },
    Malformed {
        file: String,
        line_number: usize,
        line: String,
    },
}

/// Walks the include graph of a device-tree source file.
///
/// Paths are resolved against `base_dir` and reported exactly as written in
/// the including file. Visiting a path that is already on the active chain
/// is reported as a cycle; the same file reached through two different
/// chains is visited twice.
#[derive(Debug, Clone)]
pub struct IncludeTracer {
    base_dir: PathBuf,
    matcher: IncludeMatcher,
}

impl IncludeTracer {
    pub fn new(base_dir: impl Into<PathBuf>, matcher: IncludeMatcher) -> Self {
        Self {
            base_dir: base_dir.into(),
            matcher,
        }
    }

    pub async fn trace(
        &self,
        root: &str,
        sink: &mut impl TraceSink,
    ) -> Result<Trace, TraceError> {
        debug!(
            "Tracing includes of {} from {}",
            root,
            self.base_dir.best_effort_path_display()
        );

        let mut result = Trace::default();
        let mut chain: Vec<String> = Vec::new();
        // Popped from the back, so children are pushed in reverse line order.
        let mut pending = vec![Pending::Include {
            path: root.to_string(),
            depth: 0,
        }];

        while let Some(item) = pending.pop() {
            let (path, depth) = match item {
                Pending::Include { path, depth } => (path, depth),
                Pending::Malformed {
                    file,
                    line_number,
                    line,
                } => {
                    return MalformedIncludeSnafu {
                        file,
                        line_number,
                        line,
                    }
                    .fail();
                }
            };

            chain.truncate(depth);
            if chain.contains(&path) {
                chain.push(path);
                return CyclicIncludeSnafu { chain }.fail();
            }

            let visit = Visit { path, depth };
            trace!("Visiting {visit}");
            sink.visit(&visit).context(OutputSnafu)?;
            result.push(visit.clone());

            let contents = self.read_source(&visit.path).await?;
            let children = self
                .matcher
                .scan(&contents)
                .inspect(|reference| trace!("{}: {reference}", visit.path))
                .map(|reference| match reference {
                    Reference::Include { path, .. } => Pending::Include {
                        path: path.to_string(),
                        depth: depth + 1,
                    },
                    Reference::Malformed { line_number, line } => Pending::Malformed {
                        file: visit.path.clone(),
                        line_number,
                        line: line.to_string(),
                    },
                })
                .collect::<Vec<_>>();
            debug!("{} references {} file(s)", visit.path, children.len());

            pending.extend(children.into_iter().rev());
            chain.push(visit.path);
        }

        debug!("Visited {} file(s)", result.visits().len());
        Ok(result)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    async fn read_source(&self, path: &str) -> Result<String, TraceError> {
        let full_path = self.resolve(path);
        let bytes = fs::read(&full_path).await.context(ReadSnafu {
            path: full_path.clone(),
        })?;
        String::from_utf8(bytes).context(DecodeSnafu { path: full_path })
    }
}

#[derive(Debug, Snafu)]
pub enum TraceError {
    #[snafu(display("Failed to read included file: {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Included file {} is not valid UTF-8", path.best_effort_path_display()))]
    DecodeError {
        path: PathBuf,
        source: FromUtf8Error,
    },
    #[snafu(display(
        "No quoted path in include on line {} of {}: {}",
        line_number,
        file,
        line
    ))]
    MalformedInclude {
        file: String,
        line_number: usize,
        line: String,
    },
    #[snafu(display("Cyclic include: {}", chain.join(" -> ")))]
    CyclicInclude { chain: Vec<String> },
    #[snafu(display("Failed to write the traversal report"))]
    OutputError { source: std::io::Error },
}
