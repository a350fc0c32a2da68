use derive_more::Display;

pub const DEFAULT_INCLUDE_MARKER: &str = "#include";
pub const DEFAULT_REFERENCE_MARKER: &str = "dts";

/// Line classifier for include references.
///
/// This is a substring heuristic, not a preprocessor: a line is a reference
/// when it contains both markers anywhere, comments included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeMatcher {
    include_marker: String,
    reference_marker: String,
}

impl Default for IncludeMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_INCLUDE_MARKER, DEFAULT_REFERENCE_MARKER)
    }
}

impl IncludeMatcher {
    pub fn new(include_marker: impl Into<String>, reference_marker: impl Into<String>) -> Self {
        Self {
            include_marker: include_marker.into(),
            reference_marker: reference_marker.into(),
        }
    }

    pub fn is_reference(&self, line: &str) -> bool {
        line.contains(&self.include_marker) && line.contains(&self.reference_marker)
    }

    /// Returns the content of the first quoted string on the line.
    ///
    /// An unterminated quote yields everything after it.
    pub fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.trim().split('"').nth(1)
    }

    /// Scans file contents and yields every reference line in file order.
    pub fn scan<'a>(&'a self, contents: &'a str) -> impl Iterator<Item = Reference<'a>> + 'a {
        universal_lines(contents)
            .enumerate()
            .filter(|(_, line)| self.is_reference(line))
            .map(|(index, line)| {
                let line_number = index + 1;
                match self.extract(line) {
                    Some(path) => Reference::Include { line_number, path },
                    None => Reference::Malformed { line_number, line },
                }
            })
    }
}

/// Splits on `\n`, `\r\n` and lone `\r`, without yielding a trailing empty line.
fn universal_lines(contents: &str) -> impl Iterator<Item = &str> {
    let mut rest = contents;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\n', '\r']) {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Reference<'a> {
    #[display("line {line_number}: {path}")]
    Include { line_number: usize, path: &'a str },
    #[display("line {line_number}: malformed reference '{line}'")]
    Malformed { line_number: usize, line: &'a str },
}
