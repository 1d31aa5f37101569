//! Source relocation for generated code.

/// Maps lines of generated code back to the original source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CsymInfo {
    /// Original file name.
    pub file: String,
    /// `map[generated_line - 1]` is the original line number.
    pub map: Vec<usize>,
    /// Original source lines, 1-based line `n` at `codes[n - 1]`.
    pub codes: Vec<String>,
}

impl CsymInfo {
    pub fn new(file: impl Into<String>, map: Vec<usize>, codes: Vec<String>) -> Self {
        CsymInfo {
            file: file.into(),
            map,
            codes,
        }
    }

    /// Original line and source text for a generated line, if mapped.
    pub fn relocate(&self, line: usize) -> Option<(usize, &str)> {
        let original = *self.map.get(line.checked_sub(1)?)?;
        let code = self.codes.get(original.checked_sub(1)?)?;
        Some((original, code.as_str()))
    }
}
