//! Non-fatal findings collected while producing a document

use serde::Serialize;

/// A warning attached to a generated document.
///
/// Warnings never block generation; the sandbox still reports the matching
/// runtime failure if the code actually trips over the problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewWarning {
    /// The script requires a module outside the platform allow-list
    UnsupportedModule { module: String },
    /// A single-file component repeats a section; everything from the first
    /// opening tag to the last closing tag is taken as one merged block
    DuplicateSection { section: String },
    /// A `%%id%%` token has no matching asset and was left in place
    UnresolvedPlaceholder { id: String },
}

impl std::fmt::Display for PreviewWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewWarning::UnsupportedModule { module } => {
                write!(f, "Module '{}' is not available in this sandbox", module)
            }
            PreviewWarning::DuplicateSection { section } => {
                write!(
                    f,
                    "Multiple <{}> sections found; they are merged into one block",
                    section
                )
            }
            PreviewWarning::UnresolvedPlaceholder { id } => {
                write!(f, "Placeholder %%{}%% does not match any asset", id)
            }
        }
    }
}
