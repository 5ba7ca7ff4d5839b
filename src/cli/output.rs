//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::SheetError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &SheetError) -> String {
    match e {
        SheetError::UnknownObject(id) => format!(
            "Unknown object '{}' in selection. Check the object ids listed in the scene file.",
            id
        ),
        _ => e.to_string(),
    }
}
