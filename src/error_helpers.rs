//! Error helper functions for creating actionable error messages

use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Create an enhanced error message for file permission issues
pub fn permission_error(path: &Path, operation: &str) -> String {
    format!(
        "Permission denied when {} '{}'\n\n\
         Possible fixes:\n\
         1. Check file permissions: ls -l '{}'\n\
         2. Make the file readable with: chmod u+r '{}'",
        operation,
        path.display(),
        path.display(),
        path.display()
    )
}

/// Create an enhanced error message for file not found issues
pub fn not_found_error(path: &Path, context: &str) -> String {
    format!(
        "File not found: '{}'\n\n\
         Context: {}\n\n\
         Possible fixes:\n\
         1. Check the file path is correct\n\
         2. Step sources are relative to the walk root (see --root)",
        path.display(),
        context
    )
}

/// Pick the right message for a failed read of `path`
pub fn read_error(path: &Path, err: &io::Error, context: &str) -> String {
    if is_not_found(err) {
        not_found_error(path, context)
    } else if is_permission_denied(err) {
        permission_error(path, context)
    } else {
        format!("Failed to read '{}' while {}: {}", path.display(), context, err)
    }
}
