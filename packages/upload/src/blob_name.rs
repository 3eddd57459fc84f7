//! Destination object key assembly.

use std::path::Path;

/// Builds the object key for `source_path`.
///
/// The key is `{path_prefix}/{name}` where `name` is the last path segment
/// of `source_path`, prefixed with `{name_prefix}-` when `name_prefix` is
/// non-empty. Nothing is escaped and no collisions are detected: two sources
/// with the same file name map to the same key, and the later upload wins.
#[must_use]
pub fn assemble_blob_name(path_prefix: &str, name_prefix: &str, source_path: impl AsRef<Path>) -> String {
    let source_path = source_path.as_ref();
    let base_name = source_path
        .file_name()
        .unwrap_or(source_path.as_os_str())
        .to_string_lossy();

    if name_prefix.is_empty() {
        format!("{path_prefix}/{base_name}")
    } else {
        format!("{path_prefix}/{name_prefix}-{base_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_prefix_is_joined_with_dash() {
        assert_eq!(
            assemble_blob_name("logs", "app", "2023/data.csv"),
            "logs/app-data.csv"
        );
    }

    #[test]
    fn empty_name_prefix_keeps_base_name() {
        assert_eq!(assemble_blob_name("logs", "", "data.csv"), "logs/data.csv");
    }

    #[test]
    fn only_last_segment_is_used() {
        assert_eq!(
            assemble_blob_name("archive/2024", "", "/var/data/deep/nested/report.json"),
            "archive/2024/report.json"
        );
    }

    #[test]
    fn same_base_name_collides() {
        let a = assemble_blob_name("p", "x", "one/file.txt");
        let b = assemble_blob_name("p", "x", "two/file.txt");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_path_prefix_yields_leading_slash() {
        assert_eq!(assemble_blob_name("", "", "data.csv"), "/data.csv");
    }
}
