//! JSON report output writer.
//!
//! Writes hot method report envelopes to JSON files with proper formatting.
//!
//! Display trees nest one JSON level per stack frame, so the tree is written
//! with an explicit stack rather than through serde's recursive serializer.

use crate::parser::schema::{DisplayNode, ReportEnvelope};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `report` - Envelope holding the display tree
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let reports = produce_reports("dump.collapsed", &PrefixClassifier::default())?;
/// write_report(&ReportEnvelope::success(FilterPolicy::Identity, reports.identity), "hotMethod.json")?;
/// ```
pub fn write_report(report: &ReportEnvelope, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing {} report to: {}", report.policy, output_path.display());

    validate_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    write_envelope(&mut writer, report)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a report to a string (for tests and in-memory use)
pub fn report_to_string(report: &ReportEnvelope) -> Result<String, OutputError> {
    let mut buffer = Vec::new();
    write_envelope(&mut buffer, report)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write an envelope as one JSON object, fields in declaration order
fn write_envelope<W: Write>(writer: &mut W, report: &ReportEnvelope) -> Result<(), OutputError> {
    writer.write_all(b"{\"status\":")?;
    serde_json::to_writer(&mut *writer, &report.status)?;
    writer.write_all(b",\"message\":")?;
    serde_json::to_writer(&mut *writer, &report.message)?;
    writer.write_all(b",\"version\":")?;
    serde_json::to_writer(&mut *writer, &report.version)?;
    writer.write_all(b",\"policy\":")?;
    serde_json::to_writer(&mut *writer, &report.policy)?;
    writer.write_all(b",\"generated_at\":")?;
    serde_json::to_writer(&mut *writer, &report.generated_at)?;
    writer.write_all(b",\"data\":")?;
    write_display_tree(writer, &report.data)?;
    writer.write_all(b"}")?;
    Ok(())
}

/// Write a display tree as JSON, in the same shape serde gives a `DisplayNode`
///
/// Memory grows with the tree, not the call stack, so any depth is fine.
pub fn write_display_tree<W: Write>(writer: &mut W, root: &DisplayNode) -> Result<(), OutputError> {
    enum Step<'a> {
        /// Node to open; `true` when a sibling precedes it
        Open(&'a DisplayNode, bool),
        Close,
    }

    let mut steps = vec![Step::Open(root, false)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Open(node, separated) => {
                if separated {
                    writer.write_all(b",")?;
                }
                writer.write_all(b"{\"name\":")?;
                serde_json::to_writer(&mut *writer, &node.name)?;
                write!(writer, ",\"value\":{},\"children\":[", node.value)?;

                steps.push(Step::Close);
                steps.extend(
                    node.children
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(i, child)| Step::Open(child, i > 0)),
                );
            }
            Step::Close => writer.write_all(b"]}")?,
        }
    }
    Ok(())
}

/// Validate that output path is writable
///
/// **Public** - also used before any artifact of a run is written
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(ext) = path.extension() {
        if ext != "json" {
            debug!("Warning: File does not have .json extension: {}", path.display());
        }
    }

    Ok(())
}

/// Calculate file size in bytes
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a report from a JSON file
///
/// **Public** - useful for validation and testing
///
/// Nesting depth is not limited: a report nests one level per stack frame.
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<ReportEnvelope, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;

    let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(file));
    deserializer.disable_recursion_limit();
    let report =
        ReportEnvelope::deserialize(&mut deserializer).map_err(OutputError::SerializationFailed)?;
    deserializer.end().map_err(OutputError::SerializationFailed)?;

    debug!(
        "Report loaded: version {}, policy {}, root value {}",
        report.version, report.policy, report.data.value
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::filter::FilterPolicy;
    use crate::parser::schema::DisplayNode;
    use tempfile::NamedTempFile;

    fn create_test_report() -> ReportEnvelope {
        let mut root = DisplayNode::new("root", 12);
        root.children.push(DisplayNode::new("pkg.Main//run", 12));
        ReportEnvelope::success(FilterPolicy::LanguageOnly, root)
    }

    #[test]
    fn test_write_and_read_report() {
        let report = create_test_report();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_report(&report, path).unwrap();
        let loaded = read_report(path).unwrap();

        assert_eq!(loaded.policy, FilterPolicy::LanguageOnly);
        assert_eq!(loaded.version, report.version);
        assert_eq!(loaded.data, report.data);
    }

    #[test]
    fn test_read_deep_report() {
        // Far deeper than serde_json's default recursion limit
        let mut node = DisplayNode::new("leaf", 1);
        for i in 0..400 {
            let mut parent = DisplayNode::new(format!("frame{}", i), 1);
            parent.children.push(node);
            node = parent;
        }
        let report = ReportEnvelope::success(FilterPolicy::Identity, node);
        let temp_file = NamedTempFile::new().unwrap();

        write_report(&report, temp_file.path()).unwrap();
        let loaded = read_report(temp_file.path()).unwrap();

        assert_eq!(loaded.data.depth(), 400);
    }

    #[test]
    fn test_report_to_string_contains_tree() {
        let json = report_to_string(&create_test_report()).unwrap();
        assert!(json.contains("\"policy\":\"language-only\""));
        assert!(json.contains("\"name\":\"pkg.Main//run\""));
    }

    #[test]
    fn test_tree_writer_matches_serde_shape() {
        let mut root = DisplayNode::new("root", 9);
        let mut a = DisplayNode::new("a.B//c \"quoted\"", 6);
        a.children.push(DisplayNode::new("leaf", 6));
        root.children.push(a);
        root.children.push(DisplayNode::new("ü", 3));

        let mut buffer = Vec::new();
        write_display_tree(&mut buffer, &root).unwrap();

        let written: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(written, serde_json::to_value(&root).unwrap());
    }

    #[test]
    fn test_envelope_string_parses_back() {
        let report = create_test_report();
        let json = report_to_string(&report).unwrap();
        let parsed: ReportEnvelope = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.policy, report.policy);
        assert_eq!(parsed.generated_at, report.generated_at);
        assert_eq!(parsed.data, report.data);
    }

    #[test]
    fn test_write_very_deep_tree() {
        let mut node = DisplayNode::new("leaf", 1);
        for i in 0..100_000 {
            let mut parent = DisplayNode::new(format!("f{}", i), 1);
            parent.children.push(node);
            node = parent;
        }

        let mut buffer = Vec::new();
        write_display_tree(&mut buffer, &node).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("{\"name\":\"f99999\",\"value\":1,\"children\":[{"));
        assert!(text.ends_with(&"]}".repeat(100_001)));
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/hotMethod.json");

        write_report(&create_test_report(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
