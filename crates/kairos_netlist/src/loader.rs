//! Design file loading.

use crate::data::{build_netlist, Netlist};
use crate::design::DesignFile;
use crate::error::NetlistError;
use kairos_common::Frequency;
use kairos_diagnostics::DiagnosticSink;
use std::path::Path;

/// Parses a JSON design description.
pub fn parse_design(content: &str) -> Result<DesignFile, NetlistError> {
    serde_json::from_str(content).map_err(|e| NetlistError::ParseError(e.to_string()))
}

/// Reads, parses and compiles a design file.
pub fn load_design(
    path: &Path,
    target: Frequency,
    sink: &DiagnosticSink,
) -> Result<Netlist, NetlistError> {
    let content = std::fs::read_to_string(path).map_err(|source| NetlistError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    build_netlist(parse_design(&content)?, target, sink)
}
