//! Shared setup for the `budget` and `analyze` commands.
//!
//! Resolves the configuration (explicit `--config` file, otherwise the
//! `kairos.toml` next to the design), applies the `--freq` override, loads
//! the design with its configured budget overrides, and renders collected
//! diagnostics.

use std::path::{Path, PathBuf};

use kairos_common::Frequency;
use kairos_config::{load_config, load_config_file, resolve_timing, ResolvedTiming};
use kairos_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticRenderer, DiagnosticSink, TerminalRenderer,
};
use kairos_netlist::{load_design, Netlist};

use crate::GlobalArgs;

/// The design or its configured overrides could not be loaded.
pub const DESIGN_LOAD_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 1);
/// The timing engine stopped on an internal consistency error.
pub const TIMING_ENGINE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 2);

/// Directory searched for `kairos.toml` when no `--config` is given.
pub fn config_dir(design: &Path) -> PathBuf {
    match design.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Loads and resolves timing settings, applying a `--freq` override.
pub fn resolve_settings(
    global: &GlobalArgs,
    design: &Path,
    freq: Option<&str>,
) -> Result<ResolvedTiming, Box<dyn std::error::Error>> {
    let config = match &global.config {
        Some(path) => load_config_file(Path::new(path))?,
        None => load_config(&config_dir(design))?,
    };
    let mut timing = resolve_timing(&config)?;
    if let Some(freq) = freq {
        timing.target_frequency = freq.parse::<Frequency>()?;
    }
    timing.verbose |= global.verbose;
    Ok(timing)
}

/// Loads the design at the resolved target and pins its overridden
/// connections.
pub fn load_netlist(
    design: &Path,
    timing: &ResolvedTiming,
    sink: &DiagnosticSink,
) -> Result<Netlist, Box<dyn std::error::Error>> {
    let mut netlist = load_design(design, timing.target_frequency, sink)?;
    netlist.apply_overrides(&timing.overrides)?;
    Ok(netlist)
}

/// Turns a failed step into an error diagnostic under `code`.
pub fn report_failure<T, E: std::fmt::Display>(
    sink: &DiagnosticSink,
    code: DiagnosticCode,
    result: Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            sink.emit(Diagnostic::error(code, e.to_string()));
            None
        }
    }
}

/// Prints collected diagnostics to stderr. Quiet mode keeps errors only.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in sink.take_all() {
        if global.quiet && !diag.severity.is_error() {
            continue;
        }
        eprintln!("{}", renderer.render(&diag));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// One register looping through a LUT, with a routed delay on each net.
    pub(crate) const LOOP_DESIGN: &str = r#"{
  "library": {
    "cell_types": {
      "DFF": {
        "ports": [
          {"name": "D", "dir": "input"},
          {"name": "CLK", "dir": "input"},
          {"name": "Q", "dir": "output"}
        ],
        "clocks": {"D": "CLK", "Q": "CLK"},
        "arcs": [{"from": "CLK", "to": "Q", "max_ps": 300}]
      },
      "LUT1": {
        "ports": [
          {"name": "A", "dir": "input"},
          {"name": "Y", "dir": "output"}
        ],
        "arcs": [{"from": "A", "to": "Y", "max_ps": 400}]
      }
    }
  },
  "cells": [
    {"name": "r", "type": "DFF", "loc": {"x": 0, "y": 0}},
    {"name": "inv", "type": "LUT1", "loc": {"x": 1, "y": 1}}
  ],
  "nets": [
    {"name": "q", "driver": {"cell": "r", "port": "Q"},
     "users": [{"cell": "inv", "port": "A", "route_delay_ps": 600}]},
    {"name": "d", "driver": {"cell": "inv", "port": "Y"},
     "users": [{"cell": "r", "port": "D", "route_delay_ps": 700}]}
  ]
}"#;

    pub(crate) fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: None,
        }
    }

    pub(crate) fn write_design(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("loop.json");
        fs::write(&path, LOOP_DESIGN).unwrap();
        path
    }

    #[test]
    fn config_dir_of_bare_file_is_cwd() {
        assert_eq!(config_dir(Path::new("top.json")), PathBuf::from("."));
        assert_eq!(
            config_dir(Path::new("build/top.json")),
            PathBuf::from("build")
        );
    }

    #[test]
    fn defaults_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let design = write_design(&tmp);
        let timing = resolve_settings(&global(), &design, None).unwrap();
        assert_eq!(timing.target_frequency.mhz(), 12.0);
        assert!(timing.overrides.is_empty());
    }

    #[test]
    fn config_next_to_design_is_used() {
        let tmp = TempDir::new().unwrap();
        let design = write_design(&tmp);
        fs::write(
            tmp.path().join("kairos.toml"),
            "[timing]\ntarget_frequency = \"200MHz\"\nverbose = true\n",
        )
        .unwrap();
        let timing = resolve_settings(&global(), &design, None).unwrap();
        assert_eq!(timing.target_frequency.mhz(), 200.0);
        assert!(timing.verbose);
    }

    #[test]
    fn freq_flag_overrides_config() {
        let tmp = TempDir::new().unwrap();
        let design = write_design(&tmp);
        let cfg = tmp.path().join("custom.toml");
        fs::write(&cfg, "[timing]\ntarget_frequency = \"50MHz\"\n").unwrap();
        let g = GlobalArgs {
            config: Some(cfg.to_string_lossy().into_owned()),
            verbose: true,
            ..global()
        };
        let timing = resolve_settings(&g, &design, Some("125MHz")).unwrap();
        assert_eq!(timing.target_frequency.mhz(), 125.0);
        assert!(timing.verbose);
    }

    #[test]
    fn bad_freq_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let design = write_design(&tmp);
        let err = resolve_settings(&global(), &design, Some("fast")).unwrap_err();
        assert!(err.to_string().contains("invalid frequency"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let design = write_design(&tmp);
        let g = GlobalArgs {
            config: Some(tmp.path().join("nope.toml").to_string_lossy().into_owned()),
            ..global()
        };
        assert!(resolve_settings(&g, &design, None).is_err());
    }

    #[test]
    fn unknown_override_target_fails_load() {
        let tmp = TempDir::new().unwrap();
        let design = write_design(&tmp);
        fs::write(
            tmp.path().join("kairos.toml"),
            "[[override]]\nnet = \"q\"\ncell = \"r\"\nport = \"A\"\ndelay = 100\n",
        )
        .unwrap();
        let timing = resolve_settings(&global(), &design, None).unwrap();
        let sink = DiagnosticSink::new();
        assert!(load_netlist(&design, &timing, &sink).is_err());
    }

    #[test]
    fn failed_step_becomes_error_diagnostic() {
        let sink = DiagnosticSink::new();
        let ok: Result<u32, String> = Ok(7);
        assert_eq!(report_failure(&sink, TIMING_ENGINE_FAILED, ok), Some(7));
        assert!(!sink.has_errors());

        let err: Result<u32, String> = Err("combinational loop".into());
        assert_eq!(report_failure(&sink, DESIGN_LOAD_FAILED, err), None);
        assert!(sink.has_errors());
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.to_string(), "E001");
        assert_eq!(diags[0].message, "combinational loop");
    }
}
