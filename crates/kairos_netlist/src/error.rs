//! Error types for design loading and netlist construction.

use std::path::PathBuf;

/// Errors that can occur while loading a design into a [`Netlist`](crate::Netlist).
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// An I/O error occurred while reading a design file.
    #[error("failed to read design file {path}: {source}")]
    IoError {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The design file is not valid JSON or does not match the schema.
    #[error("failed to parse design: {0}")]
    ParseError(String),

    /// A cell refers to a type missing from the library.
    #[error("cell '{cell}' has unknown type '{cell_type}'")]
    UnknownCellType {
        /// Cell instance name.
        cell: String,
        /// The missing type name.
        cell_type: String,
    },

    /// A library entry refers to a port its type does not declare.
    #[error("cell type '{cell_type}' refers to undeclared port '{port}'")]
    UndeclaredPort {
        /// Cell type name.
        cell_type: String,
        /// Port name.
        port: String,
    },

    /// Two cells or two nets share a name.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// `"cell"` or `"net"`.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A net or override refers to a cell that does not exist.
    #[error("unknown cell '{0}'")]
    UnknownCell(String),

    /// A net or override refers to a net that does not exist.
    #[error("unknown net '{0}'")]
    UnknownNet(String),

    /// A connection names a port the cell's type does not have.
    #[error("cell '{cell}' has no port '{port}'")]
    UnknownPort {
        /// Cell instance name.
        cell: String,
        /// Port name.
        port: String,
    },

    /// A port was connected with the wrong direction (e.g. an input used as
    /// a driver).
    #[error("port {cell}.{port} cannot be used as a net {role}")]
    DirectionMismatch {
        /// Cell instance name.
        cell: String,
        /// Port name.
        port: String,
        /// `"driver"` or `"user"`.
        role: &'static str,
    },

    /// A port appears on more than one net, or twice on the same net.
    #[error("port {cell}.{port} is already connected to net '{net}'")]
    PortAlreadyConnected {
        /// Cell instance name.
        cell: String,
        /// Port name.
        port: String,
        /// The net the port is already on.
        net: String,
    },

    /// A routed delay or the route delay per grid unit is negative.
    #[error("{what} has negative delay {value}ps")]
    NegativeDelay {
        /// What carries the delay.
        what: String,
        /// The rejected value in picoseconds.
        value: i64,
    },

    /// A budget override names a port that is not a user of the net.
    #[error("override target {cell}.{port} is not a user of net '{net}'")]
    NotAUser {
        /// Net name.
        net: String,
        /// Cell instance name.
        cell: String,
        /// Port name.
        port: String,
    },
}
