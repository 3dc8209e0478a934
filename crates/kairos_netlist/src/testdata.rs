//! Small designs shared by unit tests.

use crate::design::{
    ArcDef, CellDef, CellLibrary, CellTypeDef, DesignFile, NetDef, PinDef, PortDef, UserDef,
};
use kairos_timing::{Loc, PortType};

fn port(name: &str, dir: PortType) -> PortDef {
    PortDef {
        name: name.to_string(),
        dir,
    }
}

fn arc(from: &str, to: &str, min_ps: Option<i64>, max_ps: i64) -> ArcDef {
    ArcDef {
        from: from.to_string(),
        to: to.to_string(),
        min_ps,
        max_ps,
    }
}

fn cell(name: &str, cell_type: &str, x: i32, y: i32) -> CellDef {
    CellDef {
        name: name.to_string(),
        cell_type: cell_type.to_string(),
        loc: Some(Loc::new(x, y)),
    }
}

fn user(cell: &str, port: &str, route_delay_ps: Option<i64>) -> UserDef {
    UserDef {
        cell: cell.to_string(),
        port: port.to_string(),
        route_delay_ps,
    }
}

fn net(name: &str, driver: (&str, &str), users: Vec<UserDef>) -> NetDef {
    NetDef {
        name: name.to_string(),
        driver: Some(PinDef {
            cell: driver.0.to_string(),
            port: driver.1.to_string(),
        }),
        users,
    }
}

/// DFF, LUT4 and an input pad type.
pub(crate) fn library() -> CellLibrary {
    let mut library = CellLibrary::default();
    library.cell_types.insert(
        "DFF".into(),
        CellTypeDef {
            ports: vec![
                port("D", PortType::Input),
                port("CLK", PortType::Input),
                port("Q", PortType::Output),
            ],
            clocks: [("D", "CLK"), ("Q", "CLK")]
                .into_iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            arcs: vec![arc("CLK", "Q", None, 300)],
            boundary: false,
        },
    );
    library.cell_types.insert(
        "LUT4".into(),
        CellTypeDef {
            ports: vec![
                port("I0", PortType::Input),
                port("I1", PortType::Input),
                port("I2", PortType::Input),
                port("I3", PortType::Input),
                port("O", PortType::Output),
            ],
            clocks: Default::default(),
            arcs: ["I0", "I1", "I2", "I3"]
                .into_iter()
                .map(|i| arc(i, "O", Some(200), 450))
                .collect(),
            boundary: false,
        },
    );
    library.cell_types.insert(
        "IOB".into(),
        CellTypeDef {
            ports: vec![port("I", PortType::InOut), port("O", PortType::Output)],
            clocks: Default::default(),
            arcs: Vec::new(),
            boundary: true,
        },
    );
    library
}

/// A register feeding itself through one LUT, plus a pad feeding a second
/// register.
///
/// ```text
/// ff0.Q --q--> lut0.I0 (500ps), lut0.I1 (estimated)
/// lut0.O --n--> ff0.D (700ps)
/// pad.O --p--> ff1.D (estimated)
/// ```
pub(crate) fn counter_design() -> DesignFile {
    DesignFile {
        library: library(),
        cells: vec![
            cell("ff0", "DFF", 0, 0),
            cell("lut0", "LUT4", 1, 0),
            cell("ff1", "DFF", 3, 2),
            cell("pad", "IOB", 0, 4),
        ],
        nets: vec![
            net(
                "q",
                ("ff0", "Q"),
                vec![user("lut0", "I0", Some(500)), user("lut0", "I1", None)],
            ),
            net("n", ("lut0", "O"), vec![user("ff0", "D", Some(700))]),
            net("p", ("pad", "O"), vec![user("ff1", "D", None)]),
        ],
    }
}
