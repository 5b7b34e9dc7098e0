use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown code {code} in {table} table")]
pub struct UnknownCode {
    pub table: &'static str,
    pub code: u64,
}

/// Fixed code-to-label mapping published by the controller firmware.
#[derive(Debug)]
pub struct CodeTable {
    pub name: &'static str,
    entries: &'static [(u64, &'static str)],
    /// Label for codes the firmware has not assigned.
    fallback: &'static str,
}

impl CodeTable {
    const fn new(
        name: &'static str,
        entries: &'static [(u64, &'static str)],
        fallback: &'static str,
    ) -> Self {
        Self {
            name,
            entries,
            fallback,
        }
    }

    pub fn get(&self, code: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == code)
            .map(|(_, label)| *label)
    }

    /// Never fails: unassigned codes resolve to the table's placeholder label.
    pub fn lookup(&self, code: u64) -> &'static str {
        self.get(code).unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    pub fn entries(&self) -> &'static [(u64, &'static str)] {
        self.entries
    }
}

pub fn lookup(table: &CodeTable, code: u64) -> &'static str {
    table.lookup(code)
}

pub const RESERVED: &str = "reserved";
pub const UNKNOWN: &str = "unknown";

pub static BATTERY_TYPE: CodeTable = CodeTable::new(
    "battery type",
    &[
        (1, "open"),
        (2, "sealed"),
        (3, "gel"),
        (4, "lithium"),
        (5, "self-customized"),
    ],
    UNKNOWN,
);

pub static CHARGING_STATE: CodeTable = CodeTable::new(
    "charging state",
    &[
        (0, "deactivated"),
        (1, "activated"),
        (2, "mppt"),
        (3, "equalizing"),
        (4, "boost"),
        (5, "floating"),
        (6, "current limiting"),
    ],
    UNKNOWN,
);

pub static LOAD_MODE: CodeTable = CodeTable::new(
    "load mode",
    &[
        (0, "Sole light control, light control over on/off of load"),
        (
            1,
            "Load is turned on by light control, and goes off after a time delay of 1 hour",
        ),
        (
            2,
            "Load is turned on by light control, and goes off after a time delay of 2 hours",
        ),
        (
            3,
            "Load is turned on by light control, and goes off after a time delay of 3 hours",
        ),
        (
            4,
            "Load is turned on by light control, and goes off after a time delay of 4 hours",
        ),
        (
            5,
            "Load is turned on by light control, and goes off after a time delay of 5 hours",
        ),
        (
            6,
            "Load is turned on by light control, and goes off after a time delay of 6 hours",
        ),
        (
            7,
            "Load is turned on by light control, and goes off after a time delay of 7 hours",
        ),
        (
            8,
            "Load is turned on by light control, and goes off after a time delay of 8 hours",
        ),
        (
            9,
            "Load is turned on by light control, and goes off after a time delay of 9 hours",
        ),
        (
            10,
            "Load is turned on by light control, and goes off after a time delay of 10 hours",
        ),
        (
            11,
            "Load is turned on by light control, and goes off after a time delay of 11 hours",
        ),
        (
            12,
            "Load is turned on by light control, and goes off after a time delay of 12 hours",
        ),
        (
            13,
            "Load is turned on by light control, and goes off after a time delay of 13 hours",
        ),
        (
            14,
            "Load is turned on by light control, and goes off after a time delay of 14 hours",
        ),
        (15, "Manual"),
        (16, "Debugging"),
        (17, "Normal on"),
    ],
    UNKNOWN,
);

/// Codes 1-15 and 31 are held back by the firmware and fall through to `reserved`.
pub static ERROR_CODE: CodeTable = CodeTable::new(
    "error code",
    &[
        (0, "None"),
        (16, "battery over-discharge"),
        (17, "battery over-voltage"),
        (18, "battery under-voltage warning"),
        (19, "load short circuit"),
        (20, "load overpower or load over-current"),
        (21, "controller temperature too high"),
        (22, "ambient temperature too high"),
        (23, "photovoltaic input overpower"),
        (24, "photovoltaic input side short circuit"),
        (25, "photovoltaic input side over-voltage"),
        (26, "solar panel counter-current"),
        (27, "solar panel working point over-voltage"),
        (28, "solar panel reversely connected"),
        (29, "anti-reverse MOS short"),
        (30, "charge MOS short circuit"),
    ],
    RESERVED,
);

pub static SYSTEM_VOLTAGE: CodeTable = CodeTable::new(
    "system voltage",
    &[(12, "12V"), (24, "24V"), (36, "36V"), (48, "48V")],
    UNKNOWN,
);

pub static MODEL_TYPE: CodeTable = CodeTable::new(
    "model type",
    &[(0, "controller"), (1, "inverter")],
    UNKNOWN,
);
