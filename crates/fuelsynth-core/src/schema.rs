use rust_decimal::Decimal;
use serde::Serialize;

/// Fractional digits carried by every monetary and quantity column.
pub const MONEY_SCALE: u32 = 2;
pub const PRICE_PRECISION: u8 = 8;
pub const TOTAL_PRECISION: u8 = 12;

/// Engine-neutral column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ColumnKind {
    Utf8,
    Int16,
    Int32,
    Float32,
    Float64,
    Bool,
    Decimal { precision: u8, scale: u8 },
    /// Nanosecond timestamp pinned to UTC.
    TimestampUtc,
    Date,
    Struct { fields: &'static [ColumnSpec] },
    /// List whose items are nullable strings.
    Utf8List,
}

/// A named, typed column of the output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnSpec {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }
}

const DOCK_FIELDS: &[ColumnSpec] = &[
    ColumnSpec::required("bay", ColumnKind::Int16),
    ColumnSpec::required("level", ColumnKind::Utf8),
];

/// The fixed output schema, in declared column order.
pub const FUEL_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::required("transaction_id", ColumnKind::Utf8),
    ColumnSpec::required("station_id", ColumnKind::Int32),
    ColumnSpec::required(
        "dock",
        ColumnKind::Struct {
            fields: DOCK_FIELDS,
        },
    ),
    ColumnSpec::required("ship_name", ColumnKind::Utf8),
    ColumnSpec::required("franchise", ColumnKind::Utf8),
    ColumnSpec::required("captain_name", ColumnKind::Utf8),
    ColumnSpec::required("species", ColumnKind::Utf8),
    ColumnSpec::required("fuel_type", ColumnKind::Utf8),
    ColumnSpec::required("fuel_units", ColumnKind::Float32),
    ColumnSpec::required(
        "price_per_unit",
        ColumnKind::Decimal {
            precision: PRICE_PRECISION,
            scale: MONEY_SCALE as u8,
        },
    ),
    ColumnSpec::required(
        "total_cost",
        ColumnKind::Decimal {
            precision: TOTAL_PRECISION,
            scale: MONEY_SCALE as u8,
        },
    ),
    ColumnSpec::required("services", ColumnKind::Utf8List),
    ColumnSpec::required("is_emergency", ColumnKind::Bool),
    ColumnSpec::required("visited_at", ColumnKind::TimestampUtc),
    ColumnSpec::required("arrival_date", ColumnKind::Date),
    ColumnSpec::required("coords_x", ColumnKind::Float64),
    ColumnSpec::required("coords_y", ColumnKind::Float64),
];

/// Look up a top-level column by name.
pub fn column(name: &str) -> Option<&'static ColumnSpec> {
    FUEL_SCHEMA.iter().find(|column| column.name == name)
}

/// Whether `value` is representable as `DECIMAL(precision, scale)` without
/// rounding.
pub fn decimal_fits(value: Decimal, precision: u8, scale: u32) -> bool {
    let mut rescaled = value;
    rescaled.rescale(scale);
    if rescaled != value || rescaled.scale() != scale {
        return false;
    }
    let limit = 10_i128.checked_pow(u32::from(precision));
    match limit {
        Some(limit) => rescaled.mantissa().abs() < limit,
        None => true,
    }
}
