//! Read-only color projection for reporting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::color_to_field;
use crate::switch_table::SwitchTable;
use crate::types::{ColorValue, FieldKind};

/// One switch's entry in the color report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Field the color is encoded into.
    pub color_field: FieldKind,
    /// Encoded color value.
    pub color_value: ColorValue,
}

/// Projects the state store into a per-switch color report using the
/// configured field kind. Pure; never mutates the table.
pub fn color_snapshot(table: &SwitchTable, field: FieldKind) -> BTreeMap<String, ColorEntry> {
    table
        .snapshot()
        .into_iter()
        .map(|(dpid, color)| {
            (
                dpid,
                ColorEntry {
                    color_field: field,
                    color_value: color_to_field(color, field),
                },
            )
        })
        .collect()
}
