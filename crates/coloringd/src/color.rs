//! Color to match-field encoding.
//!
//! Pure functions mapping a switch color (an unsigned integer) into a value
//! suitable for a given packet header field. This is the basis of every
//! probe-flow match, so it has no side effects and no I/O.

use crate::types::{ColorValue, FieldKind};

/// Encodes `color` for the given match field.
///
/// MAC fields keep the low 6 bytes of the color, rendered as lowercase
/// colon-separated hex octets; every literal `"00"` byte pair in the
/// rendered string is then replaced with `"ee"`. The substitution is
/// textual, not numeric: a zero-valued octet always becomes `ee`. IPv4
/// fields keep the low 32 bits in dotted-decimal. 16-bit fields (port,
/// VLAN, transport ports) mask to `0xffff`; everything else masks to
/// `0xff`.
pub fn color_to_field(color: u64, field: FieldKind) -> ColorValue {
    match field {
        FieldKind::DlSrc | FieldKind::DlDst => {
            let bytes = color.to_be_bytes();
            let rendered = bytes[2..]
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":");
            ColorValue::Text(rendered.replace("00", "ee"))
        }
        FieldKind::NwSrc | FieldKind::NwDst => {
            let octets = ((color & 0xffff_ffff) as u32).to_be_bytes();
            ColorValue::Text(format!(
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            ))
        }
        FieldKind::InPort | FieldKind::DlVlan | FieldKind::TpSrc | FieldKind::TpDst => {
            ColorValue::Number(color & 0xffff)
        }
        // 8-bit fallback, also covering any future field kinds
        _ => ColorValue::Number(color & 0xff),
    }
}
