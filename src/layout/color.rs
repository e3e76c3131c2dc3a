//! Group color ramp and hover brightening.

/// Five-step categorical ramp; group 1 maps to the first entry.
pub const PALETTE: [&str; 5] = ["#3f51b5", "#5c6bc0", "#7986cb", "#9fa8da", "#c5cae9"];

/// Stroke color for every link.
pub const LINK_STROKE: &str = "#3f51b5";

/// Stroke opacity for every link.
pub const LINK_OPACITY: f64 = 0.4;

/// Per-channel factor applied by one step of [`brighter`].
const BRIGHTER: f64 = 1.0 / 0.7;

/// Fill color for a group. Groups outside 1..=5 wrap around, and 0 is
/// treated as 1.
#[must_use]
pub fn group_color(group: u32) -> &'static str {
    PALETTE[group.saturating_sub(1) as usize % PALETTE.len()]
}

/// Brightens a `#rrggbb` color one step, clamping each channel at 255.
/// Anything else is returned unchanged.
#[must_use]
pub fn brighter(hex: &str) -> String {
    let Some([r, g, b]) = parse_hex(hex) else {
        return hex.to_string();
    };
    format!("#{:02x}{:02x}{:02x}", brighten(r), brighten(g), brighten(b))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn brighten(channel: u8) -> u8 {
    (f64::from(channel) * BRIGHTER).round().min(255.0) as u8
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#').filter(|d| d.len() == 6 && d.is_ascii())?;
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
