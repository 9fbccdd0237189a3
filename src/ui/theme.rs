use ratatui::style::Color;

// Small palette: neutral grays, one accent, and one color per module status.
//
// Keep this palette cohesive. Prefer adding new roles here instead of sprinkling colors through the UI.
pub const FG: Color = Color::Rgb(229, 231, 235);
pub const MUTED: Color = Color::Rgb(156, 163, 175);
pub const DIM: Color = Color::Rgb(107, 114, 128);
pub const BORDER: Color = Color::Rgb(55, 65, 81);

pub const ACCENT: Color = Color::Rgb(255, 159, 26);

pub const ERROR: Color = Color::Rgb(248, 113, 113); // soft red

// Status colors.
pub const ACTIVE: Color = Color::Rgb(134, 239, 172); // light green
pub const HISTORICAL: Color = Color::Rgb(156, 163, 175); // gray
pub const IN_PROCESS: Color = Color::Rgb(253, 224, 71); // amber
pub const LEVEL: Color = Color::Rgb(147, 197, 253); // light blue
