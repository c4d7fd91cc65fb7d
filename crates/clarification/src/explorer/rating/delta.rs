use serde::Serialize;

use super::display_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub const fn glyph(self) -> char {
        match self {
            Self::Up => '\u{25B2}',
            Self::Down => '\u{25BC}',
            Self::Flat => '=',
        }
    }

    pub const fn color(self) -> Option<DeltaColor> {
        match self {
            Self::Up => Some(DeltaColor::Green),
            Self::Down => Some(DeltaColor::Red),
            Self::Flat => None,
        }
    }

    const fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Flat => Self::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaColor {
    Green,
    Red,
}

impl DeltaColor {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// Movement of the current rating against the previous one on the display meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingDelta {
    pub trend: Trend,
    pub magnitude: u8,
}

impl RatingDelta {
    pub fn between(current: &str, previous: &str) -> Self {
        Self::from_values(display_value(current), display_value(previous))
    }

    pub fn from_values(current: u8, previous: u8) -> Self {
        let trend = match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Trend::Up,
            std::cmp::Ordering::Less => Trend::Down,
            std::cmp::Ordering::Equal => Trend::Flat,
        };
        Self {
            trend,
            magnitude: current.abs_diff(previous),
        }
    }

    pub fn signed(self) -> i16 {
        let magnitude = i16::from(self.magnitude);
        match self.trend {
            Trend::Up => magnitude,
            Trend::Down => -magnitude,
            Trend::Flat => 0,
        }
    }

    pub fn glyph(self) -> char {
        self.trend.glyph()
    }

    pub fn color(self) -> Option<DeltaColor> {
        self.trend.color()
    }

    /// The same movement seen from the other side.
    pub fn reversed(self) -> Self {
        Self {
            trend: self.trend.reversed(),
            magnitude: self.magnitude,
        }
    }

    /// "▲ 1", "▼ 2", or "=" when unchanged.
    pub fn text(self) -> String {
        match self.trend {
            Trend::Flat => self.glyph().to_string(),
            _ => format!("{} {}", self.glyph(), self.magnitude),
        }
    }
}
