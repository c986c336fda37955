//! Render strategies.
//!
//! Each strategy maps one sample buffer, the sensitivity, and the surface
//! geometry to drawing calls. New strategies get a module here and a `Mode`.

pub mod bars;
pub mod wave;

use clap::ValueEnum;
use std::str::FromStr;

/// Active visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Mirrored frequency bars
    #[default]
    Bars,
    /// Time-domain oscilloscope line
    Wave,
}

impl Mode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Bars => Self::Wave,
            Self::Wave => Self::Bars,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bars => write!(f, "bars"),
            Self::Wave => write!(f, "wave"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bars" => Ok(Self::Bars),
            "wave" => Ok(Self::Wave),
            other => Err(format!("unknown mode '{other}', expected 'bars' or 'wave'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        for mode in [Mode::Bars, Mode::Wave] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(" Wave ".parse::<Mode>().unwrap(), Mode::Wave);
        assert!("spectrum".parse::<Mode>().is_err());
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Mode::Bars.toggled(), Mode::Wave);
        assert_eq!(Mode::Wave.toggled(), Mode::Bars);
        assert_eq!(Mode::default(), Mode::Bars);
    }
}
