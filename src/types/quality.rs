use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

/// Known tier codes and the resolution they stand for.
static KNOWN_TIERS: [(u32, &str); 10] = [
    (16, "360P"),
    (32, "480P"),
    (64, "720P"),
    (80, "1080P"),
    (112, "1080P+"),
    (116, "1080P60"),
    (120, "4K"),
    (125, "HDR"),
    (126, "Dolby Vision"),
    (127, "8K"),
];

/// A quality tier as the platform numbers it.
///
/// The platform may report codes missing from [`KNOWN_TIERS`], so any code is
/// representable; only parsing user input is restricted to known tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Quality(u32);

impl Quality {
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    /// Human label of the tier, e.g. "1080P".
    pub fn label(self) -> Option<&'static str> {
        KNOWN_TIERS
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, label)| *label)
    }

    /// Every tier with a known label, lowest first
    pub fn known() -> impl Iterator<Item = Quality> {
        KNOWN_TIERS.iter().map(|(code, _)| Quality(*code))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl FromStr for Quality {
    type Err = Box<dyn std::error::Error + Sync + Send>;

    /// Accept either a tier code ("80") or its label ("1080p")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let found = match s.parse::<u32>() {
            Ok(code) => KNOWN_TIERS.iter().find(|(c, _)| *c == code),
            Err(_) => KNOWN_TIERS
                .iter()
                .find(|(_, label)| label.eq_ignore_ascii_case(s)),
        };

        match found {
            Some((code, _)) => Ok(Self(*code)),
            None => {
                let choices: Vec<String> = Quality::known().map(|q| q.to_string()).collect();
                Err(Box::from(format!(
                    "unknown quality '{s}', expected one of: {}",
                    choices.join(", ")
                )))
            }
        }
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.0, self.label().unwrap_or("unknown"))
    }
}
