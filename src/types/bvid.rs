use std::{fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;

/// A public bilibili video identifier, e.g. `BV1xx411c7mD`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BvId(String);

/// A bare identifier
const BARE_PATTERN: &str = r"^BV[a-zA-Z0-9]+$";

/// An identifier inside a video page URL
/// Example: "https://www.bilibili.com/video/BV1xx411c7mD/?p=2"
const URL_PATTERN: &str = r"bilibili\.com/video/(?P<id>BV[a-zA-Z0-9]+)";

static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();

fn patterns() -> &'static [Regex; 2] {
    PATTERNS.get_or_init(|| {
        [
            Regex::new(BARE_PATTERN).unwrap(),
            Regex::new(URL_PATTERN).unwrap(),
        ]
    })
}

impl BvId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BvId {
    type Err = Box<dyn std::error::Error + Sync + Send>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let [bare, url] = patterns();

        if bare.is_match(s) {
            return Ok(Self(s.to_owned()));
        }

        match url.captures(s).and_then(|cap| cap.name("id")) {
            Some(id) => Ok(Self(id.as_str().to_owned())),
            None => Err(Box::from(format!(
                "'{s}' is not a BV id (expected something like BV1xx411c7mD)"
            ))),
        }
    }
}

impl Display for BvId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_ids() {
        let id: BvId = "BV1xx411c7mD".parse().unwrap();
        assert_eq!(id.as_str(), "BV1xx411c7mD");

        let id: BvId = "  BV17x411w7KC\n".parse().unwrap();
        assert_eq!(id.as_str(), "BV17x411w7KC");
    }

    #[test]
    fn extracts_ids_from_video_urls() {
        let id: BvId = "https://www.bilibili.com/video/BV1xx411c7mD/?p=2&share_source=copy"
            .parse()
            .unwrap();
        assert_eq!(id.to_string(), "BV1xx411c7mD");
    }

    #[test]
    fn rejects_other_inputs() {
        for input in ["", "BV", "av170001", "bv1xx411c7mD", "BV1xx-411c7mD", "https://example.com/"] {
            assert!(input.parse::<BvId>().is_err(), "{input} should not parse");
        }
    }
}
