use serde::{Deserialize, Serialize};
use std::fmt;

/// Age-classification label assigned by the analysis service.
///
/// Unknown labels are kept verbatim so a report never fails to load because
/// of a rating the service added later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rating {
    Zero,
    Six,
    Twelve,
    Sixteen,
    Eighteen,
    Other(String),
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::Zero,
        Rating::Six,
        Rating::Twelve,
        Rating::Sixteen,
        Rating::Eighteen,
    ];

    pub fn label(&self) -> &str {
        match self {
            Rating::Zero => "0+",
            Rating::Six => "6+",
            Rating::Twelve => "12+",
            Rating::Sixteen => "16+",
            Rating::Eighteen => "18+",
            Rating::Other(s) => s,
        }
    }

    /// Minimum age in years, or None for labels outside the fixed set.
    pub fn min_age(&self) -> Option<u8> {
        match self {
            Rating::Zero => Some(0),
            Rating::Six => Some(6),
            Rating::Twelve => Some(12),
            Rating::Sixteen => Some(16),
            Rating::Eighteen => Some(18),
            Rating::Other(_) => None,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "0+" => Rating::Zero,
            "6+" => Rating::Six,
            "12+" => Rating::Twelve,
            "16+" => Rating::Sixteen,
            "18+" => Rating::Eighteen,
            other => Rating::Other(other.to_string()),
        }
    }

    /// True when this rating is stricter than `target`. Unknown labels never are.
    pub fn exceeds(&self, target: &Rating) -> bool {
        match (self.min_age(), target.min_age()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::Other(String::new())
    }
}

impl From<String> for Rating {
    fn from(s: String) -> Self {
        Rating::parse(&s)
    }
}

impl From<Rating> for String {
    fn from(r: Rating) -> Self {
        r.label().to_string()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Direction of a rating change between two consecutive versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improved,
    Worsened,
    Unchanged,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improved => "improved",
            Trend::Worsened => "worsened",
            Trend::Unchanged => "unchanged",
        }
    }
}

/// Rating difference from `older` to `newer`, in years.
///
/// Returns None when either side is not one of the fixed brackets.
pub fn compare(older: &Rating, newer: &Rating) -> Option<(i16, Trend)> {
    let diff = newer.min_age()? as i16 - older.min_age()? as i16;
    let trend = match diff {
        d if d < 0 => Trend::Improved,
        d if d > 0 => Trend::Worsened,
        _ => Trend::Unchanged,
    };
    Some((diff, trend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_brackets_and_keeps_unknown() {
        assert_eq!(Rating::parse("16+"), Rating::Sixteen);
        assert_eq!(Rating::parse(" 0+ "), Rating::Zero);
        assert_eq!(Rating::parse("PG-13"), Rating::Other("PG-13".into()));
        assert_eq!(Rating::parse("PG-13").min_age(), None);
    }

    #[test]
    fn serde_uses_labels() {
        let r: Rating = serde_json::from_str("\"18+\"").unwrap();
        assert_eq!(r, Rating::Eighteen);
        assert_eq!(serde_json::to_string(&Rating::Six).unwrap(), "\"6+\"");
    }

    #[test]
    fn compare_reports_direction() {
        assert_eq!(
            compare(&Rating::Eighteen, &Rating::Twelve),
            Some((-6, Trend::Improved))
        );
        assert_eq!(
            compare(&Rating::Six, &Rating::Sixteen),
            Some((10, Trend::Worsened))
        );
        assert_eq!(
            compare(&Rating::Six, &Rating::Six),
            Some((0, Trend::Unchanged))
        );
        assert_eq!(compare(&Rating::Six, &Rating::parse("X")), None);
    }

    #[test]
    fn exceeds_ignores_unknown() {
        assert!(Rating::Sixteen.exceeds(&Rating::Twelve));
        assert!(!Rating::Twelve.exceeds(&Rating::Twelve));
        assert!(!Rating::parse("R").exceeds(&Rating::Zero));
    }
}
