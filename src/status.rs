// Traffic-light status and the rule that derives it.
//
// Status is a plain domain value. How a status is drawn (glyph, colour) lives
// in `render`, so nothing here knows about emoji.
use crate::error::ParseStatusError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Achievement ratio at or above which a KPI is no longer red.
pub const YELLOW_THRESHOLD: f64 = 0.7;
/// Achievement ratio strictly above which a KPI is green.
pub const GREEN_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Red,
    Yellow,
    Green,
    Unknown,
}

impl Status {
    /// Fixed order used by every summary panel and selector.
    pub const DISPLAY_ORDER: [Status; 4] = [Status::Red, Status::Yellow, Status::Green, Status::Unknown];

    pub fn index(self) -> usize {
        match self {
            Status::Red => 0,
            Status::Yellow => 1,
            Status::Green => 2,
            Status::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Red => "Red",
            Status::Yellow => "Yellow",
            Status::Green => "Green",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    /// Accepts the label (any case) or the 1-based display position, so the
    /// interactive menu and the `--status` flag share one parser.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "1" => Ok(Status::Red),
            "yellow" | "2" => Ok(Status::Yellow),
            "green" | "3" => Ok(Status::Green),
            "unknown" | "na" | "4" => Ok(Status::Unknown),
            _ => Err(ParseStatusError(s.trim().to_string())),
        }
    }
}

/// Classify one KPI from its period-1 achievement and target.
///
/// Missing inputs are `Unknown`. A zero target yields ratio 0 (red) instead
/// of a division error; rows without a target set rely on this.
pub fn classify(achv: Option<f64>, target: Option<f64>) -> Status {
    let (Some(achv), Some(target)) = (achv, target) else {
        return Status::Unknown;
    };
    let ratio = if target == 0.0 { 0.0 } else { achv / target };
    if ratio > GREEN_THRESHOLD {
        Status::Green
    } else if ratio >= YELLOW_THRESHOLD {
        Status::Yellow
    } else {
        Status::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_inputs_are_unknown() {
        assert_eq!(classify(None, Some(5.0)), Status::Unknown);
        assert_eq!(classify(Some(5.0), None), Status::Unknown);
        assert_eq!(classify(None, None), Status::Unknown);
    }

    #[test]
    fn ratio_boundaries() {
        assert_eq!(classify(Some(8.0), Some(10.0)), Status::Yellow);
        assert_eq!(classify(Some(10.0), Some(10.0)), Status::Yellow);
        assert_eq!(classify(Some(7.0), Some(10.0)), Status::Yellow);
        assert_eq!(classify(Some(10.01), Some(10.0)), Status::Green);
        assert_eq!(classify(Some(6.9), Some(10.0)), Status::Red);
    }

    #[test]
    fn zero_target_is_red_not_an_error() {
        assert_eq!(classify(Some(5.0), Some(0.0)), Status::Red);
        assert_eq!(classify(Some(0.0), Some(0.0)), Status::Red);
        assert_eq!(classify(Some(-3.0), Some(0.0)), Status::Red);
    }

    #[test]
    fn classify_is_total_over_odd_inputs() {
        let samples = [
            Some(f64::NAN),
            Some(f64::INFINITY),
            Some(f64::NEG_INFINITY),
            Some(-1.0),
            Some(0.0),
            Some(1e300),
            None,
        ];
        for achv in samples {
            for target in samples {
                let status = classify(achv, target);
                assert!(Status::DISPLAY_ORDER.contains(&status));
            }
        }
    }

    #[test]
    fn display_order_matches_index() {
        for (i, status) in Status::DISPLAY_ORDER.iter().enumerate() {
            assert_eq!(status.index(), i);
        }
    }

    #[test]
    fn parse_from_label_or_position() {
        assert_eq!("GREEN".parse::<Status>(), Ok(Status::Green));
        assert_eq!(" yellow ".parse::<Status>(), Ok(Status::Yellow));
        assert_eq!("1".parse::<Status>(), Ok(Status::Red));
        assert_eq!("4".parse::<Status>(), Ok(Status::Unknown));
        assert_eq!(
            "purple".parse::<Status>(),
            Err(ParseStatusError("purple".to_string()))
        );
    }
}
