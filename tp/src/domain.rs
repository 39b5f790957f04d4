//! Core trip-request types shared across the workflow

use tracing::debug;

/// Budget bands offered to the traveler, labeled in yen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BudgetBand {
    #[default]
    UpTo50k,
    Between50kAnd100k,
    Between100kAnd150k,
    Between150kAnd200k,
    Over200k,
}

impl BudgetBand {
    pub const LABELS: [&'static str; 5] =
        ["~5万円", "5万円~10万円", "10万円~15万円", "15万円~20万円", "20万円~"];
}

impl std::str::FromStr for BudgetBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "BudgetBand::from_str: called");
        match s.trim() {
            "~5万円" => Ok(Self::UpTo50k),
            "5万円~10万円" => Ok(Self::Between50kAnd100k),
            "10万円~15万円" => Ok(Self::Between100kAnd150k),
            "15万円~20万円" => Ok(Self::Between150kAnd200k),
            "20万円~" => Ok(Self::Over200k),
            _ => {
                debug!(%s, "BudgetBand::from_str: unknown label");
                Err(format!("Unknown budget band: {}. Use: {}", s, Self::LABELS.join(", ")))
            }
        }
    }
}

impl std::fmt::Display for BudgetBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::UpTo50k => "~5万円",
            Self::Between50kAnd100k => "5万円~10万円",
            Self::Between100kAnd150k => "10万円~15万円",
            Self::Between150kAnd200k => "15万円~20万円",
            Self::Over200k => "20万円~",
        };
        write!(f, "{}", label)
    }
}

/// Stay-length bands, from day trip up to five nights or more
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DurationBand {
    #[default]
    DayTrip,
    OneNight,
    TwoNights,
    ThreeNights,
    FourNights,
    FiveNightsOrMore,
}

impl DurationBand {
    pub const LABELS: [&'static str; 6] = ["日帰り", "1泊2日", "2泊3日", "3泊4日", "4泊5日", "5泊以上"];
}

impl std::str::FromStr for DurationBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "DurationBand::from_str: called");
        match s.trim() {
            "日帰り" => Ok(Self::DayTrip),
            "1泊2日" => Ok(Self::OneNight),
            "2泊3日" => Ok(Self::TwoNights),
            "3泊4日" => Ok(Self::ThreeNights),
            "4泊5日" => Ok(Self::FourNights),
            "5泊以上" => Ok(Self::FiveNightsOrMore),
            _ => {
                debug!(%s, "DurationBand::from_str: unknown label");
                Err(format!("Unknown duration: {}. Use: {}", s, Self::LABELS.join(", ")))
            }
        }
    }
}

impl std::fmt::Display for DurationBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DayTrip => "日帰り",
            Self::OneNight => "1泊2日",
            Self::TwoNights => "2泊3日",
            Self::ThreeNights => "3泊4日",
            Self::FourNights => "4泊5日",
            Self::FiveNightsOrMore => "5泊以上",
        };
        write!(f, "{}", label)
    }
}

/// What the traveler asked for, set once and read-only afterwards
#[derive(Clone, Debug, PartialEq)]
pub struct TripRequest {
    /// Where the trip starts
    pub origin: String,
    /// Destination inside Japan
    pub destination: String,
    pub budget: BudgetBand,
    pub duration: DurationBand,
    /// Free-form purpose, e.g. "観光, グルメ"
    pub purpose: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_budget_band_labels_round_trip() {
        for label in BudgetBand::LABELS {
            let band = BudgetBand::from_str(label).unwrap();
            assert_eq!(band.to_string(), label);
        }
    }

    #[test]
    fn test_duration_band_labels_round_trip() {
        for label in DurationBand::LABELS {
            let band = DurationBand::from_str(label).unwrap();
            assert_eq!(band.to_string(), label);
        }
    }

    #[test]
    fn test_unknown_labels_list_valid_choices() {
        let err = BudgetBand::from_str("無料").unwrap_err();
        assert!(err.contains("~5万円"));
        assert!(err.contains("20万円~"));

        let err = DurationBand::from_str("一週間").unwrap_err();
        assert!(err.contains("日帰り"));
        assert!(err.contains("5泊以上"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(BudgetBand::from_str(" ~5万円 ").unwrap(), BudgetBand::UpTo50k);
        assert_eq!(DurationBand::from_str("2泊3日\n").unwrap(), DurationBand::TwoNights);
    }

    #[test]
    fn test_defaults_match_form_defaults() {
        assert_eq!(BudgetBand::default(), BudgetBand::UpTo50k);
        assert_eq!(DurationBand::default(), DurationBand::DayTrip);
    }
}
