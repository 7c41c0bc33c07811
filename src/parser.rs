//! Response parsing: extract the numeric estimate from generated text.
//!
//! The model is instructed to end with a line of the form
//! `Estimated Probability: X`. Parsing scans for the first line containing
//! the marker phrase and reads the float after the first colon. Every
//! failure mode yields a null estimate; a malformed response never aborts
//! a run.

use std::fmt;

/// Marker phrase locating the answer line. Case-sensitive substring match,
/// not anchored to line start.
pub const PROBABILITY_MARKER: &str = "Estimated Probability";

/// Why a response yielded no estimate. Logged for diagnostics; never
/// persisted and never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    /// No line contains the marker phrase.
    MarkerMissing,
    /// The marker line has no colon to split on.
    MissingColon,
    /// The text after the colon is not a valid float.
    InvalidNumber,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::MarkerMissing => write!(f, "no '{PROBABILITY_MARKER}' line in response"),
            ParseFailure::MissingColon => write!(f, "marker line has no colon"),
            ParseFailure::InvalidNumber => write!(f, "text after colon is not a number"),
        }
    }
}

/// Parse the estimated probability out of a response, null on any failure.
pub fn parse_probability(response: &str) -> Option<f64> {
    parse_probability_detailed(response).ok()
}

/// Like [`parse_probability`] but reports why parsing failed.
///
/// Values outside [0, 1] are returned as-is: range is not validated.
pub fn parse_probability_detailed(response: &str) -> Result<f64, ParseFailure> {
    let line = response
        .lines()
        .find(|line| line.contains(PROBABILITY_MARKER))
        .ok_or(ParseFailure::MarkerMissing)?;

    let (_, after) = line.split_once(':').ok_or(ParseFailure::MissingColon)?;

    after
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseFailure::InvalidNumber)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let text = "Reasoning...\nEstimated Probability: 0.82";
        assert_eq!(parse_probability(text), Some(0.82));
    }

    #[test]
    fn test_parse_trailing_newline() {
        assert_eq!(parse_probability("Estimated Probability: 0.15\n"), Some(0.15));
    }

    #[test]
    fn test_parse_whitespace_stripped() {
        assert_eq!(parse_probability("Estimated Probability:    0.5   "), Some(0.5));
    }

    #[test]
    fn test_parse_marker_mid_line() {
        // Substring match: the marker need not start the line.
        let text = "So my Estimated Probability: 0.33";
        assert_eq!(parse_probability(text), Some(0.33));
    }

    #[test]
    fn test_parse_first_marker_line_wins() {
        let text = "Estimated Probability: 0.2\nEstimated Probability: 0.9";
        assert_eq!(parse_probability(text), Some(0.2));
    }

    #[test]
    fn test_parse_no_marker() {
        assert_eq!(parse_probability("I cannot determine this."), None);
        assert_eq!(
            parse_probability_detailed("I cannot determine this."),
            Err(ParseFailure::MarkerMissing)
        );
    }

    #[test]
    fn test_parse_marker_case_sensitive() {
        assert_eq!(parse_probability("estimated probability: 0.4"), None);
    }

    #[test]
    fn test_parse_no_colon() {
        assert_eq!(
            parse_probability_detailed("Estimated Probability 0.7"),
            Err(ParseFailure::MissingColon)
        );
    }

    #[test]
    fn test_parse_non_numeric() {
        assert_eq!(parse_probability("Estimated Probability: N/A"), None);
        assert_eq!(
            parse_probability_detailed("Estimated Probability: high"),
            Err(ParseFailure::InvalidNumber)
        );
    }

    #[test]
    fn test_parse_trailing_prose_rejected() {
        assert_eq!(parse_probability("Estimated Probability: 0.8 roughly"), None);
    }

    #[test]
    fn test_parse_earlier_colon_consumes_split() {
        // Split is on the first colon of the line, so a leading label
        // swallows the marker and the remainder fails to parse.
        assert_eq!(parse_probability("Note: Estimated Probability: 0.8"), None);
    }

    #[test]
    fn test_parse_out_of_range_passes_through() {
        // Range is not validated.
        assert_eq!(parse_probability("Estimated Probability: 1.7"), Some(1.7));
        assert_eq!(parse_probability("Estimated Probability: -0.2"), Some(-0.2));
    }

    #[test]
    fn test_parse_scientific_notation() {
        assert_eq!(parse_probability("Estimated Probability: 8.2e-1"), Some(0.82));
    }
}
