use super::duration::parse_duration;
use crate::error::DurationError;

/// Start and end CPU time tokens of one sample, both non-empty.
///
/// Tokens are not checked numerically here; [`SamplePair::to_durations`]
/// does that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePair<'a> {
    start: &'a str,
    end: &'a str,
}

impl<'a> SamplePair<'a> {
    pub fn new(start: &'a str, end: &'a str) -> Option<Self> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return None;
        }
        Some(Self { start, end })
    }

    /// Parse a `"<start> - <end>"` line. Text after a second `-` is ignored.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut parts = line.split('-');
        let start = parts.next()?;
        let end = parts.next()?;
        Self::new(start, end)
    }

    pub fn start(&self) -> &'a str {
        self.start
    }

    pub fn end(&self) -> &'a str {
        self.end
    }

    pub fn to_durations(&self) -> Result<DurationPair, DurationError> {
        Ok(DurationPair {
            start_ms: parse_duration(self.start)?,
            end_ms: parse_duration(self.end)?,
        })
    }
}

/// A sample converted to milliseconds. Only built from finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationPair {
    start_ms: f64,
    end_ms: f64,
}

impl DurationPair {
    /// CPU time consumed during the sample, as a percentage of `window_ms`.
    pub fn utilization(&self, window_ms: f64) -> f64 {
        (self.end_ms - self.start_ms).abs() / window_ms * 100.0
    }
}

/// Split raw sampler output into sample pairs, dropping incomplete lines.
///
/// Lines may be separated by real newlines or by a literal `\n` escape.
pub fn parse_samples(output: &str) -> impl Iterator<Item = SamplePair<'_>> + '_ {
    output
        .split("\\n")
        .flat_map(str::lines)
        .filter_map(SamplePair::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        let pair = SamplePair::parse("  0:00:01 -   0:00:02 ").unwrap();
        assert_eq!(pair.start(), "0:00:01");
        assert_eq!(pair.end(), "0:00:02");
    }

    #[test]
    fn incomplete_lines_are_dropped() {
        assert_eq!(SamplePair::parse("0:00:01"), None);
        assert_eq!(SamplePair::parse("0:00:01 - "), None);
        assert_eq!(SamplePair::parse(" - 0:00:01"), None);
        assert_eq!(SamplePair::parse(""), None);
    }

    #[test]
    fn unparsable_tokens_survive_structural_parse() {
        let pair = SamplePair::parse("abc - def").unwrap();
        assert!(pair.to_durations().is_err());
    }

    #[test]
    fn accepts_real_and_escaped_newlines() {
        let output = "0:01 - 0:02\n0:03 - 0:05\\n1 - 2\\n\n garbage \n";
        let pairs: Vec<_> = parse_samples(output).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2], SamplePair::new("1", "2").unwrap());
    }

    #[test]
    fn iteration_is_restartable() {
        let output = "1 - 2\n3 - 4";
        assert_eq!(parse_samples(output).count(), 2);
        assert_eq!(parse_samples(output).count(), 2);
    }

    #[test]
    fn utilization_is_absolute() {
        let pair = SamplePair::new("2", "1").unwrap().to_durations().unwrap();
        assert_eq!(pair.utilization(2000.0), 50.0);
    }
}
