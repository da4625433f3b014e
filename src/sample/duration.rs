use crate::error::DurationError;

const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_MINUTE: f64 = 60.0;

/// Convert a CPU time token to milliseconds.
///
/// Accepts `H:MM:SS`, `MM:SS` or bare seconds. Every component is parsed as a
/// float so fractional seconds survive (`"0:00:00.5"` is 500ms). A component
/// that is not a finite number fails the whole token; no default is
/// substituted.
pub fn parse_duration(text: &str) -> Result<f64, DurationError> {
    let components = text
        .trim()
        .split(':')
        .map(parse_component)
        .collect::<Result<Vec<f64>, _>>()?;

    let seconds = match components.as_slice() {
        [h, m, s] => h * SECS_PER_HOUR + m * SECS_PER_MINUTE + s,
        [m, s] => m * SECS_PER_MINUTE + s,
        [s] => *s,
        other => return Err(DurationError::ComponentCount(other.len())),
    };

    let millis = seconds * 1000.0;
    if millis.is_finite() {
        Ok(millis)
    } else {
        Err(DurationError::InvalidComponent(text.to_string()))
    }
}

fn parse_component(component: &str) -> Result<f64, DurationError> {
    let trimmed = component.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DurationError::InvalidComponent(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_minutes_seconds() {
        assert_eq!(parse_duration("01:02:03"), Ok(3_723_000.0));
    }

    #[test]
    fn minutes_seconds() {
        assert_eq!(parse_duration("02:03"), Ok(123_000.0));
    }

    #[test]
    fn bare_seconds_keep_fraction() {
        assert_eq!(parse_duration("45.5"), Ok(45_500.0));
        assert_eq!(parse_duration("0:00:00.5"), Ok(500.0));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("   ").is_err());
    }

    #[test]
    fn any_bad_component_fails_the_token() {
        assert_eq!(
            parse_duration("00:xx:01"),
            Err(DurationError::InvalidComponent("xx".to_string()))
        );
        assert!(parse_duration("1::2").is_err());
        assert!(parse_duration("NaN").is_err());
        assert!(parse_duration("inf").is_err());
    }

    #[test]
    fn too_many_components() {
        assert_eq!(parse_duration("1:00:00:00"), Err(DurationError::ComponentCount(4)));
    }
}
