use funnelmd::core::grid::GridBounds;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected {expected} comma-separated numbers, got '{input}'.")]
    Arity { expected: usize, input: String },

    #[error("Invalid number '{0}'.")]
    Number(String),

    #[error("Bounds '{0}' must satisfy MIN_X < MAX_X and MIN_Y < MAX_Y.")]
    EmptyBounds(String),
}

fn parse_list<const N: usize>(input: &str) -> Result<[f64; N], ParseError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(ParseError::Arity {
            expected: N,
            input: input.to_string(),
        });
    }
    let mut values = [0.0; N];
    for (slot, part) in values.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::Number(part.to_string()))?;
    }
    Ok(values)
}

/// Parses `MIN_X,MAX_X,MIN_Y,MAX_Y`.
pub fn parse_bounds(input: &str) -> Result<GridBounds, ParseError> {
    let [min_x, max_x, min_y, max_y] = parse_list::<4>(input)?;
    let bounds = GridBounds::new(min_x, max_x, min_y, max_y);
    bounds
        .validate()
        .map_err(|_| ParseError::EmptyBounds(input.to_string()))?;
    Ok(bounds)
}

/// Parses `X,Y,Z`.
pub fn parse_point(input: &str) -> Result<[f64; 3], ParseError> {
    parse_list::<3>(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accept_whitespace_and_negatives() {
        assert_eq!(
            parse_bounds(" -12, 12 ,-6,6").unwrap(),
            GridBounds::new(-12.0, 12.0, -6.0, 6.0)
        );
    }

    #[test]
    fn bounds_with_wrong_arity_are_rejected() {
        assert_eq!(
            parse_bounds("1,2,3").unwrap_err(),
            ParseError::Arity {
                expected: 4,
                input: "1,2,3".to_string()
            }
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(matches!(
            parse_bounds("1,-1,0,1").unwrap_err(),
            ParseError::EmptyBounds(_)
        ));
    }

    #[test]
    fn point_rejects_non_numbers() {
        assert_eq!(
            parse_point("1,abc,2").unwrap_err(),
            ParseError::Number("abc".to_string())
        );
        assert!(parse_point("1,nan,2").is_err());
        assert_eq!(parse_point("0.5,-1,2e-2").unwrap(), [0.5, -1.0, 0.02]);
    }
}
