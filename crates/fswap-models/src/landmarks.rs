//! Face landmark points and their provider wire encoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when decoding an encoded landmark string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandmarksParseError {
    #[error("empty landmark string")]
    Empty,

    #[error("malformed point `{0}`: expected `x,y`")]
    MalformedPoint(String),

    #[error("non-integer coordinate `{0}`")]
    BadCoordinate(String),
}

/// An ordered sequence of face landmark points.
///
/// Landmarks anchor a swap on a specific face. They are detected once per
/// run and the same values are reused verbatim for submission; the provider
/// expects integer pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    points: Vec<(i64, i64)>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<(i64, i64)>) -> Self {
        Self { points }
    }

    /// Build from floating-point coordinates, truncating toward zero.
    ///
    /// Detection returns sub-pixel floats; the wire format carries integers,
    /// so `10.9` becomes `10` and `-1.9` becomes `-1`.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|&(x, y)| (x.trunc() as i64, y.trunc() as i64))
                .collect(),
        }
    }

    pub fn points(&self) -> &[(i64, i64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encode in the provider's compact format: points joined by `:`, with
    /// `,` between coordinates, e.g. `"100,200:150,250"`.
    pub fn encode(&self) -> String {
        self.points
            .iter()
            .map(|(x, y)| format!("{},{}", x, y))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Decode the compact format back into points.
    pub fn parse(s: &str) -> Result<Self, LandmarksParseError> {
        if s.is_empty() {
            return Err(LandmarksParseError::Empty);
        }

        let mut points = Vec::new();
        for pair in s.split(':') {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| LandmarksParseError::MalformedPoint(pair.to_string()))?;
            let x = x
                .trim()
                .parse()
                .map_err(|_| LandmarksParseError::BadCoordinate(x.to_string()))?;
            let y = y
                .trim()
                .parse()
                .map_err(|_| LandmarksParseError::BadCoordinate(y.to_string()))?;
            points.push((x, y));
        }

        Ok(Self { points })
    }
}

impl fmt::Display for FaceLandmarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_format() {
        let lm = FaceLandmarks::new(vec![(100, 200), (150, 250), (125, 300)]);
        assert_eq!(lm.encode(), "100,200:150,250:125,300");
    }

    #[test]
    fn test_encode_single_point_has_no_separator() {
        let lm = FaceLandmarks::new(vec![(42, 7)]);
        assert_eq!(lm.encode(), "42,7");
    }

    #[test]
    fn test_from_points_truncates_toward_zero() {
        let lm = FaceLandmarks::from_points(&[(10.9, 20.1), (-1.9, -0.5)]);
        assert_eq!(lm.points(), &[(10, 20), (-1, 0)]);
        assert_eq!(lm.encode(), "10,20:-1,0");
    }

    #[test]
    fn test_parse_round_trip() {
        let original = FaceLandmarks::new(vec![(1, 2), (3, 4)]);
        let parsed = FaceLandmarks::parse(&original.encode()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(FaceLandmarks::parse(""), Err(LandmarksParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_malformed_point() {
        assert!(matches!(
            FaceLandmarks::parse("1,2:34"),
            Err(LandmarksParseError::MalformedPoint(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        assert!(matches!(
            FaceLandmarks::parse("1,2:x,4"),
            Err(LandmarksParseError::BadCoordinate(_))
        ));
    }

    #[test]
    fn test_empty_landmarks() {
        let lm = FaceLandmarks::new(vec![]);
        assert!(lm.is_empty());
        assert_eq!(lm.encode(), "");
    }
}
