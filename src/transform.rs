use once_cell::sync::Lazy;
use regex::Regex;

static TRANSLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"translate\(([-\d.]+)[,\s]+([-\d.]+)\)").unwrap());
static NUMBER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

/// A 2D translation picked out of a `transform` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Extracts the first `translate(dx, dy)` from a transform string.
///
/// Anything else (missing attribute, empty string, `rotate`, `scale`,
/// `matrix`, a one-argument translate) yields a zero offset. The map assets
/// only position groups with two-argument translates.
pub fn parse_translate(transform: Option<&str>) -> Offset {
    let Some(transform) = transform else {
        return Offset::ZERO;
    };
    let Some(caps) = TRANSLATE_RE.captures(transform) else {
        return Offset::ZERO;
    };
    Offset {
        dx: parse_number_prefix(&caps[1]).unwrap_or(0.0),
        dy: parse_number_prefix(&caps[2]).unwrap_or(0.0),
    }
}

/// Reads the longest numeric prefix of `raw`, so `"12px"` is 12 and
/// `"1.5.2"` is 1.5. Returns `None` when no digits lead the string.
pub fn parse_number_prefix(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    let found = NUMBER_PREFIX_RE.find(raw)?;
    found.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_are_zero() {
        assert_eq!(parse_translate(None), Offset::ZERO);
        assert_eq!(parse_translate(Some("")), Offset::ZERO);
    }

    #[test]
    fn comma_separated_translate() {
        assert_eq!(parse_translate(Some("translate(10,20)")), Offset::new(10.0, 20.0));
    }

    #[test]
    fn space_separated_negative_fractional() {
        assert_eq!(
            parse_translate(Some("translate(-5.5 3.25)")),
            Offset::new(-5.5, 3.25)
        );
        assert_eq!(
            parse_translate(Some("translate(4, -0.5)")),
            Offset::new(4.0, -0.5)
        );
    }

    #[test]
    fn other_transforms_are_ignored() {
        assert_eq!(parse_translate(Some("rotate(45)")), Offset::ZERO);
        assert_eq!(parse_translate(Some("scale(2)")), Offset::ZERO);
        assert_eq!(parse_translate(Some("matrix(1 0 0 1 30 40)")), Offset::ZERO);
        assert_eq!(parse_translate(Some("translate(12)")), Offset::ZERO);
    }

    #[test]
    fn translate_mixed_with_rotation() {
        assert_eq!(
            parse_translate(Some("rotate(90) translate(3,4)")),
            Offset::new(3.0, 4.0)
        );
    }

    #[test]
    fn malformed_components_keep_numeric_prefix() {
        assert_eq!(parse_translate(Some("translate(1.5.2,7)")), Offset::new(1.5, 7.0));
        assert_eq!(parse_translate(Some("translate(-,7)")), Offset::new(0.0, 7.0));
    }

    #[test]
    fn number_prefix() {
        assert_eq!(parse_number_prefix("12px"), Some(12.0));
        assert_eq!(parse_number_prefix(" -3.5"), Some(-3.5));
        assert_eq!(parse_number_prefix(".5"), Some(0.5));
        assert_eq!(parse_number_prefix("1e2"), Some(100.0));
        assert_eq!(parse_number_prefix("abc"), None);
        assert_eq!(parse_number_prefix(""), None);
    }
}
