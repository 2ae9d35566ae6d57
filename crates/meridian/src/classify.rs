//! Free-text query classification.
//!
//! [`classify`] decides which structured query variant a piece of raw input
//! belongs to. It is a pure function of the text: no I/O, no configuration,
//! deterministic. Priority order is NTS grid reference, then postal
//! code/FSA, then coordinate pair, then generic place name; the first match
//! wins, so text that could structurally satisfy more than one pattern is
//! always an NTS reference first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    model::GeoPoint,
    query::{
        ClassifiedQuery, CoordinateNotation, CoordinateQuery, FsaQuery, NameQuery, NtsQuery,
        QueryKind,
    },
};

/// Sheet (2-3 digits) + map-unit subdivision (A-P) + optional map-sheet
/// unit. Units run 01-16; the range is checked numerically after the match.
static NTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2,3})([A-P])(\d{2})?$").expect("NTS pattern"));

/// Forward sortation area + optional local delivery unit. The first letter
/// alphabet excludes D, F, I, O, Q, U, W and Z, which Canada Post does not
/// assign.
static POSTAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ABCEGHJKLMNPRSTVXY]\d[A-Z])\s*(\d[A-Z]\d)?$").expect("postal pattern")
});

/// `lat, lon` in decimal degrees. Ranges are validated after the match.
static DECIMAL_DEGREES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?\d{1,3}(?:\.\d+)?)\s*[,;\s]\s*([+-]?\d{1,3}(?:\.\d+)?)$")
        .expect("decimal-degree pattern")
});

/// `deg min sec, deg min sec` triplets.
static DMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([+-]?\d{1,2})\s+(\d{1,2})\s+(\d{1,2}(?:\.\d+)?)\s*[,;\s]\s*([+-]?\d{1,3})\s+(\d{1,2})\s+(\d{1,2}(?:\.\d+)?)$",
    )
    .expect("degree-minute-second pattern")
});

/// Classify raw input into a concrete query variant.
///
/// ```rust
/// use meridian::{classify, QueryOrigin};
///
/// assert_eq!(classify("064D02").origin(), QueryOrigin::Nts);
/// assert_eq!(classify("L5L 2R7").origin(), QueryOrigin::Fsa);
/// assert_eq!(classify("45.4, -75.7").origin(), QueryOrigin::Coordinate);
/// assert_eq!(classify("Milton").origin(), QueryOrigin::Generic);
/// ```
pub fn classify(raw_text: &str) -> ClassifiedQuery {
    let trimmed = raw_text.trim();

    if let Some(kind) = match_nts(trimmed)
        .or_else(|| match_postal(trimmed))
        .or_else(|| match_coordinates(trimmed))
    {
        return ClassifiedQuery::new(raw_text, kind);
    }

    ClassifiedQuery::new(raw_text, QueryKind::Generic(NameQuery::from_raw(trimmed)))
}

fn match_nts(text: &str) -> Option<QueryKind> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    let captures = NTS_RE.captures(&compact)?;

    let sheet = captures.get(1).map(|m| m.as_str())?;
    let subdivision = captures.get(2).map(|m| m.as_str())?;
    let unit = captures.get(3).map(|m| m.as_str());

    // map-sheet units run 01-16; anything else is not a grid reference
    if let Some(unit) = unit {
        let n: u8 = unit.parse().ok()?;
        if !(1..=16).contains(&n) {
            return None;
        }
    }

    Some(QueryKind::Nts(NtsQuery::from_parts(sheet, subdivision, unit)))
}

fn match_postal(text: &str) -> Option<QueryKind> {
    let upper = text.to_uppercase();
    let captures = POSTAL_RE.captures(upper.trim())?;

    let fsa = captures.get(1).map(|m| m.as_str())?;
    let unit = captures.get(2).map(|m| m.as_str());

    Some(QueryKind::Fsa(FsaQuery::from_parts(fsa, unit)))
}

fn match_coordinates(text: &str) -> Option<QueryKind> {
    if let Some(captures) = DECIMAL_DEGREES_RE.captures(text) {
        let latitude: f64 = captures.get(1)?.as_str().parse().ok()?;
        let longitude: f64 = captures.get(2)?.as_str().parse().ok()?;
        let point = GeoPoint::new(latitude, longitude).ok()?;
        return Some(QueryKind::Coordinate(CoordinateQuery::new(
            point,
            CoordinateNotation::DecimalDegrees,
        )));
    }

    if let Some(captures) = DMS_RE.captures(text) {
        let latitude = dms_component(&captures, 1)?;
        let longitude = dms_component(&captures, 4)?;
        let point = GeoPoint::new(latitude, longitude).ok()?;
        return Some(QueryKind::Coordinate(CoordinateQuery::new(
            point,
            CoordinateNotation::DegreesMinutesSeconds,
        )));
    }

    None
}

/// Convert one `deg min sec` triplet starting at capture `base` to decimal
/// degrees. The sign comes from the degree component's text so `-0 30 0`
/// keeps its direction.
fn dms_component(captures: &regex::Captures<'_>, base: usize) -> Option<f64> {
    let degrees_str = captures.get(base)?.as_str();
    let degrees: f64 = degrees_str.parse().ok()?;
    let minutes: f64 = captures.get(base + 1)?.as_str().parse().ok()?;
    let seconds: f64 = captures.get(base + 2)?.as_str().parse().ok()?;

    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }

    let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    Some(if degrees_str.starts_with('-') {
        -magnitude
    } else {
        magnitude
    })
}
