//! Disc and release-type metadata

use serde::Serialize;

/// Disc number with its optional subtitle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Disc {
    pub number: u32,
    pub name: Option<String>,
}

/// Secondary qualifier of a primary release type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Refinement {
    Live,
    Remix,
}

/// Release type following MusicBrainz primary/secondary types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReleaseType {
    Album(Option<Refinement>),
    Ep(Option<Refinement>),
    Single(Option<Refinement>),
    Compilation(Option<Refinement>),
    Soundtrack,
    Mix,
    Mixtape,
    Demo,
}

impl Default for ReleaseType {
    fn default() -> Self {
        ReleaseType::Album(None)
    }
}

impl ReleaseType {
    /// Parse the raw release-type values, e.g. `["album", "live"]`.
    ///
    /// The first value is the primary type; the next one (if any) is the
    /// secondary type. Unrecognised primary types are treated as secondary
    /// types of an album, so `["compilation"]` and `["soundtrack"]` work
    /// without a primary type. Empty input is a plain album.
    pub fn parse(types: &[String]) -> Self {
        let Some(primary) = types.first() else {
            return Self::default();
        };

        if primary.eq_ignore_ascii_case("album") {
            parse_secondary(types, 1, ReleaseType::Album)
        } else if primary.eq_ignore_ascii_case("ep") {
            parse_secondary(types, 1, ReleaseType::Ep)
        } else if primary.eq_ignore_ascii_case("single") {
            parse_secondary(types, 1, ReleaseType::Single)
        } else {
            parse_secondary(types, 0, ReleaseType::Album)
        }
    }

    pub fn refinement(&self) -> Option<Refinement> {
        match self {
            ReleaseType::Album(r)
            | ReleaseType::Ep(r)
            | ReleaseType::Single(r)
            | ReleaseType::Compilation(r) => *r,
            _ => None,
        }
    }
}

fn parse_secondary(
    types: &[String],
    index: usize,
    convert: fn(Option<Refinement>) -> ReleaseType,
) -> ReleaseType {
    let Some(secondary) = types.get(index) else {
        return convert(None);
    };

    if secondary.eq_ignore_ascii_case("compilation") {
        // A compilation may itself be live or a remix collection
        ReleaseType::Compilation(parse_refinement(types.get(index + 1)))
    } else if secondary.eq_ignore_ascii_case("soundtrack") {
        ReleaseType::Soundtrack
    } else if secondary.eq_ignore_ascii_case("mixtape/street") {
        ReleaseType::Mixtape
    } else if secondary.eq_ignore_ascii_case("dj-mix") {
        ReleaseType::Mix
    } else if secondary.eq_ignore_ascii_case("demo") {
        ReleaseType::Demo
    } else {
        convert(parse_refinement(Some(secondary)))
    }
}

fn parse_refinement(value: Option<&String>) -> Option<Refinement> {
    let value = value?;
    if value.eq_ignore_ascii_case("live") {
        Some(Refinement::Live)
    } else if value.eq_ignore_ascii_case("remix") {
        Some(Refinement::Remix)
    } else {
        None
    }
}
