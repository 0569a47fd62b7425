//! Genre name resolution
//!
//! ID3 tags may store genres as numeric ID3v1 codes, either bare (`"17"`)
//! or in the ID3v2.3 parenthesised form (`"(17)(4)Eurodisco"`). Codes are
//! resolved through the ID3v1 table with the Winamp extensions.

use super::separators::Separators;

/// ID3v1 genres 0-79 plus the Winamp extensions 80-191
const ID3V1_GENRES: [&str; 192] = [
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop",
    "Jazz", "Metal", "New Age", "Oldies", "Other", "Pop", "R&B", "Rap",
    "Reggae", "Rock", "Techno", "Industrial", "Alternative", "Ska", "Death Metal", "Pranks",
    "Soundtrack", "Euro-Techno", "Ambient", "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance",
    "Classical", "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise",
    "AlternRock", "Bass", "Soul", "Punk", "Space", "Meditative", "Instrumental Pop", "Instrumental Rock",
    "Ethnic", "Gothic", "Darkwave", "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance", "Dream",
    "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap", "Pop/Funk", "Jungle",
    "Native American", "Cabaret", "New Wave", "Psychedelic", "Rave", "Showtunes", "Trailer", "Lo-Fi",
    "Tribal", "Acid Punk", "Acid Jazz", "Polka", "Retro", "Musical", "Rock & Roll", "Hard Rock",
    "Folk", "Folk-Rock", "National Folk", "Swing", "Fast Fusion", "Bebop", "Latin", "Revival",
    "Celtic", "Bluegrass", "Avantgarde", "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock", "Slow Rock",
    "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera",
    "Chamber Music", "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire", "Slow Jam",
    "Club", "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul", "Freestyle",
    "Duet", "Punk Rock", "Drum Solo", "A Cappella", "Euro-House", "Dance Hall", "Goa", "Drum & Bass",
    "Club-House", "Hardcore", "Terror", "Indie", "BritPop", "Afro-Punk", "Polsk Punk", "Beat",
    "Christian Gangsta Rap", "Heavy Metal", "Black Metal", "Crossover", "Contemporary Christian", "Christian Rock", "Merengue", "Salsa",
    "Thrash Metal", "Anime", "JPop", "Synthpop", "Abstract", "Art Rock", "Baroque", "Bhangra",
    "Big Beat", "Breakbeat", "Chillout", "Downtempo", "Dub", "EBM", "Eclectic", "Electro",
    "Electroclash", "Emo", "Experimental", "Garage", "Global", "IDM", "Illbient", "Industro-Goth",
    "Jam Band", "Krautrock", "Leftfield", "Lounge", "Math Rock", "New Romantic", "Nu-Breakz", "Post-Punk",
    "Post-Rock", "Psytrance", "Shoegaze", "Space Rock", "Trop Rock", "World Music", "Neoclassical", "Audiobook",
    "Audio Theatre", "Neue Deutsche Welle", "Podcast", "Indie Rock", "G-Funk", "Dubstep", "Garage Rock", "Psybient",
];

/// Name for a single ID3v1 code (`"17"`, `"RX"`, `"CR"`)
fn code_name(code: &str) -> Option<&'static str> {
    match code {
        "RX" => Some("Remix"),
        "CR" => Some("Cover"),
        _ if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) => code
            .parse::<usize>()
            .ok()
            .and_then(|index| ID3V1_GENRES.get(index).copied()),
        _ => None,
    }
}

/// Parse the ID3v2.3 `(code)(code)refinement` form; `None` if it has no codes
fn parse_parenthesised(value: &str) -> Option<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = value;

    // "((" starts literal text in ID3v2.3
    while rest.starts_with('(') && !rest.starts_with("((") {
        let Some(close) = rest.find(')') else {
            break;
        };
        let Some(name) = code_name(&rest[1..close]) else {
            break;
        };
        names.push(name.to_string());
        rest = &rest[close + 1..];
    }

    if names.is_empty() {
        return None;
    }

    let text = rest.strip_prefix('(').filter(|_| rest.starts_with("((")).unwrap_or(rest).trim();
    if !text.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(text)) {
        names.push(text.to_string());
    }
    Some(names)
}

/// Genre names of one song: codes resolved, then separators applied
pub fn resolve_genre_names(values: &[String], separators: &Separators) -> Vec<String> {
    if let [single] = values {
        let single = single.trim();
        if let Some(name) = code_name(single) {
            return vec![name.to_string()];
        }
        if let Some(names) = parse_parenthesised(single) {
            return names;
        }
        return separators.split(values);
    }

    values
        .iter()
        .map(|value| {
            let value = value.trim();
            code_name(value).map(str::to_string).unwrap_or_else(|| value.to_string())
        })
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(values: &[&str], separators: &str) -> Vec<String> {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        resolve_genre_names(&values, &Separators::parse(separators))
    }

    #[test]
    fn test_table_endpoints() {
        assert_eq!(code_name("0"), Some("Blues"));
        assert_eq!(code_name("17"), Some("Rock"));
        assert_eq!(code_name("67"), Some("Psychedelic"));
        assert_eq!(code_name("133"), Some("Afro-Punk"));
        assert_eq!(code_name("191"), Some("Psybient"));
        assert_eq!(code_name("192"), None);
        assert_eq!(code_name("-1"), None);
    }

    #[test]
    fn test_bare_codes() {
        assert_eq!(resolve(&["17"], ""), vec!["Rock"]);
        assert_eq!(resolve(&["RX"], ""), vec!["Remix"]);
        assert_eq!(resolve(&["CR"], ""), vec!["Cover"]);
    }

    #[test]
    fn test_parenthesised_codes_with_refinement() {
        assert_eq!(resolve(&["(17)"], ""), vec!["Rock"]);
        assert_eq!(resolve(&["(17)(4)Eurodisco"], ""), vec!["Rock", "Disco", "Eurodisco"]);
        assert_eq!(resolve(&["(17)Rock"], ""), vec!["Rock"]);
    }

    #[test]
    fn test_double_paren_is_literal_text() {
        assert_eq!(resolve(&["(17)((Live)"], ""), vec!["Rock", "(Live)"]);
    }

    #[test]
    fn test_plain_names_use_separators() {
        assert_eq!(resolve(&["Rock; Pop"], ";"), vec!["Rock", "Pop"]);
        assert_eq!(resolve(&["(Live) Rock"], ""), vec!["(Live) Rock"]);
    }

    #[test]
    fn test_multi_value_lists_resolve_each_code() {
        assert_eq!(resolve(&["8", "Fusion", " "], ";"), vec!["Jazz", "Fusion"]);
    }
}
