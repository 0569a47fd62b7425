//! List encoding for cache columns
//!
//! A list is stored as one string: values joined by `;`, with `\` escaping
//! a literal `;` or `\` inside a value.

const DELIMITER: char = ';';
const ESCAPE: char = '\\';

/// Join values into a single column; empty lists are `None` (SQL NULL)
pub fn join_escaped(values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }

    let mut joined = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            joined.push(DELIMITER);
        }
        for c in value.chars() {
            if c == DELIMITER || c == ESCAPE {
                joined.push(ESCAPE);
            }
            joined.push(c);
        }
    }
    Some(joined)
}

/// Inverse of [`join_escaped`]
pub fn split_escaped(column: Option<&str>) -> Vec<String> {
    let Some(column) = column else {
        return Vec::new();
    };

    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = column.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(next) => current.push(next),
                // Dangling escape at end of column
                None => current.push(ESCAPE),
            },
            DELIMITER => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_list_is_null() {
        assert_eq!(join_escaped(&[]), None);
        assert!(split_escaped(None).is_empty());
    }

    #[test]
    fn test_delimiter_and_escape_are_escaped() {
        let values = strings(&["AC;DC", "back\\slash", "plain"]);
        let joined = join_escaped(&values).unwrap();
        assert_eq!(joined, r"AC\;DC;back\\slash;plain");
        assert_eq!(split_escaped(Some(&joined)), values);
    }

    #[test]
    fn test_single_empty_value_survives() {
        let values = strings(&[""]);
        assert_eq!(split_escaped(join_escaped(&values).as_deref()), values);
    }

    #[test]
    fn test_dangling_escape_is_literal() {
        assert_eq!(split_escaped(Some("abc\\")), strings(&["abc\\"]));
    }
}
