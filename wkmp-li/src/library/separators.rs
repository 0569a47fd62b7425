//! Multi-value separator parsing
//!
//! Some taggers pack several artists or genres into a single value
//! (`"A; B"`). When the user configures separator characters, a list that
//! holds exactly one value is split on them. A backslash escapes the next
//! separator or backslash so `AC\/DC` survives a `/` separator.

/// Configured separator character set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Separators {
    chars: Vec<char>,
}

impl Separators {
    /// Every non-whitespace character of `chars` is a separator
    pub fn parse(chars: &str) -> Self {
        let mut set: Vec<char> = Vec::new();
        for c in chars.chars().filter(|c| !c.is_whitespace()) {
            if !set.contains(&c) {
                set.push(c);
            }
        }
        Self { chars: set }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn is_separator(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Trimmed, non-empty values; a single value is split on the separators
    pub fn split(&self, values: &[String]) -> Vec<String> {
        match values {
            [single] if !self.is_empty() => self.split_one(single),
            _ => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn split_one(&self, value: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.peek() {
                    Some(&next) if next == '\\' || self.is_separator(next) => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push(c),
                },
                c if self.is_separator(c) => parts.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        parts.push(current);

        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}
