use std::fmt;

/// Errors raised while sizing, building or loading a lookup table.
///
/// A code point missing from a table is not an error: lookups report it as
/// offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The output buffer cannot hold the table for this code point set
    BufferTooSmall { required: usize, actual: usize },
    /// A code point above U+10FFFF was passed in
    InvalidCodePoint { codepoint: u32, index: usize },
    /// Code points must be strictly increasing (sorted, no duplicates)
    UnsortedCodePoints { index: usize },
    /// More code points than a 16-bit offset can address
    TooManyCodePoints { count: usize },
    /// More trie nodes than a 16-bit offset can address
    TooManyNodes { count: usize },
    /// The bytes handed to `LookupTable::from_bytes` are not a table
    MalformedTable { reason: String },
}

impl TableError {
    /// Create a MalformedTable error
    pub fn malformed(reason: impl Into<String>) -> Self {
        TableError::MalformedTable {
            reason: reason.into(),
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            TableError::BufferTooSmall { required, .. } => Some(format!(
                "size the buffer with compute_table_size ({} bytes for this set)",
                required
            )),
            TableError::UnsortedCodePoints { .. } => {
                Some("sort the code points and remove duplicates before building".to_string())
            }
            TableError::TooManyCodePoints { .. } | TableError::TooManyNodes { .. } => {
                Some("split the set across several tables".to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let use_color = should_use_color();

        let message = match self {
            TableError::BufferTooSmall { required, actual } => format!(
                "table buffer too small: {} bytes required, {} bytes given",
                required, actual
            ),
            TableError::InvalidCodePoint { codepoint, index } => format!(
                "code point 0x{:X} at index {} is outside U+0000..U+10FFFF",
                codepoint, index
            ),
            TableError::UnsortedCodePoints { index } => format!(
                "code points are not strictly increasing at index {}",
                index
            ),
            TableError::TooManyCodePoints { count } => format!(
                "{} code points exceed the table limit of {}",
                count,
                u16::MAX
            ),
            TableError::TooManyNodes { count } => format!(
                "{} trie nodes exceed the table limit of {}",
                count,
                u16::MAX as usize + 1
            ),
            TableError::MalformedTable { reason } => format!("malformed table: {}", reason),
        };

        if use_color {
            write!(f, "\x1b[1;31merror:\x1b[0m {}", message)?;
        } else {
            write!(f, "error: {}", message)?;
        }

        if let Some(hint) = self.hint() {
            writeln!(f)?;
            if use_color {
                write!(f, "\x1b[1;36mhint:\x1b[0m {}", hint)?;
            } else {
                write!(f, "hint: {}", hint)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for TableError {}

/// Check if colored output should be used
fn should_use_color() -> bool {
    // Respect NO_COLOR environment variable
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}

/// Error when a charset is not found in the registry
#[derive(Debug)]
pub struct CharsetNotFoundError {
    pub name: String,
    pub suggestion: Option<String>,
}

impl CharsetNotFoundError {
    pub fn new(name: impl Into<String>, suggestion: Option<String>) -> Self {
        Self {
            name: name.into(),
            suggestion,
        }
    }

    /// Build the error, suggesting the closest known name if one is near.
    pub fn with_candidates<'a>(
        name: impl Into<String>,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let name = name.into();
        let suggestion = find_closest(&name, candidates).map(str::to_string);
        Self::new(name, suggestion)
    }
}

impl fmt::Display for CharsetNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let use_color = should_use_color();

        if use_color {
            writeln!(f, "\x1b[1;31merror:\x1b[0m charset '{}' not found", self.name)?;
        } else {
            writeln!(f, "error: charset '{}' not found", self.name)?;
        }

        writeln!(f)?;

        if let Some(suggestion) = &self.suggestion {
            if use_color {
                writeln!(f, "\x1b[1;36mhint:\x1b[0m did you mean '{}'?", suggestion)?;
            } else {
                writeln!(f, "hint: did you mean '{}'?", suggestion)?;
            }
        }

        if use_color {
            write!(
                f,
                "      run \x1b[1m`utf8-lookup config list`\x1b[0m to see all charsets"
            )?;
        } else {
            write!(f, "      run `utf8-lookup config list` to see all charsets")?;
        }

        Ok(())
    }
}

impl std::error::Error for CharsetNotFoundError {}

/// Closest candidate within an edit distance of 3, if any.
fn find_closest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|c| (c, levenshtein_distance(name, c)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for (i, c1) in s1.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, c2) in s2.chars().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}
