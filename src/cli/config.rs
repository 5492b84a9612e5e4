use crate::cli::{args::SourceArgs, global::GlobalArgs};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use utf8_lookup::{CharsetRegistry, MAX_CODEPOINT, OwnedTable};

/// Read a file or stdin, honouring `--max-size` and `--force`.
pub fn read_input(file: Option<&Path>, global: &GlobalArgs) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(file_path) = file {
        // Check file size if max_size is set
        if global.max_size > 0 {
            let file_size = fs::metadata(file_path)?.len() as usize;

            if file_size > global.max_size {
                if global.force {
                    if !global.quiet {
                        eprintln!(
                            "Warning: Processing large file ({} bytes, limit: {} bytes)",
                            file_size, global.max_size
                        );
                    }
                } else {
                    return Err(format!(
                        "File size ({} bytes) exceeds limit ({} bytes). Use --force to process anyway.",
                        file_size, global.max_size
                    )
                    .into());
                }
            }
        }

        return Ok(fs::read(file_path)?);
    }

    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;

    if global.max_size > 0 && buffer.len() > global.max_size {
        return Err(format!(
            "Input size ({} bytes) exceeds maximum ({} bytes). Use --file with --force for large inputs.",
            buffer.len(),
            global.max_size
        )
        .into());
    }

    Ok(buffer)
}

/// Collect the sorted, deduplicated code point set named by `source`.
pub fn resolve_codepoints(
    source: &SourceArgs,
    global: &GlobalArgs,
    config: &CharsetRegistry,
) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    let mut codepoints = Vec::new();

    let charset = match &source.charset {
        Some(name) => Some(name.as_str()),
        None if source.is_empty() => Some(
            config
                .settings
                .default_charset
                .as_deref()
                .ok_or("No charset given and no default_charset configured. Use --charset, --chars or --range.")?,
        ),
        None => None,
    };

    if let Some(name) = charset {
        let charset = config.charset(name)?;
        codepoints.extend(charset.codepoints().map_err(|e| format!("Invalid charset '{}': {}", name, e))?);
    }

    if let Some(chars) = &source.chars {
        codepoints.extend(chars.chars().map(u32::from));
    }

    for &(low, high) in &source.ranges {
        codepoints.extend(low..=high);
    }

    if let Some(path) = &source.from_file {
        let bytes = read_input(Some(path), global)?;
        let text = String::from_utf8(bytes).map_err(|_| format!("{} is not valid UTF-8", path.display()))?;
        codepoints.extend(text.chars().map(u32::from));
    }

    codepoints.sort_unstable();
    codepoints.dedup();
    tracing::info!(codepoints = codepoints.len(), "resolved code point set");
    Ok(codepoints)
}

/// Load and validate a table file.
pub fn load_table(path: &Path, global: &GlobalArgs) -> Result<OwnedTable, Box<dyn std::error::Error>> {
    let bytes = read_input(Some(path), global)?;
    Ok(OwnedTable::from_bytes(bytes)?)
}

/// Parse `LOW-HIGH` or a single value. Values are decimal, or hex with a
/// `0x` or `U+` prefix.
pub fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let (low, high) = match s.split_once('-') {
        Some((low, high)) => (parse_codepoint(low)?, parse_codepoint(high)?),
        None => {
            let value = parse_codepoint(s)?;
            (value, value)
        }
    };

    if low > high {
        return Err(format!("range {} is reversed", s));
    }
    if high > MAX_CODEPOINT {
        return Err(format!("U+{:X} exceeds maximum Unicode codepoint U+{:X}", high, MAX_CODEPOINT));
    }
    Ok((low, high))
}

fn parse_codepoint(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix("U+"))
        .or_else(|| s.strip_prefix("u+"));

    let parsed = match hex {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("'{}' is not a code point", s))
}
