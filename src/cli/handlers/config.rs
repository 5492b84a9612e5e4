use crate::cli::{args::ConfigAction, global::GlobalArgs};
use utf8_lookup::{CharsetRegistry, compute_table_size};

/// Characters shown in previews
const PREVIEW_LEN: usize = 20;

pub fn handle(
    action: ConfigAction,
    _global: &GlobalArgs,
    config: &CharsetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List { json } => handle_list(json, config),
        ConfigAction::Show { charset } => handle_show(&charset, config),
    }
}

fn handle_list(json: bool, config: &CharsetRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let names = config.names();

    if json {
        let charsets: Vec<_> = names
            .iter()
            .filter_map(|&name| {
                let charset = config.get_charset(name)?;
                Some(serde_json::json!({
                    "name": name,
                    "description": charset.description,
                    "codepoints": charset.codepoints().map(|c| c.len()).ok(),
                }))
            })
            .collect();
        let output = serde_json::json!({
            "charsets": charsets,
            "default": config.settings.default_charset,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Charsets: {} available\n", names.len());
    for name in names {
        let Some(charset) = config.get_charset(name) else {
            continue;
        };
        let count = charset
            .codepoints()
            .map(|c| c.len().to_string())
            .unwrap_or_else(|_| "invalid".to_string());
        let marker = if config.settings.default_charset.as_deref() == Some(name) { "*" } else { " " };
        println!(
            "{} {:<15} {:>6}  {}",
            marker,
            name,
            count,
            charset.description.as_deref().unwrap_or("")
        );
    }
    println!("\nUse 'config show NAME' for details, --json for structured output");

    Ok(())
}

fn handle_show(name: &str, config: &CharsetRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let charset = config.charset(name)?;
    let codepoints = charset
        .codepoints()
        .map_err(|e| format!("Invalid charset '{}': {}", name, e))?;

    println!("Charset: {}", name);
    if let Some(description) = &charset.description {
        println!("  Description: {}", description);
    }
    println!("  Code points: {}", codepoints.len());
    for &[low, high] in &charset.ranges {
        println!("  Range: U+{:04X}..U+{:04X}", low, high);
    }

    let preview: String = codepoints
        .iter()
        .filter_map(|&cp| char::from_u32(cp))
        .filter(|c| !c.is_control())
        .take(PREVIEW_LEN)
        .collect();
    let suffix = if codepoints.len() > PREVIEW_LEN { "..." } else { "" };
    println!("  Preview: {}{}", preview, suffix);

    match compute_table_size(&codepoints) {
        Ok(size) => println!("  Table size: {} bytes", size),
        Err(_) => println!("  Table size: too large for a single table"),
    }

    Ok(())
}
