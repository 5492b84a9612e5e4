use crate::cli::{args::InspectArgs, config::load_table, global::GlobalArgs};

pub fn handle(args: InspectArgs, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let owned = load_table(&args.path, global)?;
    let table = owned.table();
    let stats = table.stats();

    if args.json {
        let mut output = serde_json::to_value(stats)?;
        if args.entries {
            let entries: Vec<_> = table
                .entries()
                .into_iter()
                .map(|(codepoint, offset)| serde_json::json!({ "codepoint": codepoint, "offset": offset }))
                .collect();
            output["entries"] = serde_json::Value::Array(entries);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Table: {}", args.path.display());
    println!("  Size: {} bytes", stats.byte_len);
    println!("  Nodes: {} ({} populated)", stats.item_count, stats.populated_nodes);
    println!("  Code points: {}", stats.codepoints);

    if args.entries {
        for (codepoint, offset) in table.entries() {
            println!("U+{:04X}\t{}", codepoint, offset);
        }
    }

    Ok(())
}
