use crate::cli::{
    args::LookupArgs,
    config::{load_table, read_input, resolve_codepoints},
    global::GlobalArgs,
};
use serde::Serialize;
use utf8_lookup::{CharsetRegistry, LookupResult, LookupTable, OwnedTable, next_codepoint};

/// One resolved code point as printed
#[derive(Debug, Serialize)]
struct Row {
    position: usize,
    codepoint: u32,
    offset: u32,
}

pub fn handle(
    args: LookupArgs,
    global: &GlobalArgs,
    config: &CharsetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let owned = match &args.table {
        Some(path) => load_table(path, global)?,
        None => OwnedTable::build(&resolve_codepoints(&args.source, global, config)?)?,
    };

    let input = match &args.text {
        Some(text) => text.as_bytes().to_vec(),
        None => read_input(args.file.as_deref(), global)?,
    };

    let batch_size = args.batch_size.unwrap_or(config.settings.batch_size()).max(1);
    let (rows, consumed) = resolve_all(owned.table(), &input, batch_size);

    if consumed < input.len() && !global.quiet {
        eprintln!(
            "Stopped at byte {} of {} (NUL byte or truncated sequence)",
            consumed,
            input.len()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!("{}\tU+{:04X}\t{}", row.position, row.codepoint, row.offset);
    }

    Ok(())
}

/// Resolve `input` in batches of `batch_size`, returning rows and bytes consumed.
fn resolve_all(table: LookupTable<'_>, input: &[u8], batch_size: usize) -> (Vec<Row>, usize) {
    let mut results = vec![LookupResult::default(); batch_size];
    let mut rows = Vec::new();
    let mut base = 0;

    loop {
        let progress = table.lookup_into(&input[base..], &mut results);

        for result in &results[..progress.written] {
            let position = base + result.position;
            let codepoint = next_codepoint(&input[position..]).map_or(0, |(cp, _)| cp);
            rows.push(Row {
                position,
                codepoint,
                offset: result.offset,
            });
        }

        base += progress.consumed;
        if progress.written < results.len() {
            break;
        }
    }

    tracing::debug!(rows = rows.len(), consumed = base, batch_size, "lookup finished");
    (rows, base)
}
