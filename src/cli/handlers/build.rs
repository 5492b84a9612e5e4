use crate::cli::{args::BuildArgs, config::resolve_codepoints, global::GlobalArgs};
use std::fs;
use std::io::{self, IsTerminal, Write};
use utf8_lookup::{CharsetRegistry, OwnedTable};

pub fn handle(
    args: BuildArgs,
    global: &GlobalArgs,
    config: &CharsetRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let codepoints = resolve_codepoints(&args.source, global, config)?;
    let table = OwnedTable::build(&codepoints)?;
    let stats = table.table().stats();

    match &args.output {
        Some(output_path) => {
            fs::write(output_path, table.as_bytes())?;
            if !global.quiet {
                eprintln!(
                    "Wrote {} ({} code points, {} nodes, {} bytes)",
                    output_path.display(),
                    codepoints.len(),
                    stats.item_count,
                    stats.byte_len
                );
            }
        }
        None => {
            let mut stdout = io::stdout();
            if stdout.is_terminal() {
                return Err("Refusing to write a binary table to a terminal. Use -o FILE or redirect stdout.".into());
            }
            stdout.write_all(table.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
