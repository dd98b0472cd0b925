//! Compile schema files and print their diagnostics.
//!
//! Usage:
//!   schemac [OPTIONS] [FILE ...]
//!   schemac < file.schema
//!
//! Diagnostics go to stdout in the `<file>:<line>: error near ``tok'': message`
//! format. Exit code 1 if any file produced a diagnostic or could not be read.
//!
//! Options:
//!   --dump, -d      Print the parsed declarations of each clean file
//!   --every-note    Repeat the dotted-name note after every dotted reference
//!
//! Logging goes to stderr; set `SCHEMAC_LOG` (e.g. `SCHEMAC_LOG=debug`) to enable it.

use std::io::{self, Read, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use wireschema::{compile, compile_file, dump, Compilation, CompileOptions};

fn init_logging() {
    let filter = EnvFilter::try_from_env("SCHEMAC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    if let Some(pos) = args.iter().position(|a| names.contains(&a.as_str())) {
        args.remove(pos);
        true
    } else {
        false
    }
}

/// Print `compilation`'s diagnostics (or its dump); returns whether it was clean.
fn report(out: &mut impl Write, compilation: &Compilation, dump_ast: bool) -> io::Result<bool> {
    out.write_all(compilation.render().as_bytes())?;
    if compilation.is_ok() && dump_ast {
        if let Some(schema) = &compilation.schema {
            out.write_all(dump::render(schema).as_bytes())?;
        }
    }
    Ok(compilation.is_ok())
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let dump_ast = take_flag(&mut args, &["--dump", "-d"]);
    let every_note = take_flag(&mut args, &["--every-note"]);
    let options = CompileOptions {
        dotted_note_once: !every_note,
        ..CompileOptions::labelled("<stdin>")
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = false;

    if args.is_empty() {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        let compilation = compile(&src, &options);
        failed |= !report(&mut out, &compilation, dump_ast)?;
    } else {
        for path in &args {
            match compile_file(Path::new(path), &options) {
                Ok(compilation) => failed |= !report(&mut out, &compilation, dump_ast)?,
                Err(e) => {
                    eprintln!("{}", e);
                    failed = true;
                }
            }
        }
    }

    out.flush()?;
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
