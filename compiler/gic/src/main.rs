//! gi: a Go-to-Lua REPL.

use std::io::{BufReader, IsTerminal, Read};

use gic::commands::{run_repl, translate_source, ReplOptions};
use gic::{parse_cli_options, render, IncrementalSession, SessionConfig};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    gic::init_tracing(options.verbosity);

    for flag in &options.unknown {
        eprintln!("warning: unknown flag '{flag}'");
    }

    if options.version {
        println!("gi {}", env!("CARGO_PKG_VERSION"));
        return;
    }
    if options.help {
        print_usage();
        return;
    }

    let config = options.session.with_env();

    match options.positional.first().map(String::as_str) {
        None => repl(config, options.quiet),
        Some("translate") => {
            let Some(path) = options.positional.get(1) else {
                eprintln!("Usage: gi translate <file.go>");
                std::process::exit(1);
            };
            translate(path, config);
        }
        Some("help") => print_usage(),
        Some("version") => println!("gi {}", env!("CARGO_PKG_VERSION")),
        Some(command) => {
            // A bare file path translates it.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("go"))
            {
                translate(command, config);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn repl(config: SessionConfig, quiet: bool) {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let options = ReplOptions {
        banner: !quiet && interactive,
        prompts: interactive,
    };

    let mut session = IncrementalSession::new(config);
    let mut out = std::io::stdout();
    let mut err = std::io::stderr();
    if let Err(e) = run_repl(&mut session, options, stdin.lock(), &mut out, &mut err) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn translate(path: &str, config: SessionConfig) {
    let source = read_source(path);
    match translate_source(&source, config) {
        Ok(lua) => print!("{lua}"),
        Err(e) => {
            eprintln!("{path}:{}", render(&e));
            std::process::exit(1);
        }
    }
}

/// Read `path`, or standard input for `-`.
fn read_source(path: &str) -> String {
    if path == "-" {
        let mut source = String::new();
        if let Err(e) = BufReader::new(std::io::stdin()).read_to_string(&mut source) {
            eprintln!("error reading standard input: {e}");
            std::process::exit(1);
        }
        return source;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("gi: translate Go to Lua, one construct at a time");
    println!();
    println!("Usage: gi [options] [command]");
    println!();
    println!("Commands:");
    println!("  (none)               Start the interactive shell");
    println!("  translate <file.go>  Translate a whole file ('-' reads stdin)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  -q, --quiet          No banner");
    println!("  --calc               Print every expression, calls included");
    println!("  --atomic             Undo all declarations of a failed construct");
    println!("  -v, -vv              More log output");
    println!("  -V, --version        Show version information");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Environment:");
    println!("  GI_CALC=1            Same as --calc");
    println!("  GI_LOG=<filter>      Log filter, e.g. gi_parse=debug (falls back to RUST_LOG)");
    println!("  GI_LOG_TREE=1        Log as indented span trees");
    println!();
    println!("Shell commands:");
    println!("  :help  :reset  :quit");
}
