//! Hemlock CLI
//!
//! Runs `.hml` programs and exposes the front end for debugging.

use hmlc::commands::{lex_file, parse_file, run_file, run_repl};
use hmlc::{init_tracing, RunConfig, EXTENSION};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        run_repl();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: hemlock run <file.hml> [--stdlib=<dir>] [--max-depth=<n>]");
                std::process::exit(1);
            }
            run_with_args(&args[2..]);
        }
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: hemlock parse <file.hml>");
                std::process::exit(1);
            }
            parse_file(&args[2]);
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: hemlock lex <file.hml>");
                std::process::exit(1);
            }
            lex_file(&args[2]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Hemlock {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // If it looks like a file path, try to run it
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
            {
                run_with_args(&args[1..]);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn run_with_args(args: &[String]) {
    match RunConfig::from_args(args) {
        Ok(config) => run_file(&config),
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!("Usage: hemlock run <file.hml> [--stdlib=<dir>] [--max-depth=<n>]");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Hemlock");
    println!();
    println!("Usage: hemlock <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.hml>       Run a Hemlock program");
    println!("  <file.hml>           Shorthand for run");
    println!("  repl                 Start an interactive session (default)");
    println!("  parse <file.hml>     Parse and display the syntax tree");
    println!("  lex <file.hml>       Tokenize and display tokens");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Run options:");
    println!("  --stdlib=<dir>       Standard library directory (or HEMLOCK_STDLIB)");
    println!("  --max-depth=<n>      Maximum call depth (default: 1000)");
    println!();
    println!("Environment:");
    println!("  RUST_LOG             Enable tracing, e.g. RUST_LOG=hmlc=debug");
    println!("  HEMLOCK_LOG_TREE     Show tracing output as a call tree");
    println!();
    println!("Examples:");
    println!("  hemlock run main.hml");
    println!("  hemlock main.hml --max-depth=5000");
    println!("  hemlock parse lib.hml");
}
