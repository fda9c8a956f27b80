//! Debug commands: `parse` and `lex` for inspecting the front end.

use hml_ir::line_col;
use hml_lexer::lex;
use hml_parse::parse;

use super::read_file;

/// Parse a file and display the statements or the errors.
pub fn parse_file(path: &str) {
    let content = read_file(path);
    let result = parse(&content);

    println!("Parse result for '{path}':");
    println!("  Statements: {}", result.statements.len());
    println!("  Errors: {}", result.errors.len());

    if !result.statements.is_empty() {
        println!();
        println!("Statements:");
        for stmt in &result.statements {
            println!("{stmt:#?}");
        }
    }

    if result.has_errors() {
        println!();
        println!("Errors:");
        for error in &result.errors {
            let (line, col) = line_col(&content, error.span.start);
            println!("  {line}:{col}: {}", error.message);
        }
        std::process::exit(1);
    }
}

/// Lex a file and display the token stream.
pub fn lex_file(path: &str) {
    let content = read_file(path);
    let toks = lex(&content);

    println!("Tokens for '{}' ({} tokens):", path, toks.len());
    for tok in &toks {
        println!("  {:?} @ {}", tok.kind, tok.span);
    }
}
