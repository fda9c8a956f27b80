//! Line-based REPL.
//!
//! One interpreter and one module scope live for the whole session, so
//! bindings persist between lines. Errors are reported and the session
//! continues.

use std::io::{BufRead, Write};

use hml_eval::{Environment, Flow, Interpreter, Value};
use hml_ir::StmtKind;
use hml_parse::parse;

const PROMPT: &str = "hemlock> ";

/// Read lines from stdin until `exit` or end of input.
pub fn run_repl() {
    println!("Hemlock {} REPL. Type `exit` to quit.", env!("CARGO_PKG_VERSION"));

    let mut interpreter = Interpreter::new();
    let env = interpreter.global_env().child();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{PROMPT}");
        let _ = std::io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            println!();
            break;
        };
        let line = line.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(value) = eval_line(&mut interpreter, &env, line) {
            println!("{value}");
        }
    }
}

/// Run one line. Returns the value of a trailing expression statement
/// when it is not `null`.
fn eval_line(interpreter: &mut Interpreter, env: &Environment, line: &str) -> Option<Value> {
    let result = parse(line);
    if result.has_errors() {
        for error in &result.errors {
            eprintln!("Parse error: {}", error.message);
        }
        return None;
    }

    let mut last = None;
    for stmt in &result.statements {
        match interpreter.exec_stmt(stmt, env) {
            Ok(Flow::Normal(value)) if matches!(stmt.kind, StmtKind::Expr(_)) => {
                last = Some(value);
            }
            Ok(Flow::Normal(_)) => last = None,
            Ok(Flow::Return(_)) => return None,
            Ok(Flow::Break | Flow::Continue) => {
                eprintln!("Runtime error: break or continue outside of a loop");
                return None;
            }
            Err(err) => {
                eprintln!("Runtime error: {}", err.message);
                return None;
            }
        }
    }
    last.filter(|value| !matches!(value, Value::Null))
}
