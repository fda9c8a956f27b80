//! The `run` command: load the module graph from an entry file and
//! execute it.

use hml_eval::Interpreter;

use crate::config::RunConfig;
use crate::loader::ModuleLoader;

/// Run a program, exiting with status 1 on any load or runtime error.
pub fn run_file(config: &RunConfig) {
    let mut interpreter = Interpreter::new().with_max_call_depth(config.max_call_depth);
    let mut loader = ModuleLoader::new(config);

    if let Err(err) = loader.run_entry(&config.entry, &mut interpreter) {
        for line in err.report() {
            eprintln!("{line}");
        }
        std::process::exit(1);
    }
}
