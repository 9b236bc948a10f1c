use dsh::{shell, signals, utils};
use std::env;

fn main() {
    // Parse command-line arguments.
    let args: Vec<String> = env::args().collect();
    let mut emit_prompt = true;
    let mut verbose = false;
    for arg in &args[1..] {
        match arg.as_str() {
            "-h" => utils::print_usage(),
            "-v" => verbose = true,
            "-p" => emit_prompt = false,
            _ => {}
        }
    }

    // Install the process-wide signal dispositions, once, before any command
    // is dispatched. Children inherit them at fork.
    if let Err(err) = signals::install() {
        utils::fatal(&err.to_string());
    }

    // Run the main shell loop with the options.
    shell::run_shell(emit_prompt, verbose);
}
