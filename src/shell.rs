use crate::dispatch::dispatch;
use crate::parser::split_command_line;
use once_cell::sync::Lazy;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Global prompt string.
pub static PROMPT: &str = "dsh> ";

static HISTORY_FILE: Lazy<Option<PathBuf>> =
    Lazy::new(|| dirs_next::home_dir().map(|home| home.join(".dsh_history")));

/// Runs the main shell loop: prints the prompt (if enabled), reads input,
/// splits it into tokens, and hands the result to the dispatcher.
///
/// - `emit_prompt`: if true, prints the command prompt.
/// - `verbose`: if true, echoes each command before dispatching it.
///
/// The loop ends on end-of-file, on a read error, or when the dispatcher
/// reports that it cannot continue (a false continuation flag). Ctrl-C at the
/// prompt just yields a fresh prompt; the shell itself ignores SIGINT.
pub fn run_shell(emit_prompt: bool, verbose: bool) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("dsh: cannot initialize line editor: {}", err);
            return;
        }
    };
    if let Some(path) = HISTORY_FILE.as_ref() {
        // Missing on first run; ignore.
        let _ = editor.load_history(path);
    }

    let prompt = if emit_prompt { PROMPT } else { "" };
    loop {
        match editor.readline(prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                if verbose {
                    println!("Received command: {}", line.trim());
                }
                let mut args = match split_command_line(&line) {
                    Ok(args) => args,
                    Err(err) => {
                        eprintln!("dsh: {}", err);
                        continue;
                    }
                };
                match dispatch(&mut args) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => eprintln!("dsh: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("dsh: read error: {}", err);
                break;
            }
        }
    }

    if let Some(path) = HISTORY_FILE.as_ref() {
        let _ = editor.save_history(path);
    }
}
