use std::process;

pub fn print_usage() -> ! {
    println!("Usage: dsh [-hvp]");
    println!("   -h   Print this help message");
    println!("   -v   Enable verbose mode");
    println!("   -p   Do not print a command prompt");
    process::exit(1);
}

/// Reports an unrecoverable startup error and exits.
pub fn fatal(msg: &str) -> ! {
    eprintln!("dsh: {}", msg);
    process::exit(1);
}
