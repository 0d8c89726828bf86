use colored::*;

/// Turn colours off when stderr is not a terminal. `colored` already honours
/// `NO_COLOR` and `CLICOLOR_FORCE` on its own.
pub fn init_colors() {
    if std::env::var_os("CLICOLOR_FORCE").is_none() && !atty::is(atty::Stream::Stderr) {
        colored::control::set_override(false);
    }
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "[INFO]".blue().bold(), message);
}

pub fn print_debug(message: &str, verbose: bool) {
    if verbose {
        eprintln!("{} {}", "[DEBUG]".cyan().bold(), message);
    }
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "[SUCCESS]".green().bold(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "[WARNING]".yellow().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
