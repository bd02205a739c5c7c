use colored::Colorize;

fn main() {
    if let Err(err) = charity_directory::app::run_cli() {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
