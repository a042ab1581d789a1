fn main() {
    if let Err(err) = zabwrap::cli::run() {
        zabwrap::cli::commands::exit_for_error(&err);
    }
}
