fn main() {
    if let Err(err) = minicpp::cli::run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
