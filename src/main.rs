fn main() {
    if let Err(err) = csv_quotes::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
