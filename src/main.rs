fn main() {
    if let Err(err) = featuretrail::cli::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
