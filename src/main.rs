fn main() {
    if let Err(err) = waste_stats::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
