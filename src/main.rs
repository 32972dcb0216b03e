fn main() {
    if let Err(err) = cta_tracker::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
