fn main() {
    if let Err(err) = zarina::runtime::native::run() {
        eprintln!("zarina failed: {}", err);
        std::process::exit(1);
    }
}
