fn main() {
    if let Err(e) = greenroom::cli::main() {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}
