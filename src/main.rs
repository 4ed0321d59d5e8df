fn main() {
    if let Err(e) = beautydesk::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
