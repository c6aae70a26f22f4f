fn main() {
    if let Err(err) = vademecum::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
