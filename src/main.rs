fn main() {
    if let Err(err) = ridemap_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
