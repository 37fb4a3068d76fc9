use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so structured output on stdout stays clean.
    // Example: RUST_LOG=depgraph_render=debug depgraph -i issues.json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = depgraph_render::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
