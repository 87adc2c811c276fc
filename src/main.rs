// src/main.rs

use relwatch::{cli, logging};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("relwatch error: {err:?}");
        std::process::exit(1);
    }
    if let Err(err) = relwatch::run(args).await {
        tracing::error!(error = %err, exit_code = err.exit_code(), "fatal");
        std::process::exit(err.exit_code());
    }
}
