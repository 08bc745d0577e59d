use clap::Parser;
use httpload_cli::args::Args;
use httpload_cli::{export, report};
use httpload_engine::LoadTest;
use std::io::Write;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration errors caught before any request is sent.
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let test = match args.to_config().and_then(LoadTest::new) {
        Ok(test) => test,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(EXIT_CONFIG);
        }
    };
    let config = test.config();

    print!(
        "Running {:.1}s {} load against {} ",
        config.duration_secs,
        config.pattern.as_name(),
        config.url
    );
    std::io::stdout().flush().ok();

    let dot_handle = tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // consume the immediate first tick
        loop {
            interval.tick().await;
            print!(".");
            std::io::stdout().flush().ok();
        }
    });

    let result = test.run().await;
    dot_handle.abort();
    println!();

    let run_report = match result {
        Ok(run_report) => run_report,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(EXIT_CONFIG);
        }
    };

    println!();
    print!("{}", report::render(config, &run_report.summary));

    if let Some(path) = &args.output {
        match export::write_json(path, config, &run_report) {
            Ok(()) => println!("\nResults written to {}", path.display()),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to write results"),
        }
    }
}
