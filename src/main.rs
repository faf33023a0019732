use bucket_mover::{bucket_mover_main, BucketMoverCli};
use clap::Parser;
use std::process::exit;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = BucketMoverCli::parse();
    println!(concat!(
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    ));
    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .parse_default_env()
        .init();
    let strict = args.strict;
    match bucket_mover_main(args).await {
        Ok(Some(summary)) if strict && summary.has_failures() => {
            exit(2);
        }
        Ok(_) => {
            exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
}
