use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fruit_lens_lib::models::quality_types::QualityReport;
use fruit_lens_lib::services::quality_service;

#[derive(Parser, Debug)]
#[command(
    name = "quality_control",
    about = "Move unreadable, low-resolution, blurry or badly exposed images out of the raw dataset"
)]
struct Args {
    /// Raw dataset root containing one directory per class.
    #[arg(long, default_value = "../1_dataset/raw")]
    raw: PathBuf,
    /// Where rejected images go. Defaults to a `rejected` directory next to the raw root.
    #[arg(long)]
    rejected: Option<PathBuf>,
}

fn print_summary(report: &QualityReport) {
    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("SUMMARY:");
    for class in &report.classes {
        println!(
            "  {}: {} OK, {} rejected",
            class.class.dir_name(),
            class.accepted(),
            class.rejected
        );
    }
    for class in &report.missing {
        println!("  {}: folder not found", class.dir_name());
    }
    println!("Total images checked: {}", report.total_checked());
    match report.rejection_percentage() {
        Some(pct) => println!("Total rejected: {} ({:.2}%)", report.total_rejected(), pct),
        None => println!("Total rejected: 0 (no images found)"),
    }
    println!("Total accepted: {}", report.total_accepted());
    println!("{}", rule);
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fruit_lens_lib::logging::init();

    let args = Args::parse();
    let rejected = args
        .rejected
        .unwrap_or_else(|| quality_service::default_rejected_root(&args.raw));

    tracing::info!("Dataset path: {}", args.raw.display());
    tracing::info!("Rejected path: {}", rejected.display());

    let report = quality_service::quality_control_dataset(&args.raw, &rejected)
        .with_context(|| format!("quality control failed for {}", args.raw.display()))?;

    print_summary(&report);
    println!(
        "Rejected images and {} are in {}",
        quality_service::JOURNAL_FILE,
        rejected.display()
    );

    Ok(())
}
