use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fruit_lens_lib::models::fruit_types::FruitClass;
use fruit_lens_lib::models::split_types::{Split, SplitRatios, SplitReport};
use fruit_lens_lib::services::split_service;

#[derive(Parser, Debug)]
#[command(
    name = "split_dataset",
    about = "Copy the raw dataset into seeded train/validation/test splits"
)]
struct Args {
    /// Raw dataset root containing one directory per class.
    #[arg(long, default_value = "../1_dataset/raw")]
    raw: PathBuf,
    /// Output root; receives train/, validation/ and test/.
    #[arg(long, default_value = "../1_dataset/processed")]
    output: PathBuf,
    #[arg(long, default_value_t = 0.70)]
    train_ratio: f64,
    #[arg(long, default_value_t = 0.15)]
    val_ratio: f64,
    #[arg(long, default_value_t = 0.15)]
    test_ratio: f64,
    /// Seed for the shuffle; the same seed reproduces the same split.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn print_summary(report: &SplitReport) {
    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("SUMMARY");
    println!("{}", rule);
    for split in Split::ALL {
        for class in FruitClass::DATASET_ORDER {
            if report.counts.iter().any(|c| c.split == split && c.class == class) {
                println!("{}/{}: {} images", split, class.dir_name(), report.count(split, class));
            }
        }
        println!("  TOTAL {}: {} images\n", split, report.total(split));
    }
    for class in &report.missing {
        println!("skipped {}: folder not found", class.dir_name());
    }
    println!("{}", rule);
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fruit_lens_lib::logging::init();

    let args = Args::parse();
    let ratios = SplitRatios {
        train: args.train_ratio,
        validation: args.val_ratio,
        test: args.test_ratio,
    };

    tracing::info!(
        "Train {:.0}% / validation {:.0}% / test {:.0}%, seed {}",
        ratios.train * 100.0,
        ratios.validation * 100.0,
        ratios.test * 100.0,
        args.seed
    );

    let report = split_service::split_dataset(&args.raw, &args.output, &ratios, args.seed)
        .with_context(|| {
            format!(
                "splitting {} into {} failed",
                args.raw.display(),
                args.output.display()
            )
        })?;

    print_summary(&report);
    Ok(())
}
