mod assemble;
mod extract;
mod fetch;
mod geo;
mod media;
mod ocr;
mod pipeline;
mod record;
mod resolve;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "estate_scraper", about = "Real-estate project page scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one project page into its canonical record plus media tree
    Scrape {
        /// Builder identifier, used as the top-level output directory
        builder_id: String,
        /// Project identifier, used as the nested output directory
        project_id: String,
        /// Project page URL
        url: String,
        /// Root of the output tree
        #[arg(long, default_value = "data")]
        data_root: PathBuf,
        /// JSON file of extra amenity synonym mappings
        #[arg(long)]
        synonyms: Option<PathBuf>,
    },
    /// Print a summary of an already-scraped project record
    Show {
        builder_id: String,
        project_id: String,
        #[arg(long, default_value = "data")]
        data_root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape {
            builder_id,
            project_id,
            url,
            data_root,
            synonyms,
        } => {
            let client = fetch::client()?;
            let job = pipeline::ScrapeJob {
                builder_id,
                project_id,
                url,
                data_root,
                synonyms,
            };
            let summary = pipeline::run(&client, &job, None).await?;
            println!(
                "Done: {} detail fields, {} amenities, {} news images, {} assets saved ({} reused, {} skipped).",
                summary.fields_filled,
                summary.amenities,
                summary.news_linked,
                summary.assets_saved,
                summary.assets_reused,
                summary.assets_skipped
            );
            println!("Record: {}", summary.details_path.display());
            Ok(())
        }
        Commands::Show {
            builder_id,
            project_id,
            data_root,
        } => {
            let path = record::details_path(&data_root, &builder_id, &project_id);
            let rec = assemble::load_record(&path)?;
            let d = &rec.key_project_details;

            println!("{:<16} {}", "Project:", d.project_name);
            println!("{:<16} {}", "Builder:", d.builder_name);
            println!("{:<16} {}", "Location:", join_nonempty(&[d.location.as_str(), d.city.as_str()]));
            println!("{:<16} {}", "RERA:", dash(&d.rera_number));
            println!("{:<16} {}", "Acres:", dash(&d.total_acres));
            println!("{:<16} {}", "Towers:", dash(&d.total_towers));
            println!("{:<16} {}", "Floors:", dash(&d.total_floors));
            println!("{:<16} {}", "Units:", dash(&d.total_units));
            println!("{:<16} {}", "Config:", dash(&d.config));
            println!("{:<16} {}", "Unit sizes:", dash(&d.unit_sizes));
            println!("{:<16} {}", "Open space:", dash(&d.open_space_percent));
            println!("{:<16} {}", "Scraped at:", dash(&rec.scraped_at));

            println!("\n--- Media ---");
            for folder in record::RECORD_FOLDERS {
                let count = rec.folder(folder).map(Vec::len).unwrap_or(0);
                println!("{:<16} {}", format!("{}:", folder), count);
            }

            if !rec.amenities.is_empty() {
                println!("\n--- Amenities ({}) ---", rec.amenities.len());
                for amenity in &rec.amenities {
                    let name = amenity.name.as_deref().unwrap_or("-");
                    match &amenity.icon {
                        Some(icon) => println!("  {} ({})", truncate(name, 32), icon),
                        None => println!("  {}", truncate(name, 32)),
                    }
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn join_nonempty(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
