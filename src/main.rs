// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::Path;

// Use library instead of local modules
use hospital_ratings::{export_csv, export_csv_file, init_logging, open_browser, BrowserConfig, Hospital};

fn main() -> Result<()> {
    init_logging();
    let config = BrowserConfig::from_env();
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("ui") => run_ui_mode(&config)?,
        Some("export") => run_export(&config, args.get(2).map(String::as_str))?,
        Some("stats") => run_stats(&config)?,
        Some("help") | Some("--help") | Some("-h") => print_usage(),
        Some(other) => {
            print_usage();
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("hospital-ratings {}", hospital_ratings::VERSION);
    println!();
    println!("USAGE:");
    println!("  hospital-ratings [ui]          Browse, filter and compare hospitals");
    println!("  hospital-ratings export [csv]  Export hospitals with overall stars (stdout if no path)");
    println!("  hospital-ratings stats         Dataset summary");
    println!();
    println!("ENVIRONMENT:");
    println!("  HOSPITAL_DATA, HOSPITAL_ZIPS, HOSPITAL_DB, HOSPITAL_BIND, HOSPITAL_RADIUS, RUST_LOG");
}

fn run_export(config: &BrowserConfig, out: Option<&str>) -> Result<()> {
    let browser = open_browser(config)?;
    let hospitals: Vec<&Hospital> = browser.hospitals().iter().collect();

    match out {
        Some(path) => {
            println!("📤 Exporting hospitals...");
            let written = export_csv_file(Path::new(path), &hospitals)?;
            println!("✓ Wrote {} hospitals to {}", written, path);
        }
        // Plain CSV on stdout so it can be piped
        None => {
            export_csv(std::io::stdout().lock(), &hospitals)?;
        }
    }

    Ok(())
}

fn run_stats(config: &BrowserConfig) -> Result<()> {
    println!("📊 Hospital Ratings - Dataset Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let browser = open_browser(config)?;
    let stats = browser.stats();

    println!("\n🏥 Hospitals");
    println!("✓ Total:            {}", stats.total);
    println!("✓ Rated:            {}", stats.rated);
    println!("✓ Unrated:          {}", stats.unrated);
    println!("✓ Average overall:  {:.1} ★", stats.average_overall);

    println!("\n🏷️  Types");
    println!("✓ Urban / Rural:            {} / {}", stats.urban, stats.rural);
    println!("✓ Non-profit / For-profit:  {} / {}", stats.non_profit, stats.for_profit);
    println!("✓ Critical access:          {}", stats.critical_access);

    println!("\n📍 Locations");
    println!("✓ Cities:           {}", stats.cities);
    println!("✓ Locatable:        {}", stats.locatable);

    println!("\n⭐ Overall rating distribution");
    for (stars, count) in &stats.distribution {
        let label = if stars == "0.0" { "no data".to_string() } else { format!("{} ★", stars) };
        println!("  {:>8}  {}", label, count);
    }

    println!("\n⚖️  Selected for comparison: {}", stats.selected);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &BrowserConfig) -> Result<()> {
    println!("🖥️  Loading Hospital Ratings browser...\n");

    if !config.data_path.exists() {
        eprintln!("❌ Hospital data not found: {:?}", config.data_path);
        eprintln!("   Set HOSPITAL_DATA to the JSON dataset path.");
        std::process::exit(1);
    }

    println!("📊 Loading hospitals...");
    let browser = open_browser(config)?;
    println!("✓ Loaded {} hospitals\n", browser.hospitals().len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(browser, config.default_radius_miles);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &BrowserConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin hospital-server --features server");
    std::process::exit(1);
}
