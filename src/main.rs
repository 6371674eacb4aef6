use clap::{Parser, Subcommand};
use resume_screener::{Config, Reporter, Screener};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Screen a folder of resumes against job criteria using LLM analysis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen all resumes in a folder
    Screen {
        /// Folder containing the resumes (.pdf / .docx)
        #[arg(short, long, default_value = "./resumes")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for the CSV and candidate reports
        #[arg(short, long, default_value = "./screening-output")]
        output: PathBuf,

        /// Number of top candidates to highlight in the summary
        #[arg(long)]
        top: Option<usize>,

        /// Stop at the first failed resume instead of continuing
        #[arg(long)]
        halt_on_error: bool,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the config file (defaults to ~/.resume-screener.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            path,
            config,
            output,
            top,
            halt_on_error,
        } => {
            let exit_code = screen_resumes(path, config, output, top, halt_on_error).await?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Commands::Config { output } => {
            generate_config(output)?;
        }
    }

    Ok(())
}

async fn screen_resumes(
    input_path: PathBuf,
    config_path: Option<PathBuf>,
    output_path: PathBuf,
    top: Option<usize>,
    halt_on_error: bool,
) -> anyhow::Result<i32> {
    println!("🚀 Starting Resume Screening");
    println!("============================");

    let start_time = Instant::now();

    let mut config = if let Some(config_path) = config_path {
        Config::from_file(&config_path)?
    } else {
        Config::load()?
    };

    config.input_directory = input_path.clone();
    config.output_directory = output_path.clone();
    if let Some(top) = top {
        config.screening.top_candidates = top;
    }
    if halt_on_error {
        config.screening.halt_on_error = true;
    }

    println!("🎯 Input directory: {}", input_path.display());
    println!("📤 Output directory: {}", output_path.display());

    // Credential validation happens here, before any file or output is touched.
    let screener = Screener::new(config.clone())?;

    let report = screener.run().await?;

    report.print_summary(config.screening.top_candidates);

    println!("\n📊 Generating reports...");
    let reporter = Reporter::new();
    let exported_files = reporter.export_report(&report, &output_path)?;

    if config.screening.narrative_reports {
        screener
            .write_narratives(&report, &reporter, &output_path)
            .await?;
    }

    println!(
        "\n✅ Screening completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    println!("📁 Reports exported to:");
    for file in exported_files {
        println!("   - {}", file.display());
    }

    // Partial success (some candidates errored) is visible in the exit code.
    Ok(if report.error_count() > 0 { 2 } else { 0 })
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = output_path.unwrap_or_else(|| {
        Config::default_config_path().unwrap_or_else(|_| PathBuf::from("resume-screener.toml"))
    });

    println!("📝 Generating configuration file: {}", config_path.display());

    let documented_config = Config::create_documented_config();
    std::fs::write(&config_path, documented_config)?;

    println!("✅ Configuration file created successfully!");
    println!("💡 Edit the file to set your job criteria and provider settings.");
    println!();
    println!("🔧 Key configuration areas:");
    println!("  • Job criteria (description, required skills, minimum experience)");
    println!("  • LLM provider settings (Gemini, OpenAI, Ollama)");
    println!("  • Screening options (thresholds, top candidates, error policy)");
    println!("  • API keys (or use environment variables)");

    Ok(())
}
