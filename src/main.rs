use clap::{Parser, Subcommand};
use folio_prerender::{config, generate, output};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "folio-prerender")]
#[command(about = "Prerender SEO tags for every route of the portfolio SPA")]
#[command(long_about = "\
Prerender SEO tags for every route of the portfolio SPA

Runs after the SPA bundle is built. Every route gets its own index.html: a
copy of the SPA entry document with title, description, canonical, Open
Graph, Twitter Card and JSON-LD tags for that route, so crawlers and link
previews see real metadata without running JavaScript.

Inputs:

  client/src/data/
  ├── template.json        # Site, blog posts, external pages
  ├── resume.md            # One file per /page/{slug} route
  └── seo.toml             # Build options (optional)

  dist/public/
  ├── index.html           # SPA entry, used as the base document
  └── manifest.json        # Web manifest (optional, name/description synced)

Outputs (into the dist directory):

  index.html, post/{id}/index.html, page/{slug}/index.html,
  sitemap.xml, robots.txt

Metadata resolution (first available wins):
  Post title:        post title → first heading → post id
  Post description:  excerpt → body text → site description
  Page title:        first heading → nav name → slug

Run 'folio-prerender gen-config' to generate a documented seo.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding template.json and page markdown
    #[arg(long, default_value = "client/src/data", global = true)]
    data: PathBuf,

    /// Built SPA directory to prerender into
    #[arg(long, default_value = "dist/public", global = true)]
    dist: PathBuf,

    /// Log fallback decisions and skipped items
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write prerendered pages, sitemap.xml and robots.txt (default)
    Build,
    /// Resolve every route and report it without writing anything
    Check,
    /// Print a stock seo.toml with all options documented
    GenConfig,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // Only fails when a logger is already installed.
    let _ = SimpleLogger::new().with_level(level).init();
}

fn run(cli: &Cli) -> Result<(), generate::GenerateError> {
    let paths = generate::BuildPaths {
        data_dir: cli.data.clone(),
        dist_dir: cli.dist.clone(),
    };
    let today = chrono::Utc::now().date_naive();

    match cli.command.as_ref().unwrap_or(&Command::Build) {
        Command::Build => {
            log::info!(
                "prerendering {} from {}",
                paths.dist_dir.display(),
                paths.data_dir.display()
            );
            let report = generate::generate(&paths, today)?;
            output::print_generate_output(&report, &paths.dist_dir);
        }
        Command::Check => {
            let plan = generate::plan(&paths, today)?;
            output::print_check_output(&plan, &paths.dist_dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
