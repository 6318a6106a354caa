//! Folio CLI
//!
//! Render listings and article pages, preview site content, export and sync
//! content, and check data files.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use folio::cmd::render::RenderOptions;

/// Command-line interface for Folio.
#[derive(Parser)]
#[command(name = "folio", version, about = "Content tooling for Folio sites")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Render a collection's listing HTML
    Render {
        /// Collection name (e.g., affiling_articles)
        collection: String,
        /// Category filter
        #[arg(long)]
        category: Option<String>,
        /// Search term
        #[arg(short, long)]
        search: Option<String>,
        /// Number of pages to show
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Render one article as a standalone page
    Article {
        /// Collection name (e.g., affiling_articles)
        collection: String,
        /// Article id or slug
        id: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Apply site content and grid sections and print the result as JSON
    Site {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Convert raw content API results into flat JSON files
    Export {
        /// JSON file or directory of JSON files
        input: std::path::PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "data")]
        output: std::path::PathBuf,
        /// Keep unpublished records
        #[arg(long)]
        include_unpublished: bool,
    },
    /// Pull a collection from the content API and export it
    Sync {
        /// Collection name (e.g., note_articles)
        collection: String,
        /// Output file (defaults to the collection's data file)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Keep unpublished records
        #[arg(long)]
        include_unpublished: bool,
        /// Skip fetching page bodies
        #[arg(long)]
        no_content: bool,
    },
    /// Validate configuration and data files
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            collection,
            category,
            search,
            pages,
            output,
        } => {
            let options = RenderOptions {
                category,
                search,
                pages,
            };
            folio::cmd::render::run(&cli.config, &collection, &options, output.as_ref()).await?;
        }
        Commands::Article {
            collection,
            id,
            output,
        } => {
            folio::cmd::article::run(&cli.config, &collection, &id, output.as_ref()).await?;
        }
        Commands::Site { output } => {
            folio::cmd::site::run(&cli.config, output.as_ref()).await?;
        }
        Commands::Export {
            input,
            output,
            include_unpublished,
        } => {
            folio::cmd::export::run(&input, &output, include_unpublished)?;
        }
        Commands::Sync {
            collection,
            output,
            include_unpublished,
            no_content,
        } => {
            folio::cmd::sync::run(
                &cli.config,
                &collection,
                output,
                include_unpublished,
                !no_content,
            )
            .await?;
        }
        Commands::Check { strict } => {
            folio::cmd::check::run(&cli.config, strict)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_render_command_parsing() {
        let args = [
            "folio",
            "render",
            "affiling_articles",
            "--category",
            "review",
            "-s",
            "mouse",
            "--pages",
            "2",
        ];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, std::path::PathBuf::from("folio.toml"));
        match cli.command {
            Commands::Render {
                collection,
                category,
                search,
                pages,
                output,
            } => {
                assert_eq!(collection, "affiling_articles");
                assert_eq!(category.as_deref(), Some("review"));
                assert_eq!(search.as_deref(), Some("mouse"));
                assert_eq!(pages, 2);
                assert!(output.is_none());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_render_defaults() {
        let cli = Cli::parse_from(["folio", "render", "projects"]);
        match cli.command {
            Commands::Render {
                category, pages, ..
            } => {
                assert!(category.is_none());
                assert_eq!(pages, 1);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_article_command_parsing() {
        let cli = Cli::parse_from(["folio", "article", "note_articles", "my-slug", "-o", "a.html"]);
        match cli.command {
            Commands::Article {
                collection,
                id,
                output,
            } => {
                assert_eq!(collection, "note_articles");
                assert_eq!(id, "my-slug");
                assert_eq!(output, Some(std::path::PathBuf::from("a.html")));
            }
            _ => panic!("Expected Article command"),
        }
    }

    #[test]
    fn test_cli_site_command_parsing() {
        let cli = Cli::parse_from(["folio", "site"]);
        match cli.command {
            Commands::Site { output } => assert!(output.is_none()),
            _ => panic!("Expected Site command"),
        }
    }

    #[test]
    fn test_cli_export_command_parsing() {
        let cli = Cli::parse_from(["folio", "export", "raw", "--include-unpublished"]);
        match cli.command {
            Commands::Export {
                input,
                output,
                include_unpublished,
            } => {
                assert_eq!(input, std::path::PathBuf::from("raw"));
                assert_eq!(output, std::path::PathBuf::from("data"));
                assert!(include_unpublished);
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_sync_command_parsing() {
        let cli = Cli::parse_from([
            "folio",
            "sync",
            "note_articles",
            "--output",
            "out/notes.json",
            "--no-content",
        ]);
        match cli.command {
            Commands::Sync {
                collection,
                output,
                include_unpublished,
                no_content,
            } => {
                assert_eq!(collection, "note_articles");
                assert_eq!(output, Some(std::path::PathBuf::from("out/notes.json")));
                assert!(!include_unpublished);
                assert!(no_content);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let cli = Cli::parse_from(["folio", "check", "--strict"]);
        match cli.command {
            Commands::Check { strict } => assert!(strict),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_verbosity_and_config() {
        let cli = Cli::parse_from(["folio", "-vv", "--config", "site.toml", "check"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, std::path::PathBuf::from("site.toml"));
    }
}
