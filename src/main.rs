use clap::{Parser, Subcommand};
use sitegraph::fs::{Mode, SourceTree};
use sitegraph::page::{Loader, Page, resolve_media};
use sitegraph::{config, lint, output, pagination, site};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

fn version_string() -> &'static str {
    let on_tag = env!("SITEGRAPH_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SITEGRAPH_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sitegraph")]
#[command(about = "Load and validate the content graph of a static personal website")]
#[command(long_about = "\
Load and validate the content graph of a static personal website

Every page is described by a metadata.toml next to its template. Posts are
dated by their directory name, comments live outside the public tree.

Source structure:

  site/
  ├── site.toml                               # Site config (optional)
  ├── build.toml                              # Template list (optional)
  ├── errors/404/index.html.jinja             # Error page for status 404
  ├── standalone/about/
  │   ├── index.html.jinja
  │   └── metadata.toml                       # title, media
  ├── posts/2025-06-27-first-light/
  │   ├── index.html.jinja
  │   ├── metadata.toml                       # uuid, published, title, tags, media
  │   └── sunrise.jpg
  └── private/comments/2025-06-27-first-light/
      ├── <uuid>.toml                         # published, author, in_reply_to
      └── <uuid>.html                         # Comment body

Without build.toml, every *.jinja file outside output/, work/ and private/
is a template.

Run 'sitegraph gen-config' to generate a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Fail on image outputs that aren't built yet instead of deferring them
    #[arg(long, global = true)]
    render: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load every page, lint every comment and resolve image outputs
    Check,
    /// List every page with its URL
    Pages,
    /// Print every page as JSON
    Manifest,
    /// Show the page rendered by one template
    Show {
        /// Template path relative to the source directory
        template: PathBuf,
    },
    /// List the source files and build artifacts the site depends on
    Deps,
    /// Lint rendered HTML files
    Lint {
        /// HTML files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print pagination links for one page of a list
    Nav {
        /// Current page, 1-indexed
        current: usize,
        /// Number of pages
        total: usize,
        /// Pages shown on either side of the current page
        #[arg(long, default_value_t = pagination::DEFAULT_SHOW_EITHER_SIDE)]
        either_side: usize,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Load `site.toml` from the source directory and install it.
fn install_site(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let site_config = config::load_config(&cli.source)?;
    let installed = site::install(site::Site::from_config(&site_config)?)?;
    info!(title = %installed.title, url = %installed.url, "Installed site");
    Ok(())
}

/// Comment HTML by UUID, linted on the way.
fn comment_contents(
    fs: &SourceTree,
    pages: &[Page],
) -> Result<HashMap<uuid::Uuid, String>, Box<dyn std::error::Error>> {
    let mut contents = HashMap::new();
    for page in pages {
        if let Page::Post(post) = page {
            for comment in &post.comments {
                contents.insert(comment.uuid, comment.contents(fs)?.to_string());
            }
        }
    }
    Ok(contents)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mode = if cli.render { Mode::Render } else { Mode::Scan };
    let source_tree = || SourceTree::new(&cli.source, mode);

    match &cli.command {
        Command::Check => {
            install_site(&cli)?;
            let fs = source_tree();
            println!("==> Checking {}", cli.source.display());
            let pages = Loader::new(&fs).all()?;
            let contents = comment_contents(&fs, &pages)?;
            let outputs = resolve_media(&fs, &pages)?;
            output::print_check_summary(&pages, contents.len(), &outputs);
            println!("==> Content is valid");
        }
        Command::Pages => {
            install_site(&cli)?;
            let fs = source_tree();
            let pages = Loader::new(&fs).all()?;
            output::print_pages(&pages);
        }
        Command::Manifest => {
            install_site(&cli)?;
            let fs = source_tree();
            let pages = Loader::new(&fs).all()?;
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
        Command::Show { template } => {
            install_site(&cli)?;
            let fs = source_tree();
            let page = Loader::new(&fs).current(template)?;
            let contents = comment_contents(&fs, std::slice::from_ref(&page))?;
            output::print_page(&page, &contents);
        }
        Command::Deps => {
            install_site(&cli)?;
            let fs = source_tree();
            let pages = Loader::new(&fs).all()?;
            comment_contents(&fs, &pages)?;
            resolve_media(&fs, &pages)?;
            for path in fs.dependencies() {
                println!("{}", path.display());
            }
        }
        Command::Lint { files } => {
            let mut failures = 0;
            for file in files {
                let markup = std::fs::read_to_string(file)?;
                match lint::html(&markup) {
                    Ok(()) => debug!(file = %file.display(), "Lint passed"),
                    Err(error) => {
                        failures += 1;
                        println!("{}: {}", file.display(), error);
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} of {} files failed lint", files.len()).into());
            }
            println!("==> {} files passed lint", files.len());
        }
        Command::Nav {
            current,
            total,
            either_side,
        } => {
            println!("{}", output::format_nav(*current, *total, *either_side));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
