use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use sitepad_common::config::{FileStore, default_config_path};
use sitepad_common::telemetry::{self, TelemetryConfig};
use sitepad_common::{Config, FileSlotStore, SitepadHttpClient, SlotStore};
use sitepad_editor_core::{
    DOWNLOAD_FILE_NAME, EditorSession, SessionOptions, SessionSource, render_tree,
};
use sitepad_renderer::publish::{
    LoggedAuthWindow, PublishError, PublishPrompt, Publisher, Site, SiteChoice,
};
use sitepad_renderer::{
    DirResourceStore, SiteMap, build_and_record_preview, build_archive, revoke_site_map,
};
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};

/// Slot the publishing token is kept in between runs.
const TOKEN_SLOT: &str = "cli-token";

#[derive(Parser)]
#[command(version, about = "sitepad - edit, preview and publish a static site", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the configuration file (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Canonical site bundle, as a URL or a local path
    #[arg(long, global = true)]
    bundle: Option<String>,

    /// Replace the accent colour of index.html
    #[arg(long, global = true)]
    accent: Option<String>,

    /// Ignore the saved session and start from the canonical bundle
    #[arg(long, global = true)]
    fresh: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the file tree
    Tree,
    /// Print a file
    Cat {
        path: String,
    },
    /// Replace the content of a file and save the session
    Edit {
        path: String,

        /// Read the new content from this file instead of stdin
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Create a new file
    New {
        name: String,

        /// Folder to create the file in
        #[arg(long)]
        folder: Option<String>,

        /// Initial content
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Write a browsable preview of the site
    Preview {
        /// Output directory (defaults to `preview` under the storage directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the site archive
    Download {
        /// Output file
        #[arg(long, default_value = DOWNLOAD_FILE_NAME)]
        out: PathBuf,
    },
    /// Publish the site
    Publish {
        /// Subdomain to publish to. Asked interactively when omitted.
        #[arg(long)]
        subdomain: Option<String>,

        /// API token. Signs in through the browser when missing.
        #[arg(long, env = "SITEPAD_TOKEN")]
        token: Option<String>,
    },
    /// Forget the saved session
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    telemetry::init(TelemetryConfig::from_env("sitepad-cli"));

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&FileStore::new(&config_path)).await?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");
    if let Some(bundle) = &cli.bundle {
        config.bundle_location = bundle.clone();
    }
    let storage_dir = config
        .storage_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(".sitepad"));
    let mut slots = FileSlotStore::new(&storage_dir);

    if let Commands::Reset = cli.command {
        reset_slots(&mut slots, &config.session_slot)?;
        println!("✓ Saved session and sign-in cleared");
        return Ok(());
    }

    let client = SitepadHttpClient::default();
    let mut options = SessionOptions::from_config(&config);
    options.accent = cli.accent.clone();
    let fresh = cli.fresh;
    let mut session = EditorSession::open(slots, &client, options, || {
        if fresh {
            SessionSource::Canonical
        } else {
            SessionSource::Saved
        }
    })
    .await?;
    tracing::info!(
        files = session.workspace().files().len(),
        storage = %storage_dir.display(),
        "session opened"
    );

    match cli.command {
        Commands::Tree => {
            print!("{}", render_tree(session.workspace()));
        }
        Commands::Cat { path } => {
            let text = session.open_text(&path)?;
            print!("{text}");
        }
        Commands::Edit { path, from } => {
            let content = read_content(from.as_deref())?;
            session.save(&path, content)?;
            println!("✓ Saved {path}");
        }
        Commands::New { name, folder, from } => {
            let content = match from {
                Some(from) => read_content(Some(&from))?,
                None => String::new(),
            };
            let workspace = session.workspace_mut();
            match folder.as_deref() {
                Some(folder) => workspace.create_file_in(folder, &name, content)?,
                None => workspace.create_file(&name, content)?,
            };
            let path = workspace.active_path().unwrap_or(&name).to_owned();
            session.persist()?;
            println!("✓ Created {path}");
        }
        Commands::Preview { out } => {
            let out = out.unwrap_or_else(|| storage_dir.join("preview"));
            preview_site(&mut session, &config, &out)?;
        }
        Commands::Download { out } => {
            let archive = build_archive(session.workspace().files())?;
            std::fs::write(&out, &archive.bytes).into_diagnostic()?;
            tracing::info!(path = %out.display(), bytes = archive.bytes.len(), "archive written");
            println!("✓ Wrote {} ({} bytes)", out.display(), archive.bytes.len());
        }
        Commands::Publish { subdomain, token } => {
            publish_site(&mut session, client, &config, subdomain, token).await?;
        }
        Commands::Reset => unreachable!("handled before the session is opened"),
    }

    Ok(())
}

/// Forget the saved session and the publishing token.
fn reset_slots(slots: &mut impl SlotStore, session_slot: &str) -> Result<()> {
    slots.remove(session_slot)?;
    slots.remove(TOKEN_SLOT)?;
    tracing::info!(session_slot, "saved state cleared");
    Ok(())
}

fn preview_site(
    session: &mut EditorSession<FileSlotStore>,
    config: &Config,
    out: &Path,
) -> Result<()> {
    let mut resources = DirResourceStore::new(out);
    if let Some(previous) = SiteMap::load(session.store(), &config.site_map_slot)? {
        revoke_site_map(&previous, &mut resources);
    }

    println!("→ Building preview...");
    let start = std::time::Instant::now();
    let (workspace, slots) = session.split_mut();
    let build =
        build_and_record_preview(workspace.files(), &mut resources, slots, &config.site_map_slot)?;

    for error in &build.errors {
        println!("⚠ {error}");
    }
    tracing::info!(
        files = build.site_map.len(),
        errors = build.errors.len(),
        out = %out.display(),
        "preview built"
    );
    let entry = build.entry_point()?;
    println!(
        "✓ Built {} files in {:.2}s",
        build.site_map.len(),
        start.elapsed().as_secs_f64()
    );
    println!("✓ Open {entry}");
    Ok(())
}

async fn publish_site(
    session: &mut EditorSession<FileSlotStore>,
    client: SitepadHttpClient,
    config: &Config,
    subdomain: Option<String>,
    token: Option<String>,
) -> Result<()> {
    let mut publisher = Publisher::new(client, config);
    match token.or(session.store().get(TOKEN_SLOT)?) {
        Some(token) => {
            println!("✓ Found authentication");
            publisher = publisher.with_token(token);
        }
        None => {
            println!("⚠ No authentication found");
            println!("  A sign-in link will be printed below. Waiting for you to finish...");
        }
    }

    let result = publisher
        .publish(
            session.workspace().files(),
            subdomain.as_deref(),
            &mut LoggedAuthWindow,
            &mut StdinPrompt,
        )
        .await;
    let url = match result {
        Ok(url) => url,
        Err(PublishError::InvalidToken) => {
            session.store_mut().remove(TOKEN_SLOT)?;
            tracing::info!("rejected token removed");
            return Err(PublishError::InvalidToken.into());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(token) = publisher.token() {
        session.store_mut().set(TOKEN_SLOT, token)?;
        tracing::debug!("token saved");
    }
    println!("✓ Published to {url}");
    Ok(())
}

fn read_content(from: Option<&Path>) -> Result<String> {
    match from {
        Some(path) => std::fs::read_to_string(path).into_diagnostic(),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .into_diagnostic()?;
            Ok(content)
        }
    }
}

/// Publish questions answered on the terminal.
struct StdinPrompt;

fn ask(question: &str) -> Option<String> {
    print!("{question} ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(answer.trim().to_owned()),
    }
}

/// Interpret an answer to the site selector: a 1-based index into `sites`,
/// or the subdomain of a new site.
fn parse_selection(answer: &str, sites: &[Site]) -> SiteChoice {
    let answer = answer.trim();
    match answer.parse::<usize>() {
        Ok(n) if (1..=sites.len()).contains(&n) => {
            SiteChoice::Existing(sites[n - 1].subdomain.clone())
        }
        _ if answer.is_empty() => SiteChoice::Cancelled,
        _ => SiteChoice::New(answer.to_owned()),
    }
}

impl PublishPrompt for StdinPrompt {
    fn ask_subdomain(&mut self) -> Option<String> {
        ask("Enter subdomain for your new site:")
    }

    fn select_site(&mut self, sites: &[Site]) -> SiteChoice {
        println!("Select site to publish to:");
        for (i, site) in sites.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, site.display_name(), site.subdomain);
        }
        match ask("Number, or a new subdomain:") {
            Some(answer) => parse_selection(&answer, sites),
            None => SiteChoice::Cancelled,
        }
    }

    fn confirm_create(&mut self, subdomain: &str) -> bool {
        ask(&format!("Site '{subdomain}' doesn't exist. Create it? [y/N]"))
            .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use sitepad_common::MemorySlotStore;

    fn site(subdomain: &str) -> Site {
        Site {
            subdomain: subdomain.into(),
            name: String::new(),
            description: String::new(),
            active: true,
        }
    }

    #[test]
    fn reset_forgets_session_and_token() {
        let mut slots = MemorySlotStore::new();
        slots.set("rawtastic-main", "data:application/zip;base64,").unwrap();
        slots.set(TOKEN_SLOT, "tok-123").unwrap();
        slots.set("siteMap", "[]").unwrap();

        reset_slots(&mut slots, "rawtastic-main").unwrap();

        assert_eq!(slots.get("rawtastic-main").unwrap(), None);
        assert_eq!(slots.get(TOKEN_SLOT).unwrap(), None);
        assert_eq!(slots.get("siteMap").unwrap().as_deref(), Some("[]"));
        reset_slots(&mut slots, "rawtastic-main").unwrap();
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_apply_to_subcommands() {
        let cli = Cli::parse_from(["sitepad", "tree", "--fresh", "--accent", "magenta"]);
        assert!(cli.fresh);
        assert_eq!(cli.accent.as_deref(), Some("magenta"));
        assert!(matches!(cli.command, Commands::Tree));
    }

    #[test]
    fn download_defaults_to_the_archive_name() {
        let cli = Cli::parse_from(["sitepad", "download"]);
        match cli.command {
            Commands::Download { out } => assert_eq!(out, PathBuf::from("rawtastic-main.zip")),
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn selection_by_number_or_new_name() {
        let sites = [site("blog"), site("docs")];
        assert_eq!(
            parse_selection("2", &sites),
            SiteChoice::Existing("docs".into())
        );
        assert_eq!(parse_selection(" 3 ", &sites), SiteChoice::New("3".into()));
        assert_eq!(
            parse_selection("shop", &sites),
            SiteChoice::New("shop".into())
        );
        assert_eq!(parse_selection("  ", &sites), SiteChoice::Cancelled);
    }
}
