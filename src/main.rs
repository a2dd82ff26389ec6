use clap::{Parser, Subcommand};
use memora::assets::SchemeAssetStore;
use memora::config::{self, MemoraConfig};
use memora::edit::ArtworkUpdate;
use memora::library::{self, Library, LibraryError};
use memora::storage::FileStorage;
use memora::types::Gallery;
use memora::{import, links, output, qr, share};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_USER: &str = "guest";

#[derive(Parser)]
#[command(name = "memora")]
#[command(about = "Build 3D art galleries and share them as self-contained links")]
#[command(long_about = "\
Build 3D art galleries and share them as self-contained links

A share link carries the whole gallery: titles, descriptions, images and
narration are compressed into the URL, so anyone with the link can open the
exhibit without the original files.

Importing a directory:

  010-Spring-Show/                 # gallery \"Spring Show\"
  ├── 001-Harbour.jpg              # artwork 1, title \"Harbour\"
  ├── 001-Harbour.txt              # its description
  ├── 001-Harbour.mp3              # its narration
  └── 002-Evening-Light.png        # artwork 2

Run 'memora gen-config' to generate a documented memora.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing memora.toml
    #[arg(long = "config", default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Act as this user (remembered for later runs)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Log debug details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a share link for a gallery JSON file or a saved gallery id
    Share {
        gallery: String,
        /// Print only the token
        #[arg(long)]
        token_only: bool,
        /// Also write the link as an SVG QR code
        #[arg(long)]
        qr: Option<PathBuf>,
        /// Also print Twitter and Facebook share links
        #[arg(long)]
        social: bool,
    },
    /// Open a share link or bare token
    Open {
        token_or_url: String,
        /// Print the decoded gallery as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a gallery from a directory of images
    Import {
        dir: PathBuf,
        /// Gallery name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
        /// Save the gallery to the library
        #[arg(long)]
        save: bool,
    },
    /// List saved galleries
    List,
    /// Edit one artwork of a saved gallery
    Update {
        gallery_id: String,
        /// 1-based artwork position
        position: usize,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long, conflicts_with = "clear_audio")]
        audio: Option<String>,
        #[arg(long)]
        clear_audio: bool,
    },
    /// Delete a saved gallery
    Delete { gallery_id: String },
    /// Print a stock memora.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config_dir)?;
    let storage = FileStorage::open(cli.config_dir.join(&config.data_dir))?;
    let user = match &cli.user {
        Some(name) => {
            library::switch_user(&storage, name)?;
            name.trim().to_string()
        }
        None => library::current_user(&storage)?.unwrap_or_else(|| DEFAULT_USER.to_string()),
    };
    debug!(%user, data_dir = %storage.dir().display(), "opened library");
    let library = Library::new(storage, user);

    match cli.command {
        Command::Share {
            gallery,
            token_only,
            qr,
            social,
        } => {
            let (gallery, base_dir) = load_gallery(&gallery, &library)?;
            init_thread_pool(&config.assets);
            let store = SchemeAssetStore::from_config(&config.assets, base_dir.as_deref())?;
            let token = share::encode(&gallery, &store).map_err(|e| {
                warn!(error = %e, "share failed");
                e.user_message()
            })?;

            if token_only {
                println!("{}", token);
                return Ok(());
            }

            let url = links::share_url(&config.base_url, &config.query_param, &token);
            let qr_file = match qr {
                Some(path) => write_qr(&url, &path, &config),
                None => None,
            };
            let social = social.then(|| links::social_links(&gallery.name, &url));
            output::print_share_output(
                &gallery.name,
                &url,
                &token,
                qr_file.as_deref(),
                social.as_ref(),
            );
        }
        Command::Open { token_or_url, json } => {
            let token = links::token_from_input(&token_or_url, &config.query_param)
                .ok_or("No share token found in the input")?;
            let gallery = share::decode(&token).map_err(|e| e.user_message())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&gallery)?);
            } else {
                output::print_gallery(&gallery);
            }
        }
        Command::Import { dir, name, save } => {
            let mut gallery = import::import_dir(&dir)?;
            if let Some(name) = name {
                gallery.rename(name);
            }
            if save {
                gallery = library.save(gallery)?;
            }
            output::print_gallery(&gallery);
            if save {
                println!("Saved as {}", gallery.id);
            }
        }
        Command::List => {
            let galleries = library.list()?;
            output::print_library(library.owner(), &galleries);
        }
        Command::Update {
            gallery_id,
            position,
            title,
            description,
            image,
            audio,
            clear_audio,
        } => {
            let mut gallery = library
                .get(&gallery_id)?
                .ok_or_else(|| LibraryError::NotFound(gallery_id.clone()))?;
            let artwork_id = position
                .checked_sub(1)
                .and_then(|i| gallery.artworks.get(i))
                .map(|a| a.id.clone())
                .ok_or_else(|| {
                    format!(
                        "No artwork at position {} (gallery has {})",
                        position,
                        gallery.artworks.len()
                    )
                })?;

            let mut updates = Vec::new();
            updates.extend(title.map(ArtworkUpdate::Title));
            updates.extend(description.map(ArtworkUpdate::Description));
            updates.extend(image.map(ArtworkUpdate::Image));
            if clear_audio {
                updates.push(ArtworkUpdate::Audio(None));
            } else if let Some(audio) = audio {
                updates.push(ArtworkUpdate::Audio(Some(audio)));
            }
            if updates.is_empty() {
                return Err("Nothing to update: pass at least one field flag".into());
            }

            for update in updates {
                gallery.update_artwork(&artwork_id, update)?;
            }
            let gallery = library.save(gallery)?;
            output::print_gallery(&gallery);
        }
        Command::Delete { gallery_id } => {
            if !library.delete(&gallery_id)? {
                return Err(LibraryError::NotFound(gallery_id).into());
            }
            println!("Deleted {}", gallery_id);
        }
        // Printed before the config was loaded.
        Command::GenConfig => {}
    }

    Ok(())
}

/// Logs go to stderr so stdout stays usable in pipes (`--token-only`, `--json`).
fn init_logging(verbose: bool) {
    let level = if verbose { "memora=debug" } else { "memora=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool that resolves assets in parallel.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(assets: &config::AssetsConfig) {
    let threads = config::effective_threads(assets);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// A gallery JSON file (relative asset paths resolve next to it), or a saved id.
fn load_gallery(
    arg: &str,
    library: &Library<FileStorage>,
) -> Result<(Gallery, Option<PathBuf>), Box<dyn std::error::Error>> {
    let path = Path::new(arg);
    if path.is_file() {
        let gallery: Gallery = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        return Ok((gallery, path.parent().map(Path::to_path_buf)));
    }
    let gallery = library
        .get(arg)?
        .ok_or_else(|| LibraryError::NotFound(arg.to_string()))?;
    Ok((gallery, None))
}

/// Write the QR code, reporting failure without aborting the share.
fn write_qr(url: &str, path: &Path, config: &MemoraConfig) -> Option<PathBuf> {
    let written = qr::render_svg(url, &config.qr)
        .map_err(|e| e.to_string())
        .and_then(|svg| std::fs::write(path, svg).map_err(|e| e.to_string()));
    match written {
        Ok(()) => Some(path.to_path_buf()),
        Err(e) => {
            eprintln!("QR code not written: {}", e);
            None
        }
    }
}
