use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use frame_studio::{
    AnonId, CategoryFilter, CompositedArtifact, Compositor, DefaultFetcher, Downloader,
    FrameCatalog, HttpFetcher, ImageHostUploader, ImageRef, LinkAdapter, ObjectStoreUploader,
    RemoteLink, ResourceLoader, StudioConfig,
};

#[derive(Parser, Debug)]
#[command(name = "frame-studio", version)]
struct Cli {
    /// JSON config file (defaults to the user config dir, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the frame catalog.
    Frames(FramesArgs),
    /// Composite a photo and write the JPEG to a path.
    Compose(ComposeArgs),
    /// Composite a photo and save it under a timestamped name.
    Download(DownloadArgs),
    /// Composite a photo, upload it and print the public URL.
    Link(LinkArgs),
}

#[derive(Args, Debug)]
struct FramesArgs {
    /// Category label ("All Frames", "Minimal", "Events", "Fun").
    #[arg(long)]
    category: Option<String>,

    /// Frame catalog JSON replacing the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print the catalog as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Photo: file path, file:// or http(s):// URL, or data: URL.
    #[arg(long)]
    image: String,

    /// Frame id from the catalog.
    #[arg(long, conflicts_with = "frame_url")]
    frame: Option<String>,

    /// Frame image given directly by reference.
    #[arg(long)]
    frame_url: Option<String>,

    /// Frame catalog JSON replacing the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Base directory for relative frame urls.
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Target directory (defaults to the configured download dir).
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LinkArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, value_enum, default_value_t = LinkTarget::ImageHost)]
    target: LinkTarget,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LinkTarget {
    ImageHost,
    ObjectStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = StudioConfig::load(cli.config.as_deref())?;
    frame_studio::init_logging(&cfg.logging);

    match cli.cmd {
        Command::Frames(args) => cmd_frames(&cfg, args),
        Command::Compose(args) => cmd_compose(&cfg, args).await,
        Command::Download(args) => cmd_download(&cfg, args).await,
        Command::Link(args) => cmd_link(&cfg, args).await,
    }
}

fn load_catalog(cfg: &StudioConfig, explicit: Option<&Path>) -> anyhow::Result<FrameCatalog> {
    match explicit.or(cfg.catalog.as_deref()) {
        Some(path) => Ok(FrameCatalog::from_path(path)?),
        None => Ok(FrameCatalog::builtin()),
    }
}

fn cmd_frames(cfg: &StudioConfig, args: FramesArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(cfg, args.catalog.as_deref())?;
    let filter = args
        .category
        .as_deref()
        .map(CategoryFilter::from_label)
        .unwrap_or_default();
    let frames: Vec<_> = catalog.filter(&filter).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }
    for f in frames {
        println!("{}\t{}\t{}\t{}", f.id, f.name, f.category, f.url);
    }
    Ok(())
}

async fn composite(cfg: &StudioConfig, input: &InputArgs) -> anyhow::Result<CompositedArtifact> {
    let source = ImageRef::parse(&input.image)?;
    let fetcher = DefaultFetcher::with_http(HttpFetcher::new(cfg.http_timeout())?);
    let mut loader = ResourceLoader::new(fetcher);
    if let Some(dir) = input.assets.as_ref().or(cfg.asset_dir.as_ref()) {
        loader = loader.with_frame_base_dir(dir);
    }

    let resources = match (&input.frame, &input.frame_url) {
        (Some(id), _) => {
            let catalog = load_catalog(cfg, input.catalog.as_deref())?;
            let desc = catalog
                .get(id)
                .with_context(|| format!("unknown frame id '{id}'"))?;
            loader.load(&source, Some(desc)).await?
        }
        (None, Some(url)) => {
            let frame = ImageRef::parse(url)?;
            loader.load_refs(&source, Some(&frame)).await?
        }
        (None, None) => loader.load(&source, None).await?,
    };

    Ok(Compositor::new().composite_async(resources).await?)
}

async fn cmd_compose(cfg: &StudioConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let artifact = composite(cfg, &args.input).await?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create '{}'", parent.display()))?;
    }
    tokio::fs::write(&args.out, artifact.as_bytes())
        .await
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!("{} {}", artifact.size(), args.out.display());
    Ok(())
}

async fn cmd_download(cfg: &StudioConfig, args: DownloadArgs) -> anyhow::Result<()> {
    let artifact = composite(cfg, &args.input).await?;
    let dir = args.dir.unwrap_or_else(|| cfg.download_dir.clone());
    let path = Downloader::new(dir)
        .save(&artifact)
        .await?
        .done()
        .context("a download is already running")?;
    println!("{}", path.display());
    Ok(())
}

async fn cmd_link(cfg: &StudioConfig, args: LinkArgs) -> anyhow::Result<()> {
    let artifact = composite(cfg, &args.input).await?;
    let url = match args.target {
        LinkTarget::ImageHost => {
            let up = ImageHostUploader::new(cfg.image_host.clone(), cfg.http_timeout())?;
            publish(up, &artifact).await?
        }
        LinkTarget::ObjectStore => {
            let anon = AnonId::load_or_create(&cfg.anon_id_path)?;
            let up =
                ObjectStoreUploader::new(cfg.object_store.clone(), anon, cfg.http_timeout())?;
            publish(up, &artifact).await?
        }
    };
    println!("{url}");
    Ok(())
}

async fn publish<L: RemoteLink>(link: L, artifact: &CompositedArtifact) -> anyhow::Result<String> {
    LinkAdapter::new(link)
        .publish(artifact)
        .await?
        .done()
        .context("an upload is already running")
}
