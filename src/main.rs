use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inline_svg::models::{AppConfig, AttrValue, InlineSvgProps, UniqueIds};
use inline_svg::services::{InlineSvg, LoadOutcome, SvgCache, SvgEvent};

const CONFIG_ENV: &str = "INLINE_SVG_CONFIG";

#[derive(Parser)]
#[command(name = "inline-svg")]
#[command(about = "Fetch SVG files and render them as inline <svg> markup")]
struct Cli {
    /// YAML config file (defaults to $INLINE_SVG_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an SVG and print it as inline markup
    Render {
        /// URL of the SVG file
        src: String,

        /// Title inserted as the first child <title>
        #[arg(long)]
        title: Option<String>,

        /// Extra root attribute, repeatable (e.g. --attr class=icon)
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, String)>,

        /// Suffix every id with a random string
        #[arg(long)]
        unique_ids: bool,

        /// Suffix every id with this string
        #[arg(long, conflicts_with = "unique_ids")]
        unique_ids_suffix: Option<String>,

        /// Prefix for rewritten id references
        #[arg(long)]
        unique_ids_base: Option<String>,

        /// YAML file with props; command-line options take precedence
        #[arg(long)]
        props: Option<PathBuf>,

        /// Print a JSON object with `attributes` and `content`
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options of the render subcommand
struct RenderArgs {
    src: String,
    title: Option<String>,
    attrs: Vec<(String, String)>,
    unique_ids: bool,
    unique_ids_suffix: Option<String>,
    unique_ids_base: Option<String>,
    props: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
}

fn parse_attr(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty attribute name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    match cli.command {
        Some(Commands::Render {
            src,
            title,
            attrs,
            unique_ids,
            unique_ids_suffix,
            unique_ids_base,
            props,
            json,
            output,
        }) => {
            run_render_command(
                config_path.as_deref(),
                RenderArgs {
                    src,
                    title,
                    attrs,
                    unique_ids,
                    unique_ids_suffix,
                    unique_ids_base,
                    props,
                    json,
                    output,
                },
            )
            .await
        }
        None => {
            run_status_command(config_path.as_deref());
            Ok(())
        }
    }
}

/// Load one SVG through the global cache and print it
async fn run_render_command(config_path: Option<&Path>, args: RenderArgs) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inline_svg=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .init();

    let config = AppConfig::load(config_path);
    let props = build_props(&config, args.props.as_deref(), &args)?;

    let cache = SvgCache::init_global(&config.transport);
    let (mut svg, mut events) = InlineSvg::channel(cache, props);

    let pending = svg
        .mount()
        .ok_or_else(|| anyhow::anyhow!("No SVG source given"))?;
    let settled = pending.settle().await;
    if let LoadOutcome::Failed(e) = svg.complete(settled) {
        return Err(anyhow::anyhow!("Failed to load {}: {e}", args.src));
    }

    let node = svg
        .update()
        .map_err(|e| anyhow::anyhow!("Render error: {e}"))?
        .ok_or_else(|| anyhow::anyhow!("Nothing rendered for {}", args.src))?;

    while let Ok(event) = events.try_recv() {
        match event {
            SvgEvent::Loaded(_) => tracing::debug!(src = %args.src, "loaded"),
            SvgEvent::Unloaded => tracing::debug!(src = %args.src, "unloaded"),
            SvgEvent::Error(e) => tracing::debug!(src = %args.src, error = %e, "error"),
        }
    }
    svg.unmount();

    let rendered = if args.json {
        let attributes: serde_json::Map<String, serde_json::Value> = node
            .attributes
            .to_attributes()
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({
            "attributes": attributes,
            "content": node.content,
        }))?
    } else {
        node.to_markup()
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            eprintln!("Rendered {} ({} bytes)", path.display(), rendered.len());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Props file (or config defaults) overlaid with command-line options
fn build_props(
    config: &AppConfig,
    props_file: Option<&Path>,
    args: &RenderArgs,
) -> anyhow::Result<InlineSvgProps> {
    let mut props = match props_file {
        Some(path) => InlineSvgProps::from_yaml_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read props {}: {e}", path.display()))?,
        None => {
            let mut props = InlineSvgProps::new("")
                .keep_during_loading(config.defaults.keep_during_loading);
            props.unique_ids_base = config.defaults.unique_ids_base.clone();
            props
        }
    };

    props.src = args.src.clone();
    if let Some(title) = &args.title {
        props.title = Some(title.clone());
    }
    for (name, value) in &args.attrs {
        props
            .attrs
            .insert(name.clone(), AttrValue::Str(value.clone()));
    }
    if let Some(suffix) = &args.unique_ids_suffix {
        props.unique_ids = UniqueIds::Suffix(suffix.clone());
    } else if args.unique_ids {
        props.unique_ids = UniqueIds::Auto;
    }
    if let Some(base) = &args.unique_ids_base {
        props.unique_ids_base = Some(base.clone());
    }

    Ok(props)
}

/// Display version and effective configuration
fn run_status_command(config_path: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("inline-svg v{VERSION}");
    println!("Fetch SVG files and render them as inline <svg> markup\n");

    println!("Environment Variables:");
    println!(
        "  {CONFIG_ENV} = {}",
        std::env::var(CONFIG_ENV).as_deref().unwrap_or("(not set)")
    );

    let source = match config_path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (file not found, using defaults)", path.display()),
        None => "defaults".to_string(),
    };
    let config = AppConfig::load(config_path);

    println!("\nConfiguration ({source}):");
    println!("  transport.timeout_secs          = {}", config.transport.timeout_secs);
    println!("  transport.user_agent            = {}", config.transport.user_agent);
    println!("  transport.max_redirects         = {}", config.transport.max_redirects);
    println!(
        "  defaults.keep_during_loading    = {}",
        config.defaults.keep_during_loading
    );
    println!(
        "  defaults.unique_ids_base        = {}",
        config
            .defaults
            .unique_ids_base
            .as_deref()
            .unwrap_or("(not set)")
    );

    println!("\nUsage:");
    println!("  inline-svg render <SRC> [OPTIONS]   Print an SVG as inline markup");
    println!("  inline-svg --help                   Show all options");
}
