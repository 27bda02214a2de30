mod cli;

use casmclips::config;
use casmclips::pipeline::Pipeline;
use casmclips_av::{probe_with_ffprobe, ToolRegistry};
use casmclips_store::{Project, ProjectSummary};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "casmclips=trace,casmclips_av=trace,casmclips_store=debug,casmclips_common=debug"
                .to_string()
        } else {
            "casmclips=info,casmclips_av=info,casmclips_store=warn".to_string()
        }
    });

    // Logs go to stderr so `--json` output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            source,
            output_dir,
            json,
        } => block_on(analyze(&source, output_dir, config_path, json)),
        Commands::Render {
            project,
            no_gpu,
            json,
        } => block_on(render(&project, no_gpu, config_path, json)),
        Commands::List { json } => list_projects(config_path, json),
        Commands::Show { project, json } => show_project(&project, json),
        Commands::Probe { file, json } => block_on(probe_file(&file, config_path, json)),
        Commands::CheckTools { json } => block_on(check_tools(config_path, json)),
        Commands::Validate { config: file } => validate_config(file.as_deref().or(config_path)),
        Commands::Version => {
            println!("casmclips {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

async fn analyze(
    source: &str,
    output_dir: Option<PathBuf>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mut settings = config.settings.clone();
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }

    tracing::info!("Analyzing {}", source);
    let pipeline = Pipeline::from_config(&config);
    let outcome = pipeline.analyze(source, &settings).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.project)?);
    } else {
        println!("Project: {}", outcome.project.id);
        println!("Saved to: {}", outcome.project_file.display());
        print_project(&outcome.project);
    }

    Ok(())
}

async fn render(
    project_file: &Path,
    no_gpu: bool,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mut settings = config.settings.clone();
    if no_gpu {
        settings.gpu_acceleration = false;
    }

    let pipeline = Pipeline::from_config(&config);
    let outcome = pipeline.render(project_file, &settings).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.project)?);
    } else {
        println!("Rendered {} clips", outcome.rendered_count);
        if let Some(ref export) = outcome.project.export_path {
            println!("Exports: {}", export.display());
        }
        print_project(&outcome.project);
    }

    Ok(())
}

fn list_projects(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let projects = casmclips_store::list(&config.settings.output_dir).with_context(|| {
        format!(
            "Failed to list projects in {}",
            config.settings.output_dir.display()
        )
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!(
            "No projects found in {}",
            config.settings.output_dir.display()
        );
        return Ok(());
    }

    for ProjectSummary {
        path,
        name,
        created_at,
        clip_count,
    } in &projects
    {
        println!("{}  {} ({} clips)", created_at, name, clip_count);
        println!("    {}", path.display());
    }

    Ok(())
}

fn show_project(project_file: &Path, json: bool) -> Result<()> {
    let project = casmclips_store::load(project_file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        println!("Project: {}", project.id);
        println!("Created: {}", casmclips_store::timestamp::format(&project.created_at));
        if let Some(ref updated) = project.updated_at {
            println!("Updated: {}", casmclips_store::timestamp::format(updated));
        }
        print_project(&project);
    }

    Ok(())
}

fn print_project(project: &Project) {
    println!(
        "Source: {} ({})",
        project.metadata.title, project.metadata.duration_text
    );
    println!("\nClips: {}", project.clips.len());
    for (i, clip) in project.clips.iter().enumerate() {
        print!(
            "  [{}] {:.1}s - {:.1}s  score {:.2}",
            i + 1,
            clip.start,
            clip.end,
            clip.score
        );
        if !clip.hook_text.is_empty() {
            print!("  \"{}\"", clip.hook_text);
        }
        println!();
        if let Some(ref output) = clip.output_path {
            println!("      {}", output.display());
        }
    }
}

async fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::new(&config.tools, &config.worker.program);
    let info = probe_with_ffprobe(tools.ffprobe(), file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File: {}", info.file_path.display());
        println!("Container: {}", info.container);
        if let Some(duration) = info.duration {
            println!("Duration: {}", casmclips_common::format_duration(duration));
        }

        println!("\nVideo Streams: {}", info.video_streams.len());
        for (i, stream) in info.video_streams.iter().enumerate() {
            print!("  [{}] {} {}x{}", i, stream.codec, stream.width, stream.height);
            if let Some(fps) = stream.frame_rate {
                print!(" {:.3} fps", fps);
            }
            println!();
        }

        println!("\nAudio Streams: {}", info.audio_streams.len());
        for (i, stream) in info.audio_streams.iter().enumerate() {
            print!("  [{}] {} {}ch", i, stream.codec, stream.channels);
            if let Some(ref lang) = stream.language {
                print!(" ({})", lang);
            }
            println!();
        }
    }

    Ok(())
}

async fn check_tools(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::new(&config.tools, &config.worker.program);

    if json {
        let caps = tools.probe().await;
        println!("{}", serde_json::to_string_pretty(&caps)?);
        return Ok(());
    }

    println!("Checking external tools...\n");

    let infos = tools.check_all().await;
    let mut all_ok = true;

    for tool in &infos {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)
                .with_context(|| format!("Invalid configuration in {}", p.display()))?;
            println!("✓ Configuration is valid");
            print_settings(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            print_settings(&config);
        }
    }

    Ok(())
}

fn print_settings(config: &config::Config) {
    let s = &config.settings;
    println!("  Output dir: {}", s.output_dir.display());
    println!("  Clips per video: {}", s.clips_per_video);
    println!(
        "  Clip length: {}-{}s",
        s.min_clip_seconds, s.max_clip_seconds
    );
    println!("  Language: {}", s.language);
    println!("  Caption style: {} ({})", s.caption_style, s.font_family);
    println!("  GPU acceleration: {}", s.gpu_acceleration);
    println!(
        "  Worker: {} {}",
        config.worker.program.display(),
        config.worker.script.display()
    );
}
