use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

use fileutil::cli::args::{Cli, Commands, ConfigAction, OutputFormat};
use fileutil::cli::output;
use fileutil::common::config::Config;
use fileutil::common::{format, paths};
use fileutil::disk::{self, VirtualDiskLayout};
use fileutil::net::{self, DownloadOptions};
use fileutil::reader::{LineSource, LineStreamer};
use fileutil::sweep::{self, SweepFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("fileutil=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Sweep {
            ref root,
            ref older_than,
            ref prefix,
            ref suffix,
            ref regex,
            dry_run,
        } => cmd_sweep(
            &cli,
            root,
            older_than.as_deref(),
            prefix.clone(),
            suffix.clone(),
            regex.as_deref(),
            dry_run,
        ),

        Commands::Lines {
            ref path,
            max_line_bytes,
            head,
        } => cmd_lines(path.clone(), max_line_bytes, head).await,

        Commands::Download {
            ref url,
            ref dest,
            insecure,
        } => cmd_download(&cli, url, dest, insecure).await,

        Commands::Mkdir { ref paths } => cmd_mkdir(&cli, paths),

        Commands::Exists { ref path } => {
            let kind = if paths::file_exists(path) {
                "file"
            } else if paths::folder_exists(path) {
                "folder"
            } else {
                "missing"
            };
            println!("{}", kind);
            Ok(())
        }

        Commands::Vdisk {
            ref file,
            size_gb,
            ref fs,
            ref mount_point,
            no_truncate,
        } => cmd_vdisk(file, size_gb, fs.clone(), mount_point.clone(), no_truncate),

        Commands::Config { action } => cmd_config(action),

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                fileutil::cli::args::CompletionShell::Bash => clap_complete::Shell::Bash,
                fileutil::cli::args::CompletionShell::Zsh => clap_complete::Shell::Zsh,
                fileutil::cli::args::CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "fileutil", &mut std::io::stdout());
            Ok(())
        }
    }
}

// ─── Sweep ────────────────────────────────────────────────────────────────────

fn cmd_sweep(
    cli: &Cli,
    root: &std::path::Path,
    older_than: Option<&str>,
    prefix: Option<String>,
    suffix: Option<String>,
    regex: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let config = Config::load()?;
    let age = match older_than {
        Some(s) => format::parse_age(s)?,
        None => config.default_age()?,
    };

    let mut filter = SweepFilter::older_than(age);
    if let Some(p) = prefix {
        filter = filter.with_prefix(p);
    }
    if let Some(s) = suffix {
        filter = filter.with_suffix(s);
    }
    if let Some(r) = regex {
        filter = filter.with_regex(r)?;
    }
    if dry_run {
        // Taking over deletion with a no-op leaves every file in place
        filter = filter.with_callback(|_| Ok(()));
    }

    let report = sweep::delete_files_older_than(root, &filter)
        .with_context(|| format!("Sweep of {} failed", root.display()))?;

    if cli.quiet {
        output::print_sweep_quiet(&report);
    } else {
        match cli.format {
            OutputFormat::Human => output::print_sweep_report(&report, dry_run),
            OutputFormat::Json => output::print_json(&report),
        }
    }

    Ok(())
}

// ─── Lines ────────────────────────────────────────────────────────────────────

async fn cmd_lines(
    path: Option<PathBuf>,
    max_line_bytes: Option<usize>,
    head: Option<usize>,
) -> Result<()> {
    let config = Config::load()?;

    let source = match path {
        Some(p) => LineSource::path(p),
        None if paths::has_stdin() => LineSource::Stdin,
        None => anyhow::bail!("No input: pass a file path or pipe data on stdin"),
    };

    let mut stream = LineStreamer::new()
        .max_line_bytes(max_line_bytes.unwrap_or(config.max_line_bytes))
        .stream(source)
        .await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0usize;

    loop {
        if head.is_some_and(|n| printed >= n) {
            break;
        }
        let Some(item) = stream.next_line().await else {
            break;
        };
        let line = item.context("Input ended early")?;
        writeln!(out, "{}", line)?;
        printed += 1;
    }
    out.flush()?;

    stream.cancel().await;
    Ok(())
}

// ─── Download ─────────────────────────────────────────────────────────────────

async fn cmd_download(cli: &Cli, url: &str, dest: &std::path::Path, insecure: bool) -> Result<()> {
    let config = Config::load()?;
    let options = DownloadOptions {
        accept_invalid_certs: insecure || config.accept_invalid_certs,
    };

    let bytes = net::download_file_with(dest, url, &options).await?;

    if !cli.quiet {
        match cli.format {
            OutputFormat::Human => output::print_download(dest, bytes),
            OutputFormat::Json => output::print_json(&serde_json::json!({
                "url": url,
                "dest": dest,
                "bytes": bytes,
            })),
        }
    }
    Ok(())
}

// ─── Mkdir ────────────────────────────────────────────────────────────────────

fn cmd_mkdir(cli: &Cli, folders: &[PathBuf]) -> Result<()> {
    paths::create_folders(folders)?;
    if !cli.quiet {
        for folder in folders {
            println!("  {} {}", "✓".green(), format::format_path(folder));
        }
    }
    Ok(())
}

// ─── Vdisk ────────────────────────────────────────────────────────────────────

fn cmd_vdisk(
    file: &std::path::Path,
    size_gb: u64,
    fs: Option<String>,
    mount_point: Option<PathBuf>,
    no_truncate: bool,
) -> Result<()> {
    let config = Config::load()?;

    let mut layout = VirtualDiskLayout::new(file, size_gb);
    layout.file_system = fs.unwrap_or(config.default_filesystem);
    layout.truncate = !no_truncate;
    if let Some(dir) = mount_point {
        layout.mount_point = dir;
        layout.mount = true;
    }

    let out = disk::create_virtual_disk(&layout)?;
    print!("{}", out);
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::init_dirs()?;
            let config = Config::default();
            config.save()?;
            println!("  {} fileutil initialized at ~/.fileutil", "✓".green());
            Ok(())
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("  {} Set {} = {}", "✓".green(), key, value);
            Ok(())
        }
    }
}
