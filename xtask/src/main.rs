use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for gsrx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Run only GS module tests
        #[arg(long)]
        gs: bool,
    },
    /// Run benchmarks
    Bench,
    /// Replay a GIF dump through the gsrx binary
    Replay {
        /// Path to the GIF dump (little-endian quadwords)
        dump: String,
        /// GIF path the dump was captured on
        #[arg(short = 'p', long, default_value = "3")]
        path: String,
        /// Write the displayed frame as raw RGBA8888
        #[arg(short = 'o', long)]
        frame_out: Option<String>,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test { doc, ignored, gs } => run_test(doc, ignored, gs),
        Commands::Bench => run_bench(),
        Commands::Replay {
            dump,
            path,
            frame_out,
            release,
        } => run_replay(&dump, &path, frame_out.as_deref(), release),
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task("Test", || run_test(false, false, false), verbose)?;

    print_elapsed("✓ CI passed in", start);
    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    print_elapsed("✓ Checks passed in", start);
    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--all-targets").arg("--all-features");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, gs: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("test").arg("--all-features");

    if doc {
        cmd.arg("--doc");
    } else if gs {
        println!("{} Running {} tests...", "→".blue(), "GS".bold());
        cmd.arg("--lib").arg("core::gs");
    }

    if ignored {
        cmd.arg("--").arg("--ignored");
    }

    execute_command(&mut cmd)
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    execute_command(&mut cmd)
}

fn run_replay(dump: &str, path: &str, frame_out: Option<&str>, release: bool) -> Result<()> {
    println!("{}", "=== GIF Replay ===".bold().blue());

    let dump_path = Path::new(dump);
    if !dump_path.exists() {
        println!("{} Dump file not found: {}", "✗".red().bold(), dump.yellow());
        anyhow::bail!("Dump file not found");
    }

    let size = std::fs::metadata(dump_path)?.len();
    if size % 16 != 0 {
        println!(
            "{} Invalid dump size: {} bytes (expected a multiple of 16)",
            "✗".red().bold(),
            size
        );
        anyhow::bail!("Invalid dump size");
    }

    println!("{} Dump: {}", "✓".green(), dump.cyan());
    println!(
        "{} Quadwords: {}",
        "→".blue(),
        (size / 16).to_string().bold()
    );
    println!("{} Path: PATH{}", "→".blue(), path.bold());
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg("gsrx");

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--").arg(dump).arg("--path").arg(path).arg("--json");
    if let Some(out) = frame_out {
        cmd.arg("--frame-out").arg(out);
    }

    if let Err(e) = execute_command(&mut cmd) {
        println!("\n{} Replay failed", "✗".red().bold());
        return Err(e);
    }

    print_elapsed("✓ Replay completed in", start);
    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn print_elapsed(label: &str, start: Instant) {
    println!(
        "\n{} {}",
        label.green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
