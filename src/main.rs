use clap::Parser;
use log::LevelFilter;
use shipit::commands;
use shipit::core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Release a snapshot-versioned project: bump, build, commit, tag, push
#[derive(Parser)]
#[command(name = "shipit")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Project directory containing package.json
  #[arg(default_value = ".")]
  project: PathBuf,

  /// Shell command to run as the build step (receives RELEASE_VERSION)
  #[arg(short, long)]
  build: String,

  /// Shell command to run after tagging, before the next dev bump
  #[arg(long)]
  post_release: Option<String>,

  /// Explicit release version (default: next patch, marker stripped)
  #[arg(long)]
  release_version: Option<String>,

  /// Explicit next development version (default: next patch + SNAPSHOT)
  #[arg(long)]
  next_version: Option<String>,

  /// Print the outcome as JSON
  #[arg(long)]
  json: bool,

  /// Log every git invocation and its captured output
  #[arg(short, long)]
  debug: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.debug);

  let result = commands::run_release(
    cli.project,
    cli.build,
    cli.post_release,
    cli.release_version,
    cli.next_version,
    cli.json,
    cli.debug,
  );

  if let Err(err) = result {
    handle_error(err);
  }
}

fn init_logging(debug: bool) {
  let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
  env_logger::Builder::new()
    .filter_level(level)
    .format_timestamp(None)
    .format_target(false)
    .parse_default_env()
    .init();
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
