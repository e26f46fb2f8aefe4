use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_clone_as::{
    validate_destination, validate_source, CloneAsError, Identity, ImportOutcome,
    RepositoryImporter, SystemConfig,
};

#[derive(Parser, Default)]
#[command(name = "git-clone-as")]
#[command(about = "Clone a GitHub repository over SSH as a chosen identity")]
struct Cli {
    /// Repository to clone (git@github.com:<owner>/<repo>.git)
    #[arg(short, long)]
    source: Option<String>,

    /// SSH identity name (key pair plus .username and .noreplyemail files)
    #[arg(short, long)]
    identity: Option<String>,

    /// Local directory to clone into; existing contents are merged over the clone
    #[arg(short, long)]
    destination: Option<String>,

    /// git executable to invoke [default: git]
    #[arg(short, long = "git_path")]
    git_path: Option<String>,
}

impl Cli {
    fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.identity.is_none()
            && self.destination.is_none()
            && self.git_path.is_none()
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run() -> Result<ExitCode, CloneAsError> {
    let args: Vec<OsString> = std::env::args_os().collect();
    // Nothing but the option terminator counts as no options at all.
    let only_terminator = args.iter().skip(1).all(|arg| arg == "--");

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) if !only_terminator => return parse_failure(err),
        Err(_) => Cli::default(),
    };

    if only_terminator || cli.is_empty() {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = SystemConfig::from_env()?;
    let git_path = cli.git_path.unwrap_or(config.git_path);

    let source = required(cli.source, "--source").and_then(|s| validate_source(&s));
    let identity =
        required(cli.identity, "--identity").and_then(|n| Identity::validate(&n, &config.ssh_dir));
    let destination =
        required(cli.destination, "--destination").and_then(|d| validate_destination(&d));

    let (source, identity, destination) = match (source, identity, destination) {
        (Ok(source), Ok(identity), Ok(destination)) => (source, identity, destination),
        (source, identity, destination) => {
            let failures = [source.err(), identity.err(), destination.err()];
            for err in failures.iter().flatten() {
                eprintln!("Error: {}", err);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    println!(
        "Cloning {} into {} as '{}'...",
        source,
        destination.display(),
        identity.name()
    );

    let importer = RepositoryImporter::new(git_path);
    match importer.import(&source, &identity, &destination)? {
        ImportOutcome::Cloned => {}
        ImportOutcome::Merged { merged_entries } => println!(
            "Merged {} existing entries into {}",
            merged_entries,
            destination.display()
        ),
    }

    println!(
        "Successfully cloned {} as '{}'",
        source,
        identity.name()
    );
    Ok(ExitCode::SUCCESS)
}

fn required(value: Option<String>, option: &'static str) -> Result<String, CloneAsError> {
    value.ok_or(CloneAsError::MissingOption { option })
}

fn parse_failure(err: clap::Error) -> Result<ExitCode, CloneAsError> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            err.print()?;
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::UnknownArgument => {
            let option = match err.get(ContextKind::InvalidArg) {
                Some(ContextValue::String(arg)) => arg.clone(),
                _ => "unknown".to_string(),
            };
            Err(CloneAsError::UnknownOption { option })
        }
        _ => {
            err.print()?;
            Ok(ExitCode::FAILURE)
        }
    }
}
