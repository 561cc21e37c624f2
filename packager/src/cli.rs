//! CLI argument definitions for the model packager.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary focused on orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Package a directory of model files into an MSIX archive.
#[derive(Parser, Debug)]
#[command(name = "model-packager")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package a directory of model files into an MSIX archive.\n\n",
    "The model files are copied into a staging directory together with a ",
    "generated AppxManifest.xml and placeholder logo images, and the directory ",
    "is packed with makeappx.exe from the Windows SDK. Packaging only runs on ",
    "Windows.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package a model, naming it after its directory:\n",
    "    > model-packager pack models\\microsoft\\phi-3 -o dist\\\n\n",
    "  Keep the staging directory for inspection:\n",
    "    > model-packager pack phi-3 -o phi3.msix --staging-dir to_be_packed\n\n",
    "  Sign the package:\n",
    "    > model-packager pack phi-3 -o phi3.msix --sign cert.pfx --password secret\n\n",
    "  Show which SDK tools would be used:\n",
    "    > model-packager locate\n\n",
    "ENVIRONMENT:\n",
    "  WindowsSdkDir    SDK root searched when the registry has no usable kit\n",
    "  RUST_LOG         Log filter, overriding -v and -q",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Package a model directory.
    Pack(PackArgs),

    /// Show where the SDK tools were found.
    Locate(LocateArgs),
}

/// Arguments for the pack command.
#[derive(Parser, Debug, Clone)]
pub struct PackArgs {
    /// Directory holding the model files.
    #[arg(value_name = "MODEL_DIR")]
    pub model_dir: Utf8PathBuf,

    /// Archive to create, or a directory to create it in.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Utf8PathBuf,

    /// Package name [default: the model directory's name].
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Publisher name [default: the model directory's parent's name].
    #[arg(short, long, value_name = "PUBLISHER")]
    pub publisher: Option<String>,

    /// Stage into this directory and keep it afterwards.
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<Utf8PathBuf>,

    /// Sign the archive with this PFX certificate.
    #[arg(long = "sign", value_name = "CERT")]
    pub certificate: Option<Utf8PathBuf>,

    /// Password for the signing certificate.
    #[arg(long, value_name = "PASSWORD", requires = "certificate")]
    pub password: Option<String>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Arguments for the locate command.
#[derive(Parser, Debug, Clone, Default)]
pub struct LocateArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(short, long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Default for PackArgs {
    /// Creates `PackArgs` for the current directory with every option unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_packager::cli::PackArgs;
    ///
    /// let args = PackArgs::default();
    /// assert!(args.name.is_none());
    /// assert!(args.certificate.is_none());
    /// assert!(!args.quiet);
    /// ```
    fn default() -> Self {
        Self {
            model_dir: Utf8PathBuf::from("."),
            output: Utf8PathBuf::from("."),
            name: None,
            publisher: None,
            staging_dir: None,
            certificate: None,
            password: None,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Log level filter implied by the verbosity flags.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        let (verbosity, quiet) = match &self.command {
            Command::Pack(args) => (args.verbosity, args.quiet),
            Command::Locate(args) => (args.verbosity, false),
        };
        match (quiet, verbosity) {
            (true, _) => log::LevelFilter::Error,
            (false, 0) => log::LevelFilter::Info,
            (false, 1) => log::LevelFilter::Debug,
            (false, _) => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
