//! Model packager CLI entrypoint.
//!
//! This binary packages a model directory into an MSIX archive, or reports
//! which Windows SDK tools it would use.

use clap::Parser;
use model_packager::cli::{Cli, Command, LocateArgs, PackArgs};
use model_packager::error::{PackagerError, Result};
use model_packager::executor::SystemCommandExecutor;
use model_packager::invoke::SdkTools;
use model_packager::kit::Tool;
use model_packager::kit::registry::RegistryKitLocator;
use model_packager::names::PackageIdentity;
use model_packager::output::{
    LocateReport, infer_names, locate_json, resolve_output_path, write_stderr_line,
};
use model_packager::pipeline::{PackageRequest, Packager};
use model_packager::signing::SigningOptions;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env();
    if builder.try_init().is_err() {
        // A logger is already installed.
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let executor = SystemCommandExecutor;
    let locator = RegistryKitLocator::new(&executor);
    let packager = Packager::new(&executor, &locator);

    match &cli.command {
        Command::Pack(args) => run_pack(&packager, args, stderr),
        Command::Locate(args) => run_locate(&packager.tools(), args, stdout),
    }
}

fn run_pack(packager: &Packager<'_>, args: &PackArgs, stderr: &mut dyn Write) -> Result<()> {
    let request = build_request(args)?;
    let archive = packager.try_create_package(&request)?;
    if !args.quiet {
        write_stderr_line(stderr, format!("Created {archive}"));
    }
    Ok(())
}

/// Turns CLI arguments into a packaging request, inferring missing names.
fn build_request(args: &PackArgs) -> Result<PackageRequest> {
    let (package, publisher) = infer_names(
        &args.model_dir,
        args.name.as_deref(),
        args.publisher.as_deref(),
    );
    let identity = PackageIdentity::validated(&package, &publisher)?;
    let output = resolve_output_path(&args.output, &identity);

    let mut request = PackageRequest::new(args.model_dir.clone(), output, identity);
    if let Some(dir) = &args.staging_dir {
        request = request.with_staging_dir(dir.clone());
    }
    if let Some(certificate) = &args.certificate {
        let mut signing = SigningOptions::new(certificate.clone());
        if let Some(password) = &args.password {
            signing = signing.with_password(password.clone());
        }
        request = request.with_signing(signing);
    }
    Ok(request)
}

fn run_locate(tools: &SdkTools<'_>, args: &LocateArgs, stdout: &mut dyn Write) -> Result<()> {
    let reports: Vec<LocateReport> = [Tool::MakeAppx, Tool::SignTool]
        .into_iter()
        .map(|tool| LocateReport::new(tool, &tools.locate(tool)))
        .collect();

    let text = if args.json {
        locate_json(&reports).map_err(|e| PackagerError::WriteFailed { source: e.into() })?
    } else {
        reports
            .iter()
            .map(LocateReport::display_text)
            .collect::<Vec<_>>()
            .join("\n")
    };
    writeln!(stdout, "{text}").map_err(|source| PackagerError::WriteFailed { source })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
