//! `keel build` command

use std::io::IsTerminal;

use anyhow::{bail, Result};

use crate::cli::{BuildArgs, MessageFormat};
use crate::commands::{config_for, GlobalArgs};
use keel::builder::BuildEvent;
use keel::core::Manifest;
use keel::ops::{build_with, BuildOptions, BuildOutcome, BuildReport, Toolset};
use keel::util::diagnostic::emit;

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let manifest = Manifest::load(&global.manifest_path()?)?;
    let config = config_for(Some(&manifest.manifest_dir));
    let tools = Toolset::from_config(&config)?;
    let json = args.message_format == MessageFormat::Json;

    let opts = BuildOptions {
        release: args.release,
        emit_plan: args.plan,
        emit_compile_commands: args.emit_compile_commands,
        progress: !json && !global.verbose && std::io::stderr().is_terminal(),
    };

    let report = match build_with(&manifest, &config, &tools, &opts)? {
        BuildOutcome::Planned(plan) => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            return Ok(());
        }
        BuildOutcome::Built(report) => report,
    };

    if json {
        emit_events(&report);
    }

    if let Some(ref path) = report.compile_commands {
        tracing::info!("wrote {}", path.display());
    }

    let result = &report.result;
    if !result.succeeded {
        if !json {
            emit(&result.to_diagnostic(), global.color);
        }
        bail!("could not build `{}` ({} stage)", report.name, result.stage);
    }

    if !json {
        if let Some(ref artifact) = result.artifact {
            eprintln!(
                "    Finished `{}` [{}] -> {} in {:.2}s",
                report.name,
                report.mode,
                artifact.display(),
                report.duration.as_secs_f64()
            );
        }
    }

    Ok(())
}

fn emit_events(report: &BuildReport) {
    BuildEvent::started(&report.name, report.mode.as_str(), report.generated.len()).emit();
    for (schema, pair) in &report.generated {
        BuildEvent::generated(schema, pair).emit();
    }

    let result = &report.result;
    match result.artifact {
        Some(ref artifact) => BuildEvent::artifact(&report.name, artifact.clone()).emit(),
        None => BuildEvent::error(result).emit(),
    }
    BuildEvent::finished(result, report.duration.as_millis() as u64).emit();
}
