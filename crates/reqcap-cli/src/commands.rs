use colored::Colorize;
use reqcap_derive::{
    Artifact, ClasspathEntry, FixedContributor, ManifestProcessor, ProcessOutcome, Project,
    StaticAnalyzerFactory,
};
use reqcap_header::{Capability, Parameters, REQUIRE_CAPABILITY};
use reqcap_merge::{merge, Attributes, MergeOutcome, MergeReport};
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, &cli.format),
        Command::Normalize(args) => cmd_normalize(args, &cli.format),
        Command::Process(args) => cmd_process(args, config, &cli.format),
    }
}

fn seed_attributes(existing: Option<&str>, attrs: Vec<(String, String)>) -> Attributes {
    let mut manifest: Attributes = attrs.into_iter().collect();
    if let Some(existing) = existing {
        manifest.insert(REQUIRE_CAPABILITY, existing);
    }
    manifest
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut manifest = seed_attributes(args.existing.as_deref(), args.attrs);
    let report = merge(args.existing.as_deref(), args.derived.as_deref(), &mut manifest)?;
    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "report": report, "attributes": manifest }));
        }
        OutputFormat::Text => {
            print_report(&report);
            print!("{manifest}");
        }
    }
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let params = Parameters::parse(&args.header)?;
    let capabilities = Capability::from_parameters(&params)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&capabilities)?),
        OutputFormat::Text => {
            for cap in &capabilities {
                println!("{}", cap.to_string().replace('\'', "\""));
            }
        }
    }
    Ok(())
}

fn cmd_process(args: ProcessArgs, config: CliConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut processor_config = config.derive;
    if let Some(flag) = args.derive_flag() {
        processor_config.derive_header_from_source = Some(flag).into();
    }

    let mut project = Project::new(args.id.as_str(), &args.output_dir);
    for path in &args.artifacts {
        project = project.with_artifact(Artifact::new(path.display().to_string(), path));
    }

    let mut processor = ManifestProcessor::new(
        Box::new(StaticAnalyzerFactory::new(args.derived.clone())),
        processor_config,
    );
    if !args.classpath.is_empty() {
        processor.add_contributor(Box::new(FixedContributor::new(vec![ClasspathEntry::new(
            args.classpath.iter().cloned(),
        )])));
    }

    let mut manifest = seed_attributes(args.existing.as_deref(), args.attrs);
    let outcome = processor.process_manifest(&project, &mut manifest);

    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "result": outcome, "attributes": manifest }));
        }
        OutputFormat::Text => {
            match &outcome {
                ProcessOutcome::Skipped { reason } => {
                    println!("{} Skipped ({reason:?})", "-".dimmed())
                }
                ProcessOutcome::Applied {
                    report,
                    classpath_entries,
                } => {
                    print_report(report);
                    println!("  Classpath entries: {}", classpath_entries.to_string().bold());
                }
                ProcessOutcome::Failed { message } => {
                    println!("{} Cannot derive header from source: {}", "!".yellow().bold(), message)
                }
            }
            print!("{manifest}");
        }
    }
    Ok(())
}

fn print_report(report: &MergeReport) {
    match &report.outcome {
        MergeOutcome::NothingDerived => println!("{} Nothing derived.", "-".dimmed()),
        MergeOutcome::Inserted => println!("{} Require-Capability set.", "✓".green().bold()),
        MergeOutcome::Unchanged => println!("{} Require-Capability unchanged.", "✓".green()),
        MergeOutcome::Merged { clauses, added } => println!(
            "{} Merged: {} clauses, {} added.",
            "✓".green().bold(),
            clauses.to_string().bold(),
            added.to_string().cyan()
        ),
    }
    if report.legacy_ee_removed {
        println!("  Removed {}", "Bundle-RequiredExecutionEnvironment".yellow());
    }
}
