//! # psloss CLI
//!
//! Computes prestress losses along one girder of a bridge described in JSON
//! (a project file or a bare bridge model) or of a built-in demo model.
//!
//! ```text
//! psloss [--demo pretensioned|spliced | <bridge.json>] [--girder G] [--spec NAME]
//!        [--json] [--units us|si]
//! ```
//!
//! Set `RUST_LOG=debug` for per-interval logging.

use std::env;
use std::fs;
use std::process;

use log::info;

use psloss_core::losses::{BeamType, LossDetails, PsLossEngineer};
use psloss_core::model::{samples, BridgeModel};
use psloss_core::project::{LossProject, ProjectSettings};
use psloss_core::report::{build_report, report_final_losses, ReportChapter};
use psloss_core::status::{StatusCenter, StatusSeverity};
use psloss_core::units::DisplayUnits;
use psloss_core::{LossError, LossResult};

enum Source {
    Demo(String),
    File(String),
}

struct Options {
    source: Source,
    girder: usize,
    spec: Option<String>,
    json: bool,
    units: Option<DisplayUnits>,
}

fn usage() -> &'static str {
    "Usage: psloss [--demo pretensioned|spliced | <bridge.json>] [--girder G] [--spec NAME] [--json] [--units us|si]"
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut source = None;
    let mut girder = 0;
    let mut spec = None;
    let mut json = false;
    let mut units = None;

    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| args.get(i + 1).cloned().ok_or_else(|| format!("{} needs a value", args[i]));
        match args[i].as_str() {
            "--demo" => {
                source = Some(Source::Demo(value(i)?));
                i += 1;
            }
            "--girder" => {
                let g = value(i)?;
                girder = g.parse().map_err(|_| format!("invalid girder index '{}'", g))?;
                i += 1;
            }
            "--spec" => {
                spec = Some(value(i)?);
                i += 1;
            }
            "--units" => {
                units = Some(match value(i)?.to_lowercase().as_str() {
                    "us" => DisplayUnits::Us,
                    "si" => DisplayUnits::Si,
                    other => return Err(format!("unknown unit system '{}'", other)),
                });
                i += 1;
            }
            "--json" => json = true,
            "-h" | "--help" => return Err(usage().to_string()),
            arg if arg.starts_with("--") => return Err(format!("unknown option '{}'", arg)),
            path => source = Some(Source::File(path.to_string())),
        }
        i += 1;
    }

    Ok(Options {
        source: source.unwrap_or(Source::Demo("pretensioned".to_string())),
        girder,
        spec,
        json,
        units,
    })
}

/// Bridge model and project settings for the selected source.
fn load(source: &Source) -> LossResult<(BridgeModel, ProjectSettings)> {
    match source {
        Source::Demo(name) => {
            let model = match name.as_str() {
                "pretensioned" => samples::pretensioned_i_girder()?,
                "spliced" => samples::spliced_two_duct_girder()?,
                other => {
                    return Err(LossError::invalid_input("--demo", other, "expected 'pretensioned' or 'spliced'"))
                }
            };
            let mut settings = ProjectSettings::default();
            if name == "spliced" {
                settings.spec_entry = "Time Step".to_string();
            }
            Ok((model, settings))
        }
        Source::File(path) => {
            let text = fs::read_to_string(path).map_err(|e| LossError::invalid_input("path", path.as_str(), e.to_string()))?;
            parse_input(&text)
        }
    }
}

/// A project file (one carrying `meta`) or a bare bridge model.
fn parse_input(text: &str) -> LossResult<(BridgeModel, ProjectSettings)> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("meta").is_some() {
        let project = LossProject::from_json(text)?;
        return Ok((project.bridge, project.settings));
    }
    match LossProject::from_json(text) {
        Ok(project) => Ok((project.bridge, project.settings)),
        Err(project_error) => match serde_json::from_value::<BridgeModel>(value) {
            Ok(model) => {
                model.validate()?;
                Ok((model, ProjectSettings::default()))
            }
            Err(bridge_error) => {
                info!("input is neither a project ({}) nor a bridge model", project_error);
                Err(bridge_error.into())
            }
        },
    }
}

fn run(options: &Options, status: &mut StatusCenter) -> LossResult<()> {
    let (model, mut settings) = load(&options.source)?;
    if let Some(spec) = &options.spec {
        settings.spec_entry = spec.clone();
    }
    let units = options.units.unwrap_or(settings.units);
    let girder = model
        .girders
        .get(options.girder)
        .map(|g| g.key)
        .ok_or_else(|| LossError::invalid_input("--girder", options.girder.to_string(), "no such girder"))?;

    info!("computing losses for {} with \"{}\"", girder, settings.spec_entry);
    let inputs = model.inputs();
    let mut engineer = PsLossEngineer::new(
        psloss_core::losses::SpecLibrary::default_library().clone(),
        &settings.spec_entry,
    );
    let beam_type: BeamType = settings.beam_type;

    if options.json {
        let pois = model
            .girder(girder)
            .map(|g| g.pois.iter().map(|r| r.poi.clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        let records = pois
            .iter()
            .map(|poi| engineer.compute_losses(&inputs, beam_type, poi, status))
            .collect::<LossResult<Vec<LossDetails>>>()?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let mut chapter = ReportChapter::new("Prestress Losses");
        build_report(&mut engineer, &inputs, beam_type, girder, &mut chapter, units, status)?;
        report_final_losses(&mut engineer, &inputs, beam_type, girder, &mut chapter, units, status)?;
        print!("{}", chapter.to_text());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", usage());
            process::exit(2);
        }
    };

    let mut status = StatusCenter::new();
    let result = run(&options, &mut status);

    for item in status.items() {
        let label = match item.severity {
            StatusSeverity::Information => "info",
            StatusSeverity::Warning => "warning",
            StatusSeverity::Error => "error",
        };
        eprintln!("{}: {}", label, item.message);
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!("{}", json);
        }
        process::exit(1);
    }
}
