mod cli;
mod filemanager;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use lib_vera::{AssetWriter, ExportReport};
use log::error;

use cli::Cli;
use filemanager::HostError;
use settings::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = lib_vera::init_logging(cli.log_file.as_deref()) {
        eprintln!("warning: logging disabled: {}", err);
    }

    match run(&cli) {
        Ok(report) => {
            for path in &report.written {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExportReport, HostError> {
    let saved = match &cli.settings {
        Some(path) => filemanager::load_settings(path)?,
        None => Settings::default(),
    };
    let settings = cli.apply(saved)?;

    let image = filemanager::open_image(&cli.input)?;
    let writer = AssetWriter::new(settings.config.clone());
    let report = writer.export_source(
        &image,
        &settings.options,
        &settings.plan,
        &cli.output_path(),
    )?;

    if let Some(path) = &cli.settings {
        filemanager::save_settings(path, &settings)?;
    }

    Ok(report)
}
