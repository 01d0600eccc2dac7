use clap::Parser;
use dirsort::audit::init_audit_log;
use dirsort::cli::{Args, Command, MENU, prompt_line, run_cli};
use dirsort::config::Settings;
use dirsort::output::OutputFormatter;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    if let Err(e) = init_audit_log(&settings.audit.path, settings.audit.level()?) {
        OutputFormatter::warning(&format!(
            "Audit log {} unavailable: {}",
            settings.audit.path.display(),
            e
        ));
    }

    let mut stdin = io::stdin().lock();

    let dir = match args.dir {
        Some(dir) => dir,
        None => PathBuf::from(prompt_line(
            "Please enter the folder to be cleaned: ",
            &mut stdin,
        )?),
    };

    if !dir.is_dir() {
        OutputFormatter::error("No such folder exists.");
        return Ok(());
    }
    OutputFormatter::success("Folder Found!");

    let selector = match args.mode {
        Some(mode) => mode,
        None => prompt_line(MENU, &mut stdin)?,
    };

    let Some(command) = Command::from_selector(&selector, args.dry_run) else {
        OutputFormatter::error("Invalid input. Please try again.");
        return Ok(());
    };

    run_cli(command, &dir, &settings)
}
