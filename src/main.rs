// Entry point and interactive CLI flow.
//
// - A workbook given on the command line is loaded before the menu starts.
// - `--json` prints a snapshot of the dashboard and exits.
// - Otherwise the menu lets the user load a workbook, view the summaries,
//   pick a status filter and a KPI, and view the two-period comparison.
mod comparison;
mod config;
mod error;
mod loader;
mod render;
mod selection;
mod session;
mod status;
mod summary;
mod types;
mod util;

use clap::Parser;
use config::{Cli, DashboardConfig};
use error::DashboardError;
use session::Session;
use status::Status;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use tracing_subscriber::EnvFilter;

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Handle option [1]: load a workbook, replacing the current one on success.
fn handle_load(session: &mut Session, config: &DashboardConfig) {
    let Some(path) = read_line("Workbook path: ") else {
        return;
    };
    if path.is_empty() {
        println!("No path given.\n");
        return;
    }
    load_and_report(session, Path::new(&path), config);
}

/// Parse on a separate thread and wait for it, so a panic inside the parser
/// cancels the load instead of ending the session.
fn load_and_report(session: &mut Session, path: &Path, config: &DashboardConfig) {
    let ticket = session.begin_load();
    let worker = {
        let path = path.to_path_buf();
        let config = config.clone();
        thread::spawn(move || loader::load_workbook_path(&path, &config))
    };
    let result = match worker.join() {
        Ok(result) => result,
        Err(_) => {
            session.cancel_load();
            eprintln!("Workbook parser stopped unexpectedly; keeping the current data.\n");
            return;
        }
    };
    match session.finish_load(ticket, result) {
        Ok(dataset) => println!("{}", render::load_banner(&dataset.source, &dataset.report)),
        // Previous dataset, if any, is still active.
        Err(e) => eprintln!("Failed to load workbook: {}\n", e),
    }
}

/// Handle option [3]: choose the status filter.
fn handle_choose_status(session: &mut Session) {
    println!("Status filter:");
    for status in Status::DISPLAY_ORDER {
        println!("[{}] {} {}", status.index() + 1, render::status_glyph(status), status);
    }
    let Some(input) = read_line("Enter choice: ") else {
        return;
    };
    match input.parse::<Status>() {
        Ok(status) => {
            session.select_status(status);
            println!();
            println!("{}", render::kpi_picker(session.records(), session.selection()));
        }
        Err(e) => println!("{}\n", e),
    }
}

/// Handle option [4]: choose a KPI by position or by exact name.
fn handle_choose_kpi(session: &mut Session) {
    println!("{}", render::kpi_picker(session.records(), session.selection()));
    let choices: Vec<String> = session.kpi_choices().iter().map(|s| s.to_string()).collect();
    if choices.is_empty() {
        return;
    }
    let Some(input) = read_line("KPI number or name: ") else {
        return;
    };
    let name = match input.parse::<usize>() {
        Ok(n) if (1..=choices.len()).contains(&n) => choices[n - 1].clone(),
        _ => input,
    };
    match session.select_kpi(&name) {
        Ok(()) => println!("Selected KPI: {}\n", name),
        Err(e) => println!("{}\n", e),
    }
}

fn run_menu(session: &mut Session, config: &DashboardConfig) {
    loop {
        println!("KPI Dashboard - {} vs {}", config.period_labels[0], config.period_labels[1]);
        println!("[1] Load workbook");
        println!("[2] Show summary");
        println!("[3] Choose status");
        println!("[4] Choose KPI");
        println!("[5] Show comparison");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        println!();
        match choice.as_str() {
            "1" => handle_load(session, config),
            "2" => println!("{}", render::dashboard(session, &config.period_labels)),
            "3" => handle_choose_status(session),
            "4" => handle_choose_kpi(session),
            "5" => {
                if session.dataset().is_none() {
                    println!("No workbook loaded yet. Choose [1] to load one.\n");
                } else {
                    println!("{}", render::detail(session, &config.period_labels));
                }
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}

/// Apply `--status` and `--kpi`. A KPI not listed under the status is
/// reported and the default pick is kept.
fn apply_startup_selection(session: &mut Session, cli: &Cli) {
    if let Some(status) = cli.status {
        session.select_status(status);
    }
    if let Some(kpi) = &cli.kpi {
        if let Err(e) = session.select_kpi(kpi) {
            // stderr keeps a --json snapshot on stdout parseable.
            eprintln!("{}\n", e);
        }
    }
}

fn run(cli: Cli) -> Result<(), DashboardError> {
    let config = cli.dashboard_config()?;
    let mut session = Session::new();

    if let Some(path) = &cli.file {
        if cli.json {
            session.load_path(path, &config)?;
        } else {
            load_and_report(&mut session, path, &config);
        }
    }
    apply_startup_selection(&mut session, &cli);

    if cli.json {
        println!("{}", render::snapshot_json(&session)?);
        return Ok(());
    }
    run_menu(&mut session, &config);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
