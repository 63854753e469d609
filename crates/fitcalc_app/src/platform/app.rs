use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use engine_logging::{engine_error, engine_info};
use fitcalc_core::{update, AppState, AppViewModel, Msg};

use super::cli::Cli;
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::render::TerminalView;

/// How long to wait for an engine event before ticking.
const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (mut config, source) = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    engine_logging::initialize(config.log_destination.into(), config.level_filter(cli.verbose)?);
    if let Some(path) = source {
        engine_info!("Loaded config from {:?}", path);
    }

    let fitting = read_fitting(cli.fitting.as_deref())?;
    let runner = EffectRunner::new(config.stream_settings()).context("starting stream engine")?;
    let mut terminal = TerminalView::new(io::stdout().lock(), io::stderr());

    let mut state = AppState::new();
    for msg in [
        Msg::FittingChanged(fitting),
        Msg::IncludeHullToggled(cli.include_hull),
        Msg::Submitted,
    ] {
        state = step(state, msg, &runner, &mut terminal)?;
    }
    if !state.view().is_streaming() {
        bail!("nothing to submit: the fitting is empty");
    }

    while state.view().is_streaming() {
        let msg = match runner.next_msg(TICK_INTERVAL) {
            Ok(msg) => msg.unwrap_or(Msg::Tick),
            Err(err) => {
                engine_error!("Stream engine stopped: {}", err);
                bail!("stream engine stopped unexpectedly");
            }
        };
        state = step(state, msg, &runner, &mut terminal)?;
    }

    let view = state.view();
    terminal.finish(&view)?;
    exit_status(&view)
}

/// A submission that ended on a transport failure exits with an error.
fn exit_status(view: &AppViewModel) -> anyhow::Result<()> {
    match &view.failure {
        Some(failure) => bail!("connection error: {failure}"),
        None => Ok(()),
    }
}

fn step<O: io::Write, S: io::Write>(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    terminal: &mut TerminalView<O, S>,
) -> io::Result<AppState> {
    let (mut state, effects) = update(state, msg);
    runner.enqueue(effects);
    if state.consume_dirty() {
        terminal.render(&state.view())?;
    }
    Ok(state)
}

fn read_fitting(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("reading fitting from {path:?}"))
        }
        _ => {
            let mut fitting = String::new();
            io::stdin()
                .read_to_string(&mut fitting)
                .context("reading fitting from stdin")?;
            Ok(fitting)
        }
    }
}
