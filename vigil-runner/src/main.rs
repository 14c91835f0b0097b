// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Run one scenario against the dry-run road and record its outputs

use anyhow::{bail, Context, Error};
use argh::FromArgs;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter as TraceLevel;
use tracing_subscriber::fmt::format::FmtSpan;
use vigil::command::DriverClass;
use vigil::configuration::session::Builder as SessionBuilder;
use vigil::scenario::{ScenarioId, CATALOGUE};
use vigil::session::{Peripherals, ScheduledAck, Session};
use vigil::world::{TrafficLightState, World};
use vigil_log::{info, LevelFilter};
use vigil_time::{Clock, Duration, StepClock, WallClock};

mod annunciator;
mod recorder;
mod road;

/// Default output root
const OUTPUT_ROOT: &str = "output";

#[derive(FromArgs)]
#[argh(help_triggers("-h", "--help", "help"))]
/// Scenario runner arguments
struct Args {
    #[argh(description = "scenario id (1-6)")]
    #[argh(option, short = 's')]
    scenario: Option<u8>,

    #[argh(description = "town name, defaults to the scenario's town")]
    #[argh(option, short = 't')]
    town: Option<String>,

    #[argh(description = "driver class: alert, slightly_drowsy, very_drowsy or critical")]
    #[argh(option, short = 'c')]
    driver_class: Option<DriverClass>,

    #[argh(description = "run length in seconds")]
    #[argh(option)]
    horizon: Option<f64>,

    #[argh(description = "tick period in milliseconds")]
    #[argh(option)]
    step_ms: Option<u64>,

    #[argh(description = "speed up (positive) or slow down (negative) vigil time")]
    #[argh(option)]
    speed: Option<i32>,

    #[argh(description = "press the acknowledgment button at this time in seconds")]
    #[argh(option, short = 'a')]
    ack_at: Option<f64>,

    #[argh(description = "output root")]
    #[argh(option, short = 'o')]
    out: Option<PathBuf>,

    #[argh(description = "log level")]
    #[argh(option, short = 'l')]
    log_level: Option<LevelFilter>,

    #[argh(description = "print tick spans")]
    #[argh(switch)]
    trace: bool,

    #[argh(description = "pace ticks on the wall clock")]
    #[argh(switch)]
    realtime: bool,

    #[argh(description = "list the scenarios and exit")]
    #[argh(switch)]
    list: bool,
}

fn main() -> Result<(), Error> {
    let Args {
        scenario,
        town,
        driver_class,
        horizon,
        step_ms,
        speed,
        ack_at,
        out,
        log_level,
        trace,
        realtime,
        list,
    } = argh::from_env();

    vigil_logger::init(log_level.unwrap_or(LevelFilter::Info), true);
    if trace {
        tracing_subscriber::fmt()
            .with_max_level(TraceLevel::DEBUG)
            .with_span_events(FmtSpan::CLOSE)
            .init();
    }

    if list {
        for entry in &CATALOGUE {
            println!("{}: {} ({})", entry.id.value(), entry.title, entry.default_town);
        }
        return Ok(());
    }

    match speed {
        Some(0) => bail!("speed factor must not be zero"),
        Some(factor) => vigil_time::speed(factor),
        None => {}
    }

    let Some(scenario) = scenario else {
        bail!("missing --scenario, see --list");
    };
    let mut builder = SessionBuilder::default().scenario(ScenarioId::new(scenario));
    if let Some(town) = town {
        builder = builder.town(town);
    }
    if let Some(driver_class) = driver_class {
        builder = builder.driver_class(driver_class);
    }
    if let Some(horizon) = horizon {
        builder = builder.horizon(seconds(horizon).context("invalid horizon")?);
    }
    if let Some(step_ms) = step_ms {
        builder = builder.step(Duration::from_millis(step_ms));
    }
    let config = builder.build().context("invalid session parameters")?;
    let ack_at = ack_at
        .map(seconds)
        .transpose()
        .context("invalid acknowledgment time")?;

    let mut session = Session::new(config.clone())?;
    let mut road = road::Road::for_scenario(config.scenario_id);
    road.set_traffic_lights(TrafficLightState::Green)?;

    let out = out.unwrap_or_else(|| PathBuf::from(OUTPUT_ROOT));
    let mut recorder = recorder::Recorder::create(&out, session.session())?;
    road.attach_camera(recorder.frame_counter());

    let mut annunciator = annunciator::LogAnnunciator::default();
    let mut ack = ScheduledAck::new(ack_at);
    let mut clock: Box<dyn Clock> = if realtime {
        Box::new(WallClock::start(config.step))
    } else {
        Box::new(StepClock::new(config.step))
    };

    let summary = session
        .run(
            &mut road,
            clock.as_mut(),
            Peripherals {
                annunciator: &mut annunciator,
                ack: &mut ack,
                observer: Some(&mut recorder),
            },
        )
        .with_context(|| format!("{} failed", config.scenario_id))?;

    let title = session.dispatcher().scenario().title;
    let folder = recorder.finish(title, config.driver_class, &summary)?;
    info!(
        "{} complete: {} after {} ticks, {} annunciator request(s). Files saved in {}",
        config.scenario_id,
        summary.resolution,
        summary.ticks,
        annunciator.announced(),
        folder.display()
    );

    Ok(())
}

/// Duration from a non-negative number of seconds
fn seconds(secs: f64) -> Result<Duration, Error> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{secs} is not a valid number of seconds"))
}
