// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Output folder, control log and run summary of one session

use anyhow::{Context, Error};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use vigil::cleanup::CleanupLog;
use vigil::command::DriverClass;
use vigil::error::Error as VigilError;
use vigil::scenario::{Resolution, ScenarioId};
use vigil::session::{RunSummary, ScenarioSession, TickObserver, TickRecord};
use vigil_log::{debug, info};

const CONTROLS_FILE: &str = "controls.csv";
const SUMMARY_FILE: &str = "summary.json";
const CONTROLS_HEADER: &str = "time,steer,throttle,brake,speed_kmh,driver_state";

/// Name of the output folder of a run
pub fn folder_name(scenario_id: ScenarioId, town: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{scenario_id}-{town}-{suffix}"),
        None => format!("{scenario_id}-{town}"),
    }
}

/// Suffix of the folder while the run is in progress. Drowsiness scenarios are labeled
/// with the driver class right away.
fn initial_suffix(scenario_id: ScenarioId, driver_class: DriverClass) -> Option<String> {
    match scenario_id.value() {
        1 | 2 => Some(driver_class.folder_label()),
        _ => None,
    }
}

/// Contents of `summary.json`
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub scenario: ScenarioId,
    pub title: &'a str,
    pub town: &'a str,
    pub driver_class: DriverClass,
    pub resolution: Resolution,
    pub resolution_tag: String,
    pub final_phase: Option<String>,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub frames: u64,
    pub cleanup_failures: usize,
}

/// Writes the control log of a run into a fresh output folder
#[derive(Debug)]
pub struct Recorder {
    root: PathBuf,
    folder: PathBuf,
    scenario_id: ScenarioId,
    town: String,
    controls: BufWriter<File>,
    rows: u64,
    frames: Arc<AtomicU64>,
}

impl Recorder {
    /// Create the output folder below `root`, replacing a folder left by a previous run
    pub fn create(root: &Path, session: &ScenarioSession) -> Result<Self, Error> {
        let suffix = initial_suffix(session.scenario_id, session.driver_class);
        let folder = root.join(folder_name(
            session.scenario_id,
            &session.town,
            suffix.as_deref(),
        ));
        if folder.exists() {
            debug!("Removing stale output folder {}", folder.display());
            fs::remove_dir_all(&folder)
                .with_context(|| format!("failed to remove {}", folder.display()))?;
        }
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed to create {}", folder.display()))?;

        let path = folder.join(CONTROLS_FILE);
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut controls = BufWriter::new(file);
        writeln!(controls, "{CONTROLS_HEADER}")
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!("Saving outputs to {}", folder.display());
        Ok(Self {
            root: root.to_path_buf(),
            folder,
            scenario_id: session.scenario_id,
            town: session.town.clone(),
            controls,
            rows: 0,
            frames: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Current output folder
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Number of rows written to the control log
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Frame counter handed to capture callbacks
    pub fn frame_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames)
    }

    /// Flush the control log, move the folder to its resolved name and write the summary.
    ///
    /// Renaming is best effort: on failure the outputs stay in the initial folder.
    /// Returns the final folder.
    pub fn finish(
        mut self,
        title: &str,
        driver_class: DriverClass,
        run: &RunSummary,
    ) -> Result<PathBuf, Error> {
        self.controls
            .flush()
            .context("failed to flush the control log")?;
        drop(self.controls);

        let mut cleanup = CleanupLog::default();
        if let Some(suffix) = run.resolution.folder_suffix() {
            let resolved = self.root.join(folder_name(
                self.scenario_id,
                &self.town,
                Some(&suffix),
            ));
            if resolved != self.folder
                && cleanup
                    .attempt("rename output folder", rename(&self.folder, &resolved))
                    .is_some()
            {
                info!("Output folder renamed to {}", resolved.display());
                self.folder = resolved;
            }
        }

        let summary = Summary {
            scenario: self.scenario_id,
            title,
            town: &self.town,
            driver_class,
            resolution: run.resolution,
            resolution_tag: run.resolution.to_string(),
            final_phase: run.final_phase.map(|phase| phase.to_string()),
            ticks: run.ticks,
            elapsed_secs: run.elapsed.as_secs_f64(),
            frames: self.frames.load(Ordering::Relaxed),
            cleanup_failures: run.cleanup_failures + cleanup.failures().len(),
        };
        let path = self.folder.join(SUMMARY_FILE);
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(self.folder)
    }
}

/// Move `from` to `to`, replacing whatever `to` holds
fn rename(from: &Path, to: &Path) -> vigil::error::Result<()> {
    if to.exists() {
        fs::remove_dir_all(to)
            .map_err(|e| VigilError::Io((e, "failed to remove the resolved folder")))?;
    }
    fs::rename(from, to).map_err(|e| VigilError::Io((e, "failed to rename the output folder")))
}

impl TickObserver for Recorder {
    fn observe(&mut self, record: &TickRecord) -> vigil::error::Result<()> {
        let command = record.command;
        writeln!(
            self.controls,
            "{:.6},{},{},{},{},{}",
            record.wall_time.as_unix_secs_f64(),
            command.steer,
            command.throttle,
            command.brake,
            command.speed,
            record.driver_class,
        )
        .map_err(|e: io::Error| VigilError::Io((e, "failed to write the control log")))?;
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{folder_name, Recorder, CONTROLS_HEADER};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;
    use vigil::command::{ControlCommand, DriverClass};
    use vigil::scenario::{Resolution, ScenarioId};
    use vigil::session::{RunSummary, ScenarioSession, TickObserver, TickRecord};
    use vigil_time::{Duration, SystemTime};

    fn scratch(name: &str) -> PathBuf {
        let root = std::env::temp_dir()
            .join(format!("vigil-recorder-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        root
    }

    fn session(id: u8, driver_class: DriverClass) -> ScenarioSession {
        ScenarioSession {
            scenario_id: ScenarioId::new(id),
            town: "Town01".to_string(),
            driver_class,
            start_time: SystemTime::now(),
        }
    }

    fn summary(resolution: Resolution) -> RunSummary {
        RunSummary {
            ticks: 1,
            resolution,
            final_phase: None,
            elapsed: Duration::from_millis(50),
            cleanup_failures: 0,
        }
    }

    #[test]
    fn folder_names() {
        assert_eq!(folder_name(ScenarioId::new(3), "Town01", None), "Scenario3-Town01");
        assert_eq!(
            folder_name(ScenarioId::new(1), "Town01", Some("slightly_drowsy")),
            "Scenario1-Town01-slightly_drowsy"
        );
    }

    #[test]
    fn critical_run_is_renamed_to_its_resolution() {
        let root = scratch("rename");
        let mut recorder = Recorder::create(&root, &session(1, DriverClass::Critical)).unwrap();
        assert_eq!(
            recorder.folder(),
            root.join("Scenario1-Town01-critical_drowsiness")
        );

        let command = ControlCommand::drive(0.0, 0.45, 12.5);
        recorder
            .observe(&TickRecord {
                tick: 0,
                elapsed: Duration::ZERO,
                wall_time: SystemTime::now(),
                command: &command,
                driver_class: DriverClass::Critical,
                resolution: Resolution::Driver(DriverClass::Critical),
            })
            .unwrap();
        recorder.frame_counter().fetch_add(3, Ordering::Relaxed);
        assert_eq!(recorder.rows(), 1);

        let folder = recorder
            .finish(
                "urban",
                DriverClass::Critical,
                &summary(Resolution::CriticalUserCancelled),
            )
            .unwrap();
        assert_eq!(folder, root.join("Scenario1-Town01-critical_user_cancelled"));
        assert!(!root.join("Scenario1-Town01-critical_drowsiness").exists());

        let controls = fs::read_to_string(folder.join("controls.csv")).unwrap();
        let mut lines = controls.lines();
        assert_eq!(lines.next(), Some(CONTROLS_HEADER));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), 6);
        assert_eq!(&row[1..], ["0", "0.45", "0", "12.5", "critical drowsiness"]);
        assert_eq!(lines.next(), None);

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(folder.join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["resolution_tag"], "critical_user_cancelled");
        assert_eq!(summary["frames"], 3);
        assert_eq!(summary["ticks"], 1);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn unresolved_run_keeps_its_folder() {
        let root = scratch("unresolved");
        let stale = root.join("Scenario6-Town01");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.txt"), "old run").unwrap();

        let recorder = Recorder::create(&root, &session(6, DriverClass::Alert)).unwrap();
        assert!(!stale.join("leftover.txt").exists());
        let folder = recorder
            .finish("oncoming", DriverClass::Alert, &summary(Resolution::Unresolved))
            .unwrap();
        assert_eq!(folder, stale);
        assert!(folder.join("summary.json").exists());

        fs::remove_dir_all(&root).unwrap();
    }
}
