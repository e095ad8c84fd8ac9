//! Constant power-model emissions tracker.
//!
//! Energy is integrated from fixed CPU and RAM power draws by a background
//! sampler, then converted to CO₂eq with a grid carbon intensity.

use super::side_log::{EmissionsReading, SideLog};
use super::{EmissionsProvider, ProviderError, ProviderResult};
use crate::config::EmissionsConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

const JOULES_PER_KWH: f64 = 3.6e6;

/// Integrated energy since the session started.
#[derive(Debug)]
struct EnergyMeter {
    last_sample: Instant,
    cpu_joules: f64,
    ram_joules: f64,
    samples: u64,
}

impl EnergyMeter {
    fn new(now: Instant) -> Self {
        Self { last_sample: now, cpu_joules: 0.0, ram_joules: 0.0, samples: 0 }
    }

    fn sample(&mut self, now: Instant, cpu_watts: f64, ram_watts: f64) {
        let dt = now.saturating_duration_since(self.last_sample).as_secs_f64();
        self.cpu_joules += cpu_watts * dt;
        self.ram_joules += ram_watts * dt;
        self.samples += 1;
        self.last_sample = now;
    }
}

fn lock(meter: &Mutex<EnergyMeter>) -> MutexGuard<'_, EnergyMeter> {
    meter.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct ActiveSession {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    started: Instant,
    meter: Arc<Mutex<EnergyMeter>>,
    sampler: JoinHandle<()>,
}

/// [`EmissionsProvider`] backed by a constant power model.
pub struct PowerModelTracker {
    config: EmissionsConfig,
    side_log: Option<SideLog>,
    active: Option<ActiveSession>,
    last_reading: Option<EmissionsReading>,
}

impl PowerModelTracker {
    pub fn new(config: EmissionsConfig) -> Self {
        let side_log = config.side_log().map(SideLog::new);
        Self { config, side_log, active: None, last_reading: None }
    }

    #[must_use]
    pub fn config(&self) -> &EmissionsConfig {
        &self.config
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Reading produced by the most recent `stop`.
    #[must_use]
    pub fn last_reading(&self) -> Option<&EmissionsReading> {
        self.last_reading.as_ref()
    }

    fn reading(&self, session: &ActiveSession, meter: &EnergyMeter) -> EmissionsReading {
        let duration_s = session.started.elapsed().as_secs_f64();
        let cpu_energy_kwh = meter.cpu_joules / JOULES_PER_KWH;
        let ram_energy_kwh = meter.ram_joules / JOULES_PER_KWH;
        let energy_consumed_kwh = cpu_energy_kwh + ram_energy_kwh;
        let emissions_kg = energy_consumed_kwh * self.config.carbon_intensity_g_per_kwh / 1000.0;
        let emissions_rate_kg_per_s = if duration_s > 0.0 { emissions_kg / duration_s } else { 0.0 };

        EmissionsReading {
            timestamp: session.started_at,
            project_name: self.config.project_name.clone(),
            run_id: session.run_id.to_string(),
            duration_s,
            emissions_kg,
            emissions_rate_kg_per_s,
            cpu_power_w: self.config.cpu_power_watts,
            ram_power_w: self.config.ram_power_watts,
            cpu_energy_kwh,
            ram_energy_kwh,
            energy_consumed_kwh,
            samples: meter.samples,
        }
    }
}

#[async_trait]
impl EmissionsProvider for PowerModelTracker {
    async fn start(&mut self) -> ProviderResult<()> {
        if self.active.is_some() {
            return Err(ProviderError::AlreadyStarted);
        }
        self.config.validate().map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;

        let started = Instant::now();
        let meter = Arc::new(Mutex::new(EnergyMeter::new(started)));
        let cpu_watts = self.config.cpu_power_watts;
        let ram_watts = self.config.ram_power_watts;

        let mut interval = tokio::time::interval(self.config.measure_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let sampler_meter = Arc::clone(&meter);
        let sampler = tokio::spawn(async move {
            loop {
                interval.tick().await;
                {
                    let mut meter = lock(&sampler_meter);
                    meter.sample(Instant::now(), cpu_watts, ram_watts);
                    tracing::debug!(samples = meter.samples, "emissions sample");
                }
            }
        });

        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, project = %self.config.project_name, "measurement started");
        self.active = Some(ActiveSession { run_id, started_at: Utc::now(), started, meter, sampler });
        Ok(())
    }

    async fn stop(&mut self) -> ProviderResult<f64> {
        let mut session = self.active.take().ok_or(ProviderError::NotStarted)?;
        session.sampler.abort();
        if let Err(e) = (&mut session.sampler).await {
            if !e.is_cancelled() {
                return Err(ProviderError::Sampler(e.to_string()));
            }
        }

        let reading = {
            let mut meter = lock(&session.meter);
            meter.sample(Instant::now(), self.config.cpu_power_watts, self.config.ram_power_watts);
            self.reading(&session, &meter)
        };

        tracing::debug!(
            run_id = %reading.run_id,
            duration_s = reading.duration_s,
            emissions_kg = reading.emissions_kg,
            "measurement stopped"
        );

        if let Some(side_log) = &self.side_log {
            if let Err(e) = side_log.append(&reading) {
                tracing::warn!(path = %side_log.path().display(), error = %e, "failed to write emissions side log");
            }
        }

        let emissions_kg = reading.emissions_kg;
        self.last_reading = Some(reading);
        Ok(emissions_kg)
    }
}

impl Drop for PowerModelTracker {
    fn drop(&mut self) {
        if let Some(session) = self.active.take() {
            session.sampler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn quick_config(side_log: Option<std::path::PathBuf>) -> EmissionsConfig {
        EmissionsConfig { measure_interval_secs: 0.01, side_log, ..Default::default() }
    }

    #[test]
    fn test_meter_integrates_power() {
        let start = Instant::now();
        let mut meter = EnergyMeter::new(start);
        meter.sample(start + Duration::from_secs(2), 40.0, 10.0);
        assert!((meter.cpu_joules - 80.0).abs() < 1e-9);
        assert!((meter.ram_joules - 20.0).abs() < 1e-9);
        assert_eq!(meter.samples, 1);
    }

    #[tokio::test]
    async fn test_stop_without_start_fails() {
        let mut tracker = PowerModelTracker::new(quick_config(None));
        assert!(matches!(tracker.stop().await, Err(ProviderError::NotStarted)));
    }

    #[tokio::test]
    async fn test_double_start_fails() {
        let mut tracker = PowerModelTracker::new(quick_config(None));
        tracker.start().await.unwrap();
        assert!(matches!(tracker.start().await, Err(ProviderError::AlreadyStarted)));
        tracker.stop().await.unwrap();
        assert!(!tracker.is_active());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_on_start() {
        let config = EmissionsConfig { cpu_power_watts: -5.0, side_log: None, ..Default::default() };
        let mut tracker = PowerModelTracker::new(config);
        assert!(matches!(tracker.start().await, Err(ProviderError::InvalidConfig(_))));
        assert!(!tracker.is_active());
    }

    #[tokio::test]
    async fn test_measurement_is_positive_and_logged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("emissions.csv");
        let mut tracker = PowerModelTracker::new(quick_config(Some(path.clone())));

        for _ in 0..2 {
            tracker.start().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            let kg = tracker.stop().await.unwrap();
            assert!(kg.is_finite() && kg > 0.0);

            let reading = tracker.last_reading().unwrap();
            assert!(reading.samples >= 2);
            // 48.5 W for at least 50 ms at 475 g/kWh.
            let floor = 48.5 * 0.05 / JOULES_PER_KWH * 475.0 / 1000.0;
            assert!(kg >= floor * 0.99);
            assert!((reading.energy_consumed_kwh - (reading.cpu_energy_kwh + reading.ram_energy_kwh)).abs() < 1e-15);
        }

        let rows = SideLog::new(&path).read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].run_id, rows[1].run_id);
        assert_eq!(rows[0].project_name, "greenmodel");
    }

    #[tokio::test]
    async fn test_side_log_failure_does_not_fail_measurement() {
        let temp = TempDir::new().unwrap();
        let mut tracker = PowerModelTracker::new(quick_config(Some(temp.path().to_path_buf())));
        tracker.start().await.unwrap();
        assert!(tracker.stop().await.is_ok());
    }
}
