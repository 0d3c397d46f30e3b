#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub elapsed: Duration,
    pub memory_usage_mb: Option<u64>,
}

/// 記錄每個遷移階段（載入、遷移、匯入整理、套用、寫出）的耗時與記憶體
pub struct PhaseMonitor {
    enabled: bool,
    start_time: Instant,
    phase_start: Instant,
    phases: Vec<PhaseStats>,
    #[cfg(feature = "cli")]
    system: System,
    #[cfg(feature = "cli")]
    pid: Option<Pid>,
}

impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            start_time: now,
            phase_start: now,
            phases: Vec::new(),
            #[cfg(feature = "cli")]
            system: System::new(),
            #[cfg(feature = "cli")]
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// 結束目前階段並開始計時下一階段
    pub fn finish_phase(&mut self, phase: &str) {
        if !self.enabled {
            return;
        }

        let stats = PhaseStats {
            phase: phase.to_string(),
            elapsed: self.phase_start.elapsed(),
            memory_usage_mb: self.memory_usage_mb(),
        };

        match stats.memory_usage_mb {
            Some(memory) => tracing::info!(
                "📊 {} - Time: {:?}, Memory: {}MB",
                stats.phase,
                stats.elapsed,
                memory
            ),
            None => tracing::info!("📊 {} - Time: {:?}", stats.phase, stats.elapsed),
        }

        self.phases.push(stats);
        self.phase_start = Instant::now();
    }

    pub fn phases(&self) -> &[PhaseStats] {
        &self.phases
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.phases.iter().filter_map(|p| p.memory_usage_mb).max();
        match peak {
            Some(peak) => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                self.start_time.elapsed(),
                peak
            ),
            None => tracing::info!("📊 Final Stats - Total Time: {:?}", self.start_time.elapsed()),
        }
    }

    #[cfg(feature = "cli")]
    fn memory_usage_mb(&mut self) -> Option<u64> {
        let pid = self.pid?;
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        self.system
            .process(pid)
            .map(|process| process.memory() / 1024 / 1024)
    }

    #[cfg(not(feature = "cli"))]
    fn memory_usage_mb(&mut self) -> Option<u64> {
        None
    }
}

impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let mut monitor = PhaseMonitor::new(false);
        monitor.finish_phase("migrate");
        assert!(monitor.phases().is_empty());
    }

    #[test]
    fn test_enabled_monitor_records_phases_in_order() {
        let mut monitor = PhaseMonitor::new(true);
        monitor.finish_phase("load");
        monitor.finish_phase("migrate");
        let names: Vec<&str> = monitor.phases().iter().map(|p| p.phase.as_str()).collect();
        assert_eq!(names, vec!["load", "migrate"]);
    }
}
