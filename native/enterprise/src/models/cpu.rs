/// Tick counters of one CPU core as reported by the service.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CpuUsageInfo {
    pub active: u64,
    pub total: u64,
}

impl CpuUsageInfo {
    /// Fraction of time the core was busy, within `[0, 1]`.
    pub fn usage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.active as f64 / self.total as f64).clamp(0.0, 1.0) as f32
    }
}
