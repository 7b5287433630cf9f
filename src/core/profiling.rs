//! Lightweight timing of named sections of the decision loop
//!
//! `ScopedTimer` records into a `Profiler` when dropped, so a section is
//! timed simply by keeping the guard alive for its duration.

use std::time::{Duration, Instant};

use ahash::AHashMap;

/// Statistics for a profiled section
#[derive(Debug, Default, Clone)]
pub struct SectionStats {
    pub total_time: Duration,
    pub call_count: u64,
    pub min_time: Option<Duration>,
    pub max_time: Option<Duration>,
}

impl SectionStats {
    pub fn avg_time(&self) -> Duration {
        if self.call_count == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.total_time.as_secs_f64() / self.call_count as f64)
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
        self.call_count += 1;
        self.min_time = Some(self.min_time.map_or(elapsed, |m| m.min(elapsed)));
        self.max_time = Some(self.max_time.map_or(elapsed, |m| m.max(elapsed)));
    }
}

/// Accumulated timings per section name
#[derive(Debug, Default)]
pub struct Profiler {
    sections: AHashMap<&'static str, SectionStats>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing `name`; the sample is recorded when the guard drops
    pub fn scope(&mut self, name: &'static str) -> ScopedTimer<'_> {
        ScopedTimer {
            profiler: self,
            name,
            start: Instant::now(),
        }
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        self.sections.entry(name).or_default().record(elapsed);
    }

    pub fn section(&self, name: &str) -> Option<&SectionStats> {
        self.sections.get(name)
    }

    /// Sections sorted by total time, slowest first
    pub fn report(&self) -> Vec<(&'static str, SectionStats)> {
        let mut sections: Vec<_> = self
            .sections
            .iter()
            .map(|(name, stats)| (*name, stats.clone()))
            .collect();
        sections.sort_by(|a, b| b.1.total_time.cmp(&a.1.total_time));
        sections
    }

    pub fn reset(&mut self) {
        self.sections.clear();
    }
}

/// RAII guard timing one section
pub struct ScopedTimer<'a> {
    profiler: &'a mut Profiler,
    name: &'static str,
    start: Instant,
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::trace!(section = self.name, elapsed_us = elapsed.as_micros() as u64, "profile");
        self.profiler.record(self.name, elapsed);
    }
}
