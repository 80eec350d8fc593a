//! HUD status line.

use std::fmt;

use lifegrid_kernel::SimulationCore;

/// Days per calendar week.
pub const DAYS_PER_WEEK: u64 = 7;
/// Days per calendar month.
pub const DAYS_PER_MONTH: u64 = 30;
/// Days per calendar year.
pub const DAYS_PER_YEAR: u64 = 365;

/// Tick count, population and calendar of a core. One tick is one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    /// Ticks since the last reset
    pub tick: u64,
    /// Living cells
    pub population: usize,
}

impl StatusLine {
    /// Reads the current status of `core`.
    #[must_use]
    pub const fn from_core(core: &SimulationCore) -> Self {
        Self {
            tick: core.tick_count(),
            population: core.population(),
        }
    }

    /// Days elapsed.
    #[must_use]
    pub const fn days(&self) -> u64 {
        self.tick
    }

    /// Whole weeks elapsed.
    #[must_use]
    pub const fn weeks(&self) -> u64 {
        self.days() / DAYS_PER_WEEK
    }

    /// Whole months elapsed.
    #[must_use]
    pub const fn months(&self) -> u64 {
        self.days() / DAYS_PER_MONTH
    }

    /// Whole years elapsed.
    #[must_use]
    pub const fn years(&self) -> u64 {
        self.days() / DAYS_PER_YEAR
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticks: {} | Population: {} | Day {} (Week {}, Month {}, Year {})",
            self.tick,
            self.population,
            self.days(),
            self.weeks(),
            self.months(),
            self.years()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_kernel::SimulationSettings;

    #[test]
    fn test_calendar() {
        let status = StatusLine {
            tick: 800,
            population: 12,
        };
        assert_eq!(status.days(), 800);
        assert_eq!(status.weeks(), 114);
        assert_eq!(status.months(), 26);
        assert_eq!(status.years(), 2);
    }

    #[test]
    fn test_display() {
        let status = StatusLine {
            tick: 6,
            population: 3,
        };
        assert_eq!(
            status.to_string(),
            "Ticks: 6 | Population: 3 | Day 6 (Week 0, Month 0, Year 0)"
        );
    }

    #[test]
    fn test_from_core() {
        let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(8));
        core.set_cell_alive(0, 0, 1.0, 0);
        core.tick();
        let status = StatusLine::from_core(&core);
        assert_eq!(status.tick, 1);
        assert_eq!(status.population, core.population());
    }
}
