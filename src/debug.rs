/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * shown in the stats panel: frame timing, how long the last tick took and
 * what it did.
 */

use std::time::Duration;

use crate::flocking::TickStats;

// Debug information to display
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub tick_time: Duration,
    pub last_tick: TickStats,
    pub ticks: u64,
}

impl DebugInfo {
    pub fn record_tick(&mut self, stats: TickStats, tick_time: Duration, ticks: u64) {
        self.last_tick = stats;
        self.tick_time = tick_time;
        self.ticks = ticks;
    }

    // Average candidates looked at per birb in the last tick
    pub fn candidates_per_birb(&self, population: usize) -> f32 {
        if population == 0 {
            0.0
        } else {
            self.last_tick.candidates_examined as f32 / population as f32
        }
    }
}
