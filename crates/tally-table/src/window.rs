// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use anyhow::{Result, bail};
use tracing::debug;

pub const DEFAULT_BASELINE: usize = 100;
pub const DEFAULT_INCREMENT: usize = 50;
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 200.0;
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    pub baseline: usize,
    pub increment: usize,
    pub scroll_threshold_px: f64,
    pub reveal_delay: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            increment: DEFAULT_INCREMENT,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.baseline == 0 {
            bail!("window baseline must be positive, got 0");
        }
        if self.increment == 0 {
            bail!("window increment must be positive, got 0");
        }
        if !self.scroll_threshold_px.is_finite() || self.scroll_threshold_px < 0.0 {
            bail!(
                "scroll threshold must be a non-negative number of pixels, got {}",
                self.scroll_threshold_px
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn distance_to_end(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    pub fn near_end(&self, threshold_px: f64) -> bool {
        self.distance_to_end() < threshold_px
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealTicket {
    token: u64,
    pub due_after: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Revealing { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Grew { from: usize, to: usize },
    Unchanged,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    config: WindowConfig,
    visible_count: usize,
    phase: RevealPhase,
    last_token: u64,
}

impl Window {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            visible_count: config.baseline,
            phase: RevealPhase::Idle,
            last_token: 0,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_revealing(&self) -> bool {
        matches!(self.phase, RevealPhase::Revealing { .. })
    }

    pub fn visible_len(&self, total: usize) -> usize {
        self.visible_count.min(total)
    }

    pub fn reached_end(&self, total: usize) -> bool {
        self.visible_count >= total && total > self.config.baseline
    }

    /// Back to the baseline, reporting whether the count moved. A reveal
    /// already in flight stays in flight.
    pub fn reset(&mut self) -> bool {
        if self.visible_count == self.config.baseline {
            return false;
        }
        debug!(
            from = self.visible_count,
            to = self.config.baseline,
            "window reset"
        );
        self.visible_count = self.config.baseline;
        true
    }

    pub fn request_more(&mut self, total: usize) -> Option<RevealTicket> {
        if self.is_revealing() || self.visible_count >= total {
            return None;
        }

        self.last_token = self.last_token.wrapping_add(1);
        let token = self.last_token;
        self.phase = RevealPhase::Revealing { token };
        debug!(token, visible = self.visible_count, total, "reveal scheduled");
        Some(RevealTicket {
            token,
            due_after: self.config.reveal_delay,
        })
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics, total: usize) -> Option<RevealTicket> {
        if !metrics.near_end(self.config.scroll_threshold_px) {
            return None;
        }
        self.request_more(total)
    }

    pub fn complete(&mut self, ticket: RevealTicket, total: usize) -> RevealOutcome {
        let expected = RevealPhase::Revealing {
            token: ticket.token,
        };
        if self.phase != expected {
            debug!(token = ticket.token, "stale reveal ticket ignored");
            return RevealOutcome::Stale;
        }

        self.phase = RevealPhase::Idle;
        let from = self.visible_count;
        let to = from.saturating_add(self.config.increment).min(total);
        if to <= from {
            return RevealOutcome::Unchanged;
        }

        self.visible_count = to;
        debug!(token = ticket.token, from, to, total, "reveal completed");
        RevealOutcome::Grew { from, to }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}
