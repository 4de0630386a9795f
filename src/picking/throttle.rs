//! # Hover Throttle
//!
//! At most one pick resolution per interval; pointer positions arriving in
//! between are coalesced and only the latest is resolved.

use crate::types::Point2;

#[derive(Debug, Clone, PartialEq)]
pub struct HoverThrottle {
    min_interval_s: f64,
    last_resolved_at: Option<f64>,
    pending: Option<Point2>,
}

impl HoverThrottle {
    pub fn new(min_interval_s: f64) -> Self {
        Self { min_interval_s: min_interval_s.max(0.0), last_resolved_at: None, pending: None }
    }

    fn ready(&self, now_s: f64) -> bool {
        self.last_resolved_at.map_or(true, |last| now_s - last >= self.min_interval_s)
    }

    /// Records a pointer move; returns the position to resolve now, if any
    pub fn push(&mut self, position: Point2, now_s: f64) -> Option<Point2> {
        self.pending = Some(position);
        self.poll(now_s)
    }

    /// Releases the coalesced position once the interval has elapsed
    pub fn poll(&mut self, now_s: f64) -> Option<Point2> {
        if self.pending.is_none() || !self.ready(now_s) {
            return None;
        }
        self.last_resolved_at = Some(now_s);
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
