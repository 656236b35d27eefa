use chrono::{Duration, NaiveDateTime};

/// Composite distance between a demand row and a supply candidate.
///
/// The temporal component is the lag from demand to supply; a supply event
/// posted before the demand it would resolve is causally impossible, which
/// the sentinel `None` encodes. The magnitude component is the absolute
/// area difference and only participates while the lag is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    /// Supply lag behind demand; `None` when the supply event precedes
    /// the demand event
    pub temporal: Option<Duration>,
    /// Absolute area difference
    pub area: f64,
}

impl Distance {
    #[must_use]
    pub fn between(
        demand_ts: NaiveDateTime,
        demand_area: f64,
        supply_ts: NaiveDateTime,
        supply_area: f64,
    ) -> Self {
        let lag = supply_ts - demand_ts;
        Self {
            temporal: if lag >= Duration::zero() { Some(lag) } else { None },
            area: (supply_area - demand_area).abs(),
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.temporal.is_some()
    }

    /// Strict dominance: smaller lag AND no-larger area difference.
    ///
    /// This is intentionally not a total order. Two finite distances where
    /// one has the smaller lag but the larger area delta are incomparable;
    /// the caller keeps whichever it encountered first.
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        match (self.temporal, other.temporal) {
            (Some(a), Some(b)) => a < b && self.area <= other.area,
            (Some(_), None) => false, // infinite cells are never in play
            _ => false,
        }
    }
}
