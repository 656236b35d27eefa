//! The matching engine: strategy cascade, neighborhood partitioning,
//! greedy nearest-neighbor assignment, and the run outcome model.
//!
//! ## Matching pipeline
//!
//! 1. Rows settled by a previous run claim their supply entities up front.
//! 2. The **strategy cascade** tries, per row and in priority order:
//!    reference lookup, tight match, loose match, cross-reference match,
//!    same-day fallback, exclusion list. First success wins; the claimed
//!    entity leaves the index immediately.
//! 3. Remaining rows and entities are partitioned into **neighborhoods**
//!    by `(item, qty, material)` and paired greedily by minimum distance
//!    (temporal lag primary, area delta secondary, causally impossible
//!    pairs never considered).
//! 4. The applier emits resolutions, enforces at-most-once consumption,
//!    and reports everything left over.
//!
//! The assignment is greedy, not globally optimal: neighborhoods are small
//! by construction, and the locally best pair is accepted outright.

pub mod engine;
pub mod neighborhood;
pub mod outcome;
pub mod strategy;

pub use engine::{ReconcileConfig, ReconcileError, Reconciler};
pub use outcome::{Anomaly, MatchResolution, RunOutcome, UnmatchedRow};
pub use strategy::Tolerances;
