//! Cycle phase calculator
//!
//! The one deterministic piece of the app: maps a recorded cycle start, a
//! reported cycle length, and a reference date to one of four phase labels.
//! Everything downstream (calendar coloring, suggestion prompts) derives its
//! behavior from the `Phase` label produced here; the day-range table lives
//! in this module and nowhere else.

use crate::models::Profile;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Phase Table
/// ---------------------------------------------------------------------------

/// Shortest cycle length for which a phase is computable.
pub const MIN_CYCLE_LENGTH: i64 = 15;

/// Last cycle day of the menstrual range.
const MENSTRUAL_END: i64 = 5;
/// Last cycle day of the follicular range.
const FOLLICULAR_END: i64 = 13;
/// Last cycle day of the ovulatory range.
const OVULATORY_END: i64 = 17;

/// One of four mutually exclusive labels over the cycle. A derived value,
/// recomputed from the profile and a reference date on every read; "phase
/// unknown" is represented as `Option<Phase>::None`, a distinct non-error
/// state that callers must render as "phase will appear once you provide
/// cycle info".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
  Menstrual,
  Follicular,
  Ovulatory,
  Luteal,
}

impl Phase {
  /// Map a 1-based cycle day to a phase.
  ///
  /// Fixed ranges: [1,5] Menstrual, [6,13] Follicular, [14,17] Ovulatory,
  /// [18,cycle_length] Luteal. When `cycle_length < 18` the Luteal range is
  /// empty; days outside every defined range yield `None` rather than a
  /// guessed phase.
  pub fn for_cycle_day(cycle_day: i64, cycle_length: i64) -> Option<Self> {
    match cycle_day {
      d if d < 1 => None,
      1..=MENSTRUAL_END => Some(Phase::Menstrual),
      d if d <= FOLLICULAR_END => Some(Phase::Follicular),
      d if d <= OVULATORY_END => Some(Phase::Ovulatory),
      d if d <= cycle_length => Some(Phase::Luteal),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Menstrual => "Menstrual",
      Phase::Follicular => "Follicular",
      Phase::Ovulatory => "Ovulatory",
      Phase::Luteal => "Luteal",
    }
  }

  /// Calendar tint for this phase (hex). Presentation components key off the
  /// label only; they never re-encode day ranges.
  pub fn color(&self) -> &'static str {
    match self {
      Phase::Menstrual => "#e57373",
      Phase::Follicular => "#64b5f6",
      Phase::Ovulatory => "#ffd54f",
      Phase::Luteal => "#ba68c8",
    }
  }

  pub fn all() -> [Phase; 4] {
    [Phase::Menstrual, Phase::Follicular, Phase::Ovulatory, Phase::Luteal]
  }
}

impl std::fmt::Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// ---------------------------------------------------------------------------
/// Calculator
/// ---------------------------------------------------------------------------

/// Compute the 1-based day index within the current cycle for `reference`.
///
/// Returns `None` when the reference date precedes the recorded cycle start
/// (the system has no model for phases before a recorded start) or when
/// `cycle_length` is below the computable minimum. No upper bound is enforced
/// here: input forms cap entry at 45, but legacy stored values must still be
/// tolerated.
pub fn cycle_day(start: NaiveDate, cycle_length: i64, reference: NaiveDate) -> Option<i64> {
  if cycle_length < MIN_CYCLE_LENGTH {
    return None;
  }

  let days_since_start = (reference - start).num_days();
  if days_since_start < 0 {
    return None;
  }

  Some((days_since_start % cycle_length) + 1)
}

/// Typed core of the calculator: phase for a concrete start date, length,
/// and reference day.
pub fn phase_on(start: NaiveDate, cycle_length: i64, reference: NaiveDate) -> Option<Phase> {
  cycle_day(start, cycle_length, reference).and_then(|d| Phase::for_cycle_day(d, cycle_length))
}

/// Phase for an arbitrary reference date, reading cycle data from the stored
/// profile. All invalid or insufficient input funnels to `None`; this never
/// panics and is deterministic for fixed inputs.
pub fn phase_for_date(profile: &Profile, reference: NaiveDate) -> Option<Phase> {
  let (start, len) = cycle_anchor(profile)?;
  phase_on(start, len, reference)
}

/// Phase for a timestamped reference. The timestamp is normalized to its
/// calendar day first, so time-of-day never perturbs the result.
pub fn phase_for_datetime(profile: &Profile, reference: DateTime<Utc>) -> Option<Phase> {
  phase_for_date(profile, reference.date_naive())
}

/// Phase for today.
pub fn current_phase(profile: &Profile) -> Option<Phase> {
  phase_for_date(profile, Local::now().date_naive())
}

/// A point-in-time projection of the cycle for display. `cycle_day` and
/// `phase` are both `None` when the phase cannot be computed from the
/// stored profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSnapshot {
  pub date: NaiveDate,
  pub cycle_day: Option<i64>,
  pub phase: Option<Phase>,
}

impl PhaseSnapshot {
  pub fn for_date(profile: &Profile, date: NaiveDate) -> Self {
    let anchor = cycle_anchor(profile);
    let day = anchor.and_then(|(start, len)| cycle_day(start, len, date));
    let phase = match (anchor, day) {
      (Some((_, len)), Some(d)) => Phase::for_cycle_day(d, len),
      _ => None,
    };

    Self {
      date,
      cycle_day: day,
      phase,
    }
  }
}

/// Extract a usable (start date, cycle length) pair from the profile, or
/// `None` when either field is absent or unparsable.
fn cycle_anchor(profile: &Profile) -> Option<(NaiveDate, i64)> {
  let start = profile
    .last_cycle_start
    .as_deref()
    .and_then(parse_cycle_start)?;
  let len = profile.cycle_length?;
  if len < MIN_CYCLE_LENGTH {
    return None;
  }
  Some((start, len))
}

/// Parse a stored cycle-start value to a calendar day.
///
/// Stored values are semantically dates, but legacy records may carry a full
/// date-time (e.g. an ISO-8601 timestamp from a date picker); any time
/// component is stripped.
fn parse_cycle_start(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();

  if let Ok(date) = raw.parse::<NaiveDate>() {
    return Some(date);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.date_naive());
  }
  if let Ok(dt) = raw.parse::<NaiveDateTime>() {
    return Some(dt.date());
  }

  None
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
