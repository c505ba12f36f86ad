//! Phase display commands
//!
//! Current-phase snapshot plus calendar browsing. Every phase and color here
//! comes out of the `cycle` module's single table; this layer never encodes
//! day ranges of its own.

use crate::cycle::{self, PhaseSnapshot};
use crate::db::AppState;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar cell: the phase projection for a day plus its tint.
/// `phase` and `color` are `None` for days the calculator can't place
/// (no profile, or before the recorded cycle start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
  pub date: NaiveDate,
  pub cycle_day: Option<i64>,
  pub phase: Option<cycle::Phase>,
  pub color: Option<String>,
}

/// Phase snapshot for today. A missing or incomplete profile yields a
/// snapshot with empty fields, not an error: the UI renders "phase will
/// appear once you provide cycle info".
pub async fn get_current_phase(state: &AppState) -> Result<PhaseSnapshot, String> {
  get_phase_for_date(state, Local::now().date_naive()).await
}

/// Phase snapshot for an arbitrary date, to support calendar browsing of
/// past and future days.
pub async fn get_phase_for_date(state: &AppState, date: NaiveDate) -> Result<PhaseSnapshot, String> {
  let profile = state.profiles.read().await.unwrap_or_default();
  Ok(PhaseSnapshot::for_date(&profile, date))
}

/// Phase projection for every day of a month, for calendar coloring.
pub async fn get_phase_calendar(
  state: &AppState,
  year: i32,
  month: u32,
) -> Result<Vec<CalendarDay>, String> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or_else(|| format!("Invalid month: {}-{}", year, month))?;

  let profile = state.profiles.read().await.unwrap_or_default();

  let days = first
    .iter_days()
    .take_while(|d| d.month() == month)
    .map(|date| {
      let snapshot = PhaseSnapshot::for_date(&profile, date);
      CalendarDay {
        date,
        cycle_day: snapshot.cycle_day,
        color: snapshot.phase.map(|p| p.color().to_string()),
        phase: snapshot.phase,
      }
    })
    .collect();

  Ok(days)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cycle::Phase;
  use crate::test_utils::*;

  #[tokio::test]
  async fn test_current_phase_without_profile_is_unknown_not_error() {
    let pool = setup_test_db().await;
    let state = AppState::new(pool.clone());

    let snapshot = get_current_phase(&state).await.unwrap();
    assert!(snapshot.phase.is_none());
    assert!(snapshot.cycle_day.is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_phase_for_date_uses_stored_profile() {
    let pool = setup_test_db().await;
    let state = AppState::new(pool.clone());
    state.profiles.write(&mock_profile()).await.unwrap();

    // mock_profile starts 2024-01-01 with a 28-day cycle
    let snapshot = get_phase_for_date(&state, date(2024, 1, 15)).await.unwrap();
    assert_eq!(snapshot.cycle_day, Some(15));
    assert_eq!(snapshot.phase, Some(Phase::Ovulatory));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_calendar_covers_month_and_matches_calculator() {
    let pool = setup_test_db().await;
    let state = AppState::new(pool.clone());
    let profile = mock_profile();
    state.profiles.write(&profile).await.unwrap();

    let days = get_phase_calendar(&state, 2024, 2).await.unwrap();
    assert_eq!(days.len(), 29); // leap February

    for day in &days {
      assert_eq!(day.phase, cycle::phase_for_date(&profile, day.date));
      assert_eq!(
        day.color.as_deref(),
        day.phase.map(|p| p.color()),
        "color must derive from the phase label for {}",
        day.date
      );
    }

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_calendar_before_cycle_start_has_no_phases() {
    let pool = setup_test_db().await;
    let state = AppState::new(pool.clone());
    state.profiles.write(&mock_profile()).await.unwrap();

    let days = get_phase_calendar(&state, 2023, 12).await.unwrap();
    assert_eq!(days.len(), 31);
    assert!(days.iter().all(|d| d.phase.is_none() && d.color.is_none()));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_calendar_rejects_invalid_month() {
    let pool = setup_test_db().await;
    let state = AppState::new(pool.clone());

    let result = get_phase_calendar(&state, 2024, 13).await;
    assert!(result.is_err());

    teardown_test_db(pool).await;
  }
}
