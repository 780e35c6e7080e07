/// Repeating fetch schedule driven by an external millisecond clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
  period_ms:   u64,
  next_due_ms: Option<u64>
}

impl PollSchedule {
  pub fn new(period_ms: u64) -> Self {
    Self {
      period_ms:   period_ms.max(1),
      next_due_ms: None
    }
  }

  pub fn period_ms(&self) -> u64 {
    self.period_ms
  }

  pub fn start(&mut self, now_ms: u64) {
    self.next_due_ms =
      Some(now_ms.saturating_add(self.period_ms));
    tracing::debug!(
      period_ms = self.period_ms,
      now_ms,
      "poll schedule started"
    );
  }

  pub fn cancel(&mut self) {
    if self.next_due_ms.take().is_some() {
      tracing::debug!("poll schedule cancelled");
    }
  }

  pub fn poll(&mut self, now_ms: u64) -> bool {
    let Some(due) = self.next_due_ms else {
      return false;
    };
    if now_ms < due {
      return false;
    }

    let missed = (now_ms - due) / self.period_ms;
    if missed > 0 {
      tracing::debug!(
        missed,
        "poll schedule skipped periods"
      );
    }
    self.next_due_ms = Some(
      due.saturating_add(
        (missed + 1).saturating_mul(self.period_ms)
      )
    );
    true
  }
}

#[cfg(test)]
mod tests {
  use super::PollSchedule;

  #[test]
  fn fires_once_per_period_on_virtual_clock() {
    let mut schedule = PollSchedule::new(15_000);
    assert!(!schedule.poll(0));

    schedule.start(0);
    let fired: Vec<u64> = (0..=60_000)
      .step_by(1_000)
      .filter(|now| schedule.poll(*now))
      .collect();

    assert_eq!(fired, vec![15_000, 30_000, 45_000, 60_000]);
  }

  #[test]
  fn stalled_clock_collapses_missed_periods() {
    let mut schedule = PollSchedule::new(15_000);
    schedule.start(0);

    assert!(schedule.poll(50_000));
    assert!(!schedule.poll(55_000));
    assert!(schedule.poll(60_000));
  }

  #[test]
  fn cancelled_schedule_never_fires() {
    let mut schedule = PollSchedule::new(15_000);
    schedule.start(0);
    schedule.cancel();

    assert!(!schedule.poll(1_000_000));
  }
}
