#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseSequence {
  issued:        u64,
  applied:       u64,
  discard_stale: bool
}

impl ResponseSequence {
  pub fn new(discard_stale: bool) -> Self {
    Self {
      issued: 0,
      applied: 0,
      discard_stale
    }
  }

  pub fn issue(&mut self) -> u64 {
    self.issued += 1;
    self.issued
  }

  pub fn accept(&mut self, seq: u64) -> bool {
    if self.discard_stale && seq < self.applied {
      tracing::debug!(
        seq,
        applied = self.applied,
        "discarding stale response"
      );
      return false;
    }
    self.applied = self.applied.max(seq);
    true
  }
}
