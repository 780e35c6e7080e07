use std::ops::Range;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct PageWindow {
  pub page:        usize,
  pub total_pages: usize,
  pub total:       usize,
  pub start:       usize,
  pub end:         usize
}

impl PageWindow {
  pub fn compute(
    total: usize,
    page_size: usize,
    requested_page: usize
  ) -> Self {
    let page_size = page_size.max(1);
    let total_pages =
      total_pages(total, page_size);
    let page =
      clamp_page(requested_page, total_pages);
    let start = (page - 1) * page_size;
    let end =
      (start + page_size).min(total);

    Self {
      page,
      total_pages,
      total,
      start: start.min(total),
      end
    }
  }

  pub fn range(&self) -> Range<usize> {
    self.start..self.end
  }

  pub fn has_prev(&self) -> bool {
    self.page > 1
  }

  pub fn has_next(&self) -> bool {
    self.page < self.total_pages
  }

  pub fn describe(&self) -> String {
    let noun = if self.total == 1 {
      "event"
    } else {
      "events"
    };
    if self.total == 0 {
      format!("Showing 0 of 0 {noun}")
    } else {
      format!(
        "Showing {}-{} of {} {noun}",
        self.start + 1,
        self.end,
        self.total
      )
    }
  }
}

pub fn total_pages(
  total: usize,
  page_size: usize
) -> usize {
  total.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(
  page: usize,
  total_pages: usize
) -> usize {
  page.clamp(1, total_pages.max(1))
}
