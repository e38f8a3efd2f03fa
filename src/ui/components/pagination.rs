use ratatui::prelude::*;

/// One slot of the page strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
  Page(usize),
  Ellipsis,
}

/// Pages to show for `current` of `total` (1-based).
///
/// Up to five pages are listed in full. Beyond that: the first page, the
/// current page with one neighbour each side, the last page, and an ellipsis
/// for every gap.
pub fn page_numbers(current: usize, total: usize) -> Vec<PageItem> {
  if total <= 5 {
    return (1..=total).map(PageItem::Page).collect();
  }

  let current = current.clamp(1, total);
  let start = current.saturating_sub(1).max(2);
  let end = (current + 1).min(total - 1);

  let mut items = vec![PageItem::Page(1)];
  if start > 2 {
    items.push(PageItem::Ellipsis);
  }
  items.extend((start..=end).map(PageItem::Page));
  if end < total - 1 {
    items.push(PageItem::Ellipsis);
  }
  items.push(PageItem::Page(total));
  items
}

/// 1-based page cursor over a list whose length changes as data loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
  page: usize,
  size: usize,
}

impl Pager {
  pub fn new(size: usize) -> Self {
    Self {
      page: 1,
      size: size.max(1),
    }
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn total_pages(&self, len: usize) -> usize {
    len.div_ceil(self.size)
  }

  /// Keep the page in range after the list shrank
  pub fn clamp(&mut self, len: usize) {
    self.page = self.page.clamp(1, self.total_pages(len).max(1));
  }

  pub fn next(&mut self, len: usize) -> bool {
    if self.page < self.total_pages(len) {
      self.page += 1;
      true
    } else {
      false
    }
  }

  pub fn prev(&mut self) -> bool {
    if self.page > 1 {
      self.page -= 1;
      true
    } else {
      false
    }
  }

  pub fn reset(&mut self) {
    self.page = 1;
  }

  /// Index into the full list of row `row` on the current page
  pub fn absolute(&self, row: usize) -> usize {
    (self.page - 1) * self.size + row
  }

  /// Range of the full list shown on the current page
  pub fn range(&self, len: usize) -> std::ops::Range<usize> {
    let start = ((self.page - 1) * self.size).min(len);
    let end = (start + self.size).min(len);
    start..end
  }
}

/// "Page 3/9  1 … 2 [3] 4 … 9" with the current page highlighted
pub fn page_line(pager: &Pager, len: usize) -> Line<'static> {
  let total = pager.total_pages(len);
  if total <= 1 {
    return Line::from(Span::styled(
      format!(" {} item(s)", len),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let mut spans = vec![Span::styled(
    format!(" Page {}/{}  ", pager.page(), total),
    Style::default().fg(Color::DarkGray),
  )];
  for item in page_numbers(pager.page(), total) {
    match item {
      PageItem::Page(n) if n == pager.page() => {
        spans.push(Span::styled(format!("[{}]", n), Style::default().fg(Color::Cyan).bold()));
      }
      PageItem::Page(n) => spans.push(Span::raw(n.to_string())),
      PageItem::Ellipsis => spans.push(Span::styled("…", Style::default().fg(Color::DarkGray))),
    }
    spans.push(Span::raw(" "));
  }
  spans.push(Span::styled(
    format!(" ({} items, ←/→ to page)", len),
    Style::default().fg(Color::DarkGray),
  ));
  Line::from(spans)
}
