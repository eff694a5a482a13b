use std::ops::Range;

/// Portrait A4 geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub line_height: f32,
    /// Space above the table on the first page for title and preamble.
    pub title_block: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
            line_height: 7.0,
            title_block: 30.0,
        }
    }
}

impl PageLayout {
    fn lines_in(&self, space: f32) -> usize {
        (space / self.line_height).floor().max(0.0) as usize
    }

    /// Body rows that fit on a page, after the repeated header line.
    pub fn rows_per_page(&self, first: bool) -> usize {
        let mut usable = self.height - 2.0 * self.margin;
        if first {
            usable -= self.title_block;
        }
        self.lines_in(usable).saturating_sub(1).max(1)
    }

    /// Distance of the first table line from the page top.
    pub fn table_top(&self, first: bool) -> f32 {
        if first {
            self.margin + self.title_block
        } else {
            self.margin
        }
    }
}

/// Splits `total` body rows into per-page ranges. There is always at least
/// one page so an empty report still shows its header.
pub fn paginate(total: usize, layout: &PageLayout) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + layout.rows_per_page(pages.is_empty())).min(total);
        pages.push(start..end);
        if end >= total {
            return pages;
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn first_page_reserves_title_block() {
        let layout = PageLayout::default();
        assert_eq!(layout.rows_per_page(true), 31);
        assert_eq!(layout.rows_per_page(false), 35);
    }

    #[rstest]
    #[case(0, vec![0..0])]
    #[case(25, vec![0..25])]
    #[case(31, vec![0..31])]
    #[case(32, vec![0..31, 31..32])]
    #[case(80, vec![0..31, 31..66, 66..80])]
    fn splits_rows_across_pages(#[case] total: usize, #[case] expected: Vec<Range<usize>>) {
        assert_eq!(paginate(total, &PageLayout::default()), expected);
    }

    #[test]
    fn tiny_pages_still_make_progress() {
        let layout = PageLayout {
            height: 50.0,
            ..Default::default()
        };
        let pages = paginate(3, &layout);
        assert_eq!(pages, vec![0..1, 1..2, 2..3]);
    }
}
