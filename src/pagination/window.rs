//! Visible page window
//!
//! The page links drawn under a table: up to `pages_to_show` page numbers
//! around the current page, shifted so the window never leaves
//! `[0, total_pages)`.

/// Page numbers to display for the current position.
///
/// When the window has an even size the extra slot goes ahead of the current
/// page.
pub fn page_window(current_page: usize, total_pages: usize, pages_to_show: usize) -> Vec<usize> {
    let size = pages_to_show.min(total_pages);
    if size == 0 {
        return Vec::new();
    }

    let behind = (size - 1) / 2;
    let current = current_page.min(total_pages - 1);

    let mut start = current.saturating_sub(behind);
    if start + size > total_pages {
        start = total_pages - size;
    }

    (start..start + size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 10, 5 => vec![0, 1, 2, 3, 4] ; "start of range")]
    #[test_case(1, 10, 5 => vec![0, 1, 2, 3, 4] ; "near start")]
    #[test_case(5, 10, 5 => vec![3, 4, 5, 6, 7] ; "centered")]
    #[test_case(9, 10, 5 => vec![5, 6, 7, 8, 9] ; "end of range")]
    #[test_case(8, 10, 5 => vec![5, 6, 7, 8, 9] ; "near end")]
    #[test_case(1, 3, 5 => vec![0, 1, 2] ; "fewer pages than window")]
    #[test_case(4, 10, 4 => vec![3, 4, 5, 6] ; "even window leans ahead")]
    #[test_case(0, 0, 5 => Vec::<usize>::new() ; "no pages")]
    #[test_case(12, 10, 5 => vec![5, 6, 7, 8, 9] ; "current past end is clamped")]
    fn test_page_window(current: usize, total: usize, show: usize) -> Vec<usize> {
        page_window(current, total, show)
    }
}
