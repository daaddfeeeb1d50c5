//! Page arithmetic: clamping, single/dual layout and reading progress

use crate::markup;

/// Clamp a requested page into `[0, total - 1]`
///
/// An empty document clamps everything to page 0.
pub fn clamp_page(requested: isize, total: usize) -> usize {
    if total == 0 || requested <= 0 {
        return 0;
    }
    (requested as usize).min(total - 1)
}

/// Whether a viewport of `width` affords two pages side by side
pub fn is_dual_page(width: u16, dual_page_min_width: u16) -> bool {
    width >= dual_page_min_width
}

/// Pages moved by next/previous navigation
pub fn page_increment(dual: bool) -> usize {
    if dual {
        2
    } else {
        1
    }
}

/// Pages rendered for the current position
///
/// The second page of a spread is shown only when it exists.
pub fn visible_pages(current: usize, total: usize, dual: bool) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    if dual && current + 1 < total {
        vec![current, current + 1]
    } else {
        vec![current]
    }
}

/// Percentage of words read up to and including `current`
pub fn reading_progress<S: AsRef<str>>(pages: &[S], current: usize) -> u8 {
    let counts: Vec<usize> = pages.iter().map(|p| markup::word_count(p.as_ref())).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0;
    }

    let read: usize = counts.iter().take(current.saturating_add(1)).sum();
    ((100.0 * read as f64 / total as f64).round() as u8).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(-5, 3), 0);
        assert_eq!(clamp_page(0, 3), 0);
        assert_eq!(clamp_page(1, 3), 1);
        assert_eq!(clamp_page(3, 3), 2);
        assert_eq!(clamp_page(isize::MAX, 3), 2);
        assert_eq!(clamp_page(4, 0), 0);
    }

    #[test]
    fn test_clamping_matches_bounds_for_all_inputs() {
        let total = 7;
        for n in -20..20 {
            let page = clamp_page(n, total);
            if n < 0 {
                assert_eq!(page, clamp_page(0, total));
            } else if n as usize >= total {
                assert_eq!(page, clamp_page(total as isize - 1, total));
            } else {
                assert_eq!(page, n as usize);
            }
        }
    }

    #[test]
    fn test_increment_and_visible_pages() {
        assert_eq!(page_increment(is_dual_page(150, 120)), 2);
        assert_eq!(page_increment(is_dual_page(80, 120)), 1);

        assert_eq!(visible_pages(0, 3, true), vec![0, 1]);
        assert_eq!(visible_pages(2, 3, true), vec![2]);
        assert_eq!(visible_pages(1, 3, false), vec![1]);
        assert!(visible_pages(0, 0, true).is_empty());
    }

    #[test]
    fn test_reading_progress() {
        let pages = ["one two", "three four five", "<b>six</b> seven eight nine ten"];
        assert_eq!(reading_progress(&pages, 0), 20);
        assert_eq!(reading_progress(&pages, 1), 50);
        assert_eq!(reading_progress(&pages, 2), 100);
        assert_eq!(reading_progress(&pages, 99), 100);
    }

    #[test]
    fn test_reading_progress_empty() {
        let pages: [&str; 2] = ["", "  "];
        assert_eq!(reading_progress(&pages, 1), 0);
    }
}
