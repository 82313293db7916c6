use crate::layout::Size;

/// Measures single-line text for layout and cursor placement.
pub trait TextMetrics {
    fn measure(&self, text: &str) -> Size;

    /// Width of the first `char_index` characters.
    fn measure_to_char(&self, text: &str, char_index: usize) -> i32 {
        if char_index == 0 || text.is_empty() {
            return 0;
        }
        let byte_pos = text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        self.measure(&text[..byte_pos]).width
    }

    /// Character index closest to `x`, measured from the text start.
    fn char_from_x(&self, text: &str, x: i32) -> usize {
        if text.is_empty() || x <= 0 {
            return 0;
        }
        let char_count = text.chars().count();
        if x >= self.measure(text).width {
            return char_count;
        }

        let mut left = 0;
        let mut right = char_count;
        while left < right {
            let mid = (left + right) / 2;
            if self.measure_to_char(text, mid) < x {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        // Snap to whichever boundary is nearer
        if left > 0 {
            let before = self.measure_to_char(text, left - 1);
            let after = self.measure_to_char(text, left);
            if x - before < after - x {
                return left - 1;
            }
        }
        left
    }
}

/// Monospace metrics: every character advances by the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMetrics {
    pub char_width: i32,
    pub line_height: i32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width: 8,
            line_height: 16,
        }
    }
}

impl TextMetrics for FixedMetrics {
    fn measure(&self, text: &str) -> Size {
        Size::new(
            text.chars().count() as i32 * self.char_width,
            self.line_height,
        )
    }

    fn measure_to_char(&self, text: &str, char_index: usize) -> i32 {
        char_index.min(text.chars().count()) as i32 * self.char_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_metrics_measure() {
        let metrics = FixedMetrics::default();
        assert_eq!(metrics.measure("abcd"), Size::new(32, 16));
        assert_eq!(metrics.measure(""), Size::new(0, 16));
        assert_eq!(metrics.measure_to_char("abcd", 2), 16);
        assert_eq!(metrics.measure_to_char("abcd", 10), 32);
    }

    #[test]
    fn test_char_from_x_snaps_to_nearest() {
        let metrics = FixedMetrics::default();
        assert_eq!(metrics.char_from_x("abcd", -3), 0);
        assert_eq!(metrics.char_from_x("abcd", 3), 0);
        assert_eq!(metrics.char_from_x("abcd", 5), 1);
        assert_eq!(metrics.char_from_x("abcd", 17), 2);
        assert_eq!(metrics.char_from_x("abcd", 100), 4);
    }
}
