use unicode_width::UnicodeWidthStr;

pub struct TextMetrics {
    pub char_width: f64,
    /// Horizontal text inset applied on each side of a label.
    pub label_inset: f64,
    /// Room reserved for the key-indicator column.
    pub key_allowance: f64,
    /// px to pt conversion used by draw.io geometry.
    pub pt_ratio: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            label_inset: 13.333333333333332,
            key_allowance: 50.0,
            pt_ratio: 0.75,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Width a row needs so `label` fits without clipping.
    pub fn label_width(&self, label: &str) -> f64 {
        let px = self.text_width(label) + self.label_inset * 2.0 + self.key_allowance;
        (px * self.pt_ratio).ceil()
    }

    /// Uniform table width: the widest label, never below `base_width`.
    pub fn table_width<'a>(&self, base_width: f64, labels: impl IntoIterator<Item = &'a str>) -> f64 {
        labels
            .into_iter()
            .map(|label| self.label_width(label))
            .fold(base_width, f64::max)
    }
}
