// Categorical colour assignment for grouped traces

use std::collections::HashMap;

/// Ordered list of colours, cycled when there are more groups than colours
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    /// The d3/plotly "category10" scheme
    pub fn category10() -> Self {
        Self {
            colors: vec![
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
                "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
            ],
        }
    }

    pub fn color(&self, index: usize) -> &'static str {
        self.colors[index % self.colors.len()]
    }

    /// Map each key to a colour by its position in `keys`
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), self.color(i).to_string()))
            .collect()
    }
}

/// Colour used for ungrouped traces and for missing group values
pub const DEFAULT_COLOR: &str = "#1f77b4";
pub const MISSING_COLOR: &str = "#7f7f7f";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_distinct() {
        let palette = ColorPalette::category10();
        let map = palette.assign_colors(&["a".to_string(), "b".to_string()]);
        assert_ne!(map["a"], map["b"]);
    }

    #[test]
    fn test_cycles() {
        let palette = ColorPalette::category10();
        assert_eq!(palette.color(0), palette.color(10));
    }
}
