// Flip-button handling

use crate::chart::ChartFamily;
use crate::options::{OptionsBag, Orientation};

/// Resolve the effective X/Y selections for a flip-button click count.
///
/// An odd count flips. Histograms keep their axes and switch to horizontal
/// bars instead; every other family swaps X and Y.
pub fn resolve_axes(
    flip_count: u32,
    options: &mut OptionsBag,
    family: ChartFamily,
    x: &[String],
    y: &[String],
) -> (Vec<String>, Vec<String>) {
    if flip_count % 2 == 0 {
        return (x.to_vec(), y.to_vec());
    }

    match family {
        ChartFamily::Histogram => {
            options.orientation = Orientation::Horizontal;
            (x.to_vec(), y.to_vec())
        }
        _ => (y.to_vec(), x.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parity() {
        let (x, y) = (cols(&["A"]), cols(&["B", "C"]));
        for (count, swapped) in [(0, false), (1, true), (2, false), (3, true)] {
            let mut opts = OptionsBag::default();
            let (ex, ey) = resolve_axes(count, &mut opts, ChartFamily::Scatter, &x, &y);
            if swapped {
                assert_eq!((ex, ey), (y.clone(), x.clone()));
            } else {
                assert_eq!((ex, ey), (x.clone(), y.clone()));
            }
            assert_eq!(opts.orientation, Orientation::Vertical);
        }
    }

    #[test]
    fn test_histogram_goes_horizontal() {
        let (x, y) = (cols(&["A"]), cols(&[]));
        let mut opts = OptionsBag::default();
        let (ex, ey) = resolve_axes(1, &mut opts, ChartFamily::Histogram, &x, &y);
        assert_eq!(ex, x);
        assert_eq!(ey, y);
        assert_eq!(opts.orientation, Orientation::Horizontal);

        let mut opts = OptionsBag::default();
        resolve_axes(2, &mut opts, ChartFamily::Histogram, &x, &y);
        assert_eq!(opts.orientation, Orientation::Vertical);
    }
}
