use ferroscreen_core::StockRecord;
use textplots::{Chart, Plot, Shape};

/// One plotted stock: PE on x, ROE % on y.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub label: String,
    pub pe: f64,
    pub roe: f64,
}

/// Records with both PE and ROE, in input order.
pub fn plot_points(records: &[StockRecord]) -> Vec<PlotPoint> {
    records
        .iter()
        .filter_map(|record| {
            Some(PlotPoint {
                label: record.display_name().to_owned(),
                pe: record.pe_ratio?,
                roe: record.roe?,
            })
        })
        .collect()
}

/// Padded axis ranges `(x_min, x_max, y_min, y_max)`.
pub fn bounds(points: &[PlotPoint]) -> (f32, f32, f32, f32) {
    let (x_min, x_max) = padded(points.iter().map(|p| p.pe));
    let (y_min, y_max) = padded(points.iter().map(|p| p.roe));
    (x_min, x_max, y_min, y_max)
}

fn padded(values: impl Iterator<Item = f64>) -> (f32, f32) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    ((min - pad) as f32, (max + pad) as f32)
}

pub fn legend(points: &[PlotPoint]) -> Vec<String> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            format!(
                "{:>3}. {:<28} PE: {:>7.2}  ROE: {:>6.2}%",
                index + 1,
                point.label,
                point.pe,
                point.roe
            )
        })
        .collect()
}

pub fn render(points: &[PlotPoint], width: u32, height: u32) {
    let samples: Vec<(f32, f32)> = points
        .iter()
        .map(|point| (point.pe as f32, point.roe as f32))
        .collect();
    let (x_min, x_max, y_min, y_max) = bounds(points);

    println!("PE vs ROE (filtered stocks): x = PE ratio, y = ROE %");
    Chart::new_with_y_range(width.max(40), height.max(10), x_min, x_max, y_min, y_max)
        .lineplot(&Shape::Points(&samples))
        .display();

    println!();
    for line in legend(points) {
        println!("{line}");
    }
}
