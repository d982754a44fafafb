// Chart rendering onto plotters backends (PNG bitmap or SVG)

use crate::chart::{
    BoxTrace, ChartFamily, ChartSpec, HeatmapTrace, HistogramTrace, Layout, LegendPlacement,
    LineTrace, ParallelCoordinatesTrace, ScatterMatrixTrace, ScatterTrace, StripTrace,
    TernaryTrace, Trace,
};
use crate::options::Orientation;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Render a chart spec to PNG or SVG bytes, per `options.format`
pub fn render_chart(spec: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Png => render_png(spec, options.width, options.height),
        OutputFormat::Svg => render_svg(spec, options.width, options.height).map(String::into_bytes),
    }
}

fn render_png(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; rgb_buffer_len(width, height)];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root, spec)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

/// Byte length of an RGB8 canvas, sized in `usize` so large canvases
/// don't overflow `u32`
fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw(&root, spec)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg)
}

/// Draw a whole chart onto a drawing area. The empty chart is a blank canvas.
fn draw<DB>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let Some(family) = spec.family else {
        return Ok(());
    };
    log::debug!("Rendering {} chart with {} traces", family.name(), spec.traces.len());

    match family {
        ChartFamily::Histogram => draw_histograms(root, &spec.layout, &collect(spec, as_histogram)),
        ChartFamily::Scatter => match spec.traces.first() {
            Some(Trace::ScatterMatrix(m)) => draw_scatter_matrix(root, m),
            _ => draw_scatter(
                root,
                &spec.layout,
                &collect(spec, as_scatter),
                &collect(spec, as_line),
            ),
        },
        ChartFamily::Box => draw_boxes(root, &spec.layout, &collect(spec, as_box)),
        ChartFamily::Heatmap => match collect(spec, as_heatmap).first() {
            Some(h) => draw_heatmap(root, &spec.layout, h),
            None => Ok(()),
        },
        ChartFamily::ParallelCoordinates => match collect(spec, as_parcoords).first() {
            Some(p) => draw_parallel_coordinates(root, &spec.layout, p),
            None => Ok(()),
        },
        ChartFamily::Strip => draw_strips(root, &spec.layout, &collect(spec, as_strip)),
        ChartFamily::Ternary => match collect(spec, as_ternary).first() {
            Some(t) => draw_ternary(root, &spec.layout, t),
            None => Ok(()),
        },
    }
}

fn collect<'s, T>(spec: &'s ChartSpec, pick: fn(&'s Trace) -> Option<&'s T>) -> Vec<&'s T> {
    spec.traces.iter().filter_map(pick).collect()
}

fn as_histogram(t: &Trace) -> Option<&HistogramTrace> {
    match t { Trace::Histogram(h) => Some(h), _ => None }
}
fn as_scatter(t: &Trace) -> Option<&ScatterTrace> {
    match t { Trace::Scatter(s) => Some(s), _ => None }
}
fn as_line(t: &Trace) -> Option<&LineTrace> {
    match t { Trace::Line(l) => Some(l), _ => None }
}
fn as_box(t: &Trace) -> Option<&BoxTrace> {
    match t { Trace::Box(b) => Some(b), _ => None }
}
fn as_heatmap(t: &Trace) -> Option<&HeatmapTrace> {
    match t { Trace::Heatmap(h) => Some(h), _ => None }
}
fn as_parcoords(t: &Trace) -> Option<&ParallelCoordinatesTrace> {
    match t { Trace::ParallelCoordinates(p) => Some(p), _ => None }
}
fn as_strip(t: &Trace) -> Option<&StripTrace> {
    match t { Trace::Strip(s) => Some(s), _ => None }
}
fn as_ternary(t: &Trace) -> Option<&TernaryTrace> {
    match t { Trace::Ternary(t) => Some(t), _ => None }
}

/// Data range with 5% padding; a constant range is widened by one unit
fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// Cartesian chart with titles, mesh and optional category tick labels at
/// integer positions
fn build_chart<'a, DB>(
    root: &'a DrawingArea<DB, Shift>,
    layout: &Layout,
    x_range: Range<f64>,
    y_range: Range<f64>,
    categories: &[String],
) -> Result<Chart2d<'a, DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(layout.title.as_deref().unwrap_or(""), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    let category_label = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < categories.len() {
            categories[idx as usize].clone()
        } else {
            String::new()
        }
    };

    let mut mesh = chart.configure_mesh();
    if !categories.is_empty() {
        mesh.x_labels(categories.len() * 2 + 1)
            .x_label_formatter(&category_label);
    }
    if let Some(title) = &layout.x_title {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = &layout.y_title {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;

    Ok(chart)
}

fn draw_legend<'a, DB>(chart: &mut Chart2d<'a, DB>, placement: LegendPlacement) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    let position = match placement {
        LegendPlacement::Right => SeriesLabelPosition::UpperRight,
        LegendPlacement::Top => SeriesLabelPosition::UpperMiddle,
    };
    chart
        .configure_series_labels()
        .position(position)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;
    Ok(())
}

fn draw_histograms<DB>(root: &DrawingArea<DB, Shift>, layout: &Layout, traces: &[&HistogramTrace]) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let edges = traces.iter().flat_map(|t| t.bins.iter().flat_map(|b| [b.start, b.end]));
    let value_range = padded_range(edges);
    let max_count = traces
        .iter()
        .flat_map(|t| t.bins.iter().map(|b| b.count))
        .max()
        .unwrap_or(0);
    let count_range = 0.0..(max_count as f64 * 1.05).max(1.0);

    let horizontal = layout.orientation == Orientation::Horizontal;
    let (x_range, y_range) = if horizontal {
        (count_range, value_range)
    } else {
        (value_range, count_range)
    };
    let mut chart = build_chart(root, layout, x_range, y_range, &[])?;

    for trace in traces {
        let color = parse_color(&trace.color);
        let style = color.mix(trace.opacity).filled();
        let bars = trace.bins.iter().filter(|b| b.count > 0).map(|b| {
            let count = b.count as f64;
            let corners = if horizontal {
                [(0.0, b.start), (count, b.end)]
            } else {
                [(b.start, 0.0), (b.end, count)]
            };
            Rectangle::new(corners, style)
        });
        let anno = chart.draw_series(bars).context("Failed to draw histogram")?;
        if traces.len() > 1 {
            anno.label(trace.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }
    }

    if traces.len() > 1 {
        draw_legend(&mut chart, layout.legend)?;
    }
    Ok(())
}

fn draw_scatter<DB>(
    root: &DrawingArea<DB, Shift>,
    layout: &Layout,
    scatters: &[&ScatterTrace],
    lines: &[&LineTrace],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let xs = scatters
        .iter()
        .flat_map(|t| t.x.iter().copied())
        .chain(lines.iter().flat_map(|l| l.points.iter().map(|p| p.0)));
    let ys = scatters
        .iter()
        .flat_map(|t| t.y.iter().copied())
        .chain(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1)));
    let mut chart = build_chart(root, layout, padded_range(xs), padded_range(ys), &[])?;

    let mut labelled = false;
    for trace in scatters {
        let points = trace
            .x
            .iter()
            .zip(trace.y.iter())
            .zip(trace.colors.iter())
            .map(|((&x, &y), c)| Circle::new((x, y), 3, parse_color(c).filled()));
        let anno = chart.draw_series(points).context("Failed to draw points")?;

        // named pairing traces get one legend entry each
        if scatters.len() > 1 {
            let color = trace.colors.first().map(|c| parse_color(c)).unwrap_or(BLUE);
            anno.label(trace.name.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            labelled = true;
        }

        for entry in &trace.legend {
            let color = parse_color(&entry.color);
            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())
                .context("Failed to draw legend entry")?
                .label(entry.label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            labelled = true;
        }
    }

    for line in lines {
        let color = parse_color(&line.color);
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))
            .context("Failed to draw line series")?
            .label(line.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2)));
        labelled = true;
    }

    if labelled {
        draw_legend(&mut chart, layout.legend)?;
    }
    Ok(())
}

fn draw_scatter_matrix<DB>(root: &DrawingArea<DB, Shift>, trace: &ScatterMatrixTrace) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = trace.dimensions.len();
    let cells = root.split_evenly((n, n));

    for (idx, cell) in cells.iter().enumerate() {
        let (row, col) = (idx / n, idx % n);
        let y_dim = &trace.dimensions[row];
        let x_dim = &trace.dimensions[col];

        if row == col && !trace.show_diagonal {
            cell.draw(&Text::new(
                x_dim.label.clone(),
                (10, 10),
                ("sans-serif", 14).into_font(),
            ))
            .context("Failed to draw matrix label")?;
            continue;
        }

        let points: Vec<(f64, f64, usize)> = x_dim
            .values
            .iter()
            .zip(y_dim.values.iter())
            .enumerate()
            .filter_map(|(r, (x, y))| Some(((*x)?, (*y)?, r)))
            .collect();

        let mut chart = ChartBuilder::on(cell)
            .margin(4)
            .x_label_area_size(15)
            .y_label_area_size(25)
            .build_cartesian_2d(
                padded_range(points.iter().map(|p| p.0)),
                padded_range(points.iter().map(|p| p.1)),
            )
            .context("Failed to build matrix cell")?;
        chart
            .configure_mesh()
            .x_labels(3)
            .y_labels(3)
            .draw()
            .context("Failed to draw matrix mesh")?;
        chart
            .draw_series(points.iter().map(|&(x, y, r)| {
                let color = trace.colors.get(r).map(|c| parse_color(c)).unwrap_or(BLUE);
                Circle::new((x, y), 2, color.filled())
            }))
            .context("Failed to draw matrix points")?;
    }
    Ok(())
}

fn draw_boxes<DB>(root: &DrawingArea<DB, Shift>, layout: &Layout, traces: &[&BoxTrace]) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let categories: Vec<String> = traces.iter().map(|t| t.name.clone()).collect();
    let ys = traces.iter().flat_map(|t| {
        let s = &t.stats;
        [s.lower_whisker, s.upper_whisker]
            .into_iter()
            .chain(s.outliers.iter().copied())
    });
    let x_range = -0.5..(traces.len() as f64 - 0.5);
    let mut chart = build_chart(root, layout, x_range, padded_range(ys), &categories)?;

    for (i, trace) in traces.iter().enumerate() {
        let x = i as f64;
        let s = &trace.stats;
        let color = parse_color(&trace.color);

        chart
            .draw_series([
                Rectangle::new([(x - 0.3, s.q1), (x + 0.3, s.q3)], color.mix(0.3).filled()),
                Rectangle::new([(x - 0.3, s.q1), (x + 0.3, s.q3)], color.stroke_width(1)),
            ])
            .context("Failed to draw box")?;
        chart
            .draw_series([
                PathElement::new(vec![(x - 0.3, s.median), (x + 0.3, s.median)], color.stroke_width(2)),
                PathElement::new(vec![(x, s.q3), (x, s.upper_whisker)], color.stroke_width(1)),
                PathElement::new(vec![(x, s.q1), (x, s.lower_whisker)], color.stroke_width(1)),
            ])
            .context("Failed to draw whiskers")?;
        chart
            .draw_series(s.outliers.iter().map(|&o| Circle::new((x, o), 3, color.stroke_width(1))))
            .context("Failed to draw outliers")?;
    }
    Ok(())
}

fn draw_heatmap<DB>(root: &DrawingArea<DB, Shift>, layout: &Layout, trace: &HeatmapTrace) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_range = padded_range(trace.x_edges.iter().copied());
    let y_range = padded_range(trace.y_edges.iter().copied());
    let mut chart = build_chart(root, layout, x_range, y_range, &[])?;

    let max = trace.counts.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;
    let cells = trace.counts.iter().enumerate().flat_map(|(yi, row)| {
        row.iter().enumerate().map(move |(xi, &count)| (xi, yi, count))
    });
    chart
        .draw_series(cells.map(|(xi, yi, count)| {
            let corners = [
                (trace.x_edges[xi], trace.y_edges[yi]),
                (trace.x_edges[xi + 1], trace.y_edges[yi + 1]),
            ];
            Rectangle::new(corners, heat_color(count as f64 / max).filled())
        }))
        .context("Failed to draw heatmap")?;
    Ok(())
}

/// White through to the default trace blue
fn heat_color(t: f64) -> RGBColor {
    let lerp = |to: u8| (255.0 - t.clamp(0.0, 1.0) * (255.0 - to as f64)).round() as u8;
    RGBColor(lerp(0x1f), lerp(0x77), lerp(0xb4))
}

fn draw_parallel_coordinates<DB>(
    root: &DrawingArea<DB, Shift>,
    layout: &Layout,
    trace: &ParallelCoordinatesTrace,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = trace.dimensions.len();
    let categories: Vec<String> = trace.dimensions.iter().map(|d| d.label.clone()).collect();
    let x_range = -0.2..((n as f64 - 1.0).max(0.0) + 0.2);
    let mut chart = build_chart(root, layout, x_range, -0.05..1.05, &categories)?;

    let bounds: Vec<(f64, f64)> = trace
        .dimensions
        .iter()
        .map(|d| {
            let r = padded_range(d.values.iter().flatten().copied());
            (r.start, r.end)
        })
        .collect();

    chart
        .draw_series((0..n).map(|i| {
            PathElement::new(vec![(i as f64, 0.0), (i as f64, 1.0)], BLACK.stroke_width(1))
        }))
        .context("Failed to draw axes")?;

    let n_rows = trace.dimensions.first().map(|d| d.values.len()).unwrap_or(0);
    let lines = (0..n_rows).filter_map(|r| {
        let path: Option<Vec<(f64, f64)>> = trace
            .dimensions
            .iter()
            .zip(bounds.iter())
            .enumerate()
            .map(|(i, (d, &(lo, hi)))| d.values[r].map(|v| (i as f64, (v - lo) / (hi - lo))))
            .collect();
        let color = trace.colors.get(r).map(|c| parse_color(c)).unwrap_or(BLUE);
        path.map(|p| PathElement::new(p, color.mix(0.5).stroke_width(1)))
    });
    chart.draw_series(lines).context("Failed to draw lines")?;
    Ok(())
}

fn draw_strips<DB>(root: &DrawingArea<DB, Shift>, layout: &Layout, traces: &[&StripTrace]) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let slots = traces.iter().map(|t| t.position + 1).max().unwrap_or(0);
    let mut categories = vec![String::new(); slots];
    for t in traces {
        categories[t.position] = t.name.clone();
    }
    let ys = traces.iter().flat_map(|t| t.values.iter().copied());
    let x_range = -0.5..(slots as f64 - 0.5);
    let mut chart = build_chart(root, layout, x_range, padded_range(ys), &categories)?;

    for trace in traces {
        let color = parse_color(&trace.color);
        let x = trace.position as f64;
        chart
            .draw_series(
                trace
                    .values
                    .iter()
                    .zip(trace.offsets.iter())
                    .map(|(&v, &o)| Circle::new((x + o, v), 3, color.mix(0.7).filled())),
            )
            .context("Failed to draw strip")?;
    }
    Ok(())
}

fn draw_ternary<DB>(root: &DrawingArea<DB, Shift>, layout: &Layout, trace: &TernaryTrace) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let h = 3f64.sqrt() / 2.0;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(layout.title.as_deref().unwrap_or(""), ("sans-serif", 20))
        .build_cartesian_2d(-0.1..1.1, -0.1..(h + 0.1))
        .context("Failed to build chart")?;

    // vertices: a at bottom-left, b at bottom-right, c at the top
    let corners = [(0.0, 0.0), (1.0, 0.0), (0.5, h)];
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![corners[0], corners[1], corners[2], corners[0]],
            BLACK.stroke_width(1),
        )))
        .context("Failed to draw triangle")?;

    let labels = [&trace.a_label, &trace.b_label, &trace.c_label];
    let offsets = [(-0.08, -0.06), (0.02, -0.06), (-0.03, 0.03)];
    chart
        .draw_series(labels.iter().zip(corners.iter().zip(offsets.iter())).map(
            |(label, (&(cx, cy), &(dx, dy)))| {
                Text::new(label.to_string(), (cx + dx, cy + dy), ("sans-serif", 14).into_font())
            },
        ))
        .context("Failed to draw vertex labels")?;

    let color = parse_color(&trace.color);
    chart
        .draw_series((0..trace.a.len()).map(|i| {
            let (b, c) = (trace.b[i], trace.c[i]);
            Circle::new((b + c / 2.0, c * h), 3, color.filled())
        }))
        .context("Failed to draw ternary points")?;
    Ok(())
}

/// Parse a `#rrggbb` hex string or a basic colour name
pub fn parse_color(color: &str) -> RGBColor {
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return RGBColor(r, g, b);
            }
        }
    }
    match color.to_ascii_lowercase().as_str() {
        "red" => RED,
        "green" => GREEN,
        "blue" => BLUE,
        "black" => BLACK,
        "yellow" => YELLOW,
        "cyan" => CYAN,
        "magenta" => MAGENTA,
        "white" => WHITE,
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "gray" | "grey" => RGBColor(127, 127, 127),
        _ => RGBColor(0x1f, 0x77, 0xb4),
    }
}
