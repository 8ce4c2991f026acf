use std::error::Error;
use std::fs::{create_dir_all, write};
use std::path::Path;

use clap::Parser;
use plotters::prelude::*;
use tracing::info;

use rugosity::config::{OutputConfig, PlotConfig};
use rugosity::core::curve::{CurveOptions, overlap_curve, roughness_curve};
use rugosity::core::spectrum::{ChordSpectrum, IntervalKind};
use rugosity::figures::{self, FigureCurve, Series};
use rugosity::presets;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// Figure names to render (default: all)
    #[arg(value_name = "FIGURE")]
    figures: Vec<String>,

    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Output directory (overrides config)
    #[arg(long)]
    out_dir: Option<String>,

    /// Also render the custom sweep from the [sweep] config section
    #[arg(long, default_value_t = false)]
    sweep: bool,

    /// List available figure names and exit
    #[arg(long, default_value_t = false)]
    list: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    if args.list {
        for name in figures::FIGURE_NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let config = PlotConfig::load_or_default(&args.config);
    let out_dir_string = args.out_dir.unwrap_or_else(|| config.output.out_dir.clone());
    let out_dir = Path::new(&out_dir_string);
    create_dir_all(out_dir)?;

    let requested: Vec<String> = if args.figures.is_empty() {
        figures::FIGURE_NAMES.iter().map(|s| s.to_string()).collect()
    } else {
        args.figures.clone()
    };

    for name in &requested {
        let fig = match figures::build(name) {
            Some(result) => result?,
            None => {
                return Err(format!(
                    "unknown figure {name:?}; available: {}",
                    figures::FIGURE_NAMES.join(", ")
                )
                .into());
            }
        };
        render_figure(out_dir, &fig, &config.output)?;
        info!(figure = fig.name, "rendered");
    }

    if args.sweep {
        let fig = custom_sweep(&config)?;
        render_figure(out_dir, &fig, &config.output)?;
        info!(figure = fig.name, "rendered");
    }

    println!("Saved figures to {}", out_dir.display());
    Ok(())
}

/// Dyad sweep with the configured timbre, domain and models: a harmonic
/// tone swept against a fixed copy of itself.
fn custom_sweep(config: &PlotConfig) -> Result<FigureCurve, Box<dyn Error>> {
    let kind = config.sweep.interval_kind()?;
    let domain = config.sweep.domain()?;
    let timbre = presets::sethares_timbre(config.sweep.partials);
    let tone = ChordSpectrum::new(
        &[kind.identity_interval()],
        kind,
        &timbre,
        config.sweep.fund_hz,
    );

    let roughness_model = config.models.roughness_model()?;
    let overlap_model = config.models.overlap_model()?;
    let opts = CurveOptions {
        normalize: config.sweep.normalize,
        ..CurveOptions::default()
    };

    let rough = roughness_curve(&tone, &tone, &domain, &roughness_model, &opts)?;
    let lap = overlap_curve(&tone, &tone, &domain, &overlap_model, &opts)?;

    Ok(FigureCurve {
        name: "custom_sweep",
        title: format!(
            "{} roughness and {} overlap, {}-partial tone at {} Hz",
            config.models.roughness,
            config.models.overlap,
            config.sweep.partials,
            config.sweep.fund_hz
        ),
        x_label: match kind {
            IntervalKind::SemitoneDiff => "interval (semitones)",
            IntervalKind::ScaleFactor => "frequency ratio",
            IntervalKind::HzShift => "offset (Hz)",
        },
        y_label: if config.sweep.normalize {
            "normalized value"
        } else {
            "value"
        },
        positions: domain.positions().to_vec(),
        series: vec![
            Series {
                label: format!("roughness ({})", config.models.roughness),
                values: rough,
            },
            Series {
                label: format!("overlap ({})", config.models.overlap),
                values: lap,
            },
        ],
    })
}

fn render_figure(
    out_dir: &Path,
    fig: &FigureCurve,
    output: &OutputConfig,
) -> Result<(), Box<dyn Error>> {
    const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, BLACK];

    let plot_path = out_dir.join(format!("{}.png", fig.name));
    let root = BitMapBackend::new(&plot_path, (output.width, output.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_min = fig.positions.first().copied().unwrap_or(0.0);
    let x_max = fig.positions.last().copied().unwrap_or(1.0);
    let mut y_max = fig
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0f64, f64::max);
    if y_max <= 0.0 {
        y_max = 1.0;
    }
    let y_hi = y_max * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(&fig.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0f64..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(fig.x_label)
        .y_desc(fig.y_label)
        .draw()?;

    for (i, series) in fig.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<(f64, f64)> = fig
            .positions
            .iter()
            .copied()
            .zip(series.values.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, &color))?
            .label(series.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;

    if output.write_csv {
        write_figure_csv(out_dir, fig)?;
    }
    Ok(())
}

fn write_figure_csv(out_dir: &Path, fig: &FigureCurve) -> Result<(), Box<dyn Error>> {
    let mut csv = String::from("position");
    for series in &fig.series {
        csv.push(',');
        csv.push_str(&series.label.replace(',', ";"));
    }
    csv.push('\n');
    for (i, &position) in fig.positions.iter().enumerate() {
        csv.push_str(&format!("{position:.6}"));
        for series in &fig.series {
            csv.push_str(&format!(",{:.9}", series.values[i]));
        }
        csv.push('\n');
    }
    write(out_dir.join(format!("{}.csv", fig.name)), csv)?;
    Ok(())
}
