//! Terminal output formatting.
//!
//! Histogram renderings are plain text and byte-stable so that reports can
//! be diffed across runs. The setup and calibration summaries use ANSI
//! colors.

use std::fmt::{self, Write};

use colored::Colorize;

use crate::config::BenchmarkSetup;
use crate::measurement::Calibration;
use crate::result::ExperimentReport;
use crate::statistics::{Histo, Histogram};

const FULL_BLOCK: &str = "\u{2588}";
const HALF_BLOCK: &str = "\u{258C}";

/// Write the two statistics lines of a [`Histogram`].
pub fn write_histogram_stats<W: Write + ?Sized>(w: &mut W, hist: &Histogram) -> fmt::Result {
    let p = &hist.percentiles;
    write!(
        w,
        "  min {:8.3}ns;  p25 {:8.3}ns;  p50 {:8.3}ns;  p75  {:8.3}ns;  max   {:8.3}ns;\n  avg {:8.3}ns;  p90 {:8.3}ns;  p99 {:8.3}ns;  p999 {:8.3}ns;  p9999 {:8.3}ns;\n",
        hist.minimum,
        p.p25,
        p.p50,
        p.p75,
        hist.maximum,
        hist.average,
        p.p90,
        p.p99,
        p.p999,
        p.p9999,
    )
}

/// Write statistics and one bar per bin of a [`Histogram`].
pub fn write_histogram<W: Write + ?Sized>(w: &mut W, hist: &Histogram) -> fmt::Result {
    write_histogram_stats(w, hist)?;

    let count_width = count_width(hist.bins.iter().map(|b| b.count as u64));
    for bin in &hist.bins {
        let marker = if bin.and_above { '+' } else { ' ' };
        write!(
            w,
            " {:8.3}ns{}[{:>width$}] ",
            bin.start,
            marker,
            bin.count,
            width = count_width
        )?;
        write_bar(w, hist.width as f64 * bin.width, false)?;
    }
    Ok(())
}

/// Write the statistics line of a [`Histo`].
///
/// An empty histogram prints `-----` in place of every value.
pub fn write_histo_stats<W: Write + ?Sized>(w: &mut W, histo: &Histo) -> fmt::Result {
    let u = &histo.unit;
    match (histo.avg(), histo.min(), histo.max()) {
        (Some(avg), Some(min), Some(max)) => write!(
            w,
            "  avg {:.3}{u};  min {:.3}{u};  p25 {:.3}{u};  p50 {:.3}{u};  p75 {:.3}{u};  p90 {:.3}{u};  max {:.3}{u};\n",
            avg,
            min,
            histo.p25(),
            histo.p50(),
            histo.p75(),
            histo.p90(),
            max,
            u = u
        ),
        _ => write!(
            w,
            "  avg -----{u};  min -----{u};  p25 -----{u};  p50 -----{u};  p75 -----{u};  p90 -----{u};  max -----{u};\n",
            u = u
        ),
    }
}

/// Write statistics and one bar per slot of a [`Histo`].
///
/// The first slot is marked `-` (it also collects everything below the
/// range) and the last slot `+`.
pub fn write_histo<W: Write + ?Sized>(w: &mut W, histo: &Histo) -> fmt::Result {
    write_histo_stats(w, histo)?;

    let slots = histo.slots();
    let count_width = count_width(slots.iter().copied());
    let max_count = slots.iter().copied().max().unwrap_or(0);
    let last = slots.len() - 1;

    for (idx, &count) in slots.iter().enumerate() {
        let marker = match idx {
            0 => '-',
            i if i == last => '+',
            _ => ' ',
        };
        write!(
            w,
            " {:8.3}{}{}[{:>width$}] ",
            histo.anchor_point(idx as isize),
            histo.unit,
            marker,
            count,
            width = count_width
        )?;
        let rel = if max_count == 0 {
            0.0
        } else {
            count as f64 / max_count as f64
        };
        write_bar(w, histo.width as f64 * rel, true)?;
    }
    Ok(())
}

/// Digits of the largest count, at least three.
fn count_width(counts: impl Iterator<Item = u64>) -> usize {
    counts
        .map(|c| ((c + 1) as f64).log10().ceil() as usize)
        .fold(3, usize::max)
}

/// Full blocks for the integer part of `width`, a half block for a large
/// enough fraction, then a newline.
fn write_bar<W: Write + ?Sized>(w: &mut W, width: f64, half_at_midpoint: bool) -> fmt::Result {
    let whole = width.trunc();
    let frac = width - whole;
    w.write_str(&FULL_BLOCK.repeat(whole as usize))?;
    if frac > 0.5 || (half_at_midpoint && frac == 0.5) {
        w.write_str(HALF_BLOCK)?;
    }
    w.write_char('\n')
}

/// Format a benchmark setup for human-readable terminal output.
pub fn format_setup(setup: &BenchmarkSetup, calibration: &Calibration, prng_overhead_ns: f64) -> String {
    let p = setup.params();
    let quantization_error = setup.quantization_error_percent(calibration.precision_ns);
    let mut output = String::new();

    output.push_str(&format!("{}\n", "set-add-bench setup".bold()));
    output.push_str(&format!(
        "  Architecture:               {}\n",
        std::env::consts::ARCH
    ));
    output.push_str(&format!("  OS:                         {}\n", std::env::consts::OS));
    output.push_str(&format_calibration(calibration));
    output.push_str(&format!(
        "  PRNG draw:                  {:.2}ns (subtracted from measurements)\n",
        prng_overhead_ns
    ));
    output.push_str(&format!(
        "  Expected add runtime:       {:.2}ns\n",
        p.exp_runtime_per_add_ns
    ));

    let error_line = format!(
        "{:.3}% quantization error, i.e. {:.3}ns per add",
        quantization_error,
        quantization_error * p.exp_runtime_per_add_ns / 100.0
    );
    let error_line = if quantization_error > 1.0 {
        error_line.yellow().to_string()
    } else {
        error_line.green().to_string()
    };
    output.push_str(&format!(
        "  Adds per round:             {} ({})\n",
        p.target_adds_per_round, error_line
    ));
    output.push_str(&format!(
        "  Adds per config:            {} (~{:.2}s per config)\n",
        setup.total_adds_per_config(),
        p.seconds_per_config
    ));
    output.push_str(&format!(
        "  Set sizes:                  from {} to {}, step {}\n",
        p.from, p.to, p.step
    ));
    output.push_str(&format!(
        "  Number of configs:          {}\n",
        setup.number_of_configs()
    ));
    output.push_str(&format!(
        "  Expected total runtime:     {:?} (incl. 12% housekeeping)\n",
        setup.predict_total_duration()
    ));

    output
}

/// Format a clock calibration.
pub fn format_calibration(calibration: &Calibration) -> String {
    format!(
        "  Clock precision:            {}\n  Clock resolution:           {:.2}ns\n  Sampling call:              {:.2}ns (subtracted from measurements)\n",
        format!("{:.2}ns", calibration.precision_ns).cyan(),
        calibration.min_time_sample_ns,
        calibration.median_call_ns
    )
}

/// Format an experiment report: one summary line, then the histogram.
pub fn format_report(report: &ExperimentReport) -> String {
    let mut output = String::new();
    let status = if report.is_valid() {
        "\u{2713}".green().to_string()
    } else {
        "\u{26A0}".red().bold().to_string()
    };
    output.push_str(&format!(
        "{} set size {} / capacity {}: median {:.3}ns per add over {} rounds\n",
        status,
        report.config.final_set_size,
        report.config.init_size,
        report.median_ns_per_add,
        report.rounds_ns.len()
    ));
    for warning in &report.preflight.warnings {
        output.push_str(&format!("  {}\n", warning.description().yellow()));
    }
    if let Some(histogram) = &report.histogram {
        output.push_str(&histogram.to_string());
    }
    output
}
