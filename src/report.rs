//! Operator console report: summaries, range distributions and paginated
//! per-vessel listings.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::config::ReportConfig;
use crate::model::{Imo, VesselEmissions, VesselSavings};
use crate::stats::{pct, round6};

/// Blocks until the operator asks for the next page.
pub trait Prompt {
    fn pause(&mut self, message: &str) -> Result<()>;
}

/// Prints the message and waits for a line on stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn pause(&mut self, message: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{message}")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Never waits. Used for non-interactive runs.
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn pause(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Writes a titled `label: value` block.
pub fn write_summary<W: Write>(out: &mut W, title: &str, lines: &[(&str, String)]) -> Result<()> {
    writeln!(out, "\n{title}")?;
    for (label, value) in lines {
        writeln!(out, "{label}: {value}")?;
    }
    Ok(())
}

/// Formats a tonnes figure with 2 decimals, `n/a` when there is none.
pub fn tonnes(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Writes a range distribution, with the share of `total` per label when given.
pub fn write_distribution<W: Write>(
    out: &mut W,
    title: &str,
    dist: &[(&str, usize)],
    total: Option<usize>,
) -> Result<()> {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{}", "=".repeat(50))?;
    for (label, count) in dist {
        match total {
            Some(t) => writeln!(out, "{label:<10} {count:>8} {:>8.2}%", pct(*count, t))?,
            None => writeln!(out, "{label:<10} {count:>8}")?,
        }
    }
    Ok(())
}

/// Lists every vessel in blocks of `block_size` rows, pausing after every
/// `pause_every` rows while more remain.
pub fn print_blocks<W: Write>(
    out: &mut W,
    rows: &[VesselEmissions],
    value_column: &str,
    layout: &ReportConfig,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let total = rows.len();
    let block_size = layout.block_size.max(1);
    let mut pager = Pager::new(layout.pause_every);

    for (n, block) in rows.chunks(block_size).enumerate() {
        let start = n * block_size;
        let end = start + block.len();

        writeln!(out, "\nIMOs {} to {}:", start + 1, end)?;
        write_vessel_lines(out, block, value_column)?;
        writeln!(out, "{}", "-".repeat(50))?;

        if pager.advance(block.len(), end < total) {
            prompt.pause("Press Enter to continue showing more IMOs...")?;
        }
    }
    Ok(())
}

/// Lists vessels whose IMO lies in `start..=end`.
pub fn print_imo_range<W: Write>(
    out: &mut W,
    rows: &[VesselEmissions],
    value_column: &str,
    start: &Imo,
    end: &Imo,
) -> Result<usize> {
    let selected: Vec<VesselEmissions> = rows
        .iter()
        .filter(|r| &r.imo >= start && &r.imo <= end)
        .cloned()
        .collect();

    writeln!(out, "\nDisplaying IMOs from {start} to {end}:")?;
    write_vessel_lines(out, &selected, value_column)?;
    Ok(selected.len())
}

fn write_vessel_lines<W: Write>(out: &mut W, rows: &[VesselEmissions], value_column: &str) -> Result<()> {
    writeln!(out, "{:<14} {:>16}", "imo", value_column)?;
    for row in rows {
        writeln!(out, "{:<14} {:>16.6}", row.imo.as_str(), round6(row.tonnes))?;
    }
    Ok(())
}

/// Before/after/savings table for every vessel, paged like [`print_blocks`].
pub fn print_savings_table<W: Write>(
    out: &mut W,
    rows: &[VesselSavings],
    layout: &ReportConfig,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let total = rows.len();
    let block_size = layout.block_size.max(1);
    let mut pager = Pager::new(layout.savings_pause_every);

    writeln!(out, "\nComplete List of All IMOs and Their Savings:")?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "{:<14} {:>12} {:>12} {:>12}", "IMO", "Before JIT", "After JIT", "Savings")?;
    writeln!(out, "{}", "-".repeat(80))?;

    for (n, block) in rows.chunks(block_size).enumerate() {
        for row in block {
            writeln!(
                out,
                "{:<14} {:>12.6} {:>12.6} {:>12.6}",
                row.imo.as_str(),
                row.anc_before_jit,
                row.anc_after_jit,
                row.anc_savings_after_jit
            )?;
        }

        let end = n * block_size + block.len();
        if pager.advance(block.len(), end < total) {
            prompt.pause(&format!("Press Enter to see next {block_size} IMOs..."))?;
        }
    }
    Ok(())
}

/// Counts rows shown since the last pause. `every == 0` never pauses.
struct Pager {
    every: usize,
    since_pause: usize,
}

impl Pager {
    fn new(every: usize) -> Self {
        Self {
            every,
            since_pause: 0,
        }
    }

    /// Records `rows` more rows and reports whether to pause before the next block.
    fn advance(&mut self, rows: usize, more_remaining: bool) -> bool {
        self.since_pause += rows;
        if self.every > 0 && more_remaining && self.since_pause >= self.every {
            self.since_pause = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingPrompt {
        pauses: usize,
    }

    impl Prompt for CountingPrompt {
        fn pause(&mut self, _message: &str) -> Result<()> {
            self.pauses += 1;
            Ok(())
        }
    }

    fn vessels(n: usize) -> Vec<VesselEmissions> {
        (0..n)
            .map(|i| VesselEmissions::new(format!("{}", 1_000_000 + i), i as f64 * 0.1))
            .collect()
    }

    #[test]
    fn test_pager_counts_rows_since_last_pause() {
        let mut pager = Pager::new(500);
        assert!(!pager.advance(300, true));
        assert!(pager.advance(300, true));
        assert!(!pager.advance(300, true));
        assert!(!pager.advance(300, false));

        let mut never = Pager::new(0);
        assert!(!never.advance(10, true));
    }

    #[test]
    fn test_print_blocks_pauses_when_blocks_do_not_divide_pause_interval() {
        let rows = vessels(1_200);
        let layout = ReportConfig {
            block_size: 30,
            ..ReportConfig::default()
        };
        let mut prompt = CountingPrompt::default();

        print_blocks(&mut Vec::<u8>::new(), &rows, "anc_after_jit", &layout, &mut prompt).unwrap();

        // after rows 510 and 1020
        assert_eq!(prompt.pauses, 2);
    }

    #[test]
    fn test_print_blocks_pages_and_pauses() {
        let rows = vessels(1_200);
        let mut out = Vec::new();
        let mut prompt = CountingPrompt::default();

        print_blocks(&mut out, &rows, "anc_after_jit", &ReportConfig::default(), &mut prompt)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("IMOs 1 to 50:"));
        assert!(text.contains("IMOs 1151 to 1200:"));
        assert_eq!(text.matches("IMOs ").count(), 24);
        assert_eq!(prompt.pauses, 2);
    }

    #[test]
    fn test_print_blocks_rounds_to_six_decimals() {
        let rows = vec![VesselEmissions::new("9321483", 0.000_190_971_2)];
        let mut out = Vec::new();

        print_blocks(&mut out, &rows, "anc_after_jit", &ReportConfig::default(), &mut NoPrompt)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("9321483"));
        assert!(text.contains("0.000191"));
    }

    #[test]
    fn test_savings_table_pauses_between_blocks() {
        let rows: Vec<VesselSavings> = (0..120)
            .map(|i| VesselSavings {
                imo: Imo::from(format!("{i}")),
                anc_before_jit: 2.0,
                anc_after_jit: 3.0,
                anc_savings_after_jit: -1.0,
            })
            .collect();
        let mut out = Vec::new();
        let mut prompt = CountingPrompt::default();

        print_savings_table(&mut out, &rows, &ReportConfig::default(), &mut prompt).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(prompt.pauses, 2);
        assert!(text.contains("-1.000000"));
    }

    #[test]
    fn test_print_imo_range_is_inclusive() {
        let rows = vessels(10);
        let mut out = Vec::new();

        let shown = print_imo_range(
            &mut out,
            &rows,
            "anc_before_jit",
            &Imo::from("1000002"),
            &Imo::from("1000005"),
        )
        .unwrap();

        assert_eq!(shown, 4);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1000002"));
        assert!(text.contains("1000005"));
        assert!(!text.contains("1000006"));
    }

    #[test]
    fn test_write_distribution_with_percentages() {
        let mut out = Vec::new();
        write_distribution(&mut out, "Ranges", &[("Zero", 1), ("0-1", 3)], Some(4)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("25.00%"));
        assert!(text.contains("75.00%"));
    }

    #[test]
    fn test_tonnes_formatting() {
        assert_eq!(tonnes(Some(1.234)), "1.23");
        assert_eq!(tonnes(None), "n/a");
    }
}
