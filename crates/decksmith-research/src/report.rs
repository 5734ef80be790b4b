//! Human-readable rendering of a [`BenchmarkReport`].

use std::fmt::{self, Write};

use crate::benchmark::BenchmarkReport;

/// Renders the report as a markdown document.
pub fn render_markdown(report: &BenchmarkReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_markdown(&mut out, report)?;
    Ok(out)
}

/// Writes the markdown document for `report` into `out`.
pub fn write_markdown<W>(out: &mut W, report: &BenchmarkReport) -> fmt::Result
where
    W: Write + ?Sized,
{
    writeln!(out, "# Deck Builder Benchmark")?;
    writeln!(out)?;
    writeln!(
        out,
        "Generated {} with seed {}.",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        report.seed
    )?;
    writeln!(out)?;

    writeln!(out, "## Executive Summary")?;
    writeln!(out)?;
    match report.aggregates.first() {
        Some(top) => writeln!(
            out,
            "Top method: **{}** (mean composite {:.3})",
            top.method, top.mean_composite
        )?,
        None => writeln!(out, "No method results available.")?,
    }
    writeln!(out)?;

    writeln!(out, "## Per-Method Aggregate Table")?;
    writeln!(out)?;
    writeln!(
        out,
        "| Method | Runs | Mean Composite | Median Composite | Mean Runtime (ms) | Constraint Violations |"
    )?;
    writeln!(out, "|---|---:|---:|---:|---:|---:|")?;
    for a in &report.aggregates {
        writeln!(
            out,
            "| {} | {} | {:.3} | {:.3} | {:.1} | {} |",
            a.method, a.runs, a.mean_composite, a.median_composite, a.mean_runtime_ms, a.constraint_violation_count
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Per-Input Winners")?;
    writeln!(out)?;
    for p in &report.player_runs {
        let winner = p.winner.map_or_else(|| "-".to_owned(), |w| w.to_string());
        writeln!(
            out,
            "- `{}` ({}): {} ({:.3})",
            p.player_tag, p.player_name, winner, p.winner_score
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Per-Input Outcomes")?;
    writeln!(out)?;
    writeln!(out, "| Tag | Method | Composite | Runtime (ms) | Violations |")?;
    writeln!(out, "|---|---|---:|---:|---:|")?;
    for p in &report.player_runs {
        for m in &p.method_runs {
            writeln!(
                out,
                "| {} | {} | {:.3} | {} | {} |",
                p.player_tag,
                m.method,
                m.metrics.composite,
                m.metrics.runtime_ms,
                m.metrics.constraint_violations.len()
            )?;
        }
    }
    writeln!(out)?;

    writeln!(out, "## Constraint Failure Analysis")?;
    writeln!(out)?;
    let mut any_violation = false;
    for p in &report.player_runs {
        for m in p.method_runs.iter().filter(|m| !m.metrics.is_valid()) {
            any_violation = true;
            writeln!(
                out,
                "- `{}` / `{}`: {}",
                p.player_tag,
                m.method,
                m.metrics.constraint_violations.join("; ")
            )?;
        }
    }
    if !any_violation {
        writeln!(out, "No constraint violations.")?;
    }
    writeln!(out)?;

    writeln!(out, "## Deck Composition Patterns")?;
    writeln!(out)?;
    for p in &report.player_runs {
        let Some(best) = p.method_runs.first() else {
            continue;
        };
        writeln!(
            out,
            "- `{}`: best method `{}`, archetype diagnostic `{}` ({:.0}% conf)",
            p.player_tag,
            best.method,
            best.detected_archetype,
            best.archetype_confidence * 100.0
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Recommendations")?;
    writeln!(out)?;
    for rec in &report.recommendations {
        writeln!(out, "- {rec}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use decksmith_evaluator::{Archetype, DeckMetrics};

    use super::*;
    use crate::{
        benchmark::{BenchmarkAggregate, PlayerResult},
        strategy::{DeckResult, StrategyKind},
    };

    fn report() -> BenchmarkReport {
        let run = |method, composite, violations: Vec<&str>| DeckResult {
            method,
            deck: vec![],
            metrics: DeckMetrics {
                composite,
                constraint_violations: violations.into_iter().map(String::from).collect(),
                runtime_ms: 12,
                ..DeckMetrics::default()
            },
            detected_archetype: Archetype::Cycle,
            archetype_confidence: 0.55,
        };
        BenchmarkReport {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            seed: 42,
            methods: vec![StrategyKind::Genetic, StrategyKind::Baseline],
            player_runs: vec![PlayerResult {
                player_tag: "#ABC".into(),
                player_name: "Alice".into(),
                method_runs: vec![
                    run(StrategyKind::Genetic, 0.81234, vec![]),
                    run(
                        StrategyKind::Baseline,
                        0.5,
                        vec!["must include at least 1 spell(s), found 0", "duplicate card: Zap"],
                    ),
                ],
                winner: Some(StrategyKind::Genetic),
                winner_score: 0.81234,
            }],
            aggregates: vec![
                BenchmarkAggregate {
                    method: StrategyKind::Genetic,
                    runs: 1,
                    mean_composite: 0.81234,
                    median_composite: 0.81234,
                    mean_runtime_ms: 12.0,
                    constraint_violation_count: 0,
                },
                BenchmarkAggregate {
                    method: StrategyKind::Baseline,
                    runs: 1,
                    mean_composite: 0.5,
                    median_composite: 0.5,
                    mean_runtime_ms: 12.0,
                    constraint_violation_count: 2,
                },
            ],
            recommendations: vec!["Top method by mean composite: genetic".into()],
        }
    }

    #[test]
    fn test_sections_in_order() {
        let md = render_markdown(&report()).unwrap();
        let headings = md.lines().filter(|l| l.starts_with('#')).collect::<Vec<_>>();
        assert_eq!(
            headings,
            [
                "# Deck Builder Benchmark",
                "## Executive Summary",
                "## Per-Method Aggregate Table",
                "## Per-Input Winners",
                "## Per-Input Outcomes",
                "## Constraint Failure Analysis",
                "## Deck Composition Patterns",
                "## Recommendations",
            ]
        );
    }

    #[test]
    fn test_rows() {
        let md = render_markdown(&report()).unwrap();
        assert!(md.contains("Generated 2024-05-01 12:00:00 UTC with seed 42."));
        assert!(md.contains("Top method: **genetic** (mean composite 0.812)"));
        assert!(md.contains("| genetic | 1 | 0.812 | 0.812 | 12.0 | 0 |"));
        assert!(md.contains("- `#ABC` (Alice): genetic (0.812)"));
        assert!(md.contains("| #ABC | baseline | 0.500 | 12 | 2 |"));
        assert!(md.contains(
            "- `#ABC` / `baseline`: must include at least 1 spell(s), found 0; duplicate card: Zap"
        ));
        assert!(md.contains("- `#ABC`: best method `genetic`, archetype diagnostic `cycle` (55% conf)"));
        assert!(md.ends_with("- Top method by mean composite: genetic\n"));
    }

    #[test]
    fn test_writer_errors_propagate() {
        struct Rejecting;
        impl Write for Rejecting {
            fn write_str(&mut self, _: &str) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        assert!(write_markdown(&mut Rejecting, &report()).is_err());
        let mut out = String::new();
        write_markdown(&mut out, &report()).unwrap();
        assert_eq!(out, render_markdown(&report()).unwrap());
    }

    #[test]
    fn test_empty_report() {
        let mut report = report();
        report.player_runs.clear();
        report.aggregates.clear();
        let md = render_markdown(&report).unwrap();
        assert!(md.contains("No method results available."));
        assert!(md.contains("No constraint violations."));
    }
}
