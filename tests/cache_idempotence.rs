//! Cache idempotence (component I): a second `generate_base` over the same
//! ticks and config must skip every cacheable stage rather than recompute
//! it, and `search_light` must fail clearly when no `generate_base` has run.

use fx_research_engine::config::{LabelGrid, RunConfig};
use fx_research_engine::domain::{PairYear, Tick};
use fx_research_engine::orchestrator::{generate_base, search_light, RunLedger, StepStatus};

fn synthetic_ticks(n: usize) -> Vec<Tick> {
    (0..n)
        .map(|i| {
            let mid = 1.1000 + (i as f64) * 1e-5;
            Tick::new(i as i64 * 1_000_000_000, mid - 0.00005, mid + 0.00005)
        })
        .collect()
}

#[test]
fn a_repeated_generate_base_skips_regimes_and_patterns_instead_of_recomputing() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::builder()
        .with_cache_root(dir.path())
        .with_label_grid(LabelGrid::new(vec![10.0], vec![10.0], vec![20]))
        .build();
    let pair_year = PairYear::new("EURUSD", 2023);
    let ticks = synthetic_ticks(5_000);

    let first = generate_base(&ticks, &pair_year, &config).unwrap();
    let second = generate_base(&ticks, &pair_year, &config).unwrap();
    assert_eq!(first.n_candles, second.n_candles);

    let ledger = RunLedger::load_or_default(&config.persistence.ledger_path);
    let dataset = pair_year.cache_prefix();
    assert_eq!(ledger.status(&dataset, "regimes"), Some(StepStatus::Skipped));
    assert_eq!(ledger.status(&dataset, "patterns"), Some(StepStatus::Skipped));
}

#[test]
fn force_rerun_recomputes_even_when_the_cache_still_matches() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::builder()
        .with_cache_root(dir.path())
        .with_label_grid(LabelGrid::new(vec![10.0], vec![10.0], vec![20]))
        .build();
    let forced = RunConfig::builder()
        .with_cache_root(dir.path())
        .with_label_grid(LabelGrid::new(vec![10.0], vec![10.0], vec![20]))
        .with_force_rerun(true)
        .build();
    let pair_year = PairYear::new("EURUSD", 2023);
    let ticks = synthetic_ticks(5_000);

    generate_base(&ticks, &pair_year, &config).unwrap();
    generate_base(&ticks, &pair_year, &forced).unwrap();

    let ledger = RunLedger::load_or_default(&config.persistence.ledger_path);
    let dataset = pair_year.cache_prefix();
    assert_eq!(ledger.status(&dataset, "regimes"), Some(StepStatus::Completed));
    assert_eq!(ledger.status(&dataset, "patterns"), Some(StepStatus::Completed));
}

#[test]
fn search_light_before_any_generate_base_reports_a_clear_error_naming_the_missing_step() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig::builder().with_cache_root(dir.path()).build();
    let pair_year = PairYear::new("EURUSD", 2023);

    let err = search_light(&pair_year, &config, 1).unwrap_err();
    assert!(format!("{err:#}").contains("generate-base"), "error should point at the missing generate-base step: {err:#}");
}
