#[cfg(test)]
mod tests {
    use super::super::sweep::*;
    use super::super::types::Position;

    const BATCH: &str = r#"
name: transit_sweep
description: Vary transit availability in a small town
runs:
  - name: low_transit
    preset: small_town
    repeat: 2
    overrides:
      ticks: 15
      random_seed: 10
      transit_availability: 0.2
  - name: custom_city
    overrides:
      population: 10
      width: 12
      height: 12
      city:
        x: 2
        y: 3
      ticks: 5
      random_seed: 1
  - name: broken
    preset: no_such_preset
"#;

    #[test]
    fn test_parse_batch() {
        let batch = SweepBatch::from_yaml_str(BATCH).unwrap();
        assert_eq!(batch.name, "transit_sweep");
        assert_eq!(batch.runs.len(), 3);
        assert_eq!(batch.runs[0].repeat, 2);
        assert_eq!(batch.runs[1].overrides.city, Some(Position::new(2, 3)));
        assert_eq!(batch.parallel, None);
    }

    #[test]
    fn test_resolve_config_offsets_seed_per_repetition() {
        let batch = SweepBatch::from_yaml_str(BATCH).unwrap();
        let first = resolve_config(&batch.runs[0], 0).unwrap();
        let second = resolve_config(&batch.runs[0], 1).unwrap();

        assert_eq!(first.name, "low_transit#0");
        assert_eq!(second.name, "low_transit#1");
        assert_eq!(first.random_seed, Some(10));
        assert_eq!(second.random_seed, Some(11));
        assert_eq!(first.width, 30);
        assert_eq!(first.transit_availability, 0.2);
    }

    #[test]
    fn test_run_batch_reports_failures_per_run() {
        let batch = SweepBatch::from_yaml_str(BATCH).unwrap();
        let results = batch.run();

        assert_eq!(results.len(), 4);
        assert!(results[0].success);
        assert!(results[1].success);
        assert!(results[2].success);
        assert!(!results[3].success);
        assert!(
            results[3]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("no_such_preset"))
        );

        let summary = results[2].summary.as_ref().unwrap();
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.population, 10);
    }

    #[test]
    fn test_parallel_batch_keeps_order() {
        let mut batch = SweepBatch::from_yaml_str(BATCH).unwrap();
        batch.parallel = Some(3);
        let results = batch.run();

        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["low_transit#0", "low_transit#1", "custom_city", "broken"]
        );
    }
}
