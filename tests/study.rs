mod common;

use common::{revenue, stores, wide};
use missify::study::{BASELINE_LABEL, CsvReporter, JsonReporter, Metric, TextReporter};
use missify::{Mechanism, ResultsReporter, Study};

#[test]
fn standard_rows_follow_the_baseline() {
    let matrix = Study::new(stores(), "sales")
        .with_standard_mechanisms(Some("region"), 0.2, 0.5)
        .with_trials(10)
        .run()
        .unwrap();
    assert_eq!(
        matrix.row_labels,
        [
            BASELINE_LABEL,
            "MCAR(sales, p=0.2)",
            "MAR(sales | region, b=0.5)",
            "NMAR(sales, b=0.5)",
        ]
    );
    assert_eq!(
        matrix.column_labels,
        Metric::ALL.map(|m| m.label().to_owned())
    );
}

#[test]
fn without_dependent_mar_row_is_skipped() {
    let matrix = Study::new(revenue(), "revenue")
        .with_standard_mechanisms(None, 0.2, 0.5)
        .with_trials(3)
        .run()
        .unwrap();
    assert_eq!(matrix.shape().0, 3);
    assert!(matrix.row_index("MAR(revenue | revenue, b=0.5)").is_none());
}

#[test]
fn nmar_on_skewed_column_lowers_observed_mean() {
    let matrix = Study::new(revenue(), "revenue")
        .with_mechanism(Mechanism::nmar("revenue", 1.0))
        .with_trials(400)
        .with_seed(11)
        .run()
        .unwrap();
    let shift = matrix.get(1, Metric::MeanShift).unwrap();
    assert!(shift < 0.0, "shift {shift}");
}

#[test]
fn mcar_rate_averages_near_probability() {
    let matrix = Study::new(wide(1_000), "y")
        .with_mechanism(Mechanism::mcar("y", 0.3))
        .with_trials(40)
        .with_seed(3)
        .run()
        .unwrap();
    let rate = matrix.get(1, Metric::MissingRate).unwrap();
    assert!((rate - 0.3).abs() < 0.01, "rate {rate}");
    let injected = matrix.get(1, Metric::Injected).unwrap();
    assert!((injected - 1_000.0 * rate).abs() < 1e-6);
}

#[test]
fn seed_changes_results_but_repeats_them() {
    let study = |seed| {
        Study::new(wide(200), "y")
            .with_mechanism(Mechanism::mar("y", "group", 0.8))
            .with_trials(5)
            .with_seed(seed)
            .run()
            .unwrap()
    };
    assert_eq!(study(1), study(1));
    assert_ne!(study(1), study(2));
}

#[test]
fn reporters_render_the_same_matrix() {
    let matrix = Study::new(stores(), "units")
        .with_standard_mechanisms(Some("promo"), 0.5, 0.5)
        .with_trials(4)
        .run()
        .unwrap();

    let mut text = TextReporter::new(Vec::new());
    text.report(&matrix).unwrap();
    let text = String::from_utf8(text.into_inner()).unwrap();
    assert_eq!(text.lines().count(), matrix.shape().0 + 1);
    assert!(text.contains("MAR(units | promo, b=0.5)"));

    let mut csv = CsvReporter::new(Vec::new());
    csv.report(&matrix).unwrap();
    let csv = String::from_utf8(csv.into_inner()).unwrap();
    assert!(csv.starts_with(
        "mechanism,injected,missing_rate,observed_mean,mean_shift,observed_std\n"
    ));
    assert_eq!(csv.lines().count(), 5);

    let mut json = JsonReporter::new(Vec::new());
    json.report(&matrix).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&json.into_inner()).unwrap();
    assert_eq!(parsed["row_labels"].as_array().unwrap().len(), 4);
    assert_eq!(parsed["values"][0].as_array().unwrap().len(), Metric::ALL.len());
}
