// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use dispensary_delivery_simulator::*;


mod scenario_tests;

#[test]
fn test_core_id_types() {
    let first = PrescriptionId::FIRST;
    assert_eq!(first.value(), 1);
    assert_eq!(first.next(), PrescriptionId(2));
    assert_eq!(first.to_string(), "RX_1");

    let run_id = RunId::new();
    assert_ne!(run_id, RunId::new());
    assert!(run_id.to_string().starts_with("RUN_"));
}

#[test]
fn test_enum_types() {
    assert_eq!(Stage::ALL.len(), 4);
    for stage in &Stage::ALL {
        assert!(!stage.to_string().is_empty());
        assert!(!stage.staff_group().is_empty());
        assert_ne!(stage.active_state(), stage.completed_state());
    }
    assert_eq!(Stage::FinalCheck.next(), None);
    assert!(PrescriptionState::Delivered.is_terminal());
    assert!(!PrescriptionState::Stored.is_terminal());
}

#[test]
fn test_serialization_roundtrip() {
    let run_id = RunId::new();
    let json = serde_json::to_string(&run_id).unwrap();
    assert!(json.contains("RUN_"));
    let deserialized: RunId = serde_json::from_str(&json).unwrap();
    assert_eq!(run_id, deserialized);

    let anchor = AdjustmentAnchor::StageStart;
    let json = serde_json::to_string(&anchor).unwrap();
    let deserialized: AdjustmentAnchor = serde_json::from_str(&json).unwrap();
    assert_eq!(anchor, deserialized);

    let params = RunParameters { seed: Some(3), num_dispensers: 2, ..Default::default() };
    let json = serde_json::to_string(&params).unwrap();
    let deserialized: RunParameters = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.seed, Some(3));
    assert_eq!(deserialized.staffing(), [3, 3, 2, 3]);
    assert_eq!(deserialized.sampling, SamplingMode::Stochastic);
}
