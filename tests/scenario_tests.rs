//! End-to-end runs through the orchestrator
//!
//! Deterministic sampling makes every duration equal to its mean, so the
//! timestamps below follow directly from the calendar and the schedules.

use chrono::Weekday;
use dispensary_delivery_simulator::calendar::day_of_week;
use dispensary_delivery_simulator::simulation::*;
use dispensary_delivery_simulator::types::*;

fn one_of_each(step: f64) -> RunParameters {
    RunParameters {
        average_step_duration: step,
        num_pharmacists: 1,
        num_labellers: 1,
        num_dispensers: 1,
        num_final_checkers: 1,
        sampling: SamplingMode::Deterministic,
        ..Default::default()
    }
}

fn injected(parameters: RunParameters, arrivals: &[f64]) -> SimulationOutcome {
    let mut orchestrator =
        SimulationOrchestrator::new(parameters).unwrap().without_arrival_generator();
    for at in arrivals {
        orchestrator = orchestrator.inject_arrival(*at);
    }
    orchestrator.run().unwrap()
}

#[test]
fn test_monday_morning_prescription_walks_straight_through() {
    let outcome = injected(one_of_each(1.0), &[10.0]);
    let record = outcome.metrics.get(PrescriptionId::FIRST).unwrap();

    assert_eq!(record.stage_started, [Some(10.0), Some(11.0), Some(12.0), Some(13.0)]);
    assert_eq!(record.stage_finished, [Some(11.0), Some(12.0), Some(13.0), Some(14.0)]);
    for stage in Stage::ALL {
        assert_eq!(record.waiting_for(stage), Some(0.0));
    }
    assert_eq!(record.process_in_dispensary(), Some(4.0));

    // 10:00 and 12:00 couriers find the store empty; 15:00 collects
    assert_eq!(record.pickup, Some(15.0));
    assert_eq!(record.delivery, Some(16.0));
    assert_eq!(record.waiting_for_transport(), Some(1.0));
    assert_eq!(record.throughput(), Some(6.0));

    assert_eq!(outcome.summary.percentage_completed, Some(100.0));
    assert_eq!(outcome.summary.mean_throughput, Some(6.0));
    assert_eq!(outcome.summary.mean_waiting, Some(1.0));
}

#[test]
fn test_second_prescription_queues_for_the_pharmacist() {
    let outcome = injected(one_of_each(1.0), &[10.0, 10.0]);
    let first = outcome.metrics.get(PrescriptionId(1)).unwrap();
    let second = outcome.metrics.get(PrescriptionId(2)).unwrap();

    assert_eq!(first.waiting_for(Stage::Verification), Some(0.0));
    assert_eq!(second.waiting_for(Stage::Verification), Some(1.0));
    assert_eq!(second.stage_finished[Stage::FinalCheck.index()], Some(15.0));
    assert_eq!(outcome.summary.completed_work_items, 2);
}

#[test]
fn test_friday_evening_work_finishes_on_saturday() {
    let friday_five_pm = 4.0 * 24.0 + 17.0;
    let outcome = injected(one_of_each(1.0), &[friday_five_pm]);
    let record = outcome.metrics.get(PrescriptionId::FIRST).unwrap();

    let verified = record.stage_finished[0].unwrap();
    assert_eq!(verified - friday_five_pm, 16.5);
    assert_eq!(day_of_week(verified), Weekday::Sat);
    // Every stage reuses the Friday 17:00 anchor
    assert_eq!(record.stage_finished[1], Some(verified + 16.5));
}

#[test]
fn test_stage_start_anchor_uses_each_stage_start() {
    let friday_five_pm = 4.0 * 24.0 + 17.0;
    let parameters =
        RunParameters { adjustment_anchor: AdjustmentAnchor::StageStart, ..one_of_each(1.0) };
    let outcome = injected(parameters, &[friday_five_pm]);
    let record = outcome.metrics.get(PrescriptionId::FIRST).unwrap();

    assert_eq!(record.stage_finished[0], Some(friday_five_pm + 16.5));
    // Labelling starts Saturday 09:30 and fits before 13:00
    assert_eq!(record.stage_finished[1], Some(friday_five_pm + 17.5));
}

#[test]
fn test_week_without_arrivals() {
    let outcome = SimulationOrchestrator::new(RunParameters::default())
        .unwrap()
        .without_arrival_generator()
        .run()
        .unwrap();

    assert_eq!(outcome.summary.total_work_items, 0);
    assert_eq!(outcome.summary.percentage_completed, None);
    assert_eq!(outcome.summary.mean_throughput, None);
    assert!(!outcome.pickup_audit.is_empty());
    assert!(outcome.pickup_audit.iter().all(|row| row.items_in_store_before == 0));
    assert_eq!(outcome.summary.empty_pickups, outcome.summary.pickup_cycles);
    assert_eq!(outcome.runtime.final_time, 168.0);
}

#[test]
fn test_same_seed_reproduces_the_run() {
    let parameters = RunParameters { seed: Some(42), ..Default::default() };
    let first = SimulationOrchestrator::new(parameters.clone()).unwrap().run().unwrap();
    let second = SimulationOrchestrator::new(parameters).unwrap().run().unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.pickup_audit, second.pickup_audit);
    assert_eq!(first.summary.mean_throughput, second.summary.mean_throughput);
    assert_eq!(first.final_states, second.final_states);
}

#[test]
fn test_generated_week_respects_opening_hours() {
    let parameters = RunParameters { seed: Some(7), ..Default::default() };
    let outcome = SimulationOrchestrator::new(parameters).unwrap().run().unwrap();
    let calendar = dispensary_delivery_simulator::calendar::WeekCalendar::default();

    assert!(outcome.summary.total_work_items > 100);
    for record in outcome.metrics.iter() {
        let hours = calendar.opening_hours(record.arrival_day);
        assert!(record.arrival_time_of_day >= hours.open);
        assert!(record.arrival_time_of_day <= hours.close);

        let mut previous = record.arrival;
        for stage in Stage::ALL {
            let started = record.stage_started[stage.index()];
            let finished = record.stage_finished[stage.index()];
            if let Some(started) = started {
                assert!(started >= previous);
                previous = started;
            }
            if let Some(finished) = finished {
                assert!(finished >= previous);
                previous = finished;
            }
        }
        if record.is_completed() {
            assert!(record.delivery.unwrap() >= record.pickup.unwrap());
            assert!(record.pickup.unwrap() >= record.put_in_store.unwrap());
        }
    }
    assert!(outcome.pickup_audit.iter().all(|row| row.items_in_store_after == 0));
}

#[test]
fn test_infinite_interarrival_stops_after_first_arrival() {
    let parameters = RunParameters {
        interarrival_time: f64::INFINITY,
        sampling: SamplingMode::Deterministic,
        ..Default::default()
    };
    let outcome = SimulationOrchestrator::new(parameters).unwrap().run().unwrap();
    // The generator sleeps forever after the Monday 09:00 arrival
    assert_eq!(outcome.summary.total_work_items, 1);
    assert_eq!(outcome.metrics.get(PrescriptionId::FIRST).unwrap().arrival, 9.0);
}
