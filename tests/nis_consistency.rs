//! Statistical consistency of the tracker under noisy sensors
//!
//! Feeds readings drawn with the exact noise levels the tracker is tuned
//! for and checks that the normalized innovation squared stays consistent
//! with its chi-square reference, and that the estimation error stays
//! bounded.

mod common;

use common::{default_tracker, init_logging, TruthTarget};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sigmatrack::filters::tracker::{Tracker, TrackerConfig};
use sigmatrack::types::measurement::MeasurementPackage;
use sigmatrack::utils::{
    fraction_above, position_velocity, rmse, CHI_SQUARE_95_2DOF, CHI_SQUARE_95_3DOF,
};

const STEP_US: u64 = 50_000;
const DT: f64 = 0.05;

#[test]
fn test_nis_fractions_and_rmse_with_noisy_sensors() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(42);
    let pos_noise = Normal::new(0.0, 0.15).unwrap();
    let range_noise = Normal::new(0.0, 0.3).unwrap();
    let bearing_noise = Normal::new(0.0, 0.03).unwrap();
    let rate_noise = Normal::new(0.0, 0.3).unwrap();

    let mut truth = TruthTarget {
        px: 6.0,
        py: 2.0,
        speed: 2.5,
        yaw: 0.5,
        yaw_rate: 0.3,
    };
    let mut tracker = default_tracker();

    let mut estimations = Vec::new();
    let mut ground_truth = Vec::new();
    let mut nis_position = Vec::new();
    let mut nis_polar = Vec::new();

    for step in 0..400u64 {
        if step > 0 {
            truth.step(DT);
        }
        let timestamp_us = step * STEP_US;

        let package = if step % 2 == 0 {
            MeasurementPackage::position(
                timestamp_us,
                truth.px + pos_noise.sample(&mut rng),
                truth.py + pos_noise.sample(&mut rng),
            )
        } else {
            let range = truth.px.hypot(truth.py);
            MeasurementPackage::range_bearing_rate(
                timestamp_us,
                range + range_noise.sample(&mut rng),
                truth.py.atan2(truth.px) + bearing_noise.sample(&mut rng),
                (truth.px * truth.vx() + truth.py * truth.vy()) / range
                    + rate_noise.sample(&mut rng),
            )
        };

        let estimate = tracker.process(&package).unwrap().unwrap();
        if let Some(nis) = estimate.nis {
            if step % 2 == 0 {
                nis_position.push(nis);
            } else {
                nis_polar.push(nis);
            }
        }

        estimations.push(position_velocity(&estimate.state.mean));
        ground_truth.push(nalgebra::vector![
            truth.px,
            truth.py,
            truth.vx(),
            truth.vy()
        ]);
    }

    // A consistent filter exceeds the 95% line about 5% of the time; far
    // more than that means the filter underestimates its uncertainty
    let position_fraction = fraction_above(&nis_position, CHI_SQUARE_95_2DOF);
    let polar_fraction = fraction_above(&nis_polar, CHI_SQUARE_95_3DOF);
    assert!(
        position_fraction < 0.3,
        "position NIS above threshold too often: {:.3}",
        position_fraction
    );
    assert!(
        polar_fraction < 0.3,
        "polar NIS above threshold too often: {:.3}",
        polar_fraction
    );

    let error = rmse(&estimations, &ground_truth).unwrap();
    assert!(
        error[0] < 0.5 && error[1] < 0.5,
        "position RMSE [{:.3}, {:.3}]",
        error[0],
        error[1]
    );
    assert!(
        error[2] < 1.0 && error[3] < 1.0,
        "velocity RMSE [{:.3}, {:.3}]",
        error[2],
        error[3]
    );
}

#[test]
fn test_position_only_noisy_rmse() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    let pos_noise = Normal::new(0.0, 0.15).unwrap();

    let mut truth = TruthTarget {
        px: 4.0,
        py: -1.0,
        speed: 2.0,
        yaw: 0.3,
        yaw_rate: -0.2,
    };
    let mut tracker = Tracker::new(TrackerConfig {
        use_range_bearing: false,
        ..TrackerConfig::default()
    })
    .unwrap();

    let mut estimations = Vec::new();
    let mut ground_truth = Vec::new();

    for step in 0..300u64 {
        if step > 0 {
            truth.step(DT);
        }
        let package = MeasurementPackage::position(
            step * STEP_US,
            truth.px + pos_noise.sample(&mut rng),
            truth.py + pos_noise.sample(&mut rng),
        );

        let estimate = tracker.process(&package).unwrap().unwrap();
        estimations.push(position_velocity(&estimate.state.mean));
        ground_truth.push(nalgebra::vector![
            truth.px,
            truth.py,
            truth.vx(),
            truth.vy()
        ]);
    }

    let error = rmse(&estimations, &ground_truth).unwrap();
    assert!(
        error[0] < 0.5 && error[1] < 0.5,
        "position RMSE [{:.3}, {:.3}]",
        error[0],
        error[1]
    );
    assert!(
        error[2] < 1.2 && error[3] < 1.2,
        "velocity RMSE [{:.3}, {:.3}]",
        error[2],
        error[3]
    );
}
