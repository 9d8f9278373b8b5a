use std::sync::Arc;

use approx::assert_abs_diff_eq;
use tilt_tracker_rs::{
    DisplayConvention, OrientationEstimator, OrientationSession, RawSample, ScreenRotation,
    StaticHost, TrackerConfig, YawOrigin,
};
use tokio::sync::mpsc;

const SCREENS: [ScreenRotation; 4] = [
    ScreenRotation::Portrait,
    ScreenRotation::Landscape,
    ScreenRotation::PortraitFlipped,
    ScreenRotation::LandscapeFlipped,
];

#[test]
fn estimates_stay_in_range_for_all_screens() {
    for screen in SCREENS {
        let mut estimator = OrientationEstimator::default();
        let mut alpha = 0.0;
        while alpha < 360.0 {
            let mut beta = -180.0;
            while beta <= 180.0 {
                let mut gamma = -90.0;
                while gamma <= 90.0 {
                    let e = estimator
                        .update(&RawSample::new(alpha, beta, gamma), screen)
                        .unwrap();
                    assert!(e.is_finite());
                    assert!((-180.0..=180.0).contains(&e.yaw));
                    assert!((-90.0..=90.0).contains(&e.pitch));
                    assert!((-180.0..=180.0).contains(&e.roll));
                    gamma += 22.5;
                }
                beta += 45.0;
            }
            alpha += 45.0;
        }
    }
}

#[test]
fn flat_device_is_level_and_reproducible() {
    let mut estimator = OrientationEstimator::default();
    let flat = RawSample::new(0.0, 0.0, 0.0);
    let first = estimator.update(&flat, ScreenRotation::Portrait).unwrap();
    let second = estimator.update(&flat, ScreenRotation::Portrait).unwrap();
    assert_abs_diff_eq!(first.pitch, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(first.roll, 0.0, epsilon = 1e-9);
    assert_eq!(first, second);
}

#[test]
fn reset_rezeroes_on_following_sample() {
    let convention = DisplayConvention::compass();
    let mut estimator = OrientationEstimator::new(Default::default(), convention);
    estimator.update(&RawSample::new(15.0, 30.0, 10.0), ScreenRotation::Portrait);
    estimator.update(&RawSample::new(95.0, 30.0, 10.0), ScreenRotation::Portrait);

    estimator.reset();
    assert_eq!(estimator.origin(), YawOrigin::NoOrigin);

    let sample = RawSample::new(95.0, 30.0, 10.0);
    let e = estimator.update(&sample, ScreenRotation::Portrait).unwrap();
    assert_abs_diff_eq!(e.yaw, convention.yaw(0.0), epsilon = 1e-9);
    let e = estimator.update(&sample, ScreenRotation::Portrait).unwrap();
    assert_abs_diff_eq!(e.yaw, convention.yaw(0.0), epsilon = 1e-9);
}

#[tokio::test]
async fn session_end_to_end() {
    let host = Arc::new(StaticHost::ungated());
    let mut session = OrientationSession::new(host, TrackerConfig::default());
    let (tx, rx) = mpsc::channel(8);
    session.start(rx).await.unwrap();
    let mut watch = session.watch();

    tx.send(RawSample::new(120.0, 10.0, 5.0)).await.unwrap();
    watch.changed().await.unwrap();
    assert_abs_diff_eq!(watch.borrow_and_update().yaw, 0.0, epsilon = 1e-9);

    session.unsubscribe();
    session.unsubscribe();
    assert!(!session.is_subscribed());
}
