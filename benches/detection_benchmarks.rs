//! Benchmarks for geometry extraction and the detector state machines

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_gesture_control::{
    blink_detector::{BlinkDetector, BlinkState},
    constants::{CHIN, LEFT_EYE, RIGHT_EYE},
    geometry::{self, HeadPose},
    head_pose::{HeadDirection, HeadPoseClassifier},
    landmarks::LandmarkFrame,
};

/// Face mesh with slightly jittered points and a plausible eye contour
fn noisy_face() -> LandmarkFrame {
    let mut points: Vec<[f64; 3]> = (0..468)
        .map(|_| {
            [
                0.5 + 0.01 * rand::random::<f64>(),
                0.5 + 0.01 * rand::random::<f64>(),
                0.01 * rand::random::<f64>(),
            ]
        })
        .collect();
    for (eye, outer, dir) in [(LEFT_EYE, 0.3, 1.0), (RIGHT_EYE, 0.7, -1.0)] {
        points[eye[0]] = [outer, 0.4, 0.0];
        points[eye[3]] = [outer + dir * 0.1, 0.4, 0.0];
        points[eye[1]] = [outer + dir * 0.03, 0.385, 0.0];
        points[eye[5]] = [outer + dir * 0.03, 0.415, 0.0];
        points[eye[2]] = [outer + dir * 0.07, 0.385, 0.0];
        points[eye[4]] = [outer + dir * 0.07, 0.415, 0.0];
    }
    points[CHIN] = [0.52, 0.8, 0.01];
    LandmarkFrame::new(points).expect("benchmark face is valid")
}

fn benchmark_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    let frame = noisy_face();

    group.bench_function("eye_aspect_ratio", |b| {
        b.iter(|| black_box(geometry::eye_aspect_ratio(black_box(&frame), LEFT_EYE)));
    });
    group.bench_function("head_pose", |b| {
        b.iter(|| black_box(geometry::head_pose(black_box(&frame))));
    });
    group.bench_function("extract", |b| {
        b.iter(|| black_box(geometry::extract(black_box(&frame))));
    });
    group.bench_function("validate_frame", |b| {
        let points = frame.points().to_vec();
        b.iter(|| black_box(LandmarkFrame::new(black_box(points.clone()))));
    });

    group.finish();
}

fn benchmark_detectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("detectors");

    // EAR trace with a blink every 20 frames
    let ears: Vec<f64> = (0..1000)
        .map(|i| (if i % 20 < 3 { 0.1 } else { 0.3 }) + 0.02 * rand::random::<f64>())
        .collect();
    group.bench_function("blink_sequence_1000", |b| {
        let detector = BlinkDetector::default();
        b.iter(|| {
            let mut state = BlinkState::default();
            for &ear in &ears {
                black_box(detector.step(&mut state, black_box(ear)));
            }
        });
    });

    // Tilt trace hovering around the threshold
    let poses: Vec<HeadPose> = (0..1000)
        .map(|_| HeadPose {
            pitch: 0.0,
            tilt: Some(5.0 + (rand::random::<f64>() - 0.5) * 2.0),
        })
        .collect();
    for hysteresis in [0.0, 1.0, 2.0] {
        let classifier = HeadPoseClassifier::new(hysteresis).expect("valid hysteresis");
        let id = BenchmarkId::new("classify_sequence_1000", hysteresis);
        group.bench_with_input(id, &poses, |b, poses| {
            b.iter(|| {
                let mut last = HeadDirection::Center;
                for pose in poses {
                    black_box(classifier.step(&mut last, black_box(pose)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_geometry, benchmark_detectors);
criterion_main!(benches);
