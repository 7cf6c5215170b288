//! # Trajectory Generation Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Vector2;

use traj_core::{
    ChassisSpeeds, DesatMode, GoalEndState, Kinematics, Path, PathConstraints, RobotConfig,
    RotationTarget, SwerveKin, Trajectory,
};

fn traj_gen_benchmark(c: &mut Criterion) {
    // ---- Build the robot config ----

    let config = RobotConfig::new(
        Kinematics::Swerve(
            SwerveKin::new([
                Vector2::new(0.3, 0.3),
                Vector2::new(0.3, -0.3),
                Vector2::new(-0.3, 0.3),
                Vector2::new(-0.3, -0.3),
            ])
            .unwrap(),
        ),
        4.5,
        4.0,
        3.0,
        6.0,
        12.0,
    )
    .unwrap();

    // ---- Serpentine path to profile ----

    let mut path = Path::new(
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 2.0),
            Vector2::new(0.0, 2.0),
            Vector2::new(0.0, 4.0),
            Vector2::new(4.0, 4.0),
            Vector2::new(4.0, 6.0),
            Vector2::new(0.0, 6.0),
        ],
        PathConstraints {
            max_vel_ms: 4.0,
            max_acc_mss: 3.0,
            max_ang_vel_rads: 6.0,
            max_ang_acc_radss: 12.0,
        },
        GoalEndState {
            velocity_ms: 0.0,
            heading_rad: std::f64::consts::PI,
        },
        0.05,
    );
    path.rotation_targets = vec![
        RotationTarget {
            pos: 0.5,
            heading_rad: std::f64::consts::FRAC_PI_2,
        },
        RotationTarget {
            pos: 1.0,
            heading_rad: std::f64::consts::PI,
        },
    ];

    c.bench_function("generate serpentine trajectory", |b| {
        b.iter(|| {
            Trajectory::generate(
                &path,
                &config,
                &ChassisSpeeds::default(),
                0.0,
                DesatMode::ScaleBoth,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, traj_gen_benchmark);
criterion_main!(benches);
