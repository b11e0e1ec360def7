use motionkit_core::Axis;
use motionkit_planner::{ArcCommand, ArcSession, CanonicalMachine, PlannerQueue, StepResult};
use motionkit_settings::Config;
use proptest::prelude::*;
use std::f64::consts::PI;

fn machine_at(x: f64, y: f64) -> CanonicalMachine {
    let mut machine = CanonicalMachine::new(Config::new());
    machine.model_mut().feed_rate = 1000.0;
    machine.set_position([x, y, 0.0, 0.0, 0.0, 0.0]);
    machine
}

fn radius_command(ccw: bool, x: f64, y: f64, radius: f64) -> ArcCommand {
    let command = if ccw {
        ArcCommand::counter_clockwise()
    } else {
        ArcCommand::clockwise()
    };
    command
        .with_axis(Axis::X, x)
        .with_axis(Axis::Y, y)
        .with_radius(radius)
}

proptest! {
    #[test]
    fn radius_format_center_is_equidistant(
        x0 in -50.0f64..50.0,
        y0 in -50.0f64..50.0,
        dx in -50.0f64..50.0,
        dy in -50.0f64..50.0,
        factor in 1.0f64..5.0,
        long_way in any::<bool>(),
        ccw in any::<bool>(),
    ) {
        let chord = dx.hypot(dy);
        prop_assume!(chord > 1.0);

        let radius = factor * chord / 2.0;
        let signed = if long_way { -radius } else { radius };
        let mut machine = machine_at(x0, y0);
        let mut session = ArcSession::new();
        session
            .prepare(&mut machine, &radius_command(ccw, x0 + dx, y0 + dy, signed))
            .unwrap();

        let tolerance = 1e-6 * radius;
        let (c0, c1) = session.center();
        prop_assert!(((x0 - c0).hypot(y0 - c1) - radius).abs() < tolerance);
        prop_assert!(((x0 + dx - c0).hypot(y0 + dy - c1) - radius).abs() < tolerance);
        prop_assert!((session.radius() - radius).abs() < tolerance);
    }

    #[test]
    fn negative_radius_selects_long_arc(
        dx in -50.0f64..50.0,
        dy in -50.0f64..50.0,
        factor in 1.05f64..5.0,
        long_way in any::<bool>(),
        ccw in any::<bool>(),
    ) {
        prop_assume!(dx.hypot(dy) > 1.0);

        let radius = factor * dx.hypot(dy) / 2.0;
        let signed = if long_way { -radius } else { radius };
        let mut session = ArcSession::new();
        session
            .prepare(&mut machine_at(0.0, 0.0), &radius_command(ccw, dx, dy, signed))
            .unwrap();

        let travel = session.angular_travel();
        prop_assert_eq!(travel < 0.0, ccw);
        if long_way {
            prop_assert!(travel.abs() > PI);
        } else {
            prop_assert!(travel.abs() < PI);
        }
    }

    #[test]
    fn emitted_segments_follow_the_arc(
        dx in -50.0f64..50.0,
        dy in -50.0f64..50.0,
        factor in 1.0f64..5.0,
        long_way in any::<bool>(),
        ccw in any::<bool>(),
        z in -20.0f64..20.0,
    ) {
        prop_assume!(dx.hypot(dy) > 1.0);

        let radius = factor * dx.hypot(dy) / 2.0;
        let signed = if long_way { -radius } else { radius };
        let mut machine = machine_at(0.0, 0.0);
        let mut session = ArcSession::new();
        let command = radius_command(ccw, dx, dy, signed).with_axis(Axis::Z, z);
        session.prepare(&mut machine, &command).unwrap();

        let segments = session.segments();
        let theta_start = session.theta();
        let travel = session.angular_travel();
        let (c0, c1) = session.center();
        let mut queue = PlannerQueue::new(28);
        let mut emitted = Vec::new();
        let mut remaining = session.segment_count();

        loop {
            let result = session.step(&mut queue);
            prop_assert_eq!(session.segment_count(), remaining - 1);
            remaining = session.segment_count();
            emitted.extend(queue.pop_move());
            if result == StepResult::Done {
                break;
            }
            prop_assert_eq!(result, StepResult::Retry);
        }

        prop_assert_eq!(emitted.len() as u32, segments);
        for line in &emitted {
            let r = (line.target[0] - c0).hypot(line.target[1] - c1);
            prop_assert!((r - radius).abs() < 1e-6 * radius);
        }
        let last = &emitted[emitted.len() - 1];
        prop_assert_eq!(last.target, [dx, dy, z, 0.0, 0.0, 0.0]);
        prop_assert!((session.theta() - theta_start - travel).abs() < 1e-9 * f64::from(segments));
    }
}
