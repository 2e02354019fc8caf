use crate::*;
use approx::assert_abs_diff_eq;

/// Equal arms of 10 in. and a vertical kingpin of 8 in. on both corners.
pub(crate) fn parallelogram() -> SuspensionState {
    let asm = Assembly {
        top_fwd_chassis: [4., 5., 13.],
        top_rwd_chassis: [-4., 5., 13.],
        bot_fwd_chassis: [4., 5., 5.],
        bot_rwd_chassis: [-4., 5., 5.],
        upper_kingpin: [0., 15., 13.],
        lower_kingpin: [0., 15., 5.],
        contact_patch: [0., 17., 0.],
        camber_offset: 0.,
    };
    SuspensionState { front: asm.clone(), rear: asm }
}

#[test]
fn parallelogram_lengths() {
    let state = parallelogram();
    state.validate().unwrap();
    for corner in Corner::ALL {
        let asm = state.corner(corner);
        assert_abs_diff_eq!(asm.lower_arm_len(), 10.);
        assert_abs_diff_eq!(asm.upper_arm_len(), 10.);
        assert_abs_diff_eq!(asm.kingpin_len(), 8.);
    }
}

#[test]
fn config_to_curve() {
    let state = SuspensionState::example();
    let s = config::dump_config(&state, None).unwrap();
    let cfg = config::parse_config(&s).unwrap();
    for corner in Corner::ALL {
        let curve = compute_curve(&cfg.state, corner, 0.05, 3.).unwrap();
        assert_eq!(curve.len(), 121);
        assert_eq!(curve, compute_curve(&state, corner, 0.05, 3.).unwrap());
    }
}

#[test]
fn config_to_synthesis() {
    // Widen the front upper arm pivot of the parallelogram
    let state = parallelogram();
    let mut rows = config::dump_config(&state, None)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();
    rows[0] = "Front top forward chassis pickup,4,5,13,4,4,4,6,12.5,13.5".to_string();
    rows[1] = "Front top rearward chassis pickup,-4,5,13,-4,-4,4,6,12.5,13.5".to_string();
    let cfg = config::parse_config(&rows.join("\n")).unwrap();
    let schema = Schema::without_contact_patches();
    let guess = cfg.initial_guess(&schema);
    let bounds = cfg.bounds(&schema).unwrap();
    assert_eq!(bounds.free_indices(), [1, 2, 4, 5]);
    let target = TargetCurve::new(vec![-1., 0., 1.], vec![0.; 3]).unwrap();
    let opt_cfg = OptCfg {
        schema,
        base: cfg.state.clone(),
        seed: Some(7),
        ..Default::default()
    };
    let s = opt::optimize(&target, &guess, &bounds, 5, &opt_cfg).unwrap();
    assert!(s.cost < 0.03, "{}", s.cost);
    assert_eq!(s.state.front.contact_patch, state.front.contact_patch);
    assert!(bounds.out_of_bounds(&s.xs).is_empty());
    assert_eq!(s.state.front.top_fwd_chassis[1..], s.state.front.top_rwd_chassis[1..]);
}
