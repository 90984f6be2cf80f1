use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

use crate::ik_solver::DlsParameters;
use crate::kinematic_traits::Kinematics;
use crate::parameter_error::ParameterError;
use crate::parameters::dh_kinematics::{DhRow, DhTheta, Offset, Parameters};
use crate::tests::test_utils::{load_chain, DATA_DIR};

const READ_ERROR: &str = "Failed to load parameters from file";
const SMALL: f64 = 1e-9;

fn data(file_name: &str) -> String {
    format!("{}/{}", DATA_DIR, file_name)
}

#[test]
fn test_planar_from_yaml() {
    let loaded = Parameters::from_yaml_file(data("planar_3dof.yaml")).expect(READ_ERROR);
    assert_eq!(loaded, Parameters::planar_3dof());
}

#[test]
fn test_offsets_from_yaml() {
    let loaded = Parameters::from_yaml_file(data("offset_3dof.yaml")).expect(READ_ERROR);
    let expected = Parameters::offset_3dof();
    assert_eq!(loaded.dh.len(), 3);
    assert!(loaded.dh.iter().all(DhRow::is_variable));
    assert!((loaded.dh[1].alpha - FRAC_PI_2).abs() < SMALL);

    assert_eq!(loaded.offsets[0], Offset::Identity);
    match loaded.offsets[1] {
        Offset::Rigid { translation, rotation } => {
            assert_eq!(translation, [0.2, 0.0, 0.1]);
            assert!((rotation[2] - FRAC_PI_4).abs() < SMALL);
        }
        Offset::Identity => panic!("Expected rigid offset"),
    }

    let robot = crate::kinematics_impl::DHKinematics::new(loaded).expect(READ_ERROR);
    let reference = crate::kinematics_impl::DHKinematics::new(expected).expect(READ_ERROR);
    let joints = [0.3, -0.2, 0.9];
    let a = robot.forward(&joints).unwrap();
    let b = reference.forward(&joints).unwrap();
    assert!((a.translation.vector - b.translation.vector).norm() < SMALL);
}

#[test]
fn test_fixed_theta_from_yaml() {
    let loaded = Parameters::from_yaml_file(data("fixed_wrist.yaml")).expect(READ_ERROR);
    match loaded.dh[1].theta {
        DhTheta::Fixed(theta) => assert!((theta - FRAC_PI_6).abs() < SMALL),
        DhTheta::Variable => panic!("Joint 1 must be fixed"),
    }
    assert!(loaded.dh[0].is_variable());
    assert!(loaded.dh[2].is_variable());
}

#[test]
fn test_solver_section() {
    let (_, solver) = load_chain("offset_3dof.yaml").expect(READ_ERROR);
    assert_eq!(solver.max_iterations, 300);
    assert_eq!(solver.tolerance, 0.0005);
    assert_eq!(solver.damping, 0.05);
    // Not given, defaults kept.
    assert_eq!(solver.step_size, DlsParameters::default().step_size);

    let (_, solver) = load_chain("planar_3dof.yaml").expect(READ_ERROR);
    assert_eq!(solver, DlsParameters::default());
}

#[test]
fn test_wrong_offset_count() {
    match Parameters::from_yaml_file(data("wrong_offsets.yaml")) {
        Err(ParameterError::InvalidLength { expected, found }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("Expected InvalidLength, got {:?}", other),
    }
}

#[test]
fn test_invalid_solver_settings() {
    assert!(matches!(
        DlsParameters::from_yaml_file(data("bad_solver.yaml")),
        Err(ParameterError::ParseError(_))
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        Parameters::from_yaml_file(data("does_not_exist.yaml")),
        Err(ParameterError::IoError(_))
    ));
}

#[test]
fn test_malformed_offsets() {
    let yaml = "dh_parameters:\n  - theta: ~\n    alpha: 0\n    d: 0\n    a: 1.0\noffsets:\n  - {}\n";
    assert!(matches!(Parameters::from_yaml_str(yaml), Err(ParameterError::ParseError(_))));

    let yaml = "dh_parameters: []\n";
    assert!(matches!(Parameters::from_yaml_str(yaml), Err(ParameterError::ParseError(_))));
}

#[test]
fn test_to_yaml_reads_back() {
    for parameters in [
        Parameters::planar_3dof(),
        Parameters::offset_3dof(),
        Parameters::industrial_6dof(),
        Parameters::puma_560(),
    ] {
        let yaml = parameters.to_yaml();
        let loaded = Parameters::from_yaml_str(&yaml)
            .unwrap_or_else(|e| panic!("{}\n{}", e, yaml));
        assert_eq!(loaded.dh.len(), parameters.dh.len());
        for (a, b) in loaded.dh.iter().zip(&parameters.dh) {
            assert_eq!(a.is_variable(), b.is_variable());
            // Angles are written with 4 decimals in degrees.
            assert!((a.alpha - b.alpha).abs() < 1e-5);
            assert_eq!(a.d, b.d);
            assert_eq!(a.a, b.a);
        }
        for (a, b) in loaded.offsets.iter().zip(&parameters.offsets) {
            assert_eq!(a.is_identity(), b.is_identity());
        }
    }
}
