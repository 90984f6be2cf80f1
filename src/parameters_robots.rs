//! Hardcoded DH parameters for a few arms

pub mod dh_kinematics {
    use crate::parameters::dh_kinematics::{DhRow, Offset, Parameters};
    use std::f64::consts::FRAC_PI_2;

    #[allow(dead_code)]
    impl Parameters {
        /// Three revolute joints about parallel z axes: base (0.5 m high), shoulder
        /// (1.0 m link) and elbow (0.8 m link). The end effector stays at z = 0.5.
        pub fn planar_3dof() -> Self {
            Parameters::with_identity_offsets(vec![
                DhRow::variable(0.0, 0.5, 0.0),
                DhRow::variable(0.0, 0.0, 1.0),
                DhRow::variable(0.0, 0.0, 0.8),
            ])
        }

        /// Three joints where the shoulder has a physical offset: 0.2 m along x,
        /// 0.1 m along z and 45 degrees about z away from its DH frame.
        pub fn offset_3dof() -> Self {
            Parameters {
                dh: vec![
                    DhRow::variable(0.0, 0.3, 0.0),
                    DhRow::variable(FRAC_PI_2, 0.0, 0.5),
                    DhRow::variable(0.0, 0.0, 0.7),
                ],
                offsets: vec![
                    Offset::Identity,
                    Offset::rigid([0.2, 0.0, 0.1], [0.0, 0.0, FRAC_PI_2 / 2.0]),
                    Offset::Identity,
                ],
            }
        }

        /// Industrial style six axis arm.
        pub fn industrial_6dof() -> Self {
            Parameters::with_identity_offsets(vec![
                DhRow::variable(FRAC_PI_2, 0.4, 0.0),
                DhRow::variable(0.0, 0.0, 0.6),
                DhRow::variable(FRAC_PI_2, 0.0, 0.2),
                DhRow::variable(-FRAC_PI_2, 0.5, 0.0),
                DhRow::variable(FRAC_PI_2, 0.0, 0.0),
                DhRow::variable(0.0, 0.3, 0.0),
            ])
        }

        /// PUMA 560 like arm (classic textbook parameters).
        pub fn puma_560() -> Self {
            Parameters::with_identity_offsets(vec![
                DhRow::variable(FRAC_PI_2, 0.6718, 0.0),
                DhRow::variable(0.0, 0.0, 0.4318),
                DhRow::variable(-FRAC_PI_2, 0.0, 0.0203),
                DhRow::variable(FRAC_PI_2, 0.4318, 0.0),
                DhRow::variable(-FRAC_PI_2, 0.0, 0.0),
                DhRow::variable(0.0, 0.0, 0.0),
            ])
        }
    }
}
