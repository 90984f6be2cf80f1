//! Defines the Denavit-Hartenberg parameter data structures

pub mod dh_kinematics {
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};
    use crate::utils::deg;

    /// Theta of the DH row: either a constant of the fixed joint or taken from the joint
    /// angle vector for the variable (actuated) joint.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum DhTheta {
        Fixed(f64),
        Variable,
    }

    /// One row of the DH table, immutable once constructed. Angles in radians, lengths in meters.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DhRow {
        pub theta: DhTheta,

        /// Twist about the new x axis.
        pub alpha: f64,

        /// Offset along the previous z axis.
        pub d: f64,

        /// Length along the new x axis.
        pub a: f64,
    }

    impl DhRow {
        /// Row of the actuated joint.
        pub fn variable(alpha: f64, d: f64, a: f64) -> Self {
            DhRow { theta: DhTheta::Variable, alpha, d, a }
        }

        /// Row of the joint that never moves.
        pub fn fixed(theta: f64, alpha: f64, d: f64, a: f64) -> Self {
            DhRow { theta: DhTheta::Fixed(theta), alpha, d, a }
        }

        pub fn is_variable(&self) -> bool {
            self.theta == DhTheta::Variable
        }

        /// Angle used by the evaluator: the literal theta for the fixed joint,
        /// otherwise the supplied joint value.
        #[inline]
        pub fn effective_theta(&self, joint: f64) -> f64 {
            match self.theta {
                DhTheta::Fixed(theta) => theta,
                DhTheta::Variable => joint,
            }
        }
    }

    /// Fixed mechanical offset of the joint, composed after its DH transform.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Offset {
        Identity,
        Rigid {
            /// Translation in meters.
            translation: [f64; 3],
            /// Roll, pitch, yaw (rx, ry, rz) in radians. Roll is applied first,
            /// the combined rotation is Rz(rz) * Ry(ry) * Rx(rx).
            rotation: [f64; 3],
        },
    }

    impl Offset {
        pub fn rigid(translation: [f64; 3], rotation: [f64; 3]) -> Self {
            Offset::Rigid { translation, rotation }
        }

        pub fn is_identity(&self) -> bool {
            matches!(self, Offset::Identity)
        }

        pub fn to_isometry(&self) -> Isometry3<f64> {
            match *self {
                Offset::Identity => Isometry3::identity(),
                Offset::Rigid { translation: [tx, ty, tz], rotation: [rx, ry, rz] } => {
                    Isometry3::from_parts(
                        Translation3::new(tx, ty, tz),
                        UnitQuaternion::from_euler_angles(rx, ry, rz),
                    )
                }
            }
        }
    }

    impl Default for Offset {
        fn default() -> Self {
            Offset::Identity
        }
    }

    /// Parameters for the kinematic chain: DH table plus one offset per joint.
    /// See [parameters_robots.rs](parameters_robots.rs) for examples of concrete arms.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Parameters {
        pub dh: Vec<DhRow>,
        pub offsets: Vec<Offset>,
    }

    impl Parameters {
        /// Parameters where no joint has a mechanical offset.
        pub fn with_identity_offsets(dh: Vec<DhRow>) -> Self {
            let offsets = vec![Offset::Identity; dh.len()];
            Parameters { dh, offsets }
        }

        /// Convert to string yaml representation (quick viewing, can be read back).
        pub fn to_yaml(&self) -> String {
            let mut yaml = String::from("dh_parameters:\n");
            for row in &self.dh {
                let theta = match row.theta {
                    DhTheta::Fixed(theta) => deg(&theta),
                    DhTheta::Variable => "~".to_string(),
                };
                yaml.push_str(&format!(
                    "  - theta: {}\n    alpha: {}\n    d: {}\n    a: {}\n",
                    theta, deg(&row.alpha), row.d, row.a
                ));
            }
            yaml.push_str("offsets:\n");
            for offset in &self.offsets {
                match offset {
                    Offset::Identity => yaml.push_str("  - identity: true\n"),
                    Offset::Rigid { translation, rotation } => {
                        yaml.push_str(&format!(
                            "  - translation: [{}]\n    rotation: [{}]\n",
                            translation.iter().map(|x| x.to_string())
                                .collect::<Vec<_>>().join(", "),
                            rotation.iter().map(deg)
                                .collect::<Vec<_>>().join(", ")
                        ));
                    }
                }
            }
            yaml
        }
    }

}
