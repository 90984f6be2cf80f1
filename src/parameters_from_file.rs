//! Supports reading chain descriptions and solver settings from YAML files (optional)

use std::path::Path;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_saphyr::Options;

use crate::ik_solver::DlsParameters;
use crate::parameter_error::ParameterError;
use crate::parameters::dh_kinematics::{DhRow, DhTheta, Offset, Parameters};

#[derive(Deserialize)]
struct DhRowEntry {
    /// Absent or null for the variable joint.
    #[serde(default)]
    pub theta: Option<f64>,
    pub alpha: f64,
    pub d: f64,
    pub a: f64,
}

#[derive(Deserialize)]
struct OffsetEntry {
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub translation: Option<[f64; 3]>,
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
}

#[derive(Deserialize, Default)]
struct SolverEntry {
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    pub damping: Option<f64>,
    pub step_size: Option<f64>,
    pub epsilon: Option<f64>,
}

#[derive(Deserialize)]
struct ChainRoot {
    pub dh_parameters: Vec<DhRowEntry>,
    #[serde(default)]
    pub offsets: Option<Vec<OffsetEntry>>,
}

#[derive(Deserialize)]
struct SolverRoot {
    #[serde(default)]
    pub solver: Option<SolverEntry>,
}

fn parse<T: DeserializeOwned>(contents: &str) -> Result<T, ParameterError> {
    serde_saphyr::from_str_with_options(
        contents,
        Options { angle_conversions: true, ..Default::default() },
    ).map_err(|e| ParameterError::ParseError(format!("{}", e)))
}

fn check_finite(what: &str, index: usize, value: f64) -> Result<f64, ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::ParseError(format!(
            "{}[{}] must be finite (got {})", what, index, value
        )));
    }
    Ok(value)
}

impl OffsetEntry {
    fn to_offset(&self, index: usize) -> Result<Offset, ParameterError> {
        match (self.identity, self.translation, self.rotation) {
            (true, None, None) => Ok(Offset::Identity),
            (true, _, _) => Err(ParameterError::ParseError(format!(
                "offsets[{}]: identity offset cannot have translation or rotation", index
            ))),
            (false, None, None) => Err(ParameterError::ParseError(format!(
                "offsets[{}]: expected 'identity: true' or translation/rotation", index
            ))),
            (false, translation, rotation) => {
                let translation = translation.unwrap_or_default();
                let rotation = rotation.unwrap_or_default();
                for value in translation.iter().chain(rotation.iter()) {
                    check_finite("offsets", index, *value)?;
                }
                Ok(Offset::rigid(translation, rotation))
            }
        }
    }
}

impl Parameters {
    /// Read the chain description from YAML file. YAML file like this is supported:
    /// ```yaml
    /// dh_parameters:
    ///   - theta: ~          # variable joint
    ///     alpha: 0
    ///     d: 0.5
    ///     a: 0
    ///   - theta: deg(30)    # fixed joint
    ///     alpha: deg(90)
    ///     d: 0
    ///     a: 1.0
    /// offsets:
    ///   - identity: true
    ///   - translation: [0.2, 0.0, 0.1]
    ///     rotation: [0, 0, deg(45)]
    /// ```
    /// Offsets are optional; if absent, all joints get the identity offset. If present, there
    /// must be one per DH row.
    ///
    /// YAML extension to parse the deg(angle) function is supported (serde_saphyr).
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Same as [Parameters::from_yaml_file] for the YAML text already in memory.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let root: ChainRoot = parse(contents)?;
        if root.dh_parameters.is_empty() {
            return Err(ParameterError::ParseError("dh_parameters must not be empty".to_string()));
        }

        let mut dh = Vec::with_capacity(root.dh_parameters.len());
        for (i, row) in root.dh_parameters.iter().enumerate() {
            let theta = match row.theta {
                Some(theta) => DhTheta::Fixed(check_finite("dh_parameters", i, theta)?),
                None => DhTheta::Variable,
            };
            dh.push(DhRow {
                theta,
                alpha: check_finite("dh_parameters", i, row.alpha)?,
                d: check_finite("dh_parameters", i, row.d)?,
                a: check_finite("dh_parameters", i, row.a)?,
            });
        }

        let offsets = match root.offsets {
            None => vec![Offset::Identity; dh.len()],
            Some(entries) => {
                if entries.len() != dh.len() {
                    return Err(ParameterError::InvalidLength { expected: dh.len(), found: entries.len() });
                }
                entries.iter().enumerate()
                    .map(|(i, entry)| entry.to_offset(i))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Parameters { dh, offsets })
    }
}

impl DlsParameters {
    /// Read solver settings from the optional `solver` section of YAML file:
    /// ```yaml
    /// solver:
    ///   max_iterations: 500
    ///   tolerance: 0.0005
    ///   damping: 0.05
    /// ```
    /// Missing keys (or the whole section) keep the defaults. The section may live in the
    /// same file as the chain.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let root: SolverRoot = parse(contents)?;
        let entry = root.solver.unwrap_or_default();
        let defaults = DlsParameters::default();
        let parameters = DlsParameters {
            max_iterations: entry.max_iterations.unwrap_or(defaults.max_iterations),
            tolerance: entry.tolerance.unwrap_or(defaults.tolerance),
            damping: entry.damping.unwrap_or(defaults.damping),
            step_size: entry.step_size.unwrap_or(defaults.step_size),
            epsilon: entry.epsilon.unwrap_or(defaults.epsilon),
        };
        parameters.validate()
            .map_err(|e| ParameterError::ParseError(format!("solver: {}", e)))?;
        Ok(parameters)
    }
}
