use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Vector3;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::filter::Builder;

use rs_dh_kinematics::chain::KinematicChain;
use rs_dh_kinematics::ik_solver::{DlsParameters, Termination};
use rs_dh_kinematics::joint_command::JointCommand;
use rs_dh_kinematics::kinematic_traits::Kinematics;
use rs_dh_kinematics::kinematics_impl::DHKinematics;
use rs_dh_kinematics::parameters::dh_kinematics::Parameters;
use rs_dh_kinematics::reachability::check_reachability;
use rs_dh_kinematics::utils::{as_radians, dump_joints};

#[derive(Parser)]
#[command(version, propagate_version = true)]
#[command(about = "Forward and inverse kinematics of the DH chain described in YAML file", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the DH and actual frame of every joint.
    Forward {
        /// YAML chain file.
        file: PathBuf,

        /// Comma separated joint angles, radians unless --degrees.
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        joints: Vec<f64>,

        /// Joint angles are given in degrees.
        #[arg(short, long)]
        degrees: bool,
    },
    /// Solve for the end effector position.
    Solve {
        /// YAML chain file, may also have the solver section.
        file: PathBuf,

        /// Target position x,y,z in meters.
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        target: Vec<f64>,

        /// Initial joint angles in radians, zero if not given.
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        seed: Option<Vec<f64>>,

        /// Print the solution as device command line.
        #[arg(short, long)]
        command: Option<CommandUnit>,
    },
    /// Coarse check if the target is within reach.
    Reach {
        /// YAML chain file.
        file: PathBuf,

        /// Target position x,y,z in meters.
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        target: Vec<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CommandUnit {
    Radians,
    Degrees,
}

fn load_robot(file: &Path) -> anyhow::Result<DHKinematics> {
    let parameters = Parameters::from_yaml_file(file)
        .with_context(|| format!("Failed to read chain from {}", file.display()))?;
    info!("Loaded {} joints from {}", parameters.dh.len(), file.display());
    Ok(DHKinematics::new(parameters)?)
}

fn position(values: &[f64]) -> anyhow::Result<Vector3<f64>> {
    match values {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => bail!("Target must be x,y,z, got {} values", values.len()),
    }
}

fn forward(file: &Path, joints: &[f64], degrees: bool) -> anyhow::Result<()> {
    let robot = load_robot(file)?;
    let joints: Vec<f64> = if degrees {
        as_radians(joints)
    } else {
        joints.to_vec()
    };
    let poses = robot.forward_with_joint_poses(&joints)?;
    for (i, (dh, actual)) in poses.dh.iter().zip(&poses.actual).enumerate() {
        let (roll, pitch, yaw) = actual.rotation.euler_angles();
        println!(
            "Joint {}: dh [{:.4}, {:.4}, {:.4}] actual [{:.4}, {:.4}, {:.4}] rpy (deg) [{:.2}, {:.2}, {:.2}]",
            i,
            dh.translation.x, dh.translation.y, dh.translation.z,
            actual.translation.x, actual.translation.y, actual.translation.z,
            roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees()
        );
    }
    Ok(())
}

fn solve(file: &Path, target: &[f64], seed: Option<&[f64]>, command: Option<CommandUnit>) -> anyhow::Result<()> {
    let robot = load_robot(file)?;
    let parameters = DlsParameters::from_yaml_file(file)
        .with_context(|| format!("Failed to read solver settings from {}", file.display()))?;
    let target = position(target)?;

    let mut chain = KinematicChain::new(robot);
    if let Some(seed) = seed {
        chain.set_joints(seed)?;
    }

    let reachability = chain.check_reachability(&target);
    if !reachability.likely_reachable {
        println!(
            "Warning: target is {:.3} m from the base, maximal reach is {:.3} m",
            reachability.distance_from_base, reachability.max_reach
        );
    }

    let solution = chain.solve(&target, &parameters)?;
    let diagnostics = &solution.diagnostics;
    match diagnostics.termination {
        Termination::Converged =>
            println!("Converged in {} iterations", diagnostics.iterations),
        Termination::Exhausted =>
            println!("Not converged after {} iterations", diagnostics.iterations),
        Termination::Aborted(reason) =>
            println!("Aborted: {:?}", reason),
    }
    println!("Final error: {:.6} m", diagnostics.final_error);
    print!("Joints (deg): ");
    dump_joints(&solution.joints);

    chain.apply(&solution)?;
    let reached = chain.end_effector().translation.vector;
    println!("End effector: [{:.4}, {:.4}, {:.4}]", reached.x, reached.y, reached.z);

    match command {
        Some(CommandUnit::Radians) => print!("{}", JointCommand::radians(chain.joints()).encode()),
        Some(CommandUnit::Degrees) => print!("{}", JointCommand::degrees_from_radians(chain.joints()).encode()),
        None => {}
    }
    Ok(())
}

fn reach(file: &Path, target: &[f64]) -> anyhow::Result<()> {
    let robot = load_robot(file)?;
    let result = check_reachability(&robot, &position(target)?);
    println!(
        "Likely reachable: {} (distance {:.3} m, maximal reach {:.3} m)",
        result.likely_reachable, result.distance_from_base, result.max_reach
    );
    Ok(())
}

/// INFO unless RUST_LOG says otherwise.
fn log_filter() -> Builder {
    EnvFilter::builder().with_default_directive(LevelFilter::INFO.into())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter().from_env_lossy())
        .init();

    let args = Args::parse();
    match &args.command {
        Command::Forward { file, joints, degrees } => forward(file, joints, *degrees),
        Command::Solve { file, target, seed, command } =>
            solve(file, target, seed.as_deref(), *command),
        Command::Reach { file, target } => reach(file, target),
    }
}
