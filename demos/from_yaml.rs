use nalgebra::Vector3;
use rs_dh_kinematics::chain::KinematicChain;
use rs_dh_kinematics::ik_solver::DlsParameters;
use rs_dh_kinematics::joint_command::JointCommand;
use rs_dh_kinematics::kinematics_impl::DHKinematics;
use rs_dh_kinematics::parameters::dh_kinematics::Parameters;

/// Loading the chain from YAML and sending the solution to the device.
fn main() {
    let file = "src/tests/data/offset_3dof.yaml";
    let parameters = Parameters::from_yaml_file(file).expect("Failed to load parameters from file");
    let solver = DlsParameters::from_yaml_file(file).expect("Failed to load solver settings");
    println!("Reading:\n{}", parameters.to_yaml());

    let mut chain = KinematicChain::new(DHKinematics::new(parameters).expect("Valid chain"));
    let target = Vector3::new(0.6, 0.6, 0.6);
    let solution = chain.solve(&target, &solver).expect("Valid input");
    println!("Converged: {}, final error {:.6} m", solution.converged, solution.diagnostics.final_error);
    chain.apply(&solution).expect("Same number of joints");

    let line = JointCommand::degrees_from_radians(chain.joints()).encode();
    print!("To device: {}", line);

    // Pretend the device reports slightly different angles back.
    let feedback: JointCommand = "D,10.00,35.50,-20.25\n".parse().expect("Valid feedback");
    chain.set_joints(&feedback.to_radians()).expect("Three joints");
    println!("End effector after feedback: {:?}", chain.end_effector().translation.vector);
}
