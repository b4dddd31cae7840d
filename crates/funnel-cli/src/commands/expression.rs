use crate::cli::ExpressionArgs;
use crate::error::{CliError, Result};
use funnelmd::core::forcefield::ForceField;
use funnelmd::core::forcefield::custom::CustomExternalForce;
use funnelmd::core::forcefield::funnel::FunnelPotential;
use funnelmd::core::models::particle::Particle;
use std::fmt::Write;

pub fn run(args: ExpressionArgs) -> Result<()> {
    print!("{}", report(&args)?);
    Ok(())
}

/// Text report of the force-field expression, its gradient and optionally
/// the energy and force at one point.
pub fn report(args: &ExpressionArgs) -> Result<String> {
    let potential = match args.restraint_stiffness {
        Some(k) if !(k > 0.0) || !k.is_finite() => {
            return Err(CliError::Argument(format!(
                "restraint stiffness must be positive, got {}",
                k
            )));
        }
        Some(k) => FunnelPotential::with_restraint_stiffness(k),
        None => FunnelPotential::new(),
    };
    let force = CustomExternalForce::new(&potential)?;

    let mut out = String::new();
    let axes = ["x", "y", "z"];
    writeln!(out, "force field: {}", potential.name()).map_err(anyhow::Error::from)?;
    writeln!(out, "E      = {}", potential.expression()).map_err(anyhow::Error::from)?;
    for (axis, derivative) in axes.iter().zip(force.gradient_expressions()) {
        writeln!(out, "dE/d{}  = {}", axis, derivative).map_err(anyhow::Error::from)?;
    }

    if let Some([x, y, z]) = args.at {
        let particle = Particle::new(0, 1.0, [x, y, z].into());
        let f = force.force(&particle);
        writeln!(out, "E({}, {}, {}) = {:.6} kJ/mol", x, y, z, force.energy(&particle))
            .map_err(anyhow::Error::from)?;
        writeln!(out, "F({}, {}, {}) = ({:.6}, {:.6}, {:.6}) kJ/mol/nm", x, y, z, f.x, f.y, f.z)
            .map_err(anyhow::Error::from)?;
    }
    Ok(out)
}
