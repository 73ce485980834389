//! Inspect command - assemble one authoring export and print it

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fxbridge_core::{BridgeConfig, Curve, Gradient, ParticleInitState, PropertyTree, StateAssembler};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Authoring export (JSON property tree)
    pub input: PathBuf,

    /// Print the full assembled record as JSON
    #[arg(long)]
    pub json: bool,

    /// Override the configured authoring-to-native size scale
    #[arg(long)]
    pub size_scale: Option<f32>,
}

/// Execute the inspect command
pub fn execute(config: &BridgeConfig, args: InspectArgs) -> Result<()> {
    let tree = PropertyTree::load(&args.input)?;
    let assembler = match args.size_scale {
        Some(scale) => StateAssembler::new(scale),
        None => StateAssembler::from_config(&config.extraction),
    };
    let state = assembler
        .assemble(&tree)
        .with_context(|| format!("Failed to assemble {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_summary(&args.input, &state);
    }
    Ok(())
}

fn print_summary(input: &std::path::Path, state: &ParticleInitState) {
    println!("{}", input.display());
    println!("  checksum:       {:016x}", state.checksum());
    println!("  looping:        {}", state.looping);
    println!("  prewarm:        {}", state.prewarm);
    println!("  random seed:    {}", state.random_seed);
    println!("  max particles:  {}", state.max_num_particles);
    println!("  emission rate:  {}", state.emission_rate);
    println!("  duration:       {}s", state.length_in_sec);
    println!("  local space:    {}", state.use_local_space);
    println!();
    println!("  start lifetime  {}", describe_curve(&state.init_module_lifetime));
    println!("  start speed     {}", describe_curve(&state.init_module_speed));
    println!("  start size      {}", describe_curve(&state.init_module_size));
    println!("  start rotation  {}", describe_curve(&state.init_module_rotation));
    println!();
    println!(
        "  rotation  [{}] {}",
        flag(state.rotation_module_enable),
        describe_curve(&state.rotation_module_curve)
    );
    println!(
        "  size      [{}] {}",
        flag(state.size_module_enable),
        describe_curve(&state.size_module_curve)
    );
    let shape = &state.shape_module_data;
    println!(
        "  shape     [{}] {} radius {} angle {}",
        flag(state.shape_module_enable),
        shape
            .shape()
            .map_or_else(|| format!("unknown({})", shape.shape_type), |s| format!("{s:?}")),
        shape.radius,
        shape.angle
    );
    println!(
        "  color     [{}] {}",
        flag(state.color_module_enable),
        describe_gradient(&state.color_module_gradient)
    );
}

fn flag(enabled: bool) -> char {
    if enabled { 'x' } else { ' ' }
}

fn describe_curve(curve: &Curve) -> String {
    let mode = curve
        .state()
        .map_or_else(|| format!("unknown({})", curve.min_max_state), |s| format!("{s:?}"));
    format!(
        "{mode} scalar {} keys {}/{}",
        curve.scalar,
        curve.max_curve.key_frame_count(),
        curve.min_curve.key_frame_count()
    )
}

fn describe_gradient(gradient: &Gradient) -> String {
    let mode = gradient
        .state()
        .map_or_else(|| format!("unknown({})", gradient.min_max_state), |s| format!("{s:?}"));
    let max = &gradient.max_gradient;
    let min = &gradient.min_gradient;
    format!(
        "{mode} color keys {}/{} alpha keys {}/{}",
        max.color_key_count(),
        min.color_key_count(),
        max.alpha_key_count(),
        min.alpha_key_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_constant_curve() {
        assert_eq!(
            describe_curve(&Curve::constant(2.0)),
            "Scalar scalar 2 keys 0/0"
        );
    }

    #[test]
    fn test_describe_unknown_mode() {
        let curve = Curve {
            min_max_state: 9,
            ..Curve::constant(1.0)
        };
        assert!(describe_curve(&curve).starts_with("unknown(9)"));
    }

    #[test]
    fn test_describe_default_gradient() {
        assert_eq!(
            describe_gradient(&Gradient::default()),
            "Color color keys 0/0 alpha keys 0/0"
        );
    }
}
