use std::path::{Path, PathBuf};

use bb_behaviour::{BehaviourDescription, IntegrationScheme, source};
use bb_bricks::{BrickError, JacobianMode, compile_source, create_stress_potential};
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::info;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(about = "Stress potential bricks - option schemas and generated behaviour code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the option schema of a stress potential
    Options {
        /// Stress potential name (e.g., Hooke, IsotropicDamageHooke)
        brick: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
        /// Omit the elastic properties, as when the behaviour declares them
        #[arg(long)]
        already_configured: bool,
    },
    /// Compile a behaviour source and print its code blocks and stress derivatives
    Generate {
        /// Path to the behaviour YAML or JSON file
        behaviour_path: PathBuf,
    },
    /// Print the Jacobian contribution of the stress to an implicit equation
    Jacobian {
        /// Path to the behaviour YAML or JSON file
        behaviour_path: PathBuf,
        /// Residual name (e.g., feel)
        equation: String,
        /// Integration variable (e.g., eel, d)
        variable: String,
        /// Expression of the derivative of the residual with respect to the stress
        placeholder: String,
        /// Use central differences with this step instead of the analytical derivative
        #[arg(long)]
        numerical: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Brick(#[from] BrickError),
    #[error(transparent)]
    Behaviour(#[from] bb_behaviour::BehaviourError),
    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Options {
            brick,
            format,
            already_configured,
        } => cmd_options(&brick, format, already_configured),
        Commands::Generate { behaviour_path } => cmd_generate(&behaviour_path),
        Commands::Jacobian {
            behaviour_path,
            equation,
            variable,
            placeholder,
            numerical,
        } => cmd_jacobian(&behaviour_path, &equation, &variable, &placeholder, numerical),
    }
}

fn cmd_options(brick: &str, format: Format, already_configured: bool) -> CliResult<()> {
    let potential = create_stress_potential(brick)?;
    let bd = BehaviourDescription::new(brick, IntegrationScheme::Implicit);
    let schema = potential.options(&bd, already_configured);
    let out = match format {
        Format::Yaml => serde_yaml::to_string(&schema)?,
        Format::Json => serde_json::to_string_pretty(&schema)?,
    };
    println!("{out}");
    Ok(())
}

fn cmd_generate(behaviour_path: &Path) -> CliResult<()> {
    info!(path = %behaviour_path.display(), "loading behaviour");
    let source = source::load(behaviour_path)?;
    let compiled = compile_source(&source)?;

    println!("// behaviour {} ({})", source.name, compiled.stress_potential.brick);
    print!("{}", compiled.description.render_code());

    if !compiled.stress_potential.local_data.is_empty() {
        println!();
        println!("// local data");
        for v in compiled.stress_potential.local_data.iter() {
            println!("{} {};", v.type_, v.name);
        }
    }

    println!();
    println!("// stress derivatives");
    for entry in &compiled.stress_potential.derivatives {
        println!("{entry}");
    }
    Ok(())
}

fn cmd_jacobian(
    behaviour_path: &Path,
    equation: &str,
    variable: &str,
    placeholder: &str,
    numerical: Option<f64>,
) -> CliResult<()> {
    let source = source::load(behaviour_path)?;
    let mut compiled = compile_source(&source)?;
    let mode = match numerical {
        Some(epsilon) => JacobianMode::Numerical { epsilon },
        None => JacobianMode::Analytical,
    };
    let code = compiled.brick.generate_implicit_equation_derivatives(
        &compiled.description,
        equation,
        variable,
        placeholder,
        mode,
    )?;
    if code.is_empty() {
        println!("// the stress does not depend on '{variable}'");
        return Ok(());
    }
    compiled.description.add_jacobian_contribution(
        compiled.brick.name(),
        equation,
        variable,
        code,
    )?;
    println!("{}", compiled.description.jacobian_contribution(equation, variable));
    Ok(())
}
