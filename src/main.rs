use clap::{Parser, Subcommand};
use fuelmap::cli;
use fuelmap::error::FuelmapResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fuelmap")]
#[command(about = "Fill the fleet import template from a fuel-card transaction export.")]
#[command(long_about = "Fuelmap - fuel-card export → import template converter

Reads the vendor transaction export (header on row 3), drops internal
vehicles, translates product names, normalizes card numbers and timestamps,
and writes the rows into a copy of the import template, keeping its formats.

COMMANDS:
  transform - Fill the template with the export's transactions
  check     - Verify both files can be processed, write nothing
  template  - Generate a blank import template
  profile   - Print the effective deployment profile (YAML)

EXAMPLES:
  fuelmap transform ImportadorGenerico.xlsx transacciones-cepsa.xlsx
  fuelmap transform plantilla.xlsx datos.xlsx -o relleno.xlsx -p perfil.yaml
  fuelmap check plantilla.xlsx datos.xlsx
  fuelmap profile > perfil.yaml")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Fill the import template with the export's transactions.

Stale rows in the template are cleared first (formats are kept), then every
transaction whose vehicle is not excluded is written from row 2 down, in the
export's order, without gaps.

Rows with an unreadable timestamp or bad cell are still written; the
affected field is left empty and reported as a warning.

OUTPUT:
  Without -o the file is named <output_prefix>_<YYYYMMDD>.xlsx in the
  current directory.")]
    /// Fill the template with the export's transactions
    Transform {
        /// Destination template (.xlsx)
        template: PathBuf,

        /// Vendor transaction export (.xlsx, .xls, .ods)
        data: PathBuf,

        /// Output file path (.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Deployment profile (YAML); the built-in profile is used when omitted
        #[arg(short, long, env = "FUELMAP_PROFILE")]
        profile: Option<PathBuf>,

        /// List every row warning
        #[arg(short, long)]
        verbose: bool,
    },

    /// Verify both files can be processed without writing anything
    Check {
        /// Destination template (.xlsx)
        template: PathBuf,

        /// Vendor transaction export (.xlsx, .xls, .ods)
        data: PathBuf,

        /// Deployment profile (YAML)
        #[arg(short, long, env = "FUELMAP_PROFILE")]
        profile: Option<PathBuf>,
    },

    /// Generate a blank import template from the profile's column layout
    Template {
        /// Output file path (.xlsx)
        output: PathBuf,

        /// Deployment profile (YAML)
        #[arg(short, long, env = "FUELMAP_PROFILE")]
        profile: Option<PathBuf>,
    },

    /// Print the effective deployment profile as YAML
    Profile {
        /// Deployment profile (YAML)
        #[arg(short, long, env = "FUELMAP_PROFILE")]
        profile: Option<PathBuf>,
    },
}

fn main() -> FuelmapResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            template,
            data,
            output,
            profile,
            verbose,
        } => cli::transform(template, data, output, profile, verbose),

        Commands::Check {
            template,
            data,
            profile,
        } => cli::check(template, data, profile),

        Commands::Template { output, profile } => cli::template(output, profile),

        Commands::Profile { profile } => cli::profile(profile),
    }
}
