use std::path::Path;
use std::str::FromStr;

use clap::{Args, Command, FromArgMatches as _};

use crate::city::ContextCityExt;
use crate::context::Context;
use crate::error::CityError;
use crate::global_properties::ContextGlobalPropertiesExt;
use crate::log::{info, set_log_level, LevelFilter};
use crate::parameters::{CityParameters, Parameters};
use crate::random::ContextRandomExt;

/// Default cli arguments for the city runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a city parameters JSON file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Enable logging at the given level: off, error, warn, info, debug or trace
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// The size of the city to build and how long to run it.
#[derive(Args, Debug, Clone)]
pub struct CityArgs {
    /// Number of single-resident homes
    #[arg(long, default_value = "1000")]
    pub homes: usize,

    #[arg(long, default_value = "10")]
    pub restaurants: usize,

    #[arg(long, default_value = "20")]
    pub offices: usize,

    #[arg(long, default_value = "2")]
    pub schools: usize,

    #[arg(long, default_value = "10")]
    pub stores: usize,

    #[arg(long, default_value = "1")]
    pub hospitals: usize,

    /// Beds per hospital
    #[arg(long, default_value = "20")]
    pub hospital_beds: usize,

    /// Worker positions per hospital
    #[arg(long, default_value = "10")]
    pub hospital_workers: usize,

    /// Number of people infected at the start
    #[arg(long, default_value = "5")]
    pub initial_infected: usize,

    /// Number of hours to simulate
    #[arg(long, default_value = "336")]
    pub hours: u32,
}

#[derive(Args)]
pub struct PlaceholderCustom {}

fn create_city_cli() -> Command {
    let cli = Command::new("city-sim");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation with custom cli arguments.
///
/// This function allows you to define custom arguments and a setup function
///
/// # Parameters
/// - `setup_fn`: A function that takes a mutable reference to a `Context`, a `BaseArgs` struct,
///   a Option<A> where A is the custom cli arguments struct
///
/// # Errors
/// Returns an error if argument parsing or the setup function fails
pub fn run_with_custom_args<A, F>(setup_fn: F) -> Result<Context, Box<dyn std::error::Error>>
where
    A: Args,
    F: Fn(&mut Context, BaseArgs, Option<A>) -> Result<(), CityError>,
{
    let mut cli = create_city_cli();
    cli = A::augment_args(cli);
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    let custom_matches = A::from_arg_matches(&matches)?;
    run_with_args_internal(base_args_matches, Some(custom_matches), setup_fn)
}

/// Runs a simulation with default cli arguments
///
/// # Errors
/// Returns an error if argument parsing or the setup function fails
pub fn run_with_args<F>(setup_fn: F) -> Result<Context, Box<dyn std::error::Error>>
where
    F: Fn(&mut Context, BaseArgs, Option<PlaceholderCustom>) -> Result<(), CityError>,
{
    let cli = create_city_cli();
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(base_args_matches, None, setup_fn)
}

fn run_with_args_internal<A, F>(
    args: BaseArgs,
    custom_args: Option<A>,
    setup_fn: F,
) -> Result<Context, Box<dyn std::error::Error>>
where
    F: Fn(&mut Context, BaseArgs, Option<A>) -> Result<(), CityError>,
{
    if let Some(level) = &args.log_level {
        let level = LevelFilter::from_str(level)
            .map_err(|_| CityError::InvalidParameter(format!("unknown log level {level:?}")))?;
        set_log_level(level);
    }

    let mut context = Context::new();

    // Optionally load parameters from a file
    if !args.config.is_empty() {
        info!("loading city parameters from {}", args.config);
        let parameters: CityParameters =
            context.load_parameters_from_json(Path::new(&args.config))?;
        context.set_global_property_value(Parameters, parameters)?;
    }

    context.init_random(args.random_seed);

    setup_fn(&mut context, args, custom_args)?;

    context.execute();
    Ok(context)
}

/// Builds the city described by `args`, hires its workforce, seeds the initial infections and
/// schedules the run.
///
/// # Errors
/// Returns `CityError::InsufficientSusceptible` if more initial infections are requested than
/// there are people.
pub fn build_city(context: &mut Context, args: &CityArgs) -> Result<(), CityError> {
    context.add_homes(args.homes);
    context.construct_restaurants(args.restaurants);
    context.construct_offices(args.offices);
    context.construct_schools(args.schools);
    context.construct_stores(args.stores);
    context.construct_hospital(args.hospitals, args.hospital_beds, args.hospital_workers);
    context.assign_workplaces();
    context.seed_infected(args.initial_infected)?;
    context.schedule_hourly_updates(args.hours);
    Ok(())
}
