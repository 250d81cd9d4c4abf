use anyhow::anyhow;
use ixa_city::runner::{build_city, run_with_custom_args, CityArgs};
use ixa_city::ContextCityExt;

fn main() -> anyhow::Result<()> {
    let context = run_with_custom_args(|context, _args, city: Option<CityArgs>| {
        let city = city.ok_or("missing city arguments")?;
        build_city(context, &city)
    })
    .map_err(|error| anyhow!("{error}"))?;

    let counts = context.get_counts();
    println!(
        "S={} I={} R={}",
        counts.susceptible, counts.infected, counts.recovered
    );
    Ok(())
}
