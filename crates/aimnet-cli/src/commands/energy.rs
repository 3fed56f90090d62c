use super::load_inputs;
use crate::cli::EnergyArgs;
use crate::data::ModelStore;
use crate::error::Result;
use aimnet2rs::workflows::single_point;
use tracing::info;

pub async fn run(args: EnergyArgs, store: &ModelStore) -> Result<()> {
    let calc = &args.calculation;
    let (structure, registry) = load_inputs(calc, store)?;

    info!("Evaluating energy with model '{}'...", &calc.model);
    let energy = tokio::task::block_in_place(|| {
        single_point::get_energy(&registry, &structure, calc.charge, &calc.model)
    })?;

    println!("Energy: {:.8} eV", energy);
    Ok(())
}
