use super::load_inputs;
use crate::cli::ForcesArgs;
use crate::data::ModelStore;
use crate::error::Result;
use aimnet2rs::core::models::element::Element;
use aimnet2rs::workflows::single_point;
use nalgebra::Vector3;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub async fn run(args: ForcesArgs, store: &ModelStore) -> Result<()> {
    let calc = &args.calculation;
    let (structure, registry) = load_inputs(calc, store)?;

    info!("Evaluating forces with model '{}'...", &calc.model);
    let single_point::SinglePoint {
        configuration,
        prediction,
    } = tokio::task::block_in_place(|| {
        single_point::run_single_point(&registry, &structure, calc.charge, &calc.model)
    })?;
    let elements: Vec<Element> = configuration.elements().collect();

    println!("Energy: {:.8} eV", prediction.energy);
    println!("Max force: {:.6} eV/Å", prediction.max_force());
    write_table(&mut std::io::stdout().lock(), &elements, &prediction.forces)?;

    if let Some(csv_path) = &args.csv {
        write_csv(csv_path, &elements, &prediction.forces)?;
        println!("Forces written to: {}", csv_path.display());
    }
    Ok(())
}

fn write_table(
    out: &mut impl Write,
    elements: &[Element],
    forces: &[Vector3<f64>],
) -> Result<()> {
    writeln!(
        out,
        "{:>6} {:>4} {:>14} {:>14} {:>14}",
        "index", "elem", "fx", "fy", "fz"
    )?;
    for (i, (element, force)) in elements.iter().zip(forces).enumerate() {
        writeln!(
            out,
            "{:>6} {:>4} {:>14.8} {:>14.8} {:>14.8}",
            i, element.symbol(), force.x, force.y, force.z
        )?;
    }
    Ok(())
}

fn write_csv(path: &Path, elements: &[Element], forces: &[Vector3<f64>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["index", "element", "fx", "fy", "fz"])?;
    for (i, (element, force)) in elements.iter().zip(forces).enumerate() {
        writer.write_record([
            i.to_string(),
            element.symbol().to_string(),
            format!("{:.10}", force.x),
            format!("{:.10}", force.y),
            format!("{:.10}", force.z),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
