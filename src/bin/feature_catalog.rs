use anyhow::Result;

use gridiron_forecast::catalog::catalog;
use gridiron_forecast::config;
use gridiron_forecast::experiment::{ExperimentPlan, ModelKind};

fn main() -> Result<()> {
    config::init_tracing();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    if let Some(path) = config::arg_value(&args, "--plan") {
        let raw = std::fs::read_to_string(&path)?;
        let plan = ExperimentPlan::from_json(&raw)?;
        println!("Plan OK: {} experiments", plan.experiments().len());
        for (idx, exp) in plan.experiments().iter().enumerate() {
            println!(
                "  {:>2}. {} -> {} ({} features)",
                idx + 1,
                exp.model,
                exp.target().column(),
                exp.features.len()
            );
        }
        return Ok(());
    }

    if args.is_empty() {
        for name in catalog().names() {
            println!("{name}");
        }
        println!("# {} features", catalog().len());
        println!(
            "# models: {}",
            ModelKind::ALL.map(|m| m.name()).join(", ")
        );
        return Ok(());
    }

    let keys = catalog().validate(&args)?;
    println!("All {} feature names are valid", keys.len());
    Ok(())
}
