use std::error::Error;

use clap::Args;
use serde_json::json;
use stim_design::io::task_to_json;
use tracing::info;

use super::InputArgs;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    /// Store the seeds used by this run back into the `--seeds` registry.
    #[arg(long, requires = "seeds")]
    pub write_seeds: bool,
    /// Print the trial table instead of the full design.
    #[arg(long)]
    pub table: bool,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut inputs = args.inputs.load()?;
    let task = args.inputs.generate(&inputs)?;

    if args.write_seeds {
        if let Some(path) = &args.inputs.seeds {
            inputs.registry.record_all(task.seeds_used.clone());
            inputs
                .registry
                .save(path)
                .map_err(|err| Box::new(err) as Box<dyn Error>)?;
            info!(path = %path.display(), seeds = inputs.registry.len(), "seed registry updated");
        }
    }

    let output = if args.table {
        serde_json::to_string_pretty(&json!({
            "section": task.id,
            "columns": task.trial_columns(),
            "rows": task.trial_rows(),
        }))?
    } else {
        task_to_json(&task).map_err(|err| Box::new(err) as Box<dyn Error>)?
    };
    println!("{output}");
    Ok(())
}
