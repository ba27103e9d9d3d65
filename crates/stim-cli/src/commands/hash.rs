use std::error::Error;

use clap::Args;
use stim_design::design_hash;

use super::InputArgs;

#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

pub fn run(args: &HashArgs) -> Result<(), Box<dyn Error>> {
    let inputs = args.inputs.load()?;
    let task = args.inputs.generate(&inputs)?;
    let hash = design_hash(&task).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    println!("{hash}");
    Ok(())
}
