use anyhow::Result;
use rezone::Summary;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SummarizeArgs) -> Result<()> {
    let summary = Summary::from_result_table(&args.result, args.scale)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
