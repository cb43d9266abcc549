use clap::Parser;
use election_cli::Cli;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    let answer = cli.run().await?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}
