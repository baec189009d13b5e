use clap::Parser;
use forthic_grpc::cli::{Cli, Command, load_stack, render_outcome};
use forthic_grpc::{ClientConfig, RuntimeClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Exec { addr, word, stack } => {
            let stack = load_stack(&stack)?;
            let client = RuntimeClient::connect_lazy(&ClientConfig::new(addr))?;
            client.execute_word(&word, &stack).await?
        }
        Command::Sequence { addr, words, stack } => {
            let stack = load_stack(&stack)?;
            let client = RuntimeClient::connect_lazy(&ClientConfig::new(addr))?;
            client.execute_sequence(&words, &stack).await?
        }
    };
    let lines = render_outcome(&outcome);
    if outcome.error().is_some() {
        for line in lines {
            eprintln!("{line}");
        }
        std::process::exit(1);
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}
