use clap::Parser;
use color_eyre::Result;
use wporg_support_stats::{
    init_errors,
    init_logging,
    App,
    Args,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_errors()?;
    init_logging(&args)?;
    App::new(args)?.run().await
}
