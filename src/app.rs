use color_eyre::Result;
use eyre::Context as _;
use support_stats_config::{
    Args,
    Config,
};
use support_stats_gatherer::{
    Scheduler,
    StatsJob,
};
use tokio_util::sync::CancellationToken;

pub struct App {
    args: Args,
    config: Config,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args.clone())
            .wrap_err_with(|| format!("Failed to load configuration from {:?}", args.config))?;
        config.validate()?;

        info!(
            site = %config.site,
            username = %config.username,
            schedule = %config.cadence(),
            output = ?config.output,
            "configuration loaded"
        );

        Ok(Self { args, config })
    }

    pub async fn run(self) -> Result<()> {
        let job = StatsJob::from_config(&self.config)?;

        if self.args.once {
            job.run_cycle().await?;
            return Ok(());
        }

        let cancellation_token = CancellationToken::new();
        tokio::spawn({
            let cancellation_token = cancellation_token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("received Ctrl-C, stopping after the current collection");
                    cancellation_token.cancel();
                }
            }
        });

        Scheduler::new(self.config.cadence(), cancellation_token)
            .run(|| job.run_cycle())
            .await;

        Ok(())
    }
}
