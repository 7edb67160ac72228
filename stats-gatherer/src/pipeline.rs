use crate::{
    endpoints::Endpoints,
    error::CollectError,
    extract::{
        fields,
        CounterBundle,
        Extractors,
        PageKind,
    },
    session::{
        PageFetcher,
        Session,
    },
    snapshot::SnapshotRecord,
    stats_log::StatsLog,
};
use chrono::{
    DateTime,
    Local,
};
use eyre::Context as _;
use support_stats_config::Config;

/// One collection cycle: log in, scrape the four admin pages, append one row.
#[derive(Debug)]
pub struct StatsJob {
    config: Config,
    endpoints: Endpoints,
    extractors: Extractors,
    log: StatsLog,
}

impl StatsJob {
    pub fn new(config: Config, endpoints: Endpoints, extractors: Extractors, log: StatsLog) -> Self {
        Self {
            config,
            endpoints,
            extractors,
            log,
        }
    }

    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let endpoints = Endpoints::from_site(&config.site)
            .wrap_err_with(|| format!("Failed to derive admin page URLs from {}", config.site))?;
        let log = StatsLog::new(config.output.clone());
        Ok(Self::new(config.clone(), endpoints, Extractors::default(), log))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn log(&self) -> &StatsLog {
        &self.log
    }

    /// Authenticates a fresh session and records one snapshot with it.
    #[instrument(level = "info", name = "collection", skip(self), fields(site = %self.config.site))]
    pub async fn run_cycle(&self) -> Result<SnapshotRecord, CollectError> {
        let session = Session::authenticate(&self.config).await?;
        self.collect_into_log(&session).await
    }

    /// Nothing is appended unless every page was fetched and every counter found.
    pub async fn collect_into_log(&self, fetcher: &impl PageFetcher) -> Result<SnapshotRecord, CollectError> {
        let record = self.collect(fetcher, Local::now).await?;
        self.log.append(&record)?;
        info!(path = ?self.log.path(), "Done processing");
        Ok(record)
    }

    /// The record is stamped by `clock` once the last page has been scraped.
    pub async fn collect(
        &self,
        fetcher: &impl PageFetcher,
        clock: impl FnOnce() -> DateTime<Local>,
    ) -> Result<SnapshotRecord, CollectError> {
        let tags = self.scrape(fetcher, PageKind::Tags).await?;
        info!(total = tags.get(fields::TAGS)?, "tags");

        let replies = self.scrape(fetcher, PageKind::Replies).await?;
        info!(total = replies.get(fields::ALL)?, "replies");

        let topics = self.scrape(fetcher, PageKind::Topics).await?;
        info!(total = topics.get(fields::ALL)?, "topics");

        let users = self.scrape(fetcher, PageKind::Users).await?;
        info!(total = users.get(fields::ALL)?, "users");

        SnapshotRecord::build(&clock(), &tags, &replies, &topics, &users)
    }

    async fn scrape(&self, fetcher: &impl PageFetcher, page: PageKind) -> Result<CounterBundle, CollectError> {
        let body = fetcher.fetch(self.endpoints.url(page)).await?;
        self.extractors.extract(page, &body)
    }
}
