use crate::{
    error::CollectError,
    extract::{
        fields,
        CounterBundle,
        PageKind,
    },
};
use chrono::{
    DateTime,
    TimeZone,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;

/// `2024-03-06 10:15:30.123456789 +0100`, fraction only when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

pub const COLUMN_COUNT: usize = 17;

/// One row of the stats log.
///
/// The log has no header, so field declaration order *is* the column order and must never change. Topic
/// published/closed counts and the user HelpHub counts are placed exactly where existing logs have them,
/// with `users_blocked` last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub captured_at: String,
    pub tags: String,
    pub replies_all: String,
    pub replies_published: String,
    pub replies_archived: String,
    pub topics_all: String,
    pub topics_published: String,
    pub topics_closed: String,
    pub topics_archived: String,
    pub users_all: String,
    pub users_administrator: String,
    pub users_editor: String,
    pub users_keymaster: String,
    pub users_moderator: String,
    pub users_helphub_editor: String,
    pub users_helphub_manager: String,
    pub users_blocked: String,
}

impl SnapshotRecord {
    pub fn build<Tz>(
        captured_at: &DateTime<Tz>,
        tags: &CounterBundle,
        replies: &CounterBundle,
        topics: &CounterBundle,
        users: &CounterBundle,
    ) -> Result<Self, CollectError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        expect_page(tags, PageKind::Tags)?;
        expect_page(replies, PageKind::Replies)?;
        expect_page(topics, PageKind::Topics)?;
        expect_page(users, PageKind::Users)?;

        let field = |bundle: &CounterBundle, name| bundle.get(name).map(str::to_string);

        Ok(Self {
            captured_at: captured_at.format(TIMESTAMP_FORMAT).to_string(),
            tags: field(tags, fields::TAGS)?,
            replies_all: field(replies, fields::ALL)?,
            replies_published: field(replies, fields::PUBLISHED)?,
            replies_archived: field(replies, fields::ARCHIVED)?,
            topics_all: field(topics, fields::ALL)?,
            topics_published: field(topics, fields::PUBLISHED)?,
            topics_closed: field(topics, fields::CLOSED)?,
            topics_archived: field(topics, fields::ARCHIVED)?,
            users_all: field(users, fields::ALL)?,
            users_administrator: field(users, fields::ADMINISTRATOR)?,
            users_editor: field(users, fields::EDITOR)?,
            users_keymaster: field(users, fields::KEYMASTER)?,
            users_moderator: field(users, fields::MODERATOR)?,
            users_helphub_editor: field(users, fields::HELPHUB_EDITOR)?,
            users_helphub_manager: field(users, fields::HELPHUB_MANAGER)?,
            users_blocked: field(users, fields::BLOCKED)?,
        })
    }

    /// The row as written to the log.
    pub fn columns(&self) -> [&str; COLUMN_COUNT] {
        [
            self.captured_at.as_str(),
            self.tags.as_str(),
            self.replies_all.as_str(),
            self.replies_published.as_str(),
            self.replies_archived.as_str(),
            self.topics_all.as_str(),
            self.topics_published.as_str(),
            self.topics_closed.as_str(),
            self.topics_archived.as_str(),
            self.users_all.as_str(),
            self.users_administrator.as_str(),
            self.users_editor.as_str(),
            self.users_keymaster.as_str(),
            self.users_moderator.as_str(),
            self.users_helphub_editor.as_str(),
            self.users_helphub_manager.as_str(),
            self.users_blocked.as_str(),
        ]
    }
}

fn expect_page(bundle: &CounterBundle, expected: PageKind) -> Result<(), CollectError> {
    if bundle.page() == expected {
        Ok(())
    } else {
        Err(CollectError::UnexpectedPage {
            expected,
            found: bundle.page(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{
        FixedOffset,
        Timelike as _,
        Utc,
    };
    use pretty_assertions::assert_eq;

    pub(crate) fn bundles() -> [CounterBundle; 4] {
        [
            CounterBundle::new(PageKind::Tags).with(fields::TAGS, "42"),
            CounterBundle::new(PageKind::Replies)
                .with(fields::ALL, "10")
                .with(fields::PUBLISHED, "8")
                .with(fields::ARCHIVED, "2"),
            CounterBundle::new(PageKind::Topics)
                .with(fields::ALL, "20")
                .with(fields::PUBLISHED, "15")
                .with(fields::CLOSED, "3")
                .with(fields::ARCHIVED, "2"),
            CounterBundle::new(PageKind::Users)
                .with(fields::ALL, "100")
                .with(fields::ADMINISTRATOR, "1")
                .with(fields::EDITOR, "2")
                .with(fields::KEYMASTER, "3")
                .with(fields::MODERATOR, "4")
                .with(fields::BLOCKED, "5")
                .with(fields::HELPHUB_EDITOR, "6")
                .with(fields::HELPHUB_MANAGER, "7"),
        ]
    }

    #[test]
    fn columns_follow_the_log_order() {
        let [tags, replies, topics, users] = bundles();
        let at = Utc.with_ymd_and_hms(2024, 3, 6, 10, 15, 30).unwrap();
        let record = SnapshotRecord::build(&at, &tags, &replies, &topics, &users).unwrap();

        assert_eq!(
            record.columns(),
            [
                "2024-03-06 10:15:30 +0000",
                "42",
                "10",
                "8",
                "2",
                "20",
                "15",
                "3",
                "2",
                "100",
                "1",
                "2",
                "3",
                "4",
                "6",
                "7",
                "5",
            ]
        );
    }

    #[test]
    fn extra_counters_do_not_change_the_shape() {
        let [tags, replies, topics, users] = bundles();
        let users = users.with("spectator", "99");
        let at = Utc.with_ymd_and_hms(2024, 3, 6, 10, 15, 30).unwrap();
        let record = SnapshotRecord::build(&at, &tags, &replies, &topics, &users).unwrap();
        assert_eq!(record.columns().len(), COLUMN_COUNT);
        assert_eq!(record.users_blocked, "5");
    }

    #[test]
    fn missing_counter_fails_the_build() {
        let [tags, replies, _, users] = bundles();
        let topics = CounterBundle::new(PageKind::Topics).with(fields::ALL, "20");
        let at = Utc.with_ymd_and_hms(2024, 3, 6, 10, 15, 30).unwrap();
        let err = SnapshotRecord::build(&at, &tags, &replies, &topics, &users).unwrap_err();
        assert!(matches!(
            err,
            CollectError::MissingField {
                page: PageKind::Topics,
                field: fields::PUBLISHED,
            }
        ));
    }

    #[test]
    fn swapped_bundles_are_rejected() {
        let [tags, replies, topics, users] = bundles();
        let at = Utc.with_ymd_and_hms(2024, 3, 6, 10, 15, 30).unwrap();
        let err = SnapshotRecord::build(&at, &tags, &topics, &replies, &users).unwrap_err();
        assert!(matches!(
            err,
            CollectError::UnexpectedPage {
                expected: PageKind::Replies,
                found: PageKind::Topics,
            }
        ));
    }

    #[test]
    fn timestamp_keeps_offset_and_fraction() {
        let [tags, replies, topics, users] = bundles();
        let tz = FixedOffset::east_opt(3600).unwrap();
        let at = tz
            .with_ymd_and_hms(2024, 3, 6, 10, 15, 30)
            .unwrap()
            .with_nanosecond(250_000_000)
            .unwrap();
        let record = SnapshotRecord::build(&at, &tags, &replies, &topics, &users).unwrap();
        assert_eq!(record.captured_at, "2024-03-06 10:15:30.250 +0100");
    }
}
