use crate::extract::PageKind;
use url::Url;

/// The four admin pages scraped each cycle, derived from the site URL once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub tags: Url,
    pub replies: Url,
    pub topics: Url,
    pub users: Url,
}

impl Endpoints {
    pub fn from_site(site: &Url) -> Result<Self, url::ParseError> {
        let base = site.as_str().trim_end_matches('/');
        let page = |path: &str| Url::parse(&format!("{base}{path}"));

        Ok(Self {
            tags: page("/wp-admin/edit-tags.php?taxonomy=topic-tag&post_type=topic")?,
            replies: page("/wp-admin/edit.php?post_type=reply")?,
            topics: page("/wp-admin/edit.php?post_type=topic")?,
            users: page("/wp-admin/users.php?role=bbp_moderator")?,
        })
    }

    pub fn url(&self, page: PageKind) -> &Url {
        match page {
            PageKind::Tags => &self.tags,
            PageKind::Replies => &self.replies,
            PageKind::Topics => &self.topics,
            PageKind::Users => &self.users,
        }
    }
}
