use super::{
    fields,
    CounterBundle,
    ExtractionStrategy,
    PageKind,
};
use crate::error::CollectError;
use regex::Regex;

/// One counter: a label somewhere in the page, followed (after any markup) by its value.
struct Step {
    field: &'static str,
    pattern: Regex,
}

impl Step {
    /// WordPress list tables render filter links as `All <span class="count">(1,234)</span>`.
    fn labelled_count(field: &'static str, label: &str) -> Self {
        let pattern = format!(r#"(?s){}.+?"count">\((\d[\d,]*)\)<"#, regex::escape(label));
        Self {
            field,
            pattern: Regex::new(&pattern).expect("labelled count pattern is valid"),
        }
    }

    fn tag_total() -> Self {
        Self {
            field: fields::TAGS,
            pattern: Regex::new(r#"(?s)"displaying-num">(\d[\d,]*) items?<"#).expect("tag total pattern is valid"),
        }
    }
}

lazy_static::lazy_static! {
    static ref TAG_STEPS: Vec<Step> = vec![Step::tag_total()];
    static ref REPLY_STEPS: Vec<Step> = vec![
        Step::labelled_count(fields::ALL, "All"),
        Step::labelled_count(fields::PUBLISHED, "Published"),
        Step::labelled_count(fields::ARCHIVED, "Archived"),
    ];
    static ref TOPIC_STEPS: Vec<Step> = vec![
        Step::labelled_count(fields::ALL, "All"),
        Step::labelled_count(fields::PUBLISHED, "Published"),
        Step::labelled_count(fields::CLOSED, "Closed"),
        Step::labelled_count(fields::ARCHIVED, "Archived"),
    ];
    static ref USER_STEPS: Vec<Step> = vec![
        Step::labelled_count(fields::ALL, "All"),
        Step::labelled_count(fields::ADMINISTRATOR, "Administrator"),
        Step::labelled_count(fields::EDITOR, "Editor"),
        Step::labelled_count(fields::KEYMASTER, "Keymaster"),
        Step::labelled_count(fields::MODERATOR, "Moderator"),
        Step::labelled_count(fields::BLOCKED, "Blocked"),
        Step::labelled_count(fields::HELPHUB_EDITOR, "HelpHub Editor"),
        Step::labelled_count(fields::HELPHUB_MANAGER, "HelpHub Manager"),
    ];
}

/// Walks the page once, matching each label after the previous counter.
///
/// Labels must appear in the expected order; the first one that cannot be found is reported as
/// [`CollectError::MissingField`], so a value is never attributed to the wrong counter.
pub struct PatternExtractor {
    page: PageKind,
    steps: &'static [Step],
}

impl PatternExtractor {
    pub fn for_page(page: PageKind) -> Self {
        let steps: &'static [Step] = match page {
            PageKind::Tags => TAG_STEPS.as_slice(),
            PageKind::Replies => REPLY_STEPS.as_slice(),
            PageKind::Topics => TOPIC_STEPS.as_slice(),
            PageKind::Users => USER_STEPS.as_slice(),
        };
        Self { page, steps }
    }

    #[cfg(test)]
    fn expected_len(&self) -> usize {
        self.steps.len()
    }
}

impl ExtractionStrategy for PatternExtractor {
    fn extract(&self, body: &str) -> Result<CounterBundle, CollectError> {
        let mut bundle = CounterBundle::new(self.page);
        let mut offset = 0;

        for step in self.steps {
            let captures = step
                .pattern
                .captures_at(body, offset)
                .ok_or(CollectError::MissingField {
                    page: self.page,
                    field: step.field,
                })?;
            let (Some(whole), Some(value)) = (captures.get(0), captures.get(1)) else {
                return Err(CollectError::MissingField {
                    page: self.page,
                    field: step.field,
                });
            };
            bundle.push(step.field, value.as_str());
            offset = whole.end();
        }

        trace!(page = %self.page, counters = bundle.len(), "extracted counters");
        Ok(bundle)
    }
}
