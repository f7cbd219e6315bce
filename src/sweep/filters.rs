use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use regex::Regex;

use crate::common::errors::{FsError, Result};

/// Extra filename test supplied by the caller
pub type NamePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Hook that takes over deletion of an eligible file
pub type DeleteCallback = Arc<dyn Fn(&Path) -> std::io::Result<()> + Send + Sync>;

/// Eligibility rules for an age sweep.
///
/// A file qualifies only when it is at least `older_than` old AND every
/// configured name filter accepts it. Unset filters accept everything.
#[derive(Clone)]
pub struct SweepFilter {
    older_than: Duration,
    prefix: Option<String>,
    suffix: Option<String>,
    pattern: Option<Regex>,
    predicate: Option<NamePredicate>,
    callback: Option<DeleteCallback>,
}

impl SweepFilter {
    pub fn older_than(age: Duration) -> Self {
        Self {
            older_than: age,
            prefix: None,
            suffix: None,
            pattern: None,
            predicate: None,
            callback: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Require the filename to contain a match for `pattern` (unanchored)
    pub fn with_regex(mut self, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|source| FsError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(re);
        Ok(self)
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Hand eligible files to `callback` instead of deleting them.
    /// The sweep does not check that the callback removed anything.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Path) -> std::io::Result<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn age_threshold(&self) -> Duration {
        self.older_than
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub(crate) fn callback(&self) -> Option<&DeleteCallback> {
        self.callback.as_ref()
    }

    /// Age check against a fixed sweep start time.
    /// Files stamped in the future have age zero.
    pub fn is_old_enough(&self, modified: SystemTime, now: SystemTime) -> bool {
        let age = now.duration_since(modified).unwrap_or_default();
        age >= self.older_than
    }

    /// All name filters, AND-ed
    pub fn matches_name(&self, name: &str) -> bool {
        self.prefix.as_deref().map_or(true, |p| name.starts_with(p))
            && self.suffix.as_deref().map_or(true, |s| name.ends_with(s))
            && self.pattern.as_ref().map_or(true, |re| re.is_match(name))
            && self.predicate.as_ref().map_or(true, |f| f(name))
    }

    pub fn is_eligible(&self, name: &str, modified: SystemTime, now: SystemTime) -> bool {
        self.is_old_enough(modified, now) && self.matches_name(name)
    }
}

impl std::fmt::Debug for SweepFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepFilter")
            .field("older_than", &self.older_than)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("pattern", &self.pattern.as_ref().map(|r| r.as_str()))
            .field("predicate", &self.predicate.is_some())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
