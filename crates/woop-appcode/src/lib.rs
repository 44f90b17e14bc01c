use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Decides whether an application code may load the widget.
///
/// Injected into widget creation; there is no process-wide allowlist.
#[async_trait(?Send)]
pub trait AppCodeValidator {
    async fn validate(&self, app_code: &str) -> Result<bool>;
}

#[async_trait(?Send)]
impl<V: AppCodeValidator + ?Sized> AppCodeValidator for Rc<V> {
    async fn validate(&self, app_code: &str) -> Result<bool> {
        (**self).validate(app_code).await
    }
}

#[async_trait(?Send)]
impl<V: AppCodeValidator + ?Sized> AppCodeValidator for Arc<V> {
    async fn validate(&self, app_code: &str) -> Result<bool> {
        (**self).validate(app_code).await
    }
}

/// Explicit in-memory allowlist of application codes.
#[derive(Debug, Default)]
pub struct AppCodeRegistry {
    codes: RwLock<HashSet<String>>,
}

impl AppCodeRegistry {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_owned())
            .filter(|code| !code.is_empty())
            .collect();
        Self {
            codes: RwLock::new(codes),
        }
    }

    /// Parse a comma-separated list such as `"app-1, app-2"`.
    pub fn from_csv(raw: &str) -> Self {
        Self::from_codes(raw.split(','))
    }

    pub fn contains(&self, app_code: &str) -> Result<bool> {
        let app_code = app_code.trim();
        if app_code.is_empty() {
            return Ok(false);
        }
        let guard = self
            .codes
            .read()
            .map_err(|_| anyhow!("app code registry lock poisoned"))?;
        Ok(guard.contains(app_code))
    }

    /// Returns `true` when the code was not already present.
    pub fn register(&self, app_code: &str) -> Result<bool> {
        let app_code = app_code.trim();
        if app_code.is_empty() {
            return Err(anyhow!("app code cannot be empty"));
        }
        let mut guard = self
            .codes
            .write()
            .map_err(|_| anyhow!("app code registry lock poisoned"))?;
        let added = guard.insert(app_code.to_owned());
        if added {
            debug!(app_code, "registered app code");
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.codes.read().map(|guard| guard.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait(?Send)]
impl AppCodeValidator for AppCodeRegistry {
    async fn validate(&self, app_code: &str) -> Result<bool> {
        self.contains(app_code)
    }
}
