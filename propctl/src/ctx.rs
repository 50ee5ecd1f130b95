//! Application context and state management.
//!
//! [`AppContext`] holds what every command needs: where the page model lives,
//! which server to talk to and how. It loads the page, builds the editor and
//! writes the page back afterwards.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use proptree::{Dialogs, Editor, Page, transport::HttpTransport};

use crate::utils::replace_env_placeholders;

/// Default location of the page model file.
pub const DEFAULT_PAGE_PATH: &str = ".propctl.json";

/// The main application context.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Page model file (`.json` or `.toml`).
    pub page_path: PathBuf,
    /// Base URL of the property server.
    pub server: String,
    /// CSRF token applied to every REST save target, if given.
    pub csrf_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            page_path: PathBuf::from(DEFAULT_PAGE_PATH),
            server: "http://localhost:8000".to_string(),
            csrf_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl AppContext {
    /// Loads the page model.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_page(&self) -> anyhow::Result<Page> {
        Page::load(&self.page_path)
            .with_context(|| format!("failed to load page {}", self.page_path.display()))
    }

    /// Writes the page model back, keeping a backup of the previous file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn store_page(&self, page: &Page) -> anyhow::Result<()> {
        page.write(&self.page_path)
            .with_context(|| format!("failed to write {}", self.page_path.display()))?;
        debug!("page written to {}", self.page_path.display());
        Ok(())
    }

    /// Builds the HTTP transport for the configured server.
    ///
    /// A CSRF token given on the command line is held by the transport and
    /// overrides the tokens of every REST save target.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn transport(&self) -> anyhow::Result<HttpTransport> {
        let server = replace_env_placeholders(&self.server);
        let transport = HttpTransport::with_timeout(server, self.timeout)
            .context("failed to create HTTP client")?;
        Ok(match &self.csrf_token {
            Some(token) => transport.with_csrf_token(replace_env_placeholders(token)),
            None => transport,
        })
    }

    /// Loads the page and wraps it in an editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the page or the transport cannot be set up.
    pub fn editor<D: Dialogs>(&self, dialogs: D) -> anyhow::Result<Editor<HttpTransport, D>> {
        Ok(Editor::new(self.load_page()?, self.transport()?, dialogs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptree::{
        AddressingMode,
        data::{ControlGroup, SaveTarget},
    };

    #[test]
    fn test_csrf_token_stays_out_of_page() {
        unsafe {
            std::env::set_var("PROPCTL_TEST_CSRF", "s3cr3t-token");
        }
        let dir = tempfile::tempdir().unwrap();
        let page_path = dir.path().join("page.json");
        let page = Page {
            project: "demo".into(),
            groups: vec![
                ControlGroup::new("rest", AddressingMode::Nested).with_target(SaveTarget::Rest {
                    url: "/config/".into(),
                    csrf_token: String::new(),
                }),
            ],
            ..Default::default()
        };
        page.write(&page_path).unwrap();

        let ctx = AppContext {
            page_path: page_path.clone(),
            csrf_token: Some("${env:PROPCTL_TEST_CSRF}".into()),
            ..Default::default()
        };
        assert_eq!(ctx.transport().unwrap().csrf_token_for(""), "s3cr3t-token");

        let loaded = ctx.load_page().unwrap();
        ctx.store_page(&loaded).unwrap();
        let written = std::fs::read_to_string(&page_path).unwrap();
        assert!(!written.contains("s3cr3t-token"));
        assert_eq!(loaded, page);
    }

    #[test]
    fn test_missing_page() {
        let ctx = AppContext {
            page_path: PathBuf::from("/nonexistent/page.json"),
            ..Default::default()
        };
        let err = ctx.load_page().unwrap_err();
        assert!(err.to_string().contains("failed to load page"));
    }
}
