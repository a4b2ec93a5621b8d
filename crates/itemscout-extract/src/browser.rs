//! Headless-browser capability consumed by the rendered strategy.
//!
//! The concrete binding (CDP, WebDriver, ...) is an external collaborator
//! injected at catalog construction; this crate only defines the narrow
//! surface the scroll loop needs. Tests substitute doubles.

use async_trait::async_trait;

use crate::error::ExtractError;

/// Opens isolated page sessions.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Open a fresh session and navigate to `url`.
    ///
    /// A page is only returned on successful navigation; on error the engine
    /// is responsible for its own cleanup. Once a page is handed out, the
    /// caller owns teardown via [`BrowserPage::close`].
    ///
    /// # Errors
    ///
    /// Navigation failures map to the standard extraction taxonomy.
    async fn open(&self, url: &str) -> Result<Box<dyn BrowserPage>, ExtractError>;
}

/// One live page session.
///
/// `close` must be called exactly once before the page is dropped; a leaked
/// session holds a browser process's memory and file descriptors for the
/// rest of the batch run.
#[async_trait]
pub trait BrowserPage: Send {
    async fn wait_for_network_idle(&mut self) -> Result<(), ExtractError>;

    /// Scroll to the bottom of the current viewport to trigger lazy loading.
    async fn scroll_to_bottom(&mut self) -> Result<(), ExtractError>;

    /// Current serialized DOM.
    async fn content(&mut self) -> Result<String, ExtractError>;

    async fn close(&mut self) -> Result<(), ExtractError>;
}
