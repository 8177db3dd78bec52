//! The user-facing side of publishing: the sign-in window and the questions
//! the workflow asks along the way.

use super::types::{Site, SiteChoice};

/// The window the user signs in through.
pub trait AuthWindow {
    /// Show the sign-in page at `url`.
    fn open(&mut self, url: &str);

    /// Whether the user has closed the window. Polling stops once it is.
    fn is_closed(&self) -> bool;

    /// Dismiss the window after sign-in finishes or gives up.
    fn close(&mut self);
}

/// Stand-in window for hosts that cannot open one: logs the sign-in URL and
/// is never closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggedAuthWindow;

impl AuthWindow for LoggedAuthWindow {
    fn open(&mut self, url: &str) {
        tracing::info!(url, "open this page to sign in");
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn close(&mut self) {}
}

impl<W: AuthWindow + ?Sized> AuthWindow for &mut W {
    fn open(&mut self, url: &str) {
        (**self).open(url)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Questions the publish workflow asks the user.
pub trait PublishPrompt {
    /// Subdomain for a first site. `None` when the user declines.
    fn ask_subdomain(&mut self) -> Option<String>;

    /// Pick one of `sites`, or a new subdomain.
    fn select_site(&mut self, sites: &[Site]) -> SiteChoice;

    /// Whether to create `subdomain`, which does not exist yet.
    fn confirm_create(&mut self, subdomain: &str) -> bool;

    /// Offer to open the published site. The default declines.
    fn offer_open(&mut self, url: &str) -> bool {
        let _ = url;
        false
    }
}

impl<P: PublishPrompt + ?Sized> PublishPrompt for &mut P {
    fn ask_subdomain(&mut self) -> Option<String> {
        (**self).ask_subdomain()
    }

    fn select_site(&mut self, sites: &[Site]) -> SiteChoice {
        (**self).select_site(sites)
    }

    fn confirm_create(&mut self, subdomain: &str) -> bool {
        (**self).confirm_create(subdomain)
    }

    fn offer_open(&mut self, url: &str) -> bool {
        (**self).offer_open(url)
    }
}
