//! Sign-in popup and the native dialogs used by the publish workflow.

use sitepad_editor_core::SessionSource;
use sitepad_renderer::publish::{AuthWindow, PublishPrompt, Site, SiteChoice};

/// The sign-in page in a popup window.
#[derive(Debug, Default)]
pub struct PopupAuthWindow {
    popup: Option<web_sys::Window>,
}

impl PopupAuthWindow {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthWindow for PopupAuthWindow {
    fn open(&mut self, url: &str) {
        match gloo_utils::window().open_with_url_and_target_and_features(
            url,
            "sitepad-auth",
            "width=500,height=600",
        ) {
            Ok(popup) => self.popup = popup,
            Err(e) => tracing::warn!(error = ?e, "could not open sign-in window"),
        }
    }

    fn is_closed(&self) -> bool {
        // a blocked popup never opened, so there is nothing the user can close
        self.popup
            .as_ref()
            .is_some_and(|popup| popup.closed().unwrap_or(false))
    }

    fn close(&mut self) {
        if let Some(popup) = self.popup.take() {
            let _ = popup.close();
        }
    }
}

/// `prompt()` and `confirm()` on the current window.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogPrompt;

fn prompt(message: &str) -> Option<String> {
    gloo_utils::window()
        .prompt_with_message(message)
        .ok()
        .flatten()
}

fn confirm(message: &str) -> bool {
    gloo_utils::window()
        .confirm_with_message(message)
        .unwrap_or(false)
}

/// Ask whether to restore the previous session.
pub fn choose_session_source() -> SessionSource {
    if confirm("A previous session was found. Do you want to load it?") {
        SessionSource::Saved
    } else {
        SessionSource::Canonical
    }
}

impl PublishPrompt for DialogPrompt {
    fn ask_subdomain(&mut self) -> Option<String> {
        prompt("Enter subdomain for your new site:")
    }

    fn select_site(&mut self, sites: &[Site]) -> SiteChoice {
        let mut message = String::from("Select site to publish to:\n");
        for (i, site) in sites.iter().enumerate() {
            message.push_str(&format!(
                "{}. {} ({})\n",
                i + 1,
                site.display_name(),
                site.subdomain
            ));
        }
        message.push_str("\nEnter a number, or a new subdomain to create a new site.");

        let Some(answer) = prompt(&message) else {
            return SiteChoice::Cancelled;
        };
        let answer = answer.trim();
        match answer.parse::<usize>() {
            Ok(n) if (1..=sites.len()).contains(&n) => {
                SiteChoice::Existing(sites[n - 1].subdomain.clone())
            }
            _ if answer.is_empty() => SiteChoice::Cancelled,
            _ => SiteChoice::New(answer.to_owned()),
        }
    }

    fn confirm_create(&mut self, subdomain: &str) -> bool {
        confirm(&format!("Site '{subdomain}' doesn't exist. Create it?"))
    }

    fn offer_open(&mut self, url: &str) -> bool {
        if !confirm("Open published site?") {
            return false;
        }
        gloo_utils::window()
            .open_with_url_and_target(url, "_blank")
            .is_ok()
    }
}
