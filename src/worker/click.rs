use crate::config::SITE_ROOT;
use crate::ports::worker::{ClientQuery, DisplayedNotification, WindowClients};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing window was brought forward. It is not navigated.
    Focused,
    Opened { url: String },
    /// No window is open and the platform cannot open one.
    NoWindow,
    /// A platform call failed; nothing is shown to the user.
    Failed,
}

pub(crate) fn target_url<N: DisplayedNotification + ?Sized>(notification: &N) -> String {
    notification
        .data()
        .map(|data| data.url)
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| SITE_ROOT.to_string())
}

pub(crate) async fn route<C: WindowClients>(clients: &C, url: &str) -> ClickOutcome {
    let windows = match clients.match_all(&ClientQuery::all_windows()).await {
        Ok(windows) => windows,
        Err(err) => {
            tracing::debug!(%err, "failed to enumerate window clients");
            return ClickOutcome::Failed;
        }
    };

    if let Some(first) = windows.into_iter().next() {
        return match clients.focus(first).await {
            Ok(()) => ClickOutcome::Focused,
            Err(err) => {
                tracing::debug!(%err, "failed to focus window client");
                ClickOutcome::Failed
            }
        };
    }

    if !clients.can_open_window() {
        return ClickOutcome::NoWindow;
    }

    match clients.open_window(url).await {
        Ok(()) => ClickOutcome::Opened {
            url: url.to_string(),
        },
        Err(err) => {
            tracing::debug!(%err, url, "failed to open window");
            ClickOutcome::Failed
        }
    }
}
