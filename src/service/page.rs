//! Server-rendered HTML page.
//!
//! The page is a plain rendering of [`DashboardView`]. A small script posts
//! toggle and wallet actions to the REST API and reloads whenever the
//! `/ws` stream reports a change.

use std::fmt::Write;

use super::view::{BlockSection, DashboardView, SectionHeader, TransactionSection};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #0f1419; color: #e6e6e6; }
.app-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: #161b22; }
.app-main { padding: 2rem; }
.sections { display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; }
.section-card { background: #161b22; border-radius: 8px; padding: 1rem; }
.section-header { display: flex; justify-content: space-between; align-items: center; }
.scroll-box { max-height: 60vh; overflow-y: auto; font-family: monospace; }
.btn { border: none; border-radius: 4px; padding: 0.5rem 1rem; cursor: pointer; color: #fff; }
.btn-start { background: #238636; }
.btn-stop { background: #da3633; }
.error { color: #f85149; }
.empty-msg { color: #8b949e; }
a { color: #58a6ff; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 0.25rem 0.5rem; }
"#;

const SCRIPT: &str = r#"
async function post(url, body, method) {
  const res = await fetch(url, {
    method: method || 'POST',
    headers: { 'content-type': 'application/json' },
    body: body ? JSON.stringify(body) : undefined,
  });
  if (!res.ok) {
    const err = await res.json().catch(() => null);
    alert(err && err.error ? err.error.message : res.statusText);
  }
  location.reload();
}
function connectWallet() {
  post('/api/v1/wallet', { address: document.getElementById('wallet-address').value });
}
function disconnectWallet() { post('/api/v1/wallet', null, 'DELETE'); }
(function () {
  const ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/ws');
  let pending = null;
  ws.onopen = () => ws.send(JSON.stringify({ id: 'page', type: 'command', timestamp: new Date().toISOString(), payload: { command: 'subscribe', feeds: ['*'] } }));
  ws.onmessage = (msg) => {
    const data = JSON.parse(msg.data);
    if (data.type !== 'event' || pending) return;
    pending = setTimeout(() => location.reload(), 1000);
  };
})();
"#;

/// Escapes text for HTML element and attribute content.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the full page for `view`.
#[must_use]
pub fn render_page(view: &DashboardView) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Ethereum Live Monitor</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"app-container\">\n");
    html.push_str("<header class=\"app-header\">\n<h1 class=\"app-title\">Ethereum Live Monitor</h1>\n");
    render_wallet(&mut html, view);
    html.push_str("</header>\n<main class=\"app-main\">\n");

    match view {
        DashboardView::ConnectPrompt { message } => {
            let _ = writeln!(
                html,
                "<div class=\"not-connected\"><h3>{}</h3></div>",
                escape(message)
            );
        }
        DashboardView::Sections {
            transactions,
            blocks,
            ..
        } => {
            html.push_str("<div class=\"sections\">\n");
            render_transactions(&mut html, transactions);
            render_blocks(&mut html, blocks);
            html.push_str("</div>\n");
        }
    }

    html.push_str("</main>\n</div>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn render_wallet(html: &mut String, view: &DashboardView) {
    match view {
        DashboardView::Sections { wallet_address, .. } => {
            let _ = writeln!(
                html,
                "<div class=\"wallet\"><code>{}</code> \
                 <button class=\"btn btn-stop\" onclick=\"disconnectWallet()\">Disconnect</button></div>",
                escape(wallet_address)
            );
        }
        DashboardView::ConnectPrompt { .. } => {
            html.push_str(
                "<div class=\"wallet\"><input id=\"wallet-address\" placeholder=\"0x...\" size=\"44\"> \
                 <button class=\"btn btn-start\" onclick=\"connectWallet()\">Connect Wallet</button></div>\n",
            );
        }
    }
}

/// Section opening tag, heading, toggle button and count.
fn render_header(html: &mut String, header: &SectionHeader) {
    let class = match header.toggle.action.as_str() {
        "stop" => "btn-stop",
        _ => "btn-start",
    };
    let _ = write!(
        html,
        "<section class=\"section-card\" id=\"{feed}\">\n\
         <div class=\"section-header\"><h2>{title}</h2>\
         <button class=\"btn {class}\" onclick=\"post('{endpoint}')\">{label}</button></div>\n\
         <div class=\"section-info\"><p>Count: {count}</p>",
        feed = header.feed,
        title = escape(&header.title),
        endpoint = escape(&header.toggle.endpoint),
        label = escape(&header.toggle.label),
        count = header.event_count,
    );
    if let Some(error) = &header.last_error {
        let _ = write!(html, "<p class=\"error\">{}</p>", escape(error));
    }
    html.push_str("</div>\n<div class=\"scroll-box\">\n");
}

fn render_empty(html: &mut String, header: &SectionHeader) -> bool {
    match &header.empty_message {
        Some(message) => {
            let _ = writeln!(html, "<p class=\"empty-msg\">{}</p>", escape(message));
            true
        }
        None => false,
    }
}

fn render_transactions(html: &mut String, section: &TransactionSection) {
    render_header(html, &section.header);
    if !render_empty(html, &section.header) {
        for row in &section.rows {
            let _ = writeln!(
                html,
                "<div class=\"tx-item\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></div>",
                escape(&row.url),
                escape(&row.hash)
            );
        }
    }
    html.push_str("</div>\n</section>\n");
}

fn render_blocks(html: &mut String, section: &BlockSection) {
    render_header(html, &section.header);
    if !render_empty(html, &section.header) {
        html.push_str(
            "<table class=\"block-table\">\n<thead><tr><th>Block</th><th>Total Txns</th><th>Time</th></tr></thead>\n<tbody>\n",
        );
        for row in &section.rows {
            let _ = writeln!(
                html,
                "<tr><td><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></td><td>{}</td><td>{}</td></tr>",
                escape(&row.url),
                row.number,
                row.transaction_count,
                escape(&row.time)
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }
    html.push_str("</div>\n</section>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedKind;
    use crate::service::view::{BlockRow, ToggleControl, TransactionRow};
    use crate::session::LifecycleState;

    fn header(feed: FeedKind, state: LifecycleState, empty: Option<&str>) -> SectionHeader {
        SectionHeader {
            feed,
            title: feed.title().to_string(),
            state,
            toggle: ToggleControl {
                label: state.toggle_label().to_string(),
                action: state.toggle_action().to_string(),
                endpoint: format!("/api/v1/feeds/{feed}/{}", state.toggle_action()),
            },
            event_count: 2,
            empty_message: empty.map(str::to_string),
            last_error: None,
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn prompt_page_has_no_sections() {
        let page = render_page(&DashboardView::ConnectPrompt {
            message: "Connect your wallet to get started".to_string(),
        });
        assert!(page.contains("Connect your wallet to get started"));
        assert!(!page.contains("class=\"section-card\""));
        assert!(page.contains("Connect Wallet"));
    }

    #[test]
    fn sections_page_lists_links() {
        let view = DashboardView::Sections {
            wallet_address: "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".to_string(),
            transactions: TransactionSection {
                header: header(FeedKind::Transactions, LifecycleState::Listening, None),
                rows: vec![TransactionRow {
                    hash: "0xaa".to_string(),
                    url: "https://etherscan.io/tx/0xaa".to_string(),
                }],
            },
            blocks: BlockSection {
                header: header(FeedKind::Blocks, LifecycleState::Idle, None),
                rows: vec![BlockRow {
                    number: 102,
                    url: "https://etherscan.io/block/102".to_string(),
                    transaction_count: 7,
                    time: "2023-11-14 22:13:20 UTC".to_string(),
                }],
            },
        };
        let page = render_page(&view);
        assert!(page.contains("href=\"https://etherscan.io/tx/0xaa\""));
        assert!(page.contains("href=\"https://etherscan.io/block/102\""));
        assert!(page.contains("Stop Listening"));
        assert!(page.contains("Start Listening"));
        assert!(page.contains("Count: 2"));
        assert_eq!(page.matches("class=\"section-card\"").count(), 2);
    }

    #[test]
    fn empty_section_shows_placeholder() {
        let mut html = String::new();
        let section = TransactionSection {
            header: header(
                FeedKind::Transactions,
                LifecycleState::Idle,
                Some("Press Start to begin"),
            ),
            rows: Vec::new(),
        };
        render_transactions(&mut html, &section);
        assert!(html.contains("<p class=\"empty-msg\">Press Start to begin</p>"));
    }
}
