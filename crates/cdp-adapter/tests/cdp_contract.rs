//! Contract tests against a real Chromium binary. Ignored by default because
//! they need Chrome/Chromium on the host machine.

use std::env;

use action_primitives::PagePort;
use cdp_adapter::{BrowserSession, CdpConfig};

const FIXTURE: &str = "data:text/html,<html><body><div id='imputacion'>\
<button id='incur' onmousedown=\"document.getElementById('total').innerText='02:00'\">Incurrir</button>\
<span id='total'>00:00</span><input id='hours' value=''></div></body></html>";

fn contract_enabled() -> bool {
    env::var("AUTOINCUR_CDP_CONTRACT")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

async fn start_session() -> BrowserSession {
    let cfg = CdpConfig {
        headless: true,
        target_url: Some(FIXTURE.to_string()),
        target_url_fragment: "imputacion".to_string(),
        ..CdpConfig::default()
    };
    BrowserSession::start(&cfg).await.expect("session start")
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set AUTOINCUR_CDP_CONTRACT=1"]
async fn contract_press_dispatches_mousedown() {
    if !contract_enabled() {
        eprintln!("skipping CDP contract test (AUTOINCUR_CDP_CONTRACT not enabled)");
        return;
    }

    let session = start_session().await;
    let page = session.page();
    let button = page
        .query("#incur", None)
        .await
        .expect("query")
        .remove(0);
    assert_eq!(button.text.trim(), "Incurrir");
    page.press(&button).await.expect("press");

    let total = page.query("#total", None).await.expect("query").remove(0);
    assert_eq!(total.text.trim(), "02:00");
    session.close().await;
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set AUTOINCUR_CDP_CONTRACT=1"]
async fn contract_fill_and_shared_attribute() {
    if !contract_enabled() {
        eprintln!("skipping CDP contract test (AUTOINCUR_CDP_CONTRACT not enabled)");
        return;
    }

    let session = start_session().await;
    let page = session.page();
    let input = page.query("#hours", None).await.expect("query").remove(0);
    page.fill(&input, "3").await.expect("fill");
    let again = page.query("#hours", None).await.expect("query").remove(0);
    assert_eq!(again.reference, input.reference);
    assert_eq!(again.value.as_deref(), Some("3"));

    page.set_shared_attribute("data-autoincur-date", "17/03/2025")
        .await
        .expect("attribute");
    page.run_in_page_context(
        "document.getElementById('total').innerText = document.body.getAttribute('data-autoincur-date')",
    )
    .await
    .expect("page script");
    let total = page.query("#total", None).await.expect("query").remove(0);
    assert_eq!(total.text.trim(), "17/03/2025");
    session.close().await;
}
