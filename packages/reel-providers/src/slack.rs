use std::time::Duration as StdDuration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::Result;

const ALERT_COLOR: &str = "#FF0000";

/// An internal failure worth paging about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackAlert {
	pub title: String,
	pub request_id: String,
	pub route: String,
	pub message: String,
}

pub async fn notify(cfg: &reel_config::Slack, alert: &SlackAlert) -> Result<()> {
	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;

	client
		.post(cfg.webhook_url.as_str())
		.json(&alert_payload(alert))
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

pub fn alert_payload(alert: &SlackAlert) -> Value {
	json!({
		"attachments": [{
			"color": ALERT_COLOR,
			"blocks": [
				{
					"type": "header",
					"text": {
						"type": "plain_text",
						"text": format!("{}: {}", alert.title, alert.request_id),
					}
				},
				{
					"type": "section",
					"fields": [{ "type": "mrkdwn", "text": format!("*Route*\n{}", alert.route) }]
				},
				{
					"type": "section",
					"fields": [{
						"type": "mrkdwn",
						"text": format!("*Message*\n{}", alert.message)
					}]
				}
			]
		}]
	})
}
