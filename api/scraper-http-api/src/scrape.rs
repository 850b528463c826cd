use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scraper_app::workflow::trigger::TriggerOutcome;

use crate::AppState;

#[derive(serde::Serialize)]
pub struct JsonUsage {
    trigger_scraping: &'static str,
    description: &'static str,
}

#[derive(serde::Serialize)]
pub struct JsonHomeResponse {
    status: &'static str,
    message: &'static str,
    usage: JsonUsage,
}

#[derive(serde::Serialize)]
pub struct JsonTriggerResponse {
    status: &'static str,
    message: String,
    run_id: String,
}

#[derive(serde::Serialize)]
pub struct JsonStatusResponse {
    running: bool,
    run_id: Option<String>,
    started_at: Option<String>,
    finished_at: Option<String>,
    last_outcome: Option<String>,
    succeeded: Option<bool>,
}

pub async fn home() -> Json<JsonHomeResponse> {
    Json(JsonHomeResponse {
        status: "ok",
        message: "Dhan Scraper Service is running",
        usage: JsonUsage {
            trigger_scraping: "GET /trigger-scrape",
            description: "Visit /trigger-scrape to start a scraping job. The results will be emailed to the configured recipient.",
        },
    })
}

pub async fn trigger_scrape(State(app_state): State<AppState>) -> Response {
    match app_state.trigger.trigger() {
        TriggerOutcome::Started(run_id) => {
            log::info!("Scrape run {} triggered over HTTP", run_id);
            Json(JsonTriggerResponse {
                status: "ok",
                message: "Scraping job started. Results will be emailed when complete."
                    .to_string(),
                run_id: run_id.to_string(),
            })
            .into_response()
        }
        TriggerOutcome::AlreadyRunning(run_id) => (
            StatusCode::CONFLICT,
            Json(JsonTriggerResponse {
                status: "busy",
                message: format!("Scraping job {} is still running.", run_id),
                run_id: run_id.to_string(),
            }),
        )
            .into_response(),
    }
}

pub async fn status(State(app_state): State<AppState>) -> Json<JsonStatusResponse> {
    let status = app_state.trigger.status();
    Json(JsonStatusResponse {
        running: status.running,
        run_id: status.run_id.map(|id| id.to_string()),
        started_at: status.started_at.map(|t| t.to_rfc3339()),
        finished_at: status.finished_at.map(|t| t.to_rfc3339()),
        succeeded: status.last_outcome.as_ref().map(|o| o.is_success()),
        last_outcome: status.last_outcome.map(|o| o.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc, time::Duration};

    use scraper_app::{
        ScraperSettings, build_application,
        domain::scroll::ScrollPolicy,
        ports::mocks::{MockBrowser, MockEmailPort, MockReportRepository},
    };

    use super::*;

    fn state(browser: MockBrowser) -> AppState {
        let app = build_application(
            Arc::new(browser),
            Arc::new(MockReportRepository::default()),
            Arc::new(MockEmailPort::default()),
            ScraperSettings {
                url: "https://dhan.test/".to_string(),
                recipient: "ops@example.com".to_string(),
                screenshot_dir: PathBuf::from("."),
                scroll_policy: ScrollPolicy {
                    initial_wait: Duration::from_secs(3600),
                    ..ScrollPolicy::default()
                },
                daily_schedule: None,
            },
        );
        AppState {
            trigger: app.trigger_scrape_use_case,
        }
    }

    fn body_json(value: impl serde::Serialize) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_home() {
        let Json(response) = home().await;
        let json = body_json(response);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["message"], "Dhan Scraper Service is running");
        assert_eq!(json["usage"]["trigger_scraping"], "GET /trigger-scrape");
    }

    #[tokio::test]
    async fn test_trigger_then_conflict() {
        let state = state(MockBrowser::default());

        let first = trigger_scrape(State(state.clone())).await;
        assert_eq!(first.status(), StatusCode::OK);

        // the first run is parked in its initial page-load wait
        let second = trigger_scrape(State(state.clone())).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let Json(current) = status(State(state)).await;
        let json = body_json(current);
        assert_eq!(json["running"], true);
        assert!(json["run_id"].is_string());
        assert!(json["last_outcome"].is_null());
    }

    #[tokio::test]
    async fn test_status_reports_failed_run() {
        let state = state(MockBrowser::failing_launch());

        let response = trigger_scrape(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let mut json = serde_json::Value::Null;
        for _ in 0..200 {
            let Json(current) = status(State(state.clone())).await;
            json = body_json(current);
            if json["running"] == false {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(json["running"], false);
        assert_eq!(json["succeeded"], false);
        assert!(
            json["last_outcome"]
                .as_str()
                .unwrap()
                .starts_with("browser launch failed")
        );
    }
}
