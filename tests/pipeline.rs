use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use gear_alerts::config::Settings;
use gear_alerts::error::{ExtractionError, ScrapeError, TrackerError};
use gear_alerts::extraction::{ExtractionContract, StructuredExtractor};
use gear_alerts::models::Watch;
use gear_alerts::monitor::{Monitor, RunMode, WatchOutcome, WatchReport};
use gear_alerts::notify::{AlertDispatcher, DispatchOutcome, Issue, IssueTracker, SkipReason};
use gear_alerts::scrapers::PageScraper;

const ECHO_PAGE: &str = "\
![banner](https://images.reverb.com/banner.jpg)

## [Roland RE-201 Space Echo](https://reverb.com/item/111-roland-re-201?bk=abc)

Excellent

$280 +$25 shipping

## [Roland RE-201 AC Adapter](https://reverb.com/item/222-adapter)

$40

## Sort by

Price Low to High
";

fn echo_payload() -> Value {
    json!({
        "listings": [
            {
                "title": "Roland RE-201 Space Echo",
                "price": 280.0,
                "shipping_cost": 25.0,
                "seller_location": null,
                "url": "https://reverb.com/item/111-roland-re-201",
                "condition": "Excellent",
                "is_primary_product": true
            },
            {
                "title": "Roland RE-201 AC Adapter",
                "price": 40.0,
                "shipping_cost": 0.0,
                "seller_location": null,
                "url": "https://reverb.com/item/222-adapter",
                "condition": null,
                "is_primary_product": false
            }
        ]
    })
}

/// Serves canned pages keyed by search query.
#[derive(Default)]
struct FakeScraper {
    pages: HashMap<String, Option<String>>,
}

impl FakeScraper {
    fn with_page(mut self, query: &str, page: Option<&str>) -> Self {
        self.pages.insert(query.to_string(), page.map(str::to_string));
        self
    }
}

#[async_trait]
impl PageScraper for FakeScraper {
    async fn scrape(&self, url: &Url) -> Result<Option<String>, ScrapeError> {
        let query = url
            .query_pairs()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        match self.pages.get(&query) {
            Some(page) => Ok(page.clone()),
            None => Err(ScrapeError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }
}

/// Returns canned payloads keyed by query and records what it was sent.
#[derive(Clone, Default)]
struct FakeExtractor {
    payloads: Arc<Mutex<HashMap<String, Value>>>,
    received: Arc<Mutex<Vec<String>>>,
}

impl FakeExtractor {
    fn with_payload(self, query: &str, payload: Value) -> Self {
        self.payloads.lock().unwrap().insert(query.to_string(), payload);
        self
    }
}

#[async_trait]
impl StructuredExtractor for FakeExtractor {
    async fn extract(
        &self,
        markdown: &str,
        contract: &ExtractionContract,
    ) -> Result<Value, ExtractionError> {
        self.received.lock().unwrap().push(markdown.to_string());
        self.payloads
            .lock()
            .unwrap()
            .get(contract.query())
            .cloned()
            .ok_or(ExtractionError::MissingOutput)
    }
}

/// Keeps created issues open; search is fuzzy like the real tracker.
#[derive(Clone, Default)]
struct FakeTracker {
    issues: Arc<Mutex<Vec<Issue>>>,
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn search_open_by_title(&self, title: &str) -> Result<Vec<Issue>, TrackerError> {
        Ok(self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|issue| issue.title.contains(title))
            .cloned()
            .collect())
    }

    async fn ensure_label(&self, _name: &str) -> Result<(), TrackerError> {
        Ok(())
    }

    async fn create_issue(&self, title: &str, _body: &str, _label: &str) -> Result<(), TrackerError> {
        let mut issues = self.issues.lock().unwrap();
        let number = issues.len() as u64 + 1;
        issues.push(Issue {
            number,
            title: title.to_string(),
        });
        Ok(())
    }
}

fn echo_watch(max_price: f64) -> Watch {
    let mut watch = Watch::new("RE-201 Watch", "Roland RE-201", max_price);
    watch.include_shipping = true;
    watch
}

fn monitor(scraper: FakeScraper, extractor: FakeExtractor, mode: RunMode) -> Monitor {
    Monitor::new(Settings::default(), Box::new(scraper), Box::new(extractor), mode)
}

async fn run(monitor: &Monitor, watches: &[Watch]) -> (Vec<WatchReport>, String) {
    let mut out = Vec::new();
    let reports = monitor.run(watches, &mut out).await.unwrap();
    (reports, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn dry_run_reports_qualifying_listing() {
    let scraper = FakeScraper::default().with_page("Roland RE-201", Some(ECHO_PAGE));
    let extractor = FakeExtractor::default().with_payload("Roland RE-201", echo_payload());
    let monitor = monitor(scraper, extractor.clone(), RunMode::DryRun);

    let (reports, output) = run(&monitor, &[echo_watch(320.0)]).await;

    assert_eq!(
        output,
        "Checking: RE-201 Watch (max $320.00)...\n\
         \x20 Found 1 match(es) for RE-201 Watch\n\
         \x20   - Roland RE-201 Space Echo: $280.00 + $25.00 shipping = $305.00 [Excellent]\n\
         \x20     https://reverb.com/item/111-roland-re-201\n"
    );

    match &reports[0].outcome {
        WatchOutcome::Matched { listings, alert } => {
            assert_eq!(listings.len(), 1);
            assert_eq!(listings[0].title, "Roland RE-201 Space Echo");
            assert_eq!(alert, &None);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn shipping_pushes_listing_over_lower_ceiling() {
    let scraper = FakeScraper::default().with_page("Roland RE-201", Some(ECHO_PAGE));
    let extractor = FakeExtractor::default().with_payload("Roland RE-201", echo_payload());
    let monitor = monitor(scraper, extractor, RunMode::DryRun);

    let (reports, output) = run(&monitor, &[echo_watch(300.0)]).await;
    assert_eq!(reports[0].outcome, WatchOutcome::NoMatches);
    assert!(output.contains("  No matches found for RE-201 Watch"));
}

#[tokio::test]
async fn extractor_receives_cleaned_markdown() {
    let scraper = FakeScraper::default().with_page("Roland RE-201", Some(ECHO_PAGE));
    let extractor = FakeExtractor::default().with_payload("Roland RE-201", echo_payload());
    let monitor = monitor(scraper, extractor.clone(), RunMode::DryRun);

    run(&monitor, &[echo_watch(320.0)]).await;

    let received = extractor.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].contains("![banner]"));
    assert!(!received[0].contains("?bk="));
    assert!(!received[0].contains("Sort by"));
    assert!(received[0].contains("Roland RE-201 AC Adapter"));
}

#[tokio::test]
async fn failing_watch_does_not_stop_the_run() {
    let scraper = FakeScraper::default()
        .with_page("Roland RE-201", Some(ECHO_PAGE))
        .with_page("Boss DD-3", Some("## [Boss DD-3](https://reverb.com/item/3-dd3)\n\n$90"));
    let extractor = FakeExtractor::default()
        .with_payload("Roland RE-201", echo_payload())
        .with_payload("Boss DD-3", json!({ "listings": [{ "title": "Boss DD-3" }] }));
    let monitor = monitor(scraper, extractor, RunMode::DryRun);

    let watches = vec![
        Watch::new("Juno", "Roland Juno-60", 1_500.0),
        Watch::new("Delay", "Boss DD-3", 100.0),
        echo_watch(320.0),
    ];
    let (reports, output) = run(&monitor, &watches).await;

    assert_eq!(reports.len(), 3);
    assert!(matches!(&reports[0].outcome, WatchOutcome::Failed(reason) if reason.contains("503")));
    assert!(matches!(&reports[1].outcome, WatchOutcome::Failed(reason) if reason.contains("missing field")));
    assert!(matches!(&reports[2].outcome, WatchOutcome::Matched { .. }));

    assert!(output.contains("  Failed to check Juno: "));
    assert!(output.contains("  Failed to check Delay: "));
    assert!(output.contains("  Found 1 match(es) for RE-201 Watch"));
}

#[tokio::test]
async fn empty_page_skips_extraction() {
    let scraper = FakeScraper::default()
        .with_page("Roland RE-201", None)
        .with_page("Boss DD-3", Some("## Sort by\n\nnothing here"));
    let extractor = FakeExtractor::default();
    let monitor = monitor(scraper, extractor.clone(), RunMode::DryRun);

    let watches = vec![echo_watch(320.0), Watch::new("Delay", "Boss DD-3", 100.0)];
    let (reports, _) = run(&monitor, &watches).await;

    assert_eq!(reports[0].outcome, WatchOutcome::NoMatches);
    assert_eq!(reports[1].outcome, WatchOutcome::NoMatches);
    assert!(extractor.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rerun_with_open_alert_is_a_no_op() {
    let tracker = FakeTracker::default();
    let build = |tracker: &FakeTracker| {
        monitor(
            FakeScraper::default().with_page("Roland RE-201", Some(ECHO_PAGE)),
            FakeExtractor::default().with_payload("Roland RE-201", echo_payload()),
            RunMode::Execute(AlertDispatcher::new(Box::new(tracker.clone()), "deal-alert")),
        )
    };

    let (first, output) = run(&build(&tracker), &[echo_watch(320.0)]).await;
    assert!(matches!(
        &first[0].outcome,
        WatchOutcome::Matched { alert: Some(DispatchOutcome::Created), .. }
    ));
    assert!(output.contains("  Created issue for RE-201 Watch"));

    let (second, output) = run(&build(&tracker), &[echo_watch(320.0)]).await;
    assert!(matches!(
        &second[0].outcome,
        WatchOutcome::Matched { alert: Some(DispatchOutcome::Skipped(SkipReason::AlreadyOpen)), .. }
    ));
    assert!(output.contains("  Issue already open for RE-201 Watch, skipping"));

    let issues = tracker.issues.lock().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].title, "Deal Alert: RE-201 Watch");
}
