//! End-to-end reconciliation runs against an in-memory store and a fake
//! post client.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;
use tally_graph::{Author, Comment, CommentStream, GraphError, Post, PostClient};
use tally_reconcile::{CommentOutcome, ReconcileError, Reconciler, SkipReason};
use tally_settings::ReconcileSettings;
use tally_store::{ConnectionConfig, ContestStore, new_in_memory};

const POST_ID: &str = "100_200";

// ─────────────────────────────────────────────────────────────────────────────
// Fake client
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeClient {
    text: Mutex<String>,
    comments: Vec<Comment>,
    /// Comments that only show up from the second listing onward.
    late_comments: Vec<Comment>,
    /// Snapshot the text, then yield before returning it.
    yield_in_fetch: bool,
    fail_fetch: bool,
    fail_comments: bool,
    fail_write: bool,
    fail_reply: bool,
    fetches: Mutex<usize>,
    listings: Mutex<usize>,
    writes: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, String)>>,
}

impl FakeClient {
    fn new(text: &str, comments: Vec<Comment>) -> Self {
        Self {
            text: Mutex::new(text.to_owned()),
            comments,
            ..Self::default()
        }
    }

    fn text(&self) -> String {
        self.text.lock().clone()
    }
}

fn upstream(message: &str) -> GraphError {
    GraphError::Api {
        status: 500,
        message: message.to_owned(),
    }
}

#[async_trait]
impl PostClient for FakeClient {
    async fn fetch_post(&self, post_id: &str, _token: &str) -> tally_graph::Result<Post> {
        *self.fetches.lock() += 1;
        if self.fail_fetch {
            return Err(upstream("fetch failed"));
        }
        let text = self.text();
        if self.yield_in_fetch {
            tokio::task::yield_now().await;
        }
        Ok(Post {
            id: post_id.to_owned(),
            text,
            created_time: None,
        })
    }

    fn comments<'a>(
        &'a self,
        _post_id: &str,
        _token: &str,
        _since: Option<&str>,
    ) -> CommentStream<'a> {
        if self.fail_comments {
            let first = self.comments.first().cloned().map(Ok);
            let items = first
                .into_iter()
                .chain(std::iter::once(Err(GraphError::PageLimit { max_pages: 1 })));
            return Box::pin(futures::stream::iter(items.collect::<Vec<_>>()));
        }
        let mut comments = self.comments.clone();
        let mut listings = self.listings.lock();
        if *listings > 0 {
            comments.extend(self.late_comments.iter().cloned());
        }
        *listings += 1;
        Box::pin(futures::stream::iter(comments.into_iter().map(Ok)))
    }

    async fn write_post(&self, _post_id: &str, text: &str, _token: &str) -> tally_graph::Result<()> {
        if self.fail_write {
            return Err(upstream("write failed"));
        }
        self.writes.lock().push(text.to_owned());
        *self.text.lock() = text.to_owned();
        Ok(())
    }

    async fn reply_to_comment(
        &self,
        comment_id: &str,
        text: &str,
        _token: &str,
    ) -> tally_graph::Result<String> {
        if self.fail_reply {
            return Err(upstream("reply failed"));
        }
        self.replies
            .lock()
            .push((comment_id.to_owned(), text.to_owned()));
        Ok(format!("{comment_id}_reply"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn comment(id: &str, text: &str, name: &str) -> Comment {
    Comment {
        id: id.to_owned(),
        text: text.to_owned(),
        from: Some(Author {
            id: format!("u_{id}"),
            name: name.to_owned(),
        }),
        created_time: None,
    }
}

struct Harness {
    store: ContestStore,
    client: Arc<FakeClient>,
    reconciler: Reconciler,
    contest_id: i64,
}

fn harness_with(client: FakeClient, settings: ReconcileSettings) -> Harness {
    let store = ContestStore::open(new_in_memory(&ConnectionConfig::default()).unwrap()).unwrap();
    let contest_id = store.create_contest("Raffle", POST_ID, None).unwrap().id;
    let _ = store.save_token("page", "tok", None).unwrap();
    let client = Arc::new(client);
    let reconciler = Reconciler::new(store.clone(), client.clone(), settings);
    Harness {
        store,
        client,
        reconciler,
        contest_id,
    }
}

fn harness(client: FakeClient) -> Harness {
    harness_with(client, ReconcileSettings::default())
}

// ─────────────────────────────────────────────────────────────────────────────
// Assignment
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn taken_number_is_skipped_and_open_number_is_assigned() {
    let h = harness(FakeClient::new(
        "1. \n2. \n3. Bob",
        vec![
            comment("c1", "I want 3", "Carol"),
            comment("c2", "number 2 please", "Dave"),
        ],
    ));

    let report = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.assigned, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);
    assert!(report.post_updated);
    assert_eq!(
        report.details[0].outcome,
        CommentOutcome::Skipped {
            reason: SkipReason::NoneAvailable
        }
    );
    assert_eq!(report.details[1].outcome, CommentOutcome::Assigned { number: 2 });
    assert_eq!(report.details[1].user_name.as_deref(), Some("Dave"));

    assert_eq!(*h.client.writes.lock(), ["1. \n2. Dave\n3. Bob"]);
    let entries = h.store.list_entries(h.contest_id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].number, 2);
    assert_eq!(entries[0].comment_id, "c2");
}

#[tokio::test]
async fn second_run_assigns_nothing() {
    let h = harness(FakeClient::new(
        "1. \n2. \n3. Bob",
        vec![
            comment("c1", "I want 3", "Carol"),
            comment("c2", "number 2 please", "Dave"),
        ],
    ));

    let _ = h.reconciler.run(h.contest_id).await.unwrap();
    let second = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(second.assigned, 0);
    assert!(!second.post_updated);
    assert_eq!(
        second.details[1].outcome,
        CommentOutcome::Skipped {
            reason: SkipReason::AlreadyProcessed
        }
    );
    assert_eq!(h.client.writes.lock().len(), 1);
    assert_eq!(h.store.list_entries(h.contest_id).unwrap().len(), 1);
}

#[tokio::test]
async fn several_numbers_fall_through_to_first_open_one() {
    let h = harness(FakeClient::new(
        "1. Ann\n2. \n3. ",
        vec![comment("c1", "1 or 2 or 3", "Eve")],
    ));

    let report = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(report.assigned, 1);
    assert_eq!(report.details[0].outcome, CommentOutcome::Assigned { number: 2 });
    assert_eq!(h.client.text(), "1. Ann\n2. Eve\n3. ");
}

#[tokio::test]
async fn numbers_taken_in_store_are_skipped_even_if_post_shows_them_open() {
    let h = harness(FakeClient::new(
        "1. \n2. ",
        vec![comment("c9", "1 then 2", "Fay")],
    ));
    let _ = h.store.create_entry(h.contest_id, "c0", "Gus", 1).unwrap();

    let report = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(report.details[0].outcome, CommentOutcome::Assigned { number: 2 });
    assert_eq!(h.client.text(), "1. \n2. Fay");
}

#[tokio::test]
async fn later_comments_see_earlier_assignments_in_same_run() {
    let h = harness(FakeClient::new(
        "1. \n2. ",
        vec![comment("c1", "1", "Ann"), comment("c2", "1 or 2", "Bob")],
    ));

    let report = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(report.assigned, 2);
    assert_eq!(report.details[1].outcome, CommentOutcome::Assigned { number: 2 });
    assert_eq!(*h.client.writes.lock(), ["1. Ann\n2. Bob"]);
}

#[tokio::test]
async fn comment_without_numbers_is_skipped() {
    let h = harness(FakeClient::new("1. ", vec![comment("c1", "good luck all!", "Ann")]));

    let report = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(
        report.details[0].outcome,
        CommentOutcome::Skipped {
            reason: SkipReason::NoNumbers
        }
    );
    assert!(!report.post_updated);
    assert!(h.client.writes.lock().is_empty());
}

#[tokio::test]
async fn comment_without_author_is_an_error_and_run_continues() {
    let mut anonymous = comment("c1", "1", "");
    anonymous.from = None;
    let h = harness(FakeClient::new(
        "1. \n2. ",
        vec![anonymous, comment("c2", "1", "Ann")],
    ));

    let report = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(report.errors, 1);
    assert_eq!(report.assigned, 1);
    assert_matches!(
        &report.details[0].outcome,
        CommentOutcome::Error { error } if error == "comment has no author"
    );
    assert!(report.details[0].user_name.is_none());
    assert_eq!(h.client.text(), "1. Ann\n2. ");
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_contest_is_rejected() {
    let h = harness(FakeClient::new("1. ", vec![]));
    let err = h.reconciler.run(h.contest_id + 100).await.unwrap_err();
    assert_matches!(err, ReconcileError::ContestNotFound(_));
    assert!(err.is_validation());
    assert_eq!(*h.client.fetches.lock(), 0);
}

#[tokio::test]
async fn missing_token_is_rejected_before_fetching() {
    let store = ContestStore::open(new_in_memory(&ConnectionConfig::default()).unwrap()).unwrap();
    let contest_id = store.create_contest("Raffle", POST_ID, None).unwrap().id;
    let client = Arc::new(FakeClient::new("1. ", vec![comment("c1", "1", "Ann")]));
    let reconciler = Reconciler::new(store, client.clone(), ReconcileSettings::default());

    let err = reconciler.run(contest_id).await.unwrap_err();
    assert_matches!(err, ReconcileError::MissingToken);
    assert_eq!(*client.fetches.lock(), 0);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let h = harness(FakeClient::new("1. ", vec![comment("c1", "1", "Ann")]));
    let _ = h
        .store
        .save_token("page", "old", Some("2020-01-01T00:00:00Z"))
        .unwrap();

    let err = h.reconciler.run(h.contest_id).await.unwrap_err();
    assert_matches!(err, ReconcileError::TokenExpired(_));
    assert_eq!(*h.client.fetches.lock(), 0);
}

#[tokio::test]
async fn post_fetch_failure_aborts_run() {
    let h = harness(FakeClient {
        fail_fetch: true,
        ..FakeClient::new("1. ", vec![comment("c1", "1", "Ann")])
    });

    let err = h.reconciler.run(h.contest_id).await.unwrap_err();
    assert_matches!(err, ReconcileError::Fetch(_));
    assert!(h.store.list_entries(h.contest_id).unwrap().is_empty());
}

#[tokio::test]
async fn comment_fetch_failure_aborts_before_any_assignment() {
    let h = harness(FakeClient {
        fail_comments: true,
        ..FakeClient::new("1. ", vec![comment("c1", "1", "Ann")])
    });

    let err = h.reconciler.run(h.contest_id).await.unwrap_err();
    assert_matches!(err, ReconcileError::Fetch(GraphError::PageLimit { .. }));
    assert!(h.store.list_entries(h.contest_id).unwrap().is_empty());
    assert!(h.client.writes.lock().is_empty());
}

#[tokio::test]
async fn write_failure_rolls_back_run_entries() {
    let h = harness(FakeClient {
        fail_write: true,
        ..FakeClient::new(
            "1. \n2. \n3. ",
            vec![comment("c1", "1", "Ann"), comment("c2", "2", "Bob")],
        )
    });
    let _ = h.store.create_entry(h.contest_id, "c0", "Old", 3).unwrap();

    let err = h.reconciler.run(h.contest_id).await.unwrap_err();

    assert_matches!(err, ReconcileError::Write { rolled_back: 2, .. });
    let left = h.store.list_entries(h.contest_id).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].comment_id, "c0");
}

// ─────────────────────────────────────────────────────────────────────────────
// Replies
// ─────────────────────────────────────────────────────────────────────────────

fn replying() -> ReconcileSettings {
    ReconcileSettings {
        reply_to_assigned: true,
        reply_template: "{name} has #{number}".into(),
    }
}

#[tokio::test]
async fn replies_go_to_assigned_comments_only() {
    let h = harness_with(
        FakeClient::new(
            "1. \n2. ",
            vec![comment("c1", "2", "Ann"), comment("c2", "hello", "Bob")],
        ),
        replying(),
    );

    let _ = h.reconciler.run(h.contest_id).await.unwrap();

    assert_eq!(
        *h.client.replies.lock(),
        [("c1".to_owned(), "Ann has #2".to_owned())]
    );
}

#[tokio::test]
async fn reply_failure_does_not_fail_run() {
    let h = harness_with(
        FakeClient {
            fail_reply: true,
            ..FakeClient::new("1. ", vec![comment("c1", "1", "Ann")])
        },
        replying(),
    );

    let report = h.reconciler.run(h.contest_id).await.unwrap();
    assert_eq!(report.assigned, 1);
    assert_eq!(h.store.list_entries(h.contest_id).unwrap().len(), 1);
}

#[tokio::test]
async fn no_replies_when_disabled() {
    let h = harness(FakeClient::new("1. ", vec![comment("c1", "1", "Ann")]));
    let _ = h.reconciler.run(h.contest_id).await.unwrap();
    assert!(h.client.replies.lock().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_runs_for_one_contest_are_serialized() {
    // Both runs are in flight at once: each yields inside fetch_post. The
    // second run sees a newer comment, so if it read the post before the
    // first run wrote, its write would drop Ann.
    let h = harness(FakeClient {
        late_comments: vec![comment("c2", "2", "Bob")],
        yield_in_fetch: true,
        ..FakeClient::new("1. \n2. ", vec![comment("c1", "1", "Ann")])
    });

    let (a, b) = tokio::join!(
        h.reconciler.run(h.contest_id),
        h.reconciler.run(h.contest_id)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(*h.client.fetches.lock(), 2);
    assert_eq!(a.assigned + b.assigned, 2);
    assert_eq!(
        *h.client.writes.lock(),
        vec!["1. Ann\n2. ".to_owned(), "1. Ann\n2. Bob".to_owned()]
    );
    assert_eq!(h.client.text(), "1. Ann\n2. Bob");
    assert_eq!(h.store.list_entries(h.contest_id).unwrap().len(), 2);
}

#[tokio::test]
async fn runs_for_different_contests_interleave() {
    let h = harness(FakeClient {
        yield_in_fetch: true,
        ..FakeClient::new("1. \n2. ", vec![comment("c1", "1", "Ann")])
    });
    let other = h.store.create_contest("Other", "300_400", None).unwrap().id;

    let (a, b) = tokio::join!(h.reconciler.run(h.contest_id), h.reconciler.run(other));
    let (a, b) = (a.unwrap(), b.unwrap());

    // Both fetched the same open list before either wrote.
    assert_eq!(a.assigned, 1);
    assert_eq!(b.assigned, 1);
    assert_eq!(h.client.writes.lock().len(), 2);
}
