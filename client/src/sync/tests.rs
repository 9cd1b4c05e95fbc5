use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use futures::channel::oneshot;
use futures::executor::block_on;
use futures::{join, pin_mut, poll};
use rstest::rstest;
use uuid::Uuid;

use paging::{PageRequest, PagedResult};

use crate::api::{IncidentApi, IncidentChanges, MockIncidentApi, NewIncident, TransportError};
use crate::filter::Filter;
use crate::model::{
    ApiErrorBody, Comment, ErrorCode, FieldError, Incident, IncidentPriority, IncidentStatus,
    UserKind, UserRef,
};

use super::{ListSynchronizer, MutationReport, Phase};

type ListResult = Result<PagedResult<Incident>, TransportError>;

/// Transport whose `list` responses resolve only when the test says so.
/// Each call consumes the next scripted channel in order.
struct ScriptedApi {
    scripted: Mutex<VecDeque<oneshot::Receiver<ListResult>>>,
    list_calls: AtomicUsize,
}

impl ScriptedApi {
    fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Script one pending `list` response; the returned sender resolves it.
    fn script(&self) -> oneshot::Sender<ListResult> {
        let (tx, rx) = oneshot::channel();
        self.scripted
            .lock()
            .expect("scripted queue poisoned")
            .push_back(rx);
        tx
    }

    /// Script one `list` response that resolves immediately.
    fn script_ready(&self, result: ListResult) {
        let tx = self.script();
        let _ = tx.send(result);
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncidentApi for ScriptedApi {
    async fn list(&self, _page: PageRequest) -> ListResult {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rx = self
            .scripted
            .lock()
            .map_err(|_| TransportError::Network("scripted queue poisoned".into()))?
            .pop_front()
            .ok_or_else(|| TransportError::Network("unscripted list call".into()))?;
        rx.await
            .map_err(|_| TransportError::Network("script cancelled".into()))?
    }

    async fn get_by_id(&self, _id: Uuid) -> Result<Option<Incident>, TransportError> {
        Err(TransportError::Network("not scripted".into()))
    }

    async fn create(&self, _new: NewIncident) -> Result<Incident, TransportError> {
        Err(TransportError::Network("not scripted".into()))
    }

    async fn update(
        &self,
        _id: Uuid,
        _changes: IncidentChanges,
    ) -> Result<Incident, TransportError> {
        Err(TransportError::Network("not scripted".into()))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), TransportError> {
        Err(TransportError::Network("not scripted".into()))
    }

    async fn add_comment(
        &self,
        _incident_id: Uuid,
        _content: String,
    ) -> Result<Comment, TransportError> {
        Err(TransportError::Network("not scripted".into()))
    }
}

fn requester() -> UserRef {
    UserRef {
        id: Uuid::new_v4(),
        name: "Ana".into(),
        email: "ana@example.test".into(),
        kind: UserKind::Requester,
        avatar: None,
    }
}

fn incident(title: &str) -> Incident {
    let now = Utc::now();
    Incident {
        id: Uuid::new_v4(),
        title: title.into(),
        description: format!("{title} description"),
        status: IncidentStatus::Open,
        priority: IncidentPriority::Medium,
        category: "Software".into(),
        created_at: now,
        updated_at: now,
        created_by: requester(),
        assigned_to: None,
        comments: Vec::new(),
    }
}

fn incidents(prefix: &str, count: usize) -> Vec<Incident> {
    (0..count).map(|n| incident(&format!("{prefix}-{n}"))).collect()
}

fn page(items: Vec<Incident>, current: u32, total_pages: u32, total_count: u64) -> PagedResult<Incident> {
    PagedResult {
        items,
        current_page: current,
        total_pages,
        total_count,
    }
}

fn network_error() -> TransportError {
    TransportError::Network("connection reset".into())
}

fn titles(sync: &ListSynchronizer) -> Vec<String> {
    sync.snapshot().items.iter().map(|i| i.title.clone()).collect()
}

#[rstest]
fn refresh_populates_the_list() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("a", 2), 1, 1, 2)));
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.phase, Phase::Loaded);
    assert_eq!(snapshot.items.len(), 2);
    assert!(!snapshot.has_more);
    assert!(snapshot.error.is_none());
    assert_eq!(api.list_calls(), 1);
}

#[rstest]
fn latest_filter_wins_even_when_its_response_arrives_first() {
    let api = Arc::new(ScriptedApi::new());
    let tx_old = api.script();
    let tx_new = api.script();
    let sync = ListSynchronizer::new(api.clone(), 10);

    let old_filter = Filter {
        search: Some("printer".into()),
        ..Filter::default()
    };
    let new_filter = Filter {
        status: Some(IncidentStatus::Open),
        ..Filter::default()
    };

    block_on(async {
        let first = sync.set_filters(old_filter);
        pin_mut!(first);
        assert!(poll!(first.as_mut()).is_pending());

        let second = sync.set_filters(new_filter.clone());
        pin_mut!(second);
        assert!(poll!(second.as_mut()).is_pending());

        // The fresh response lands and is applied first.
        let _ = tx_new.send(Ok(page(incidents("new", 3), 1, 1, 3)));
        assert!(poll!(second.as_mut()).is_ready());

        // The superseded response arrives afterwards and must be dropped.
        let _ = tx_old.send(Ok(page(incidents("old", 5), 1, 1, 5)));
        assert!(poll!(first.as_mut()).is_ready());
    });

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.filter, new_filter);
    assert_eq!(
        titles(&sync),
        ["new-0", "new-1", "new-2"],
        "superseded page must not overwrite the fresh one"
    );
}

#[rstest]
fn concurrent_filter_changes_settle_on_the_last_one() {
    let api = Arc::new(ScriptedApi::new());
    let tx_first = api.script();
    let tx_second = api.script();
    let sync = ListSynchronizer::new(api.clone(), 10);

    let last_filter = Filter {
        priority: Some(IncidentPriority::Medium),
        ..Filter::default()
    };

    block_on(async {
        join!(
            sync.set_filters(Filter {
                search: Some("vpn".into()),
                ..Filter::default()
            }),
            sync.set_filters(last_filter.clone()),
            async {
                let _ = tx_first.send(Ok(page(incidents("first", 2), 1, 1, 2)));
                let _ = tx_second.send(Ok(page(incidents("second", 2), 1, 1, 2)));
            }
        );
    });

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.filter, last_filter);
    assert_eq!(titles(&sync), ["second-0", "second-1"]);
    assert_eq!(api.list_calls(), 2);
}

#[rstest]
fn load_more_appends_the_next_page() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("p1", 10), 1, 3, 25)));
    api.script_ready(Ok(page(incidents("p2", 10), 2, 3, 25)));
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());
    block_on(sync.load_more());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.items.len(), 20);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.items[0].title, "p1-0");
    assert_eq!(snapshot.items[10].title, "p2-0");
}

#[rstest]
fn overlapping_load_more_calls_fetch_one_page() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("p1", 10), 1, 3, 25)));
    let tx_page = api.script();
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());
    block_on(async {
        join!(sync.load_more(), sync.load_more(), async {
            let _ = tx_page.send(Ok(page(incidents("p2", 10), 2, 3, 25)));
        });
    });

    assert_eq!(api.list_calls(), 2, "second load_more must be a no-op");
    assert_eq!(sync.snapshot().items.len(), 20);
}

#[rstest]
fn load_more_without_further_pages_is_a_no_op() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("only", 3), 1, 1, 3)));
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());
    block_on(sync.load_more());

    assert_eq!(api.list_calls(), 1);
    assert_eq!(sync.snapshot().items.len(), 3);
}

#[rstest]
fn load_more_before_first_load_is_a_no_op() {
    let api = Arc::new(ScriptedApi::new());
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.load_more());

    assert_eq!(api.list_calls(), 0);
    assert_eq!(sync.snapshot().phase, Phase::Idle);
}

#[rstest]
fn failed_refresh_retains_items_and_reports_the_error() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("kept", 4), 1, 1, 4)));
    api.script_ready(Err(network_error()));
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());
    block_on(sync.refresh());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.phase, Phase::Failed);
    assert_eq!(snapshot.items.len(), 4, "items survive a failed refresh");
    assert_eq!(
        snapshot.error.as_deref(),
        Some("network error: connection reset")
    );
}

#[rstest]
fn failed_load_more_retains_items() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("p1", 10), 1, 2, 12)));
    api.script_ready(Err(network_error()));
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());
    block_on(sync.load_more());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.phase, Phase::Failed);
    assert_eq!(snapshot.items.len(), 10);
    assert!(snapshot.has_more, "the unfetched page is still out there");
}

#[rstest]
fn overlapping_pages_do_not_duplicate_incidents() {
    let api = Arc::new(ScriptedApi::new());
    let mut first = incidents("p1", 10);
    let straddler = incident("straddler");
    first.push(straddler.clone());
    // The straddler shifted onto page two between the requests.
    let mut second = vec![straddler];
    second.extend(incidents("p2", 9));
    api.script_ready(Ok(page(first, 1, 2, 20)));
    api.script_ready(Ok(page(second, 2, 2, 20)));
    let sync = ListSynchronizer::new(api.clone(), 11);

    block_on(sync.refresh());
    block_on(sync.load_more());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.items.len(), 20);
    let straddler_count = snapshot
        .items
        .iter()
        .filter(|i| i.title == "straddler")
        .count();
    assert_eq!(straddler_count, 1);
}

#[rstest]
fn stale_load_more_after_filter_change_is_discarded() {
    let api = Arc::new(ScriptedApi::new());
    api.script_ready(Ok(page(incidents("p1", 10), 1, 2, 12)));
    let tx_more = api.script();
    let tx_filtered = api.script();
    let sync = ListSynchronizer::new(api.clone(), 10);

    block_on(sync.refresh());
    block_on(async {
        let more = sync.load_more();
        pin_mut!(more);
        assert!(poll!(more.as_mut()).is_pending());

        let filtered = sync.set_filters(Filter {
            status: Some(IncidentStatus::Open),
            ..Filter::default()
        });
        pin_mut!(filtered);
        assert!(poll!(filtered.as_mut()).is_pending());

        let _ = tx_filtered.send(Ok(page(incidents("filtered", 2), 1, 1, 2)));
        assert!(poll!(filtered.as_mut()).is_ready());

        let _ = tx_more.send(Ok(page(incidents("p2", 2), 2, 2, 12)));
        assert!(poll!(more.as_mut()).is_ready());
    });

    assert_eq!(
        titles(&sync),
        ["filtered-0", "filtered-1"],
        "page fetched under the old filter must not leak in"
    );
}

#[rstest]
fn create_prepends_the_new_incident() {
    let created = incident("freshly filed");
    let mut api = MockIncidentApi::new();
    let existing = page(incidents("existing", 2), 1, 1, 2);
    api.expect_list().return_once(move |_| Ok(existing));
    let returned = created.clone();
    api.expect_create().return_once(move |_| Ok(returned));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.refresh());
    let report = block_on(sync.create(NewIncident {
        title: "freshly filed".into(),
        description: "it broke".into(),
        priority: IncidentPriority::High,
        category: "Hardware".into(),
    }));

    assert!(report.success);
    assert_eq!(report.value, Some(created));
    assert_eq!(titles(&sync), ["freshly filed", "existing-0", "existing-1"]);
}

#[rstest]
fn update_replaces_the_incident_in_place() {
    let listed = incidents("row", 3);
    let mut changed = listed[1].clone();
    changed.status = IncidentStatus::Resolved;
    changed.title = "row-1 resolved".into();

    let mut api = MockIncidentApi::new();
    let fetched = page(listed, 1, 1, 3);
    api.expect_list().return_once(move |_| Ok(fetched));
    let returned = changed.clone();
    api.expect_update().return_once(move |_, _| Ok(returned));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.refresh());
    let report = block_on(sync.update(changed.id, IncidentChanges::default()));

    assert!(report.success);
    assert_eq!(titles(&sync), ["row-0", "row-1 resolved", "row-2"]);
}

#[rstest]
fn update_out_of_the_active_filter_hides_the_incident() {
    let listed = incidents("open", 2);
    let mut resolved = listed[0].clone();
    resolved.status = IncidentStatus::Resolved;

    let mut api = MockIncidentApi::new();
    let fetched = page(listed, 1, 1, 2);
    api.expect_list().return_once(move |_| Ok(fetched));
    let returned = resolved.clone();
    api.expect_update().return_once(move |_, _| Ok(returned));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.set_filters(Filter {
        status: Some(IncidentStatus::Open),
        ..Filter::default()
    }));
    assert_eq!(sync.snapshot().items.len(), 2);

    let report = block_on(sync.update(resolved.id, IncidentChanges::default()));

    assert!(report.success);
    assert_eq!(
        titles(&sync),
        ["open-1"],
        "the resolved incident no longer matches the open filter"
    );
}

#[rstest]
fn remove_drops_the_incident_from_the_list() {
    let listed = incidents("row", 3);
    let victim = listed[1].id;

    let mut api = MockIncidentApi::new();
    let fetched = page(listed, 1, 1, 3);
    api.expect_list().return_once(move |_| Ok(fetched));
    api.expect_delete().return_once(|_| Ok(()));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.refresh());
    let report = block_on(sync.remove(victim));

    assert!(report.success);
    assert_eq!(titles(&sync), ["row-0", "row-2"]);
}

#[rstest]
fn comment_lands_inside_the_listed_incident() {
    let listed = incidents("row", 2);
    let target = listed[0].clone();
    let comment = Comment {
        id: Uuid::new_v4(),
        content: "restarted the service".into(),
        author: requester(),
        incident_id: target.id,
        created_at: Utc::now(),
    };

    let mut api = MockIncidentApi::new();
    let fetched = page(listed, 1, 1, 2);
    api.expect_list().return_once(move |_| Ok(fetched));
    let returned = comment.clone();
    api.expect_add_comment().return_once(move |_, _| Ok(returned));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.refresh());
    let report = block_on(sync.add_comment(target.id, "restarted the service".into()));

    assert!(report.success);
    let snapshot = sync.snapshot();
    let listed_target = snapshot
        .items
        .iter()
        .find(|i| i.id == target.id)
        .expect("target still listed");
    assert_eq!(listed_target.comments, vec![comment]);
}

#[rstest]
fn failed_mutation_reports_the_error_and_leaves_the_list_alone() {
    let mut api = MockIncidentApi::new();
    let fetched = page(incidents("row", 2), 1, 1, 2);
    api.expect_list().return_once(move |_| Ok(fetched));
    api.expect_create().return_once(|_| {
        Err(TransportError::Api(ApiErrorBody {
            code: ErrorCode::Validation,
            message: "validation failed".into(),
            field_errors: vec![FieldError {
                field: "title".into(),
                message: "title must not be blank".into(),
            }],
        }))
    });

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.refresh());
    let report = block_on(sync.create(NewIncident {
        title: "  ".into(),
        description: "it broke".into(),
        priority: IncidentPriority::Low,
        category: "Software".into(),
    }));

    assert_eq!(
        report,
        MutationReport {
            success: false,
            value: None,
            error: Some("validation failed".into()),
        }
    );
    assert_eq!(sync.snapshot().items.len(), 2);
}

#[rstest]
fn get_by_id_refreshes_the_listed_copy() {
    let listed = incidents("row", 2);
    let mut detailed = listed[0].clone();
    detailed.description = "now with full history".into();

    let mut api = MockIncidentApi::new();
    let fetched = page(listed, 1, 1, 2);
    api.expect_list().return_once(move |_| Ok(fetched));
    let returned = detailed.clone();
    api.expect_get_by_id().return_once(move |_| Ok(Some(returned)));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    block_on(sync.refresh());
    let fetched_detail = block_on(sync.get_by_id(detailed.id)).expect("transport ok");

    assert_eq!(fetched_detail, Some(detailed.clone()));
    let snapshot = sync.snapshot();
    let listed_copy = snapshot
        .items
        .iter()
        .find(|i| i.id == detailed.id)
        .expect("still listed");
    assert_eq!(listed_copy.description, "now with full history");
}

#[rstest]
fn get_by_id_of_unknown_incident_returns_none() {
    let mut api = MockIncidentApi::new();
    api.expect_get_by_id().return_once(|_| Ok(None));

    let sync = ListSynchronizer::new(Arc::new(api), 10);
    let fetched = block_on(sync.get_by_id(Uuid::new_v4())).expect("transport ok");

    assert_eq!(fetched, None);
}
