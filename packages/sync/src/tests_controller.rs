//! Controller tests driven on a paused clock.
//! Covers debounce coalescing, echo suppression, external changes,
//! structured edits, templates and disposal.
use crate::*;
use async_trait::async_trait;
use markban_editor::{BoardSettingsPatch, ColumnSettingsPatch, Mutation};
use markban_parser::Board;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;

const BOARD: &str = "## Todo\n\n- [ ] First task\n\n## Done [auto-complete]\n";

struct Harness<F: SyncFormat, S> {
    store: Arc<S>,
    handle: ControllerHandle<F>,
    from_host: mpsc::Receiver<HostMessage<F::Model>>,
    events: mpsc::UnboundedReceiver<SyncEvent>,
}

fn start_with<F: SyncFormat, S: DocumentStore>(
    format: F,
    store: S,
    templates: Option<Arc<TemplateLibrary>>,
) -> Harness<F, S> {
    let store = Arc::new(store);
    let (observer, events) = mpsc::unbounded_channel();
    let (handle, from_host) = spawn(
        format,
        store.clone(),
        ControllerOptions {
            config: SyncConfig::default(),
            display_name: None,
            templates,
            observer: Some(observer),
        },
    );
    Harness {
        store,
        handle,
        from_host,
        events,
    }
}

fn start(text: &str) -> Harness<BoardFormat, MemoryStore> {
    start_with(BoardFormat, MemoryStore::new("board.md", text), None)
}

fn drain(events: &mut mpsc::UnboundedReceiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

async fn ready<S>(harness: &mut Harness<BoardFormat, S>) -> Board {
    harness.handle.send(ViewMessage::Ready).await.unwrap();
    match harness.from_host.recv().await.unwrap() {
        HostMessage::Init { model, .. } => model,
        other => panic!("expected init, got {:?}", other),
    }
}

fn update(content: &str) -> ViewMessage<Mutation> {
    ViewMessage::Update {
        content: content.to_string(),
    }
}

/// Wait long enough for any debounce and settle window to close
async fn quiesce() {
    sleep(Duration::from_millis(1_000)).await;
}

#[tokio::test(start_paused = true)]
async fn test_ready_sends_init() {
    let mut h = start(BOARD);
    h.handle.send(ViewMessage::Ready).await.unwrap();

    match h.from_host.recv().await.unwrap() {
        HostMessage::Init {
            content,
            display_name,
            model,
        } => {
            assert_eq!(content, BOARD);
            assert_eq!(display_name, "board.md");
            assert_eq!(model.columns.len(), 2);
            assert_eq!(model.columns[0].cards[0].text, "First task");
        }
        other => panic!("expected init, got {:?}", other),
    }
    assert!(drain(&mut h.events).contains(&SyncEvent::Initialized {
        display_name: "board.md".to_string()
    }));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_updates_coalesce_into_one_write() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    for i in 0..5 {
        h.handle
            .send(update(&format!("## Todo {}\n", i)))
            .await
            .unwrap();
        sleep(Duration::from_millis(50)).await;
    }
    assert!(h.store.writes().is_empty());

    quiesce().await;
    assert_eq!(h.store.writes(), vec!["## Todo 4\n".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_own_write_is_not_pushed_back() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.handle.send(update("## Todo\n\n- [x] First task\n")).await.unwrap();
    quiesce().await;

    assert_eq!(h.store.writes().len(), 1);
    assert!(h.from_host.try_recv().is_err());

    let events = drain(&mut h.events);
    assert!(events
        .iter()
        .any(|e| matches!(e, SyncEvent::Persisted { bytes, .. } if *bytes == 26)));
    assert!(events.contains(&SyncEvent::EchoSuppressed));
    assert!(!events.contains(&SyncEvent::ExternalChange));
}

#[tokio::test(start_paused = true)]
async fn test_view_echo_of_init_does_not_write() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.handle.send(update(BOARD)).await.unwrap();
    quiesce().await;
    assert!(h.store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_external_change_is_pushed_to_view() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.store.set_external("## Review\n\n- [ ] Outside edit\n");

    match h.from_host.recv().await.unwrap() {
        HostMessage::Update { content, model } => {
            assert_eq!(content, "## Review\n\n- [ ] Outside edit\n");
            assert_eq!(model.columns[0].title, "Review");
            assert_eq!(model.columns[0].cards[0].text, "Outside edit");
        }
        other => panic!("expected update, got {:?}", other),
    }
    assert!(drain(&mut h.events).contains(&SyncEvent::ExternalChange));
    assert!(h.store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_external_change_after_settle_window() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.handle.send(update("## Mine\n")).await.unwrap();
    quiesce().await;

    h.store.set_external("## Theirs\n");
    let pushed = h.from_host.recv().await.unwrap();
    assert_eq!(pushed.content(), Some("## Theirs\n"));
}

#[tokio::test(start_paused = true)]
async fn test_external_change_during_pending_write_is_overwritten() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.handle.send(update("## Mine\n")).await.unwrap();
    sleep(Duration::from_millis(20)).await;
    h.store.set_external("## Theirs\n");
    quiesce().await;

    assert!(h.from_host.try_recv().is_err());
    assert_eq!(h.store.text(), "## Mine\n");
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_warns_without_retry() {
    let mut h = start(BOARD);
    ready(&mut h).await;
    h.store.fail_writes(true);

    h.handle.send(update("## Lost\n")).await.unwrap();
    quiesce().await;
    quiesce().await;

    let events = drain(&mut h.events);
    let failures = events
        .iter()
        .filter(|e| matches!(e, SyncEvent::PersistFailed { .. }))
        .count();
    assert_eq!(failures, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::Warning { message } if message.contains("writes disabled")
    )));
    assert_eq!(h.store.text(), BOARD);

    // the controller keeps working after a failure
    h.store.fail_writes(false);
    h.store.set_external("## Recovered\n");
    let pushed = h.from_host.recv().await.unwrap();
    assert_eq!(pushed.content(), Some("## Recovered\n"));
}

#[tokio::test(start_paused = true)]
async fn test_edit_mutation_is_applied_and_saved() {
    let mut h = start(BOARD);
    let model = ready(&mut h).await;
    let card_id = model.columns[0].cards[0].id.clone();
    let done_id = model.columns[1].id.clone();

    h.handle
        .send(ViewMessage::Edit {
            mutation: Mutation::MoveCard {
                card_id,
                to_column_id: done_id,
                to_index: 0,
            },
        })
        .await
        .unwrap();

    let expected = "## Todo\n\n## Done [auto-complete]\n\n- [x] First task\n";
    match h.from_host.recv().await.unwrap() {
        HostMessage::Update { content, model } => {
            assert_eq!(content, expected);
            assert!(model.columns[1].cards[0].completed);
        }
        other => panic!("expected update, got {:?}", other),
    }

    quiesce().await;
    assert_eq!(h.store.writes(), vec![expected.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_added_card_id_is_usable_in_next_edit() {
    let mut h = start(BOARD);
    let model = ready(&mut h).await;
    let todo_id = model.columns[0].id.clone();

    h.handle
        .send(ViewMessage::Edit {
            mutation: Mutation::AddCard {
                column_id: todo_id,
                text: "Second task".to_string(),
                at_index: None,
            },
        })
        .await
        .unwrap();
    let model = match h.from_host.recv().await.unwrap() {
        HostMessage::Update { model, .. } => model,
        other => panic!("expected update, got {:?}", other),
    };
    let new_id = model.columns[0].cards[1].id.clone();

    h.handle
        .send(ViewMessage::Edit {
            mutation: Mutation::ToggleCard { card_id: new_id },
        })
        .await
        .unwrap();
    let pushed = h.from_host.recv().await.unwrap();
    assert_eq!(
        pushed.content(),
        Some("## Todo\n\n- [ ] First task\n- [x] Second task\n\n## Done [auto-complete]\n")
    );

    quiesce().await;
    assert_eq!(h.store.writes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_edit_with_unknown_id_does_nothing() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.handle
        .send(ViewMessage::Edit {
            mutation: Mutation::DeleteCard {
                card_id: "missing".to_string(),
            },
        })
        .await
        .unwrap();
    quiesce().await;

    assert!(h.from_host.try_recv().is_err());
    assert!(h.store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_edit_that_keeps_the_text_is_not_pushed() {
    let mut h = start(BOARD);
    let model = ready(&mut h).await;
    let done_id = model.columns[1].id.clone();

    let edits = vec![
        Mutation::UpdateBoardSettings {
            settings: BoardSettingsPatch::default(),
        },
        Mutation::UpdateColumnSettings {
            column_id: done_id,
            settings: ColumnSettingsPatch {
                auto_complete: Some(true),
            },
        },
        // explicit "show" serializes the same as the default
        Mutation::UpdateBoardSettings {
            settings: BoardSettingsPatch {
                show_thumbnails: Some(true),
            },
        },
    ];
    for mutation in edits {
        h.handle.send(ViewMessage::Edit { mutation }).await.unwrap();
    }
    quiesce().await;

    assert!(h.from_host.try_recv().is_err());
    assert!(h.store.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_passthrough_reaches_observer() {
    let mut h = start(BOARD);
    h.handle
        .send(ViewMessage::Passthrough {
            kind: "openLink".to_string(),
            payload: serde_json::json!({ "href": "https://example.com" }),
        })
        .await
        .unwrap();
    quiesce().await;

    assert!(drain(&mut h.events).contains(&SyncEvent::Passthrough {
        kind: "openLink".to_string(),
        payload: serde_json::json!({ "href": "https://example.com" }),
    }));
}

#[tokio::test(start_paused = true)]
async fn test_markdown_format_round_trips_text() {
    let mut h = start_with(
        MarkdownFormat,
        MemoryStore::new("notes.md", "# Notes\n"),
        None,
    );
    h.handle.send(ViewMessage::Ready).await.unwrap();
    match h.from_host.recv().await.unwrap() {
        HostMessage::Init { content, model, .. } => {
            assert_eq!(content, "# Notes\n");
            assert_eq!(model, "# Notes\n");
        }
        other => panic!("expected init, got {:?}", other),
    }

    h.handle
        .send(ViewMessage::Update {
            content: "# Notes\n\nmore\n".to_string(),
        })
        .await
        .unwrap();
    quiesce().await;
    assert_eq!(h.store.writes(), vec!["# Notes\n\nmore\n".to_string()]);
}

#[tokio::test]
async fn test_templates_on_request_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sprint.md"), "## Todo\n").unwrap();
    let library = Arc::new(TemplateLibrary::new());
    library.init(dir.path()).await.unwrap();

    let mut h = start_with(
        BoardFormat,
        MemoryStore::new("board.md", BOARD),
        Some(library.clone()),
    );

    h.handle.send(ViewMessage::RequestTemplates).await.unwrap();
    match h.from_host.recv().await.unwrap() {
        HostMessage::Templates { templates } => {
            assert_eq!(templates.len(), 1);
            assert_eq!(templates[0].name, "sprint");
        }
        other => panic!("expected templates, got {:?}", other),
    }

    std::fs::write(dir.path().join("bugs.md"), "## Triage\n").unwrap();
    library.reload().await.unwrap();
    match h.from_host.recv().await.unwrap() {
        HostMessage::Templates { templates } => {
            let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
            assert_eq!(names, vec!["bugs", "sprint"]);
        }
        other => panic!("expected templates, got {:?}", other),
    }
}

#[tokio::test]
async fn test_templates_without_library_are_empty() {
    let mut h = start(BOARD);
    h.handle.send(ViewMessage::RequestTemplates).await.unwrap();
    assert_eq!(
        h.from_host.recv().await.unwrap(),
        HostMessage::Templates {
            templates: Vec::new()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_pending_write() {
    let mut h = start(BOARD);
    ready(&mut h).await;

    h.handle.send(update("## Never saved\n")).await.unwrap();
    sleep(Duration::from_millis(20)).await;
    h.handle.dispose().await;
    quiesce().await;

    assert!(h.store.writes().is_empty());
    assert!(h.from_host.recv().await.is_none());
    assert_eq!(drain(&mut h.events).last(), Some(&SyncEvent::Disposed));
}

/// Store whose writes take a while
struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn get_text(&self) -> StoreResult<String> {
        self.inner.get_text().await
    }

    async fn replace_all(&self, text: &str) -> StoreResult<()> {
        sleep(self.delay).await;
        self.inner.replace_all(text).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.subscribe()
    }

    fn display_name(&self) -> String {
        self.inner.display_name()
    }
}

#[tokio::test(start_paused = true)]
async fn test_dispose_during_write_discards_result() {
    let store = SlowStore {
        inner: MemoryStore::new("board.md", BOARD),
        delay: Duration::from_secs(1),
    };
    let mut h = start_with(BoardFormat, store, None);
    ready(&mut h).await;

    h.handle.send(update("## In flight\n")).await.unwrap();
    sleep(Duration::from_millis(200)).await;
    h.handle.dispose().await;

    let events = drain(&mut h.events);
    assert_eq!(events.last(), Some(&SyncEvent::Disposed));

    // the detached write still lands
    sleep(Duration::from_secs(2)).await;
    assert_eq!(h.store.inner.writes(), vec!["## In flight\n".to_string()]);
    assert!(!drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, SyncEvent::Persisted { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_disposes() {
    let h = start(BOARD);
    let Harness {
        handle,
        mut from_host,
        mut events,
        ..
    } = h;
    drop(handle);

    assert!(from_host.recv().await.is_none());
    assert_eq!(events.recv().await, Some(SyncEvent::Disposed));
}
