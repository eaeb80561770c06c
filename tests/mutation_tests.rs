use resto_admin::dialog::{
    DeleteDialog, DialogControls, DialogPolicy, FormField, NAME_REQUIRED_MESSAGE,
    RestaurantDialog,
};
use resto_admin::mutation::{
    CANCELLED_MESSAGE, MutationOutcome, Notice, NoticeLevel, PendingMutation, RecordingNotifier,
    SettlePolicy,
};
use resto_admin::{
    ClientError, InMemoryRestaurantsApi, MutationCoordinator, MutationPhase, MutationState,
    QueryCache, Restaurant, RestaurantCreate, RestaurantUpdate,
};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    api: Arc<InMemoryRestaurantsApi>,
    cache: QueryCache,
    notifier: Arc<RecordingNotifier>,
    coordinator: MutationCoordinator,
}

async fn harness(n: usize) -> Harness {
    let api = Arc::new(InMemoryRestaurantsApi::new());
    for i in 1..=n {
        api.store()
            .create(RestaurantCreate::new(format!("Restaurant {i}")))
            .await
            .unwrap();
    }
    let cache = QueryCache::new(api.clone(), 8);
    let notifier = Arc::new(RecordingNotifier::new());
    let coordinator = MutationCoordinator::new(cache.clone(), notifier.clone());

    Harness {
        api,
        cache,
        notifier,
        coordinator,
    }
}

async fn first_record(h: &Harness) -> Restaurant {
    h.api.store().list(0, 1).await.data.remove(0)
}

#[tokio::test]
async fn test_blank_name_never_reaches_network() {
    let h = harness(0).await;
    let mut dialog = RestaurantDialog::create();
    dialog.open();

    let err = dialog.submit(&h.coordinator).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.api.stats().total(), 0);
    assert_eq!(
        dialog.errors().get(&FormField::Name).map(String::as_str),
        Some(NAME_REQUIRED_MESSAGE)
    );
    assert!(dialog.is_open());
    assert_eq!(dialog.state().phase(), MutationPhase::Idle);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_whitespace_name_is_rejected_by_coordinator() {
    let h = harness(0).await;
    let state = MutationState::new();

    let err = h
        .coordinator
        .create(&state, RestaurantCreate::new("   "))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::validation("name", NAME_REQUIRED_MESSAGE)
    );
    assert_eq!(h.api.stats().create, 0);
}

#[tokio::test]
async fn test_create_refreshes_active_page() {
    let h = harness(12).await;
    let before = h.cache.fetch_page(1, 5).await.unwrap();
    assert_eq!(before.total_count, 12);

    let mut dialog = RestaurantDialog::create();
    dialog.open();
    dialog.set_field(FormField::Name, "Brand new");
    dialog.set_field(FormField::RevoTenant, "tenant-1");

    let created = dialog.submit(&h.coordinator).await.unwrap();
    assert_eq!(created.name, "Brand new");
    assert_eq!(created.revo_tenant.as_deref(), Some("tenant-1"));
    assert_eq!(created.revo_api_key, None);

    // settle invalidated the cache and refetched the active page
    assert_eq!(h.cache.generation(), 1);
    assert_eq!(h.api.stats().list, 2);
    let after = h.cache.fetch_page(1, 5).await.unwrap();
    assert_eq!(after.total_count, 13);
    assert_eq!(h.api.stats().list, 2);

    assert!(!dialog.is_open());
    assert_eq!(dialog.form().get(FormField::Name), "");
    assert_eq!(
        h.notifier.last(),
        Some(Notice::success("Restaurant created successfully."))
    );
}

#[tokio::test]
async fn test_failed_update_keeps_dialog_open_with_user_values() {
    let h = harness(1).await;
    let record = first_record(&h).await;

    let mut dialog = RestaurantDialog::edit(&record);
    dialog.open();
    dialog.set_field(FormField::Name, "Renamed");
    dialog.set_field(FormField::RevoApiKey, "key-42");

    h.api
        .fail_next_mutation(ClientError::server(500, "database unavailable"));
    let err = dialog.submit(&h.coordinator).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(dialog.is_open());
    assert_eq!(dialog.form().get(FormField::Name), "Renamed");
    assert_eq!(dialog.form().get(FormField::RevoApiKey), "key-42");
    assert_eq!(
        dialog.state().phase(),
        MutationPhase::Settled(MutationOutcome::Failure(err))
    );

    let notice = h.notifier.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "database unavailable");

    // the stored record is untouched
    assert_eq!(first_record(&h).await.name, record.name);
}

#[tokio::test]
async fn test_edit_dialog_clears_emptied_optional_field() {
    let h = harness(0).await;
    h.api
        .store()
        .create(RestaurantCreate::new("Osteria").revo_tenant("osteria"))
        .await
        .unwrap();
    let record = first_record(&h).await;

    let mut dialog = RestaurantDialog::edit(&record);
    dialog.open();
    dialog.set_field(FormField::RevoTenant, "  ");
    let updated = dialog.submit(&h.coordinator).await.unwrap();

    assert_eq!(updated.revo_tenant, None);
    assert_eq!(first_record(&h).await.revo_tenant, None);
    assert_eq!(updated.name, "Osteria");
}

#[tokio::test]
async fn test_failure_without_server_message_uses_generic_notice() {
    let h = harness(1).await;
    let record = first_record(&h).await;
    let state = MutationState::new();

    h.api.fail_next_mutation(ClientError::network("connection reset"));
    h.coordinator
        .delete(&state, &record.id)
        .await
        .unwrap_err();

    assert_eq!(
        h.notifier.last(),
        Some(Notice::error("Something went wrong."))
    );
}

#[tokio::test]
async fn test_failed_mutation_invalidates_cache_by_default() {
    let h = harness(1).await;
    let record = first_record(&h).await;
    let state = MutationState::new();

    h.api.fail_next_mutation(ClientError::server(500, "boom"));
    h.coordinator
        .update(&state, &record.id, RestaurantUpdate::default().name("x"))
        .await
        .unwrap_err();

    assert!(h.coordinator.policy().invalidate_on_failure);
    assert_eq!(h.cache.generation(), 1);
}

#[tokio::test]
async fn test_failed_mutation_can_skip_invalidation() {
    let h = harness(1).await;
    let record = first_record(&h).await;
    let state = MutationState::new();
    let coordinator = h.coordinator.clone().with_policy(SettlePolicy {
        invalidate_on_failure: false,
        refetch_after_settle: true,
    });

    h.api.fail_next_mutation(ClientError::server(500, "boom"));
    coordinator
        .update(&state, &record.id, RestaurantUpdate::default().name("x"))
        .await
        .unwrap_err();

    assert_eq!(h.cache.generation(), 0);

    coordinator
        .update(&state, &record.id, RestaurantUpdate::default().name("y"))
        .await
        .unwrap();
    assert_eq!(h.cache.generation(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_phase_and_controls_while_submitting() {
    let h = harness(0).await;
    h.api.delay_mutations(Duration::from_millis(100));
    let state = MutationState::new();
    let mut phases = state.subscribe();

    let task = {
        let coordinator = h.coordinator.clone();
        let state = state.clone();
        tokio::spawn(async move {
            coordinator
                .create(&state, RestaurantCreate::new("Slow"))
                .await
        })
    };

    phases.wait_for(MutationPhase::is_submitting).await.unwrap();

    let controls = DialogControls::compute(DialogPolicy::CREATE, &state.phase(), true);
    assert!(!controls.submit_enabled);
    assert!(controls.submit_loading);
    assert!(!controls.cancel_enabled);

    // a second submission on the same state is refused
    let busy = h
        .coordinator
        .create(&state, RestaurantCreate::new("Twice"))
        .await
        .unwrap_err();
    assert_eq!(busy, ClientError::Busy);

    task.await.unwrap().unwrap();
    assert_eq!(
        state.phase(),
        MutationPhase::Settled(MutationOutcome::Success)
    );
    assert_eq!(h.api.stats().create, 1);
    assert_eq!(h.api.store().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_submit_leaves_state_retryable() {
    let h = harness(0).await;
    h.api.delay_mutations(Duration::from_millis(100));
    let state = MutationState::new();
    let generation = h.cache.generation();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(10),
        h.coordinator.create(&state, RestaurantCreate::new("Slow")),
    )
    .await;
    assert!(abandoned.is_err());

    assert_eq!(
        state.phase(),
        MutationPhase::Settled(MutationOutcome::Failure(ClientError::network(
            CANCELLED_MESSAGE
        )))
    );
    assert_eq!(h.cache.generation(), generation + 1);
    let controls = DialogControls::compute(DialogPolicy::EDIT, &state.phase(), true);
    assert!(controls.cancel_enabled);
    assert!(controls.submit_enabled);

    let created = h
        .coordinator
        .create(&state, RestaurantCreate::new("Slow"))
        .await
        .unwrap();
    assert_eq!(created.name, "Slow");
    assert_eq!(
        state.phase(),
        MutationPhase::Settled(MutationOutcome::Success)
    );
    assert_eq!(h.api.store().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_edit_dialog_cannot_cancel_mid_submit() {
    let h = harness(1).await;
    let record = first_record(&h).await;
    h.api.delay_mutations(Duration::from_millis(100));

    let mut dialog = RestaurantDialog::edit(&record);
    dialog.open();
    let state = dialog.state().clone();
    let mut phases = state.subscribe();

    let coordinator = h.coordinator.clone();
    let id = record.id.clone();
    let task = tokio::spawn(async move {
        coordinator
            .update(&state, &id, RestaurantUpdate::default().name("Other"))
            .await
    });

    phases.wait_for(MutationPhase::is_submitting).await.unwrap();
    assert!(!dialog.cancel());
    assert!(dialog.is_open());

    task.await.unwrap().unwrap();
    assert!(dialog.cancel());
    assert!(!dialog.is_open());
}

#[tokio::test]
async fn test_delete_dialog_closes_on_success() {
    let h = harness(2).await;
    let record = first_record(&h).await;

    let mut dialog = DeleteDialog::new(record.id.clone());
    dialog.open();
    dialog.confirm(&h.coordinator).await.unwrap();

    assert!(!dialog.is_open());
    assert_eq!(h.api.store().len().await, 1);
    assert_eq!(
        h.notifier.last(),
        Some(Notice::success("Restaurant deleted successfully."))
    );
}

#[tokio::test]
async fn test_delete_missing_record_surfaces_server_message() {
    let h = harness(0).await;
    let mut dialog = DeleteDialog::new("5b8a1c7e-0000-4000-8000-000000000000");
    dialog.open();

    let err = dialog.confirm(&h.coordinator).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(dialog.is_open());
    assert_eq!(
        h.notifier.last().map(|n| n.message),
        Some("restaurant not found".to_string())
    );
}

#[tokio::test]
async fn test_submit_dispatches_pending_mutations() {
    let h = harness(0).await;
    let state = MutationState::new();

    let created = h
        .coordinator
        .submit(&state, PendingMutation::create(RestaurantCreate::new("Via submit")))
        .await
        .unwrap();
    let resto_admin::mutation::MutationResult::Created(restaurant) = created else {
        panic!("expected a created restaurant, got {created:?}");
    };

    let deleted = h
        .coordinator
        .submit(&state, PendingMutation::delete(restaurant.id.clone()))
        .await
        .unwrap();
    assert_eq!(
        deleted,
        resto_admin::mutation::MutationResult::Deleted(restaurant.id)
    );
    assert!(h.api.store().is_empty().await);
}
