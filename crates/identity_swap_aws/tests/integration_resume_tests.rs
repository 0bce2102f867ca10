mod support;

use identity_swap_aws::adapters::journal_store::{FileJournalStore, JournalStore};
use identity_swap_aws::handlers::swap::{run_identity_swap, SwapOutcome, SwapRequest, RESUME_PROMPT};
use identity_swap_core::{Direction, SwapError};
use support::fixtures::{
    approving_operator, full_stack_platform, routing_store, BLUE_CLUSTER, BLUE_ENV, GREEN_ENV,
};

const JOURNAL_KEY: &str = "acme-blue__acme-green";

#[test]
fn interrupted_swap_resumes_without_reissuing_applied_updates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let journals = FileJournalStore::new(dir.path());
    let platform = full_stack_platform().failing_update_call(3);
    let store = routing_store();
    let request = SwapRequest::new(BLUE_ENV, GREEN_ENV, Direction::ToMirror);

    let mut operator = approving_operator(2);
    let error = run_identity_swap(&request, &platform, &store, &journals, &mut operator)
        .expect_err("third update fails");
    match error {
        SwapError::Execution { step, total, .. } => assert_eq!((step, total), (3, 6)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.put_calls().is_empty());

    let journal = journals
        .load(JOURNAL_KEY)
        .expect("journal readable")
        .expect("journal kept after failure");
    assert_eq!(journal.completed_steps(), 2);
    assert!(dir.path().join("acme-blue__acme-green.swap.json").exists());

    let mut operator = approving_operator(2);
    let outcome = run_identity_swap(&request, &platform, &store, &journals, &mut operator)
        .expect("resume should complete");

    assert!(matches!(outcome, SwapOutcome::Completed { plan_steps: 6, .. }));
    assert_eq!(operator.questions()[0], RESUME_PROMPT);
    assert!(operator.transcript().contains("2 of 6 updates applied"));

    let calls = platform.update_calls();
    assert_eq!(calls.len(), 7);
    let portal_updates = calls
        .iter()
        .filter(|(cluster, service, _)| cluster == BLUE_CLUSTER && service == "PortalSvc")
        .count();
    assert_eq!(portal_updates, 1);
    assert_eq!(
        platform.assigned(BLUE_CLUSTER, "IngesterSvc").as_deref(),
        Some("GreenMirrorIngester:4")
    );
    assert_eq!(journals.load(JOURNAL_KEY).expect("journal readable"), None);
}

#[test]
fn tampered_journal_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let journals = FileJournalStore::new(dir.path());
    let platform = full_stack_platform().failing_update_call(1);
    let store = routing_store();
    let request = SwapRequest::new(BLUE_ENV, GREEN_ENV, Direction::ToMirror);

    let mut operator = approving_operator(2);
    run_identity_swap(&request, &platform, &store, &journals, &mut operator)
        .expect_err("first update fails");

    let path = dir.path().join("acme-blue__acme-green.swap.json");
    let edited = std::fs::read_to_string(&path)
        .expect("journal file")
        .replace("GreenMirrorPortal:5", "GreenMirrorPortal:6");
    std::fs::write(&path, edited).expect("rewrite journal");

    let mut operator = approving_operator(0);
    let error = run_identity_swap(&request, &platform, &store, &journals, &mut operator)
        .expect_err("fingerprint mismatch");

    assert!(matches!(error, SwapError::Journal(_)));
    assert_eq!(platform.update_calls().len(), 1);
}
