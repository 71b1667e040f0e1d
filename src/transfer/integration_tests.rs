//! End-to-end workflow scenarios against the in-memory store.

use std::sync::Arc;

use uuid::Uuid;

use super::state::TransferStatus;
use super::testing::{MemoryAudit, MemoryFiles, MemoryStore};
use super::types::{CreateTransfer, ProofUpload, RequestKind};
use super::workflow::TransferWorkflow;
use crate::error::PortalError;
use crate::models::{Caller, Role, Student};

struct World {
    store: Arc<MemoryStore>,
    audit: Arc<MemoryAudit>,
    workflow: Arc<TransferWorkflow>,
    district_a: Uuid,
    district_b: Uuid,
    student: Student,
}

fn student_in(district_id: Uuid) -> Student {
    Student {
        id: Uuid::new_v4(),
        district_id,
        first_name: "Sam".into(),
        last_name: "Rivera".into(),
        dob: "2014-03-15".into(),
        unique_student_identifier: "DEMO-001".into(),
    }
}

fn world() -> World {
    world_with_files(Arc::new(MemoryFiles::new()))
}

fn world_with_files(files: Arc<MemoryFiles>) -> World {
    let store = Arc::new(MemoryStore::new());
    let audit = Arc::new(MemoryAudit::new());
    let district_a = Uuid::new_v4();
    let district_b = Uuid::new_v4();
    let student = student_in(district_a);
    store.add_student(student.clone());
    let workflow = Arc::new(TransferWorkflow::new(
        store.clone(),
        files,
        audit.clone(),
    ));
    World {
        store,
        audit,
        workflow,
        district_a,
        district_b,
        student,
    }
}

fn teacher_in(district_id: Uuid) -> Caller {
    Caller::new(Uuid::new_v4(), Role::Teacher, Some(Uuid::new_v4()), Some(district_id))
}

fn district_admin() -> Caller {
    Caller::new(Uuid::new_v4(), Role::DistrictAdmin, None, None)
}

fn outbound(w: &World) -> CreateTransfer {
    CreateTransfer {
        kind: RequestKind::Outbound,
        student_id: Some(w.student.id),
        unique_student_identifier: None,
        dob: Some(w.student.dob.clone()),
        old_district_id: Some(w.district_a),
        new_district_id: Some(w.district_b),
        old_school_id: None,
        new_school_id: None,
        notes: Some("moving over the summer".into()),
        proof: None,
    }
}

#[tokio::test]
async fn test_request_approve_moves_student_then_reject_conflicts() {
    let w = world();
    let requester = teacher_in(w.district_a);
    let admin = district_admin();

    let view = w.workflow.create(&requester, outbound(&w)).await.unwrap();
    assert_eq!(view.transfer.status, TransferStatus::Pending);
    assert_eq!(view.transfer.old_district_id, w.district_a);

    let approved = w
        .workflow
        .approve(&admin, view.transfer.id, Some("verified".into()))
        .await
        .unwrap();
    assert_eq!(approved.transfer.status, TransferStatus::Approved);
    assert_eq!(approved.transfer.approved_by, Some(admin.id));
    assert_eq!(w.store.student_district(w.student.id), Some(w.district_b));
    // Notes are appended, not overwritten.
    assert_eq!(
        approved.transfer.notes.as_deref(),
        Some("moving over the summer\nverified")
    );

    // Terminal states are never re-entered.
    let err = w
        .workflow
        .reject(&admin, view.transfer.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Conflict(_)));
    assert_eq!(err.to_string(), "Transfer is already approved");
    // And the failed reject left everything untouched.
    let after = w.workflow.get(&admin, view.transfer.id).await.unwrap();
    assert_eq!(after.transfer.status, TransferStatus::Approved);
    assert_eq!(w.store.student_district(w.student.id), Some(w.district_b));
}

#[tokio::test]
async fn test_reject_never_moves_student() {
    let w = world();
    let view = w
        .workflow
        .create(&teacher_in(w.district_a), outbound(&w))
        .await
        .unwrap();

    let rejected = w
        .workflow
        .reject(&district_admin(), view.transfer.id, Some("no docs".into()))
        .await
        .unwrap();
    assert_eq!(rejected.transfer.status, TransferStatus::Rejected);
    assert_eq!(w.store.student_district(w.student.id), Some(w.district_a));
}

#[tokio::test]
async fn test_wrong_old_district_persists_nothing() {
    let w = world();
    let mut req = outbound(&w);
    req.old_district_id = Some(Uuid::new_v4());

    let err = w
        .workflow
        .create(&district_admin(), req)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Invalid(_)));
    assert_eq!(w.store.transfer_count(), 0);
}

#[tokio::test]
async fn test_dob_mismatch_rejected() {
    let w = world();
    let mut req = outbound(&w);
    req.dob = Some("2014-03-16".into());

    let err = w
        .workflow
        .create(&teacher_in(w.district_a), req)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Invalid(_)));
    assert_eq!(w.store.transfer_count(), 0);
}

#[tokio::test]
async fn test_foreign_teacher_forbidden() {
    let w = world();
    let outsider = teacher_in(Uuid::new_v4()); // home district C

    let err = w.workflow.create(&outsider, outbound(&w)).await.unwrap_err();
    assert!(matches!(err, PortalError::Forbidden(_)));
    assert_eq!(w.store.transfer_count(), 0);
}

#[tokio::test]
async fn test_unscoped_teacher_fails_closed() {
    let w = world();
    // Broken school/district link: no resolvable scope, must deny.
    let unscoped = Caller::new(Uuid::new_v4(), Role::Teacher, None, None);

    let err = w.workflow.create(&unscoped, outbound(&w)).await.unwrap_err();
    assert!(matches!(err, PortalError::Forbidden(_)));
}

#[tokio::test]
async fn test_inbound_resolves_by_identifier() {
    let w = world();
    let receiving = teacher_in(w.district_b);

    let req = CreateTransfer {
        kind: RequestKind::Inbound,
        student_id: None,
        unique_student_identifier: Some("DEMO-001".into()),
        dob: Some("2014-03-15".into()),
        old_district_id: None,
        new_district_id: None,
        old_school_id: None,
        new_school_id: None,
        notes: None,
        proof: None,
    };

    // Request authority is scoped to the OLD district, so a receiving-side
    // teacher is denied.
    let err = w.workflow.create(&receiving, req.clone()).await.unwrap_err();
    assert!(matches!(err, PortalError::Forbidden(_)));

    // A district admin can file it; destination defaults to explicit value.
    let mut admin_req = req;
    admin_req.new_district_id = Some(w.district_b);
    let view = w
        .workflow
        .create(&district_admin(), admin_req)
        .await
        .unwrap();
    assert_eq!(view.transfer.student_id, w.student.id);
    assert_eq!(view.transfer.old_district_id, w.district_a);
    assert_eq!(view.transfer.new_district_id, Some(w.district_b));
}

#[tokio::test]
async fn test_inbound_dob_mismatch() {
    let w = world();
    let req = CreateTransfer {
        kind: RequestKind::Inbound,
        student_id: None,
        unique_student_identifier: Some("DEMO-001".into()),
        dob: Some("2010-01-01".into()),
        old_district_id: None,
        new_district_id: Some(w.district_b),
        old_school_id: None,
        new_school_id: None,
        notes: None,
        proof: None,
    };
    let err = w
        .workflow
        .create(&district_admin(), req)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Invalid(_)));
    assert_eq!(w.store.transfer_count(), 0);
}

#[tokio::test]
async fn test_unknown_identifier_not_found() {
    let w = world();
    let req = CreateTransfer {
        kind: RequestKind::Inbound,
        student_id: None,
        unique_student_identifier: Some("NOPE-999".into()),
        dob: Some("2014-03-15".into()),
        old_district_id: None,
        new_district_id: Some(w.district_b),
        old_school_id: None,
        new_school_id: None,
        notes: None,
        proof: None,
    };
    let err = w
        .workflow
        .create(&district_admin(), req)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::NotFound(_)));
}

#[tokio::test]
async fn test_proof_failure_tolerated() {
    let w = world_with_files(Arc::new(MemoryFiles::failing()));
    let mut req = outbound(&w);
    req.proof = Some(ProofUpload {
        filename: "proof.pdf".into(),
        bytes: b"%PDF".to_vec(),
    });

    // Transfer survives the failed upload, just without a proof handle.
    let view = w
        .workflow
        .create(&teacher_in(w.district_a), req)
        .await
        .unwrap();
    assert_eq!(view.transfer.status, TransferStatus::Pending);
    assert!(view.transfer.proof_file_url.is_none());
}

#[tokio::test]
async fn test_proof_attached_when_storage_works() {
    let files = Arc::new(MemoryFiles::new());
    let w = world_with_files(files.clone());
    let mut req = outbound(&w);
    req.proof = Some(ProofUpload {
        filename: "proof.pdf".into(),
        bytes: b"%PDF".to_vec(),
    });

    let view = w
        .workflow
        .create(&teacher_in(w.district_a), req)
        .await
        .unwrap();
    assert!(view
        .transfer
        .proof_file_url
        .as_deref()
        .is_some_and(|u| u.starts_with("/uploads/transfers/")));
    assert_eq!(files.saved.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_pending_requires_district_admin() {
    let w = world();
    w.workflow
        .create(&teacher_in(w.district_a), outbound(&w))
        .await
        .unwrap();

    let err = w
        .workflow
        .list_pending(&teacher_in(w.district_a))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Forbidden(_)));

    let pending = w.workflow.list_pending(&district_admin()).await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn test_get_scoping() {
    let w = world();
    let view = w
        .workflow
        .create(&teacher_in(w.district_a), outbound(&w))
        .await
        .unwrap();

    // In-scope teacher (old district) and district admin can read it.
    assert!(w
        .workflow
        .get(&teacher_in(w.district_a), view.transfer.id)
        .await
        .is_ok());
    assert!(w
        .workflow
        .get(&district_admin(), view.transfer.id)
        .await
        .is_ok());

    // Out-of-scope teacher cannot.
    let err = w
        .workflow
        .get(&teacher_in(Uuid::new_v4()), view.transfer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Forbidden(_)));

    let err = w
        .workflow
        .get(&district_admin(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::NotFound(_)));
}

#[tokio::test]
async fn test_approve_requires_district_admin() {
    let w = world();
    let requester = teacher_in(w.district_a);
    let view = w.workflow.create(&requester, outbound(&w)).await.unwrap();

    let err = w
        .workflow
        .approve(&requester, view.transfer.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Forbidden(_)));
    assert_eq!(w.store.student_district(w.student.id), Some(w.district_a));
}

#[tokio::test]
async fn test_concurrent_approve_single_winner() {
    let w = world();
    let view = w
        .workflow
        .create(&teacher_in(w.district_a), outbound(&w))
        .await
        .unwrap();
    let id = view.transfer.id;

    let (wf1, wf2) = (w.workflow.clone(), w.workflow.clone());
    let (a1, a2) = (district_admin(), district_admin());
    let h1 = tokio::spawn(async move { wf1.approve(&a1, id, None).await });
    let h2 = tokio::spawn(async move { wf2.approve(&a2, id, None).await });

    let results = [h1.await.unwrap(), h2.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(PortalError::Conflict(_))))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(w.store.student_district(w.student.id), Some(w.district_b));
}

#[tokio::test]
async fn test_audit_trail_written() {
    let w = world();
    let requester = teacher_in(w.district_a);
    let admin = district_admin();

    let view = w.workflow.create(&requester, outbound(&w)).await.unwrap();
    w.workflow.approve(&admin, view.transfer.id, None).await.unwrap();

    assert_eq!(
        w.audit.actions(),
        vec!["TRANSFER_REQUEST".to_string(), "TRANSFER_APPROVE".to_string()]
    );
}

#[tokio::test]
async fn test_approve_without_destination_leaves_student() {
    let w = world();
    let mut req = outbound(&w);
    req.new_district_id = None;
    let view = w
        .workflow
        .create(&teacher_in(w.district_a), req)
        .await
        .unwrap();

    let approved = w
        .workflow
        .approve(&district_admin(), view.transfer.id, None)
        .await
        .unwrap();
    assert_eq!(approved.transfer.status, TransferStatus::Approved);
    // No destination recorded: status flips, the student stays put.
    assert_eq!(w.store.student_district(w.student.id), Some(w.district_a));
}
