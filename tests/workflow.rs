mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use lms::model::{
    AcademicCalendar, LeaveDays, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
    NotificationKind,
};
use lms::store::{
    InMemoryStore, Page, Paged, RequestFilter, RequestStore, StatusChange, StoreError,
};
use lms::workflow::{LeaveWorkflow, ListScope, WorkflowError, WorkflowPorts};
use rstest::rstest;

async fn balance_of(campus: &Campus, user_id: u64, leave_type: LeaveType) -> (LeaveDays, LeaveDays) {
    let rows = campus.workflow.balances(user_id, year()).await.unwrap();
    let row = rows.into_iter().find(|b| b.leave_type == leave_type).unwrap();
    (row.used, row.available())
}

#[actix_web::test]
async fn casual_leave_approved_by_hod_then_reject_fails() {
    let campus = Campus::new();
    let wf = &campus.workflow;

    let request = wf
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Casual, date(1, 15), date(1, 16)),
        )
        .await
        .unwrap();
    assert_eq!(request.status, LeaveStatus::Pending);
    assert_eq!(request.number_of_days, LeaveDays::whole(2));

    let approved = wf
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.approved_by, Some(HOD));
    assert_eq!(approved.version, 1);

    let (used, available) = balance_of(&campus, FACULTY, LeaveType::Casual).await;
    assert_eq!(used, LeaveDays::whole(2));
    assert_eq!(available, LeaveDays::whole(10));
    assert_eq!(used + available, LeaveDays::whole(12));

    let err = wf
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[actix_web::test]
async fn od_forwarded_by_hod_is_approved_by_principal() {
    let campus = Campus::new();
    let wf = &campus.workflow;

    let request = wf
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Od, date(2, 2), date(2, 4)),
        )
        .await
        .unwrap();

    let forwarded = wf
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Forwarded)
        .await
        .unwrap();
    assert_eq!(forwarded.status, LeaveStatus::Forwarded);

    let approved = wf
        .transition(&campus.actor(PRINCIPAL), request.id, LeaveStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.approved_by, Some(PRINCIPAL));

    // OD has no ceiling; usage is still recorded.
    let (used, available) = balance_of(&campus, FACULTY, LeaveType::Od).await;
    assert_eq!(used, LeaveDays::whole(3));
    assert_eq!(available, LeaveDays::ZERO);
}

#[actix_web::test]
async fn principal_approves_pending_od_directly() {
    let campus = Campus::new();
    let request = campus
        .workflow
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Od, date(3, 9), date(3, 9)),
        )
        .await
        .unwrap();

    let approved = campus
        .workflow
        .transition(&campus.actor(PRINCIPAL), request.id, LeaveStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
}

#[actix_web::test]
async fn principal_cannot_skip_the_hod_on_ordinary_leave() {
    let campus = Campus::new();
    let request = campus
        .workflow
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Medical, date(3, 9), date(3, 10)),
        )
        .await
        .unwrap();

    let err = campus
        .workflow
        .transition(&campus.actor(PRINCIPAL), request.id, LeaveStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[actix_web::test]
async fn insufficient_balance_changes_nothing() {
    let campus = Campus::new();
    let wf = &campus.workflow;

    // Earned opening is 2 days.
    let request = wf
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Earned, date(1, 5), date(1, 7)),
        )
        .await
        .unwrap();

    let err = wf
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InsufficientBalance { leave_type: LeaveType::Earned, .. }
    ));
    assert!(!err.is_retryable());

    let unchanged = wf.get(&campus.actor(FACULTY), request.id).await.unwrap();
    assert_eq!(unchanged.status, LeaveStatus::Pending);
    assert_eq!(unchanged.version, 0);
    assert_eq!(unchanged.approved_by, None);

    let (used, available) = balance_of(&campus, FACULTY, LeaveType::Earned).await;
    assert_eq!(used, LeaveDays::ZERO);
    assert_eq!(available, LeaveDays::whole(2));

    // Rejecting does not touch the balance and still works.
    let rejected = wf
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, LeaveStatus::Rejected);
}

#[rstest]
#[case(FACULTY_ECE)]
#[case(ASSISTANT)]
#[case(HOD_ECE)]
#[actix_web::test]
async fn only_the_right_authority_changes_status(#[case] actor_id: u64) {
    let campus = Campus::new();
    let request = campus
        .workflow
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Casual, date(4, 1), date(4, 1)),
        )
        .await
        .unwrap();

    for target in [LeaveStatus::Approved, LeaveStatus::Rejected, LeaveStatus::Forwarded] {
        let err = campus
            .workflow
            .transition(&campus.actor(actor_id), request.id, target)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)), "{actor_id} -> {target}");
    }
}

#[actix_web::test]
async fn requester_cannot_decide_own_request() {
    let campus = Campus::new();
    let request = campus
        .workflow
        .submit(
            &campus.actor(HOD),
            application(LeaveType::Casual, date(4, 1), date(4, 2)),
        )
        .await
        .unwrap();

    let err = campus
        .workflow
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    // An HOD's own request goes to the Principal while still pending.
    let approved = campus
        .workflow
        .transition(&campus.actor(PRINCIPAL), request.id, LeaveStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.approved_by, Some(PRINCIPAL));
}

#[actix_web::test]
async fn principal_queue_holds_forwarded_and_all_od() {
    let campus = Campus::new();
    let wf = &campus.workflow;
    let faculty = campus.actor(FACULTY);

    let pending_casual = wf
        .submit(&faculty, application(LeaveType::Casual, date(5, 1), date(5, 1)))
        .await
        .unwrap();
    let forwarded_casual = wf
        .submit(&faculty, application(LeaveType::Casual, date(5, 4), date(5, 4)))
        .await
        .unwrap();
    let pending_od = wf
        .submit(&faculty, application(LeaveType::Od, date(5, 6), date(5, 6)))
        .await
        .unwrap();
    let rejected_od = wf
        .submit(&faculty, application(LeaveType::Od, date(5, 8), date(5, 8)))
        .await
        .unwrap();

    wf.transition(&campus.actor(HOD), forwarded_casual.id, LeaveStatus::Forwarded)
        .await
        .unwrap();
    wf.transition(&campus.actor(PRINCIPAL), rejected_od.id, LeaveStatus::Rejected)
        .await
        .unwrap();

    let queue = wf
        .list(&campus.actor(PRINCIPAL), ListScope::Principal, None, Page::default())
        .await
        .unwrap();
    let ids: Vec<u64> = queue.data.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![rejected_od.id, pending_od.id, forwarded_casual.id]);
    assert!(!ids.contains(&pending_casual.id));
    assert_eq!(queue.total, 3);
}

#[actix_web::test]
async fn department_lists_are_scoped() {
    let campus = Campus::new();
    let wf = &campus.workflow;
    wf.submit(
        &campus.actor(FACULTY),
        application(LeaveType::Casual, date(6, 1), date(6, 1)),
    )
    .await
    .unwrap();
    wf.submit(
        &campus.actor(FACULTY_ECE),
        application(LeaveType::Casual, date(6, 1), date(6, 1)),
    )
    .await
    .unwrap();

    let cse = wf
        .list(&campus.actor(HOD), ListScope::Department, None, Page::default())
        .await
        .unwrap();
    assert_eq!(cse.total, 1);
    assert_eq!(cse.data[0].requester_id, FACULTY);

    let err = wf
        .list(&campus.actor(HOD), ListScope::Department, Some(ECE), Page::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    let all = wf
        .list(&campus.actor(ASSISTANT), ListScope::Institution, None, Page::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);

    let ece_request = all.data.iter().find(|r| r.requester_id == FACULTY_ECE).unwrap();
    let err = wf.get(&campus.actor(HOD), ece_request.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[actix_web::test]
async fn notifications_follow_the_request() {
    let campus = Campus::new();
    let wf = &campus.workflow;

    let request = wf
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Casual, date(7, 1), date(7, 2)),
        )
        .await
        .unwrap();

    let hod_inbox = wf.notifications(&campus.actor(HOD)).await.unwrap();
    assert_eq!(hod_inbox.len(), 1);
    assert_eq!(hod_inbox[0].kind, NotificationKind::Info);
    assert_eq!(
        hod_inbox[0].message,
        "New Casual Leave request from Asha Rao pending approval"
    );

    wf.transition(&campus.actor(HOD), request.id, LeaveStatus::Forwarded)
        .await
        .unwrap();
    let faculty_inbox = wf.notifications(&campus.actor(FACULTY)).await.unwrap();
    assert_eq!(faculty_inbox[0].kind, NotificationKind::Warning);
    let principal_inbox = wf.notifications(&campus.actor(PRINCIPAL)).await.unwrap();
    assert_eq!(principal_inbox.len(), 1);
    assert_eq!(principal_inbox[0].kind, NotificationKind::Info);
    assert_eq!(
        principal_inbox[0].message,
        "Casual Leave request from Asha Rao (Computer Science) forwarded for your approval"
    );

    wf.transition(&campus.actor(PRINCIPAL), request.id, LeaveStatus::Approved)
        .await
        .unwrap();
    let faculty_inbox = wf.notifications(&campus.actor(FACULTY)).await.unwrap();
    assert_eq!(faculty_inbox.len(), 2);
    assert_eq!(faculty_inbox[0].kind, NotificationKind::Success);
    assert_eq!(faculty_inbox[0].message, "Your Casual Leave request has been approved");

    // Only the recipient can mark a notification read.
    let err = wf
        .mark_notification_read(&campus.actor(HOD), faculty_inbox[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotificationNotFound(_)));
    wf.mark_notification_read(&campus.actor(FACULTY), faculty_inbox[0].id)
        .await
        .unwrap();
    assert_eq!(wf.mark_all_read(&campus.actor(FACULTY)).await.unwrap(), 1);
}

#[actix_web::test]
async fn od_and_hod_requests_notify_the_principal() {
    let campus = Campus::new();
    let wf = &campus.workflow;
    wf.submit(
        &campus.actor(FACULTY),
        application(LeaveType::Od, date(8, 3), date(8, 3)),
    )
    .await
    .unwrap();
    wf.submit(
        &campus.actor(HOD),
        application(LeaveType::Casual, date(8, 4), date(8, 4)),
    )
    .await
    .unwrap();

    assert_eq!(wf.notifications(&campus.actor(PRINCIPAL)).await.unwrap().len(), 2);
    assert!(wf.notifications(&campus.actor(HOD)).await.unwrap().is_empty());
}

#[actix_web::test]
async fn balances_cover_every_type() {
    let campus = Campus::new();
    let rows = campus.workflow.balances(PRINCIPAL, year()).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|b| b.opening == LeaveDays::ZERO && b.used == LeaveDays::ZERO));
}

#[actix_web::test]
async fn approval_charges_the_academic_year_of_from_date() {
    let campus = Campus::new();
    let wf = &campus.workflow;
    // June starts 2026-27, which nobody has been seeded for.
    let request = wf
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Casual, date(6, 10), date(6, 10)),
        )
        .await
        .unwrap();
    let err = wf
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InsufficientBalance { .. }));
}

#[actix_web::test]
async fn half_day_approval_uses_half_days() {
    let campus = Campus::new();
    let mut app = application(LeaveType::Casual, date(1, 20), date(1, 20));
    app.is_half_day = true;
    let request = campus.workflow.submit(&campus.actor(FACULTY), app).await.unwrap();
    assert_eq!(request.number_of_days, LeaveDays::from_half_days(1));

    campus
        .workflow
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Approved)
        .await
        .unwrap();
    let (used, _) = balance_of(&campus, FACULTY, LeaveType::Casual).await;
    assert_eq!(used.as_f64(), 0.5);
}

/// Serves every read of a request from the first snapshot it saw, so a
/// second approver always decides on stale data.
struct StaleReads {
    inner: Arc<InMemoryStore>,
    snapshot: std::sync::Mutex<Option<LeaveRequest>>,
}

#[async_trait]
impl RequestStore for StaleReads {
    async fn insert_request(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        self.inner.insert_request(new).await
    }

    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        if let Some(cached) = self.snapshot.lock().unwrap().clone() {
            return Ok(Some(cached));
        }
        let fresh = self.inner.fetch_request(id).await?;
        *self.snapshot.lock().unwrap() = fresh.clone();
        Ok(fresh)
    }

    async fn commit_transition(&self, change: StatusChange) -> Result<LeaveRequest, StoreError> {
        self.inner.commit_transition(change).await
    }

    async fn list_requests(
        &self,
        filter: RequestFilter,
        page: Page,
    ) -> Result<Paged<LeaveRequest>, StoreError> {
        self.inner.list_requests(filter, page).await
    }
}

#[actix_web::test]
async fn second_writer_on_stale_state_gets_conflict() {
    let campus = Campus::new();
    let request = campus
        .workflow
        .submit(
            &campus.actor(FACULTY),
            application(LeaveType::Casual, date(9, 1), date(9, 2)),
        )
        .await
        .unwrap();

    let mut ports = WorkflowPorts::shared(campus.store.clone());
    ports.requests = Arc::new(StaleReads {
        inner: campus.store.clone(),
        snapshot: std::sync::Mutex::new(None),
    });
    let racing = LeaveWorkflow::new(ports, AcademicCalendar::default());

    racing
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Forwarded)
        .await
        .unwrap();
    let err = racing
        .transition(&campus.actor(HOD), request.id, LeaveStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Conflict(id) if id == request.id));
    assert!(err.is_retryable());

    // Nothing from the losing write landed.
    let current = campus.workflow.get(&campus.actor(FACULTY), request.id).await.unwrap();
    assert_eq!(current.status, LeaveStatus::Forwarded);
    let (used, _) = balance_of(&campus, FACULTY, LeaveType::Casual).await;
    assert_eq!(used, LeaveDays::ZERO);
}
