//! Who may do what to a leave request.
//!
//! Pure decisions over already-loaded data; the engine does the I/O and calls
//! in here before anything is written.

use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::error::WorkflowError;
use crate::model::{Actor, LeaveRequest, LeaveStatus, LeaveType, Role};
use crate::store::RequestFilter;

const HOD_FROM_PENDING: &[LeaveStatus] = &[
    LeaveStatus::Approved,
    LeaveStatus::Rejected,
    LeaveStatus::Forwarded,
];

const PRINCIPAL_DECISIONS: &[LeaveStatus] = &[LeaveStatus::Approved, LeaveStatus::Rejected];

/// A pending request goes straight to the Principal when it is on-duty or was
/// raised by an HOD.
pub fn principal_actionable_when_pending(leave_type: LeaveType, requester_role: Role) -> bool {
    leave_type == LeaveType::Od || requester_role == Role::Hod
}

/// Checks that `actor` may move `request` to `target`.
///
/// Terminal requests and unreachable targets fail with `InvalidTransition`;
/// an actor without authority over the request's current stage fails with
/// `Forbidden`.
pub fn authorize_transition(
    actor: &Actor,
    request: &LeaveRequest,
    requester_role: Role,
    target: LeaveStatus,
) -> Result<(), WorkflowError> {
    let invalid = || WorkflowError::InvalidTransition {
        from: request.status,
        to: target,
    };

    if request.status.is_terminal() || target == LeaveStatus::Pending {
        return Err(invalid());
    }
    if actor.user_id == request.requester_id {
        return Err(WorkflowError::Forbidden("cannot act on your own request"));
    }

    let allowed = match (actor.role, request.status) {
        (Role::Hod, LeaveStatus::Pending) => {
            if !actor.belongs_to(request.department_id) {
                return Err(WorkflowError::Forbidden(
                    "request belongs to another department",
                ));
            }
            HOD_FROM_PENDING
        }
        (Role::Principal, LeaveStatus::Forwarded) => PRINCIPAL_DECISIONS,
        (Role::Principal, LeaveStatus::Pending)
            if principal_actionable_when_pending(request.leave_type, requester_role) =>
        {
            PRINCIPAL_DECISIONS
        }
        (Role::Principal, _) => {
            return Err(WorkflowError::Forbidden(
                "awaiting the head of department",
            ));
        }
        (Role::Hod, _) => {
            return Err(WorkflowError::Forbidden("already escalated to the Principal"));
        }
        (Role::Faculty | Role::JuniorAssistant, _) => {
            return Err(WorkflowError::Forbidden("role cannot decide leave requests"));
        }
    };

    if allowed.contains(&target) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Which list of requests the caller is asking for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListScope {
    /// The actor's own requests
    #[default]
    Mine,
    Department,
    Institution,
    /// Forwarded or on-duty requests awaiting the Principal
    Principal,
}

/// Resolves a list scope into a store filter the actor is allowed to see.
///
/// `department_id` only matters for the Principal, who may browse any
/// department; everyone else gets their own.
pub fn authorize_list(
    actor: &Actor,
    scope: ListScope,
    department_id: Option<u64>,
) -> Result<RequestFilter, WorkflowError> {
    match scope {
        ListScope::Mine => Ok(RequestFilter::Requester(actor.user_id)),
        ListScope::Department => match actor.role {
            Role::Principal => department_id
                .map(RequestFilter::Department)
                .ok_or(WorkflowError::Forbidden("department_id is required")),
            Role::Hod | Role::JuniorAssistant => {
                let own = actor
                    .department_id
                    .ok_or(WorkflowError::Forbidden("no department on profile"))?;
                match department_id {
                    Some(requested) if requested != own => {
                        Err(WorkflowError::Forbidden("request belongs to another department"))
                    }
                    _ => Ok(RequestFilter::Department(own)),
                }
            }
            Role::Faculty => Err(WorkflowError::Forbidden("role cannot list department requests")),
        },
        ListScope::Institution => match actor.role {
            Role::Principal | Role::JuniorAssistant => Ok(RequestFilter::Institution),
            _ => Err(WorkflowError::Forbidden("role cannot list all requests")),
        },
        ListScope::Principal => match actor.role {
            Role::Principal => Ok(RequestFilter::ForwardedOrOd),
            _ => Err(WorkflowError::Forbidden("only the Principal has this queue")),
        },
    }
}

/// Single-request read access.
pub fn can_view(actor: &Actor, request: &LeaveRequest) -> bool {
    match actor.role {
        _ if actor.user_id == request.requester_id => true,
        Role::Principal | Role::JuniorAssistant => true,
        Role::Hod => actor.belongs_to(request.department_id),
        Role::Faculty => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LeaveDays, NewLeaveRequest};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;

    const REQUESTER: u64 = 10;
    const DEPT: u64 = 1;

    fn request(leave_type: LeaveType, status: LeaveStatus) -> LeaveRequest {
        let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let mut request = NewLeaveRequest {
            requester_id: REQUESTER,
            leave_type,
            from_date: day,
            to_date: day,
            number_of_days: LeaveDays::whole(1),
            reason: "Personal work".into(),
            is_half_day: false,
            assigned_faculty: None,
            department_id: Some(DEPT),
        }
        .into_request(1, Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap());
        request.status = status;
        request
    }

    fn hod(department_id: u64) -> Actor {
        Actor::new(20, Role::Hod, Some(department_id))
    }

    fn principal() -> Actor {
        Actor::new(30, Role::Principal, None)
    }

    #[rstest]
    #[case(LeaveStatus::Approved)]
    #[case(LeaveStatus::Rejected)]
    #[case(LeaveStatus::Forwarded)]
    fn hod_decides_pending_requests_in_own_department(#[case] target: LeaveStatus) {
        let req = request(LeaveType::Casual, LeaveStatus::Pending);
        assert!(authorize_transition(&hod(DEPT), &req, Role::Faculty, target).is_ok());
    }

    #[test]
    fn hod_of_other_department_is_forbidden() {
        let req = request(LeaveType::Casual, LeaveStatus::Pending);
        let err = authorize_transition(&hod(2), &req, Role::Faculty, LeaveStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[test]
    fn hod_cannot_act_once_forwarded() {
        let req = request(LeaveType::Casual, LeaveStatus::Forwarded);
        let err = authorize_transition(&hod(DEPT), &req, Role::Faculty, LeaveStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[rstest]
    #[case(LeaveStatus::Approved, true)]
    #[case(LeaveStatus::Rejected, true)]
    #[case(LeaveStatus::Forwarded, false)]
    fn principal_decides_forwarded_requests(#[case] target: LeaveStatus, #[case] ok: bool) {
        let req = request(LeaveType::Earned, LeaveStatus::Forwarded);
        let result = authorize_transition(&principal(), &req, Role::Faculty, target);
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
        }
    }

    #[rstest]
    #[case(LeaveType::Casual, Role::Faculty, false)]
    #[case(LeaveType::Od, Role::Faculty, true)]
    #[case(LeaveType::Medical, Role::Hod, true)]
    #[case(LeaveType::Casual, Role::JuniorAssistant, false)]
    fn principal_on_pending_requests(
        #[case] leave_type: LeaveType,
        #[case] requester_role: Role,
        #[case] ok: bool,
    ) {
        let req = request(leave_type, LeaveStatus::Pending);
        let result = authorize_transition(&principal(), &req, requester_role, LeaveStatus::Approved);
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(result, Err(WorkflowError::Forbidden(_))));
        }
    }

    #[rstest]
    #[case(Role::Faculty)]
    #[case(Role::JuniorAssistant)]
    fn non_deciding_roles_are_forbidden(#[case] role: Role) {
        let req = request(LeaveType::Casual, LeaveStatus::Pending);
        let actor = Actor::new(40, role, Some(DEPT));
        let err = authorize_transition(&actor, &req, Role::Faculty, LeaveStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[test]
    fn nobody_acts_on_their_own_request() {
        let req = request(LeaveType::Casual, LeaveStatus::Pending);
        let own = Actor::new(REQUESTER, Role::Hod, Some(DEPT));
        let err = authorize_transition(&own, &req, Role::Hod, LeaveStatus::Approved).unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[rstest]
    #[case(LeaveStatus::Approved, LeaveStatus::Rejected)]
    #[case(LeaveStatus::Rejected, LeaveStatus::Approved)]
    #[case(LeaveStatus::Approved, LeaveStatus::Forwarded)]
    fn terminal_requests_never_move(#[case] from: LeaveStatus, #[case] target: LeaveStatus) {
        let req = request(LeaveType::Casual, from);
        for actor in [hod(DEPT), principal(), Actor::new(40, Role::Faculty, Some(DEPT))] {
            let err = authorize_transition(&actor, &req, Role::Faculty, target).unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn back_to_pending_is_invalid() {
        let req = request(LeaveType::Casual, LeaveStatus::Forwarded);
        let err = authorize_transition(&principal(), &req, Role::Faculty, LeaveStatus::Pending)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[rstest]
    #[case(Role::Faculty, ListScope::Mine, None, Some(RequestFilter::Requester(5)))]
    #[case(Role::Faculty, ListScope::Department, None, None)]
    #[case(Role::Hod, ListScope::Department, None, Some(RequestFilter::Department(DEPT)))]
    #[case(Role::Hod, ListScope::Department, Some(2), None)]
    #[case(Role::Hod, ListScope::Institution, None, None)]
    #[case(Role::JuniorAssistant, ListScope::Institution, None, Some(RequestFilter::Institution))]
    #[case(Role::JuniorAssistant, ListScope::Principal, None, None)]
    #[case(Role::Principal, ListScope::Department, Some(2), Some(RequestFilter::Department(2)))]
    #[case(Role::Principal, ListScope::Department, None, None)]
    #[case(Role::Principal, ListScope::Principal, None, Some(RequestFilter::ForwardedOrOd))]
    fn list_scopes_by_role(
        #[case] role: Role,
        #[case] scope: ListScope,
        #[case] department_id: Option<u64>,
        #[case] expected: Option<RequestFilter>,
    ) {
        let department = (role != Role::Principal).then_some(DEPT);
        let actor = Actor::new(5, role, department);
        assert_eq!(authorize_list(&actor, scope, department_id).ok(), expected);
    }

    #[test]
    fn single_request_visibility() {
        let req = request(LeaveType::Casual, LeaveStatus::Pending);
        assert!(can_view(&Actor::new(REQUESTER, Role::Faculty, Some(DEPT)), &req));
        assert!(can_view(&principal(), &req));
        assert!(can_view(&hod(DEPT), &req));
        assert!(!can_view(&hod(2), &req));
        assert!(!can_view(&Actor::new(41, Role::Faculty, Some(DEPT)), &req));
    }
}
