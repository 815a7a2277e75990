use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::error::WorkflowError;
use super::policy::{self, ListScope};
use crate::model::{
    AcademicCalendar, AcademicYear, Actor, LeaveBalance, LeaveDays, LeaveRequest, LeaveStatus,
    LeaveType, NewLeaveRequest, NewNotification, Notification, NotificationKind, Profile, Role,
};
use crate::store::{
    BalanceLedger, Directory, NotificationInbox, NotificationSink, Page, Paged, RequestStore,
    StatusChange, UsageCharge,
};

/// What a requester fills in to apply for leave.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = "casual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2026-01-16", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Family function")]
    pub reason: String,
    #[serde(default)]
    pub is_half_day: bool,
    /// Colleague covering the requester's duties
    #[schema(example = 1001, nullable = true)]
    pub assigned_faculty: Option<u64>,
}

/// The collaborators the engine reads from and writes to.
#[derive(Clone)]
pub struct WorkflowPorts {
    pub requests: Arc<dyn RequestStore>,
    pub balances: Arc<dyn BalanceLedger>,
    pub directory: Arc<dyn Directory>,
    pub notifier: Arc<dyn NotificationSink>,
    pub inbox: Arc<dyn NotificationInbox>,
}

impl WorkflowPorts {
    /// Wires every port to one store.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: RequestStore + BalanceLedger + Directory + NotificationSink + NotificationInbox + 'static,
    {
        Self {
            requests: store.clone(),
            balances: store.clone(),
            directory: store.clone(),
            notifier: store.clone(),
            inbox: store,
        }
    }
}

/// The leave-request state machine. Every operation takes the acting user
/// explicitly.
#[derive(Clone)]
pub struct LeaveWorkflow {
    ports: WorkflowPorts,
    calendar: AcademicCalendar,
}

impl LeaveWorkflow {
    pub fn new(ports: WorkflowPorts, calendar: AcademicCalendar) -> Self {
        Self { ports, calendar }
    }

    pub fn current_year(&self) -> AcademicYear {
        self.calendar.year_of(Utc::now().date_naive())
    }

    pub async fn submit(
        &self,
        actor: &Actor,
        application: LeaveApplication,
    ) -> Result<LeaveRequest, WorkflowError> {
        if !actor.role.can_submit() {
            return Err(WorkflowError::Forbidden("role cannot apply for leave"));
        }
        if application.from_date > application.to_date {
            return Err(WorkflowError::InvalidDateRange {
                from: application.from_date,
                to: application.to_date,
            });
        }
        let number_of_days = LeaveDays::for_span(
            application.from_date,
            application.to_date,
            application.is_half_day,
        )
        .filter(|days| !days.is_zero())
        .ok_or(WorkflowError::InvalidDuration)?;

        let reason = application.reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::MissingReason);
        }

        let requester = self
            .ports
            .directory
            .profile(actor.user_id)
            .await?
            .ok_or(WorkflowError::Forbidden("no profile"))?;

        let request = self
            .ports
            .requests
            .insert_request(NewLeaveRequest {
                requester_id: requester.user_id,
                leave_type: application.leave_type,
                from_date: application.from_date,
                to_date: application.to_date,
                number_of_days,
                reason: reason.to_string(),
                is_half_day: application.is_half_day,
                assigned_faculty: application.assigned_faculty,
                department_id: requester.department_id,
            })
            .await?;

        info!(
            request_id = request.id,
            actor_id = actor.user_id,
            leave_type = %request.leave_type,
            days = %request.number_of_days,
            "Leave request submitted"
        );

        self.notify_approver(&requester, &request).await;
        Ok(request)
    }

    pub async fn transition(
        &self,
        actor: &Actor,
        request_id: u64,
        target: LeaveStatus,
    ) -> Result<LeaveRequest, WorkflowError> {
        let request = self
            .ports
            .requests
            .fetch_request(request_id)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;

        let requester = self.ports.directory.profile(request.requester_id).await?;
        let requester_role = match &requester {
            Some(profile) => profile.role,
            None => {
                warn!(
                    request_id,
                    requester_id = request.requester_id,
                    "Requester has no active profile; treating as faculty"
                );
                Role::Faculty
            }
        };

        if let Err(e) = policy::authorize_transition(actor, &request, requester_role, target) {
            debug!(request_id, actor_id = actor.user_id, status = %target, error = %e, "Transition refused");
            return Err(e);
        }

        let charge = (target == LeaveStatus::Approved).then(|| UsageCharge {
            user_id: request.requester_id,
            leave_type: request.leave_type,
            academic_year: self.calendar.year_of(request.from_date),
            days: request.number_of_days,
        });

        let updated = self
            .ports
            .requests
            .commit_transition(StatusChange {
                request_id,
                expected_version: request.version,
                new_status: target,
                approved_by: actor.user_id,
                charge,
            })
            .await
            .map_err(WorkflowError::from)?;

        info!(
            request_id,
            actor_id = actor.user_id,
            from = %request.status,
            status = %updated.status,
            "Leave request transitioned"
        );

        self.notify_outcome(requester.as_ref(), &updated).await;
        Ok(updated)
    }

    /// All four leave-type rows for the year, zeroed where unseeded.
    pub async fn balances(
        &self,
        user_id: u64,
        academic_year: AcademicYear,
    ) -> Result<Vec<LeaveBalance>, WorkflowError> {
        let rows = self.ports.balances.balances(user_id, academic_year).await?;
        Ok(LeaveBalance::complete_set(user_id, academic_year, rows))
    }

    pub async fn list(
        &self,
        actor: &Actor,
        scope: ListScope,
        department_id: Option<u64>,
        page: Page,
    ) -> Result<Paged<LeaveRequest>, WorkflowError> {
        let filter = policy::authorize_list(actor, scope, department_id)?;
        Ok(self.ports.requests.list_requests(filter, page).await?)
    }

    pub async fn get(&self, actor: &Actor, request_id: u64) -> Result<LeaveRequest, WorkflowError> {
        let request = self
            .ports
            .requests
            .fetch_request(request_id)
            .await?
            .ok_or(WorkflowError::NotFound(request_id))?;
        if !policy::can_view(actor, &request) {
            return Err(WorkflowError::Forbidden("not allowed to view this request"));
        }
        Ok(request)
    }

    pub async fn notifications(&self, actor: &Actor) -> Result<Vec<Notification>, WorkflowError> {
        Ok(self.ports.inbox.notifications_for(actor.user_id).await?)
    }

    pub async fn mark_notification_read(
        &self,
        actor: &Actor,
        notification_id: u64,
    ) -> Result<(), WorkflowError> {
        if self.ports.inbox.mark_read(actor.user_id, notification_id).await? {
            Ok(())
        } else {
            Err(WorkflowError::NotificationNotFound(notification_id))
        }
    }

    pub async fn mark_all_read(&self, actor: &Actor) -> Result<u64, WorkflowError> {
        Ok(self.ports.inbox.mark_all_read(actor.user_id).await?)
    }

    async fn notify_approver(&self, requester: &Profile, request: &LeaveRequest) {
        let recipient = if policy::principal_actionable_when_pending(request.leave_type, requester.role)
        {
            self.ports.directory.principal().await
        } else {
            match request.department_id {
                Some(department_id) => self.ports.directory.department_head(department_id).await,
                None => Ok(None),
            }
        };

        match recipient {
            Ok(Some(recipient_id)) => {
                let message = format!(
                    "New {} request from {} pending approval",
                    request.leave_type.label(),
                    requester.full_name
                );
                self.emit(NewNotification::new(recipient_id, NotificationKind::Info, message))
                    .await;
            }
            Ok(None) => warn!(request_id = request.id, "No approver to notify"),
            Err(e) => warn!(request_id = request.id, error = %e, "Approver lookup failed"),
        }
    }

    async fn notify_outcome(&self, requester: Option<&Profile>, request: &LeaveRequest) {
        let label = request.leave_type.label();
        let (kind, message) = match request.status {
            LeaveStatus::Approved => (
                NotificationKind::Success,
                format!("Your {label} request has been approved"),
            ),
            LeaveStatus::Rejected => (
                NotificationKind::Error,
                format!("Your {label} request has been rejected"),
            ),
            LeaveStatus::Forwarded => (
                NotificationKind::Warning,
                format!("Your {label} request has been forwarded to the Principal"),
            ),
            LeaveStatus::Pending => return,
        };
        self.emit(NewNotification::new(request.requester_id, kind, message))
            .await;

        if request.status != LeaveStatus::Forwarded {
            return;
        }
        match self.ports.directory.principal().await {
            Ok(Some(principal_id)) => {
                let name = requester
                    .map(|profile| profile.full_name.clone())
                    .unwrap_or_else(|| format!("user {}", request.requester_id));
                let message = match self.department_name(request.department_id).await {
                    Some(department) => format!(
                        "{label} request from {name} ({department}) forwarded for your approval"
                    ),
                    None => format!("{label} request from {name} forwarded for your approval"),
                };
                self.emit(NewNotification::new(principal_id, NotificationKind::Info, message))
                    .await;
            }
            Ok(None) => warn!(request_id = request.id, "No principal to notify"),
            Err(e) => warn!(request_id = request.id, error = %e, "Principal lookup failed"),
        }
    }

    async fn department_name(&self, department_id: Option<u64>) -> Option<String> {
        match self.ports.directory.department(department_id?).await {
            Ok(department) => department.map(|d| d.name),
            Err(e) => {
                warn!(department_id, error = %e, "Department lookup failed");
                None
            }
        }
    }

    // Notification delivery never fails the operation that triggered it.
    async fn emit(&self, notification: NewNotification) {
        let recipient_id = notification.recipient_id;
        if let Err(e) = self.ports.notifier.notify(notification).await {
            warn!(recipient_id, error = %e, "Failed to deliver notification");
        }
    }
}
