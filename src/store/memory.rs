use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    BalanceLedger, Directory, NotificationInbox, NotificationSink, Page, Paged, RequestFilter,
    RequestStore, StatusChange, StoreError,
};
use crate::model::{
    AcademicYear, Department, LeaveBalance, LeaveDays, LeaveRequest, LeaveType, NewLeaveRequest,
    NewNotification, Notification, Profile, Role,
};

/// Process-local store. A single mutex over all state serializes every
/// write, which gives both the per-request and the per-balance ordering.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    requests: BTreeMap<u64, LeaveRequest>,
    balances: HashMap<(u64, LeaveType, AcademicYear), LeaveBalance>,
    notifications: Vec<Notification>,
    profiles: HashMap<u64, Profile>,
    departments: BTreeMap<u64, Department>,
    next_request_id: u64,
    next_notification_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    pub fn add_department(&self, id: u64, name: &str) -> Result<(), StoreError> {
        self.lock()?.departments.insert(
            id,
            Department {
                id,
                name: name.to_string(),
            },
        );
        Ok(())
    }

    pub fn add_profile(&self, profile: Profile) -> Result<(), StoreError> {
        self.lock()?.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    /// External academic-year seeding: sets the opening allocation and keeps
    /// whatever usage is already recorded.
    pub fn seed_balance(
        &self,
        user_id: u64,
        leave_type: LeaveType,
        academic_year: AcademicYear,
        opening: LeaveDays,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state
            .balances
            .entry((user_id, leave_type, academic_year))
            .or_insert_with(|| LeaveBalance::unseeded(user_id, leave_type, academic_year))
            .opening = opening;
        Ok(())
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn insert_request(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let mut state = self.lock()?;
        state.next_request_id += 1;
        let request = new.into_request(state.next_request_id, Utc::now());
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    async fn commit_transition(&self, change: StatusChange) -> Result<LeaveRequest, StoreError> {
        let mut state = self.lock()?;
        let current = state
            .requests
            .get(&change.request_id)
            .ok_or(StoreError::NotFound(change.request_id))?;
        if current.version != change.expected_version {
            return Err(StoreError::Conflict(change.request_id));
        }

        // Compute both writes before touching state so a refused charge
        // leaves the request untouched.
        let charged = match &change.charge {
            Some(charge) => {
                let key = (charge.user_id, charge.leave_type, charge.academic_year);
                let balance = state.balances.get(&key).cloned().unwrap_or_else(|| {
                    LeaveBalance::unseeded(charge.user_id, charge.leave_type, charge.academic_year)
                });
                Some((key, balance.apply_usage(charge.days)?))
            }
            None => None,
        };

        let mut updated = current.clone();
        updated.status = change.new_status;
        updated.approved_by = Some(change.approved_by);
        updated.version += 1;
        updated.updated_at = Utc::now();

        if let Some((key, balance)) = charged {
            state.balances.insert(key, balance);
        }
        state.requests.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn list_requests(
        &self,
        filter: RequestFilter,
        page: Page,
    ) -> Result<Paged<LeaveRequest>, StoreError> {
        let state = self.lock()?;
        let mut matching: Vec<&LeaveRequest> = state
            .requests
            .values()
            .filter(|request| filter.matches(request))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let data = matching
            .into_iter()
            .skip(offset)
            .take(page.per_page as usize)
            .cloned()
            .collect();
        Ok(Paged { data, page, total })
    }
}

#[async_trait]
impl BalanceLedger for InMemoryStore {
    async fn balances(
        &self,
        user_id: u64,
        academic_year: AcademicYear,
    ) -> Result<Vec<LeaveBalance>, StoreError> {
        let state = self.lock()?;
        Ok(LeaveType::ALL
            .iter()
            .filter_map(|leave_type| {
                state
                    .balances
                    .get(&(user_id, *leave_type, academic_year))
                    .cloned()
            })
            .collect())
    }
}

#[async_trait]
impl Directory for InMemoryStore {
    async fn profile(&self, user_id: u64) -> Result<Option<Profile>, StoreError> {
        Ok(self.lock()?.profiles.get(&user_id).cloned())
    }

    async fn department(&self, department_id: u64) -> Result<Option<Department>, StoreError> {
        Ok(self.lock()?.departments.get(&department_id).cloned())
    }

    async fn department_head(&self, department_id: u64) -> Result<Option<u64>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .profiles
            .values()
            .filter(|p| p.role == Role::Hod && p.department_id == Some(department_id))
            .map(|p| p.user_id)
            .min())
    }

    async fn principal(&self) -> Result<Option<u64>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .profiles
            .values()
            .filter(|p| p.role == Role::Principal)
            .map(|p| p.user_id)
            .min())
    }
}

#[async_trait]
impl NotificationSink for InMemoryStore {
    async fn notify(&self, notification: NewNotification) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.next_notification_id += 1;
        let id = state.next_notification_id;
        state.notifications.push(Notification {
            id,
            recipient_id: notification.recipient_id,
            message: notification.message,
            kind: notification.kind,
            read: false,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl NotificationInbox for InMemoryStore {
    async fn notifications_for(&self, user_id: u64) -> Result<Vec<Notification>, StoreError> {
        let state = self.lock()?;
        let mut own: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == user_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(own)
    }

    async fn mark_read(&self, user_id: u64, notification_id: u64) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.recipient_id == user_id)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: u64) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let mut changed = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == user_id && !n.read)
        {
            notification.read = true;
            changed += 1;
        }
        Ok(changed)
    }
}
