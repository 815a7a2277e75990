#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use lms::model::{AcademicCalendar, AcademicYear, Actor, LeaveDays, LeaveType, Profile, Role};
use lms::store::InMemoryStore;
use lms::workflow::{LeaveApplication, LeaveWorkflow, WorkflowPorts};

pub const CSE: u64 = 1;
pub const ECE: u64 = 2;

pub const FACULTY: u64 = 10;
pub const FACULTY_ECE: u64 = 11;
pub const HOD: u64 = 20;
pub const HOD_ECE: u64 = 21;
pub const PRINCIPAL: u64 = 30;
pub const ASSISTANT: u64 = 40;

pub fn year() -> AcademicYear {
    AcademicYear::starting(2025)
}

pub struct Campus {
    pub store: Arc<InMemoryStore>,
    pub workflow: LeaveWorkflow,
    profiles: Vec<Profile>,
}

impl Campus {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        store.add_department(CSE, "Computer Science").unwrap();
        store.add_department(ECE, "Electronics").unwrap();
        let mut profiles = Vec::new();
        for (user_id, full_name, role, department_id) in [
            (FACULTY, "Asha Rao", Role::Faculty, Some(CSE)),
            (FACULTY_ECE, "Ravi Kumar", Role::Faculty, Some(ECE)),
            (HOD, "Meera Nair", Role::Hod, Some(CSE)),
            (HOD_ECE, "Vikram Shah", Role::Hod, Some(ECE)),
            (PRINCIPAL, "Dr. Iyer", Role::Principal, None),
            (ASSISTANT, "Kiran Das", Role::JuniorAssistant, Some(CSE)),
        ] {
            let profile = Profile {
                user_id,
                full_name: full_name.to_string(),
                role,
                department_id,
            };
            store.add_profile(profile.clone()).unwrap();
            profiles.push(profile);
        }
        for user_id in [FACULTY, FACULTY_ECE, HOD, HOD_ECE, ASSISTANT] {
            for (leave_type, opening) in [
                (LeaveType::Casual, 12),
                (LeaveType::Earned, 2),
                (LeaveType::Medical, 10),
            ] {
                store
                    .seed_balance(user_id, leave_type, year(), LeaveDays::whole(opening))
                    .unwrap();
            }
        }

        let workflow = LeaveWorkflow::new(
            WorkflowPorts::shared(store.clone()),
            AcademicCalendar::default(),
        );
        Self {
            store,
            workflow,
            profiles,
        }
    }

    pub fn actor(&self, user_id: u64) -> Actor {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .unwrap_or_else(|| panic!("no actor {user_id}"));
        Actor::from(profile)
    }
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

pub fn application(leave_type: LeaveType, from: NaiveDate, to: NaiveDate) -> LeaveApplication {
    LeaveApplication {
        leave_type,
        from_date: from,
        to_date: to,
        reason: "Family function".to_string(),
        is_half_day: false,
        assigned_faculty: None,
    }
}
