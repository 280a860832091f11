//! Sample-data generator for read paths that tolerate an unprovisioned or
//! unreachable backend (students, staff, users, classes). Rows are shaped
//! like real ones but never persisted; each triggering call regenerates.
//!
//! Status categories are allocated by exact proportion and then shuffled, so
//! a seeded generator produces deterministic category counts.

use std::sync::Mutex;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::{
    ClassSchedule, Role, Staff, StaffStatus, Student, StudentStatus, User,
};

const FIRST_NAMES: &[&str] = &[
    "Sarah", "Michael", "Emily", "James", "Olivia", "William", "Ava", "Benjamin", "Sophia",
    "Lucas", "Isabella", "Henry", "Charlotte", "Alexander", "Amelia", "Mason", "Mia", "Ethan",
    "Harper", "Noah", "Evelyn", "Liam", "Abigail", "Oliver", "Elizabeth", "Sebastian", "Sofia",
    "Aiden", "Avery", "Jackson", "Ella", "Logan", "Madison", "Caleb", "Scarlett", "Ryan",
    "Victoria", "Nathan", "Aria", "Owen", "Grace", "Luke", "Chloe", "Gabriel", "Camila",
    "Isaac", "Penelope", "Anthony", "Riley", "Dylan",
];

const LAST_NAMES: &[&str] = &[
    "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Gomez",
];

const STAFF_ROLES: &[&str] = &[
    "Principal", "Vice Principal", "Teacher", "Math Teacher", "Science Teacher",
    "English Teacher", "History Teacher", "Art Teacher", "Physical Education Teacher",
    "Music Teacher", "Librarian", "Guidance Counselor", "Nurse", "Secretary",
    "Maintenance Staff",
];

const DEPARTMENTS: &[&str] = &["Administration", "Academics", "Support", "Maintenance"];
const SECTIONS: &[&str] = &["A", "B", "C", "D", "E"];

pub const SAMPLE_STUDENT_COUNT: usize = 283;
pub const SAMPLE_STAFF_COUNT: usize = 15;

pub struct SampleData {
    rng: Mutex<SmallRng>,
}

impl Default for SampleData {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocate `n` slots across weighted categories by integer share, remainder
/// to the last category, then shuffle. Counts are fixed for a given `n`.
fn proportioned<T: Copy>(rng: &mut SmallRng, n: usize, weights: &[(T, usize)]) -> Vec<T> {
    let mut out = Vec::with_capacity(n);
    for (i, (value, percent)) in weights.iter().enumerate() {
        let count = if i + 1 == weights.len() {
            n.saturating_sub(out.len())
        } else {
            n * percent / 100
        };
        out.extend(std::iter::repeat(*value).take(count));
    }
    out.shuffle(rng);
    out
}

impl SampleData {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn students(&self, n: usize) -> Vec<Student> {
        let mut rng = self.rng.lock().unwrap();
        let statuses = proportioned(
            &mut rng,
            n,
            &[
                (StudentStatus::Active, 85),
                (StudentStatus::Inactive, 10),
                (StudentStatus::Graduated, 5),
            ],
        );
        let now = Utc::now().to_rfc3339();
        statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| {
                let first = *FIRST_NAMES.choose(&mut *rng).unwrap_or(&"Alex");
                let last = *LAST_NAMES.choose(&mut *rng).unwrap_or(&"Reyes");
                let grade = rng.gen_range(1..=10);
                let section = *SECTIONS.choose(&mut *rng).unwrap_or(&"A");
                Student {
                    id: (i + 1) as i64,
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    suffix: None,
                    lrn: None,
                    full_name: None,
                    normalized_full_name: None,
                    email: format!("{}.{}@school.edu", first.to_lowercase(), last.to_lowercase()),
                    grade: grade.to_string(),
                    section: section.to_string(),
                    status,
                    enrollment_date: "2023-09-01".to_string(),
                    avatar_url: None,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                }
            })
            .collect()
    }

    pub fn staff(&self, n: usize) -> Vec<Staff> {
        let mut rng = self.rng.lock().unwrap();
        let statuses = proportioned(
            &mut rng,
            n,
            &[
                (StaffStatus::Active, 90),
                (StaffStatus::Inactive, 5),
                (StaffStatus::OnLeave, 5),
            ],
        );
        let now = Utc::now().to_rfc3339();
        statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| {
                let first = *FIRST_NAMES.choose(&mut *rng).unwrap_or(&"Alex");
                let last = *LAST_NAMES.choose(&mut *rng).unwrap_or(&"Reyes");
                Staff {
                    id: (i + 1) as i64,
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: format!("{}.{}@school.edu", first.to_lowercase(), last.to_lowercase()),
                    user_id: None,
                    role: STAFF_ROLES.choose(&mut *rng).unwrap_or(&"Teacher").to_string(),
                    department: DEPARTMENTS.choose(&mut *rng).unwrap_or(&"Academics").to_string(),
                    phone: Some(format!("555-{}", rng.gen_range(1000..10000))),
                    hire_date: "2020-08-15".to_string(),
                    status,
                    avatar_url: None,
                    created_at: now.clone(),
                    updated_at: now.clone(),
                }
            })
            .collect()
    }

    /// Three fixed profiles, one per role.
    pub fn users(&self) -> Vec<User> {
        let now = Utc::now().to_rfc3339();
        let user = |id: &str, email: &str, name: &str, role: Role| User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role,
            avatar_url: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        vec![
            user("1", "john.smith@school.edu", "John Smith", Role::Admin),
            user("2", "sarah.johnson@school.edu", "Sarah Johnson", Role::Teacher),
            user("3", "michael.brown@school.edu", "Michael Brown", Role::Staff),
        ]
    }

    pub fn classes_for(
        &self,
        teacher_id: &str,
        academic_year: &str,
        day_of_week: i64,
    ) -> Vec<ClassSchedule> {
        let now = Utc::now().to_rfc3339();
        let class = |id: i64, subject: &str, room: &str, start: &str, end: &str| ClassSchedule {
            id,
            name: "Grade 5 - Class 1".to_string(),
            subject: subject.to_string(),
            teacher_id: teacher_id.to_string(),
            room: Some(room.to_string()),
            day_of_week,
            start_time: start.to_string(),
            end_time: end.to_string(),
            academic_year: academic_year.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        vec![
            class(1, "Mathematics", "Room 201", "09:00", "10:00"),
            class(2, "Science", "Lab 1", "10:15", "11:00"),
        ]
    }
}
