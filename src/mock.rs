use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::models::{EmployeeInput, Gender};

/// Department names used when seeding an empty installation.
pub const MOCK_DEPARTMENTS: &[&str] = &[
    "Wohnen",
    "Finanzierung",
    "Psychologische Beratung",
    "Internationales",
    "IT",
    "Mensa",
    "Personal",
    "Buchhaltung",
    "Kita",
];

const FEMALE_NAMES: &[&str] = &["Fiona", "Bianca", "Luisa", "Anne", "Miriam", "Paula", "Jana"];
const MALE_NAMES: &[&str] = &["Jonas", "Felix", "Lukas", "Tobias", "Ahmet", "Stefan", "Karl"];
const DIVERSE_NAMES: &[&str] = &["Sarah", "Kim", "Alex", "Robin", "Sascha"];
const LAST_NAMES: &[&str] = &[
    "Köhler",
    "Lange",
    "Hofman",
    "O' Connor",
    "Wolff-Mayer",
    "Schulz",
    "Yilmaz",
    "Becker",
    "Neumann",
    "Braun",
];
const NOTES: &[&str] = &["", "", "Teilzeit", "singt gern und laut, aufgepasst!", "Schwerbehindertenausweis"];

/// A department as sent to the create endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MockDepartment {
    pub name: String,
}

/// Generator state. Employee numbers start at 1 and never repeat within one
/// generator.
pub struct MockGenerator {
    next_employee_number: u32,
    next_department: usize,
    rng: StdRng,
}

impl MockGenerator {
    pub fn new(first_employee_number: u32, seed: u64) -> Self {
        Self {
            next_employee_number: first_employee_number,
            next_department: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy(first_employee_number: u32) -> Self {
        Self::new(first_employee_number, rand::random())
    }

    /// Cycles through the fixed department list.
    pub fn next_department(&mut self) -> MockDepartment {
        let name = MOCK_DEPARTMENTS[self.next_department % MOCK_DEPARTMENTS.len()];
        self.next_department += 1;
        MockDepartment {
            name: name.to_string(),
        }
    }

    pub fn next_employee(&mut self, department_id: Uuid) -> EmployeeInput {
        let number = self.next_employee_number;
        self.next_employee_number += 1;

        let gender = *[Gender::Female, Gender::Male, Gender::Diverse]
            .choose(&mut self.rng)
            .unwrap_or(&Gender::Diverse);
        let first_names = match gender {
            Gender::Female => FEMALE_NAMES,
            Gender::Male => MALE_NAMES,
            Gender::Diverse => DIVERSE_NAMES,
        };

        let date_of_birth = self.random_date(1960, 2002);
        let earliest_entry = date_of_birth
            .checked_add_months(chrono::Months::new(18 * 12))
            .unwrap_or(date_of_birth);
        let date_of_entry = earliest_entry
            + Duration::days(self.rng.random_range(0..=365 * 5));

        EmployeeInput {
            employee_id: format!("E{number:05}"),
            first_name: pick(&mut self.rng, first_names).to_string(),
            last_name: pick(&mut self.rng, LAST_NAMES).to_string(),
            gender,
            date_of_birth,
            date_of_entry,
            date_of_exit: None,
            notes: pick(&mut self.rng, NOTES).to_string(),
            active: true,
            wants_reminder: self.rng.random_bool(0.8),
            reminder_interval: None,
            department_id,
        }
    }

    fn random_date(&mut self, from_year: i32, to_year: i32) -> NaiveDate {
        let year = self.rng.random_range(from_year..=to_year);
        let month = self.rng.random_range(1..=12);
        let day = self.rng.random_range(1..=28);
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
    }
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn employee_ids_are_unique_and_increasing() {
        let mut mock = MockGenerator::new(1, 7);
        let ids: Vec<String> = (0..50)
            .map(|_| mock.next_employee(Uuid::nil()).employee_id)
            .collect();

        assert_eq!(ids[0], "E00001");
        assert_eq!(ids[49], "E00050");
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    }

    #[test]
    fn generated_employees_pass_validation() {
        let mut mock = MockGenerator::new(100, 42);
        for _ in 0..100 {
            let employee = mock.next_employee(Uuid::nil());
            assert!(employee.validate().is_ok(), "{employee:?}");
            assert!(employee.date_of_entry > employee.date_of_birth);
        }
    }

    #[test]
    fn departments_cycle_through_the_list() {
        let mut mock = MockGenerator::new(1, 0);
        let names: Vec<String> = (0..MOCK_DEPARTMENTS.len() + 1)
            .map(|_| mock.next_department().name)
            .collect();
        assert_eq!(names[0], "Wohnen");
        assert_eq!(names[8], "Kita");
        assert_eq!(names[9], "Wohnen");
    }

    #[test]
    fn same_seed_same_records() {
        let a = MockGenerator::new(1, 99).next_employee(Uuid::nil());
        let b = MockGenerator::new(1, 99).next_employee(Uuid::nil());
        assert_eq!(a, b);
    }
}
