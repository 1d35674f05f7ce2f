//! Input rules for the console prompts
//!
//! Format policy lives here, not in the record engine, which treats these
//! fields as plain strings.

use anyhow::{Context, Result};
use regex::Regex;
use sdm_common::{Course, Gender};

/// A pattern plus the message shown when input does not match
pub struct Rule {
    pattern: Regex,
    pub message: &'static str,
}

impl Rule {
    fn new(pattern: &str, message: &'static str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid input pattern {}", pattern))?;
        Ok(Self { pattern, message })
    }

    pub fn matches(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }
}

/// Every rule used by the menus, compiled once at startup
pub struct Rules {
    pub name: Rule,
    pub address: Rule,
    pub phone: Rule,
    pub email: Rule,
    pub date: Rule,
    pub course_number: Rule,
    pub instructor: Rule,
}

impl Rules {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: Rule::new(
                r"^[A-Z][a-zA-Z]*$",
                "Names must contain letters only and start with a capital letter.",
            )?,
            address: Rule::new(
                r"^\d*\s*[A-Z][a-zA-Z]+\s[A-Z][a-zA-Z]+\s[A-Z][a-zA-Z]+$",
                "Address must be in the format: [number] [Street name] [City name].",
            )?,
            phone: Rule::new(r"^\d{10}$", "Phone number must be 10 digits.")?,
            email: Rule::new(
                r"^[^.][a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$",
                "Please enter a valid email address.",
            )?,
            date: Rule::new(
                r"^(0?[1-9]|1[0-2])/(0?[1-9]|[12][0-9]|3[01])/(19|20)\d\d$",
                "Dates must be in the format MM/DD/YYYY.",
            )?,
            course_number: Rule::new(r"^[0-9]{6}$", "Course number must be a 6-digit number.")?,
            instructor: Rule::new(
                r"^([A-Z][a-zA-Z]*\s)+[A-Z][a-zA-Z]*$",
                "Instructor name must be 2 or more capitalized words.",
            )?,
        })
    }
}

/// Accepts `m`, `male`, `f`, `female` in any case
pub fn parse_gender(input: &str) -> Option<Gender> {
    match input.trim().to_lowercase().as_str() {
        "m" | "male" => Some(Gender::Male),
        "f" | "female" => Some(Gender::Female),
        _ => None,
    }
}

pub fn parse_course(input: &str) -> Option<Course> {
    input.trim().parse().ok()
}

/// Strip leading zeros: `08/05/2023` becomes `8/5/2023`
pub fn normalize_date(input: &str) -> String {
    input
        .split('/')
        .map(|part| match part.parse::<u32>() {
            Ok(n) => n.to_string(),
            Err(_) => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
