//! Student ID utilities

use std::ops::RangeInclusive;

use rand::Rng;

use crate::repository::Repository;
use crate::{Error, Result};

/// Smallest 7-digit ID
pub const MIN_STUDENT_ID: u32 = 1_000_000;
/// Largest 7-digit ID
pub const MAX_STUDENT_ID: u32 = 9_999_999;

/// Draw random 7-digit IDs until one is not taken in `repository`
///
/// # Errors
///
/// `IdSpaceExhausted` when every ID is already assigned.
pub fn generate_student_id<R: Rng + ?Sized>(repository: &Repository, rng: &mut R) -> Result<String> {
    generate_student_id_in(repository, rng, MIN_STUDENT_ID..=MAX_STUDENT_ID)
}

/// Draw random IDs from `range` until one is not taken in `repository`
pub fn generate_student_id_in<R: Rng + ?Sized>(
    repository: &Repository,
    rng: &mut R,
    range: RangeInclusive<u32>,
) -> Result<String> {
    let size = if range.is_empty() {
        0
    } else {
        (range.end() - range.start()) as usize + 1
    };
    let taken = repository
        .iter()
        .filter(|s| s.id().parse::<u32>().is_ok_and(|v| range.contains(&v)))
        .count();
    if size == 0 || taken >= size {
        return Err(Error::IdSpaceExhausted(taken));
    }

    loop {
        let id = rng.gen_range(range.clone()).to_string();
        if !repository.contains(&id) {
            return Ok(id);
        }
    }
}

/// Generate a student ID using the thread-local RNG
pub fn generate(repository: &Repository) -> Result<String> {
    generate_student_id(repository, &mut rand::thread_rng())
}
