//! Per-subject grade value

/// Weights in tenths: prelim 30%, midterm 30%, final 40%
const PRELIM_WEIGHT: u64 = 3;
const MIDTERM_WEIGHT: u64 = 3;
const FINAL_WEIGHT: u64 = 4;

/// Three component scores plus the weighted final rating
///
/// The rating always matches the current component scores unless the grade
/// was rebuilt from storage with [`Grade::from_stored`], in which case the
/// stored rating is kept as written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    prelim: u32,
    midterm: u32,
    final_exam: u32,
    final_rating: f64,
}

impl Grade {
    pub fn new(prelim: u32, midterm: u32, final_exam: u32) -> Self {
        Self {
            prelim,
            midterm,
            final_exam,
            final_rating: Self::compute_final_rating(prelim, midterm, final_exam),
        }
    }

    /// Rebuild a grade from a stored row, trusting the stored rating
    pub fn from_stored(prelim: u32, midterm: u32, final_exam: u32, final_rating: f64) -> Self {
        Self {
            prelim,
            midterm,
            final_exam,
            final_rating,
        }
    }

    /// `0.30 * prelim + 0.30 * midterm + 0.40 * final`
    ///
    /// Summed in integer tenths first so the result carries a single rounding.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdm_common::model::Grade;
    ///
    /// assert_eq!(Grade::compute_final_rating(90, 85, 95), 90.5);
    /// assert_eq!(Grade::compute_final_rating(100, 100, 100), 100.0);
    /// ```
    pub fn compute_final_rating(prelim: u32, midterm: u32, final_exam: u32) -> f64 {
        let tenths = PRELIM_WEIGHT * u64::from(prelim)
            + MIDTERM_WEIGHT * u64::from(midterm)
            + FINAL_WEIGHT * u64::from(final_exam);
        tenths as f64 / 10.0
    }

    /// Replace all three scores and recompute the rating
    pub fn set_scores(&mut self, prelim: u32, midterm: u32, final_exam: u32) {
        *self = Self::new(prelim, midterm, final_exam);
    }

    pub fn prelim(&self) -> u32 {
        self.prelim
    }

    pub fn midterm(&self) -> u32 {
        self.midterm
    }

    pub fn final_exam(&self) -> u32 {
        self.final_exam
    }

    pub fn final_rating(&self) -> f64 {
        self.final_rating
    }
}
