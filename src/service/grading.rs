/// Letter grade for a final CIBIL score.
pub fn cibil_grade(score: i64) -> &'static str {
    match score {
        s if s >= 800 => "A+",
        s if s >= 750 => "A",
        s if s >= 700 => "B+",
        s if s >= 650 => "B",
        s if s >= 600 => "C+",
        s if s >= 550 => "C",
        s if s >= 500 => "D+",
        s if s >= 450 => "D",
        _ => "F",
    }
}

/// Category label stored with and shown next to a recorded score.
pub fn score_category(score: i64) -> &'static str {
    match score {
        s if s >= 750 => "Excellent",
        s if s >= 700 => "Good",
        s if s >= 650 => "Fair",
        s if s >= 600 => "Poor",
        _ => "Very Poor",
    }
}

/// Rating of a single 0-100 factor score.
pub fn factor_rating(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "Excellent",
        s if s >= 80.0 => "Very Good",
        s if s >= 70.0 => "Good",
        s if s >= 60.0 => "Fair",
        s if s >= 50.0 => "Average",
        _ => "Poor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(cibil_grade(1123), "A+");
        assert_eq!(cibil_grade(800), "A+");
        assert_eq!(cibil_grade(799), "A");
        assert_eq!(cibil_grade(650), "B");
        assert_eq!(cibil_grade(500), "D+");
        assert_eq!(cibil_grade(449), "F");
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(score_category(750), "Excellent");
        assert_eq!(score_category(749), "Good");
        assert_eq!(score_category(627), "Poor");
        assert_eq!(score_category(150), "Very Poor");
    }

    #[test]
    fn factor_rating_boundaries() {
        assert_eq!(factor_rating(100.0), "Excellent");
        assert_eq!(factor_rating(85.0), "Very Good");
        assert_eq!(factor_rating(70.0), "Good");
        assert_eq!(factor_rating(50.0), "Average");
        assert_eq!(factor_rating(49.99), "Poor");
    }
}
