/// Converts a final score (0–100) into a letter grade.
///
/// | Range  | Grade |
/// |--------|-------|
/// | >= 95  | A     |
/// | >= 90  | A-    |
/// | >= 85  | B+    |
/// | >= 80  | B     |
/// | >= 75  | B-    |
/// | >= 70  | C+    |
/// | >= 65  | C     |
/// | >= 60  | C-    |
/// | >= 55  | D+    |
/// | >= 50  | D     |
/// | < 50   | F     |
pub fn letter_grade(score: f64) -> String {
    match score {
        s if s >= 95.0 => "A".into(),
        s if s >= 90.0 => "A-".into(),
        s if s >= 85.0 => "B+".into(),
        s if s >= 80.0 => "B".into(),
        s if s >= 75.0 => "B-".into(),
        s if s >= 70.0 => "C+".into(),
        s if s >= 65.0 => "C".into(),
        s if s >= 60.0 => "C-".into(),
        s if s >= 55.0 => "D+".into(),
        s if s >= 50.0 => "D".into(),
        _ => "F".into(),
    }
}
