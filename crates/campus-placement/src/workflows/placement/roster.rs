use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{CourseId, DepartmentId, StudentId, StudentRecord};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidGpa { student: String, gpa: f32 },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read student roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid student roster CSV: {}", err),
            RosterImportError::InvalidGpa { student, gpa } => write!(
                f,
                "student {} has GPA {} outside the 0-10 scale",
                student, gpa
            ),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidGpa { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads student academic records exported by the student-management system.
///
/// Expected header: `id,name,email,phone,course_id,department_id,semester,
/// graduation_year,gpa,backlogs,active`. Backlog subjects are separated by `;`.
pub struct StudentRosterImporter;

impl StudentRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StudentRecord>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<StudentRecord>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut students = Vec::new();

        for row in csv_reader.deserialize::<RosterRow>() {
            let row = row?;
            if !(0.0..=10.0).contains(&row.gpa) {
                return Err(RosterImportError::InvalidGpa {
                    student: row.id,
                    gpa: row.gpa,
                });
            }
            students.push(row.into_record());
        }

        Ok(students)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    name: String,
    email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    course_id: String,
    department_id: String,
    #[serde(default)]
    semester: Option<u8>,
    #[serde(default)]
    graduation_year: Option<u16>,
    gpa: f32,
    #[serde(default)]
    backlogs: String,
    #[serde(default = "default_active", deserialize_with = "flexible_bool")]
    active: bool,
}

impl RosterRow {
    fn into_record(self) -> StudentRecord {
        let backlogs = self
            .backlogs
            .split(';')
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .map(str::to_string)
            .collect();

        StudentRecord {
            id: StudentId(self.id),
            name: self.name,
            email: self.email,
            phone: self.phone,
            course_id: CourseId(self.course_id),
            department_id: DepartmentId(self.department_id),
            current_semester: self.semester,
            graduation_year: self.graduation_year,
            gpa: self.gpa,
            backlogs,
            is_active: self.active,
        }
    }
}

fn default_active() -> bool {
    true
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, found '{other}'"
        ))),
    }
}
