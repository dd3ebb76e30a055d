use crate::models::schedule::Student;
use crate::services::api::ScheduleApi;

pub const STUDENT_LOAD_FAILED: &str = "Failed to load student data";
pub const NOT_SHORT_TERM: &str =
    "This student is not in a short-term class and cannot use short-term scheduling";

/// Fetches the student and checks they belong to a short-term class. The
/// error is the message to show next to the student field.
pub fn lookup_student<A>(api: &A, student_id: i64) -> Result<Student, String>
where
    A: ScheduleApi + ?Sized,
{
    match api.get_student(student_id) {
        Ok(student) if student.is_short_term() => {
            log::info!("Selected student {} ({})", student.id, student.name);
            Ok(student)
        }
        Ok(student) => {
            log::warn!(
                "Student {} has class type {:?}; short-term scheduling refused",
                student.id,
                student.class_schedule_type
            );
            Err(NOT_SHORT_TERM.to_string())
        }
        Err(err) => {
            log::error!("Failed to load student {}: {}", student_id, err);
            Err(STUDENT_LOAD_FAILED.to_string())
        }
    }
}
