pub mod folder;
pub mod timetable;

pub use folder::{ExamFolder, NewFolderRequest, UpdateFolderRequest};
pub use timetable::{
    GenerateTimetableRequest, ScheduleDay, Session, SessionAssignment, Subject, Timetable,
};
