pub mod attendance;
pub mod clock;

pub use attendance::AttendanceService;
pub use clock::{Clock, ManualClock, SystemClock};
