//! Names of the persisted clock store entries

/// Countdown end, Unix seconds
pub const TIMER_END: &str = "timerEnd";
/// Countdown total duration in seconds
pub const TIMER_TOTAL: &str = "timerTotal";
/// Countdown remaining seconds at the last pause
pub const TIMER_LEFT: &str = "timerLeft";
/// Stopwatch start, Unix seconds
pub const SW_START: &str = "swStart";
/// Stopwatch accumulated seconds at the last pause
pub const SW_TIME: &str = "swTime";
/// Stopwatch running flag, `"true"`/`"false"`
pub const SW_RUNNING: &str = "swRunning";
/// JSON array of completed stopwatch sessions
pub const STUDY_HISTORY: &str = "studyHistory";
/// Selected background theme identifier
pub const BG_THEME: &str = "bgTheme";

/// Countdown keys describing a running or paused timer
pub const TIMER_KEYS: [&str; 3] = [TIMER_END, TIMER_TOTAL, TIMER_LEFT];
/// All stopwatch keys
pub const STOPWATCH_KEYS: [&str; 3] = [SW_START, SW_TIME, SW_RUNNING];
