mod rewards;
mod study_sessions;
