mod property_tests;

pub(crate) use recording_sink::RecordingSink;
