mod recording;

pub use self::recording::{
    RecordedExecution, RecordingConnection, RecordingDriver, RecordingStatement, ResultBuilder,
};
