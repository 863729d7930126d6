pub mod recorder;

pub use recorder::LoginAnomalyRecorder;
