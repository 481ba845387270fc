pub mod notifier;
pub mod output;
pub mod runner;
pub mod stages;

pub use notifier::{FailureAction, InteractiveNotifier, LogNotifier, OperatorNotifier};
pub use runner::BatchRunner;
pub use stages::{Pipeline, StageFailure};
