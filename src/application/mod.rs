pub mod use_cases;

pub use use_cases::identity_matcher::{find_match, MatchResult};
pub use use_cases::reconciler::{build_update, reconcile, snapshot_fingerprint, ReconcileResult};
pub use use_cases::subscription::{RegistrationOutcome, SubscriptionUseCase};
