/// In-memory request throttles
///
/// Process-local, best-effort protection — not a security boundary of
/// record. Both throttles keep plain mutex-guarded maps with no eviction;
/// in a multi-instance deployment each instance throttles independently,
/// which is a known, accepted weakness. The public contracts are small
/// (three methods and one method respectively) so a shared external counter
/// store can replace the backing map without touching callers.
///
/// - [`login::LoginThrottle`]: blocks repeated failed logins per key
/// - [`submission::SubmissionThrottle`]: cooldown gate for public form
///   submissions per origin key

pub mod login;
pub mod submission;
