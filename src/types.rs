use serde::Deserialize;

/// Behaviour when a rebuild is requested while a build is already in flight.
///
/// - `Queue`: remember the request and run exactly one more build once the
///   current one finishes. Any number of requests coalesce into that one build.
/// - `Drop`: ignore requests that arrive while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Drop,
}
