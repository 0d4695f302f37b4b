/// The database id of a variable (an indicator time series).
///
/// This is the only thing configs use to reference data: dimensions bind a
/// `VariableId` to a chart property, and the fetch collaborator is asked for
/// a list of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct VariableId(pub i32);

impl nohash_hasher::IsEnabled for VariableId {}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
