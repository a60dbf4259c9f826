// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Accepts compose paths as a single string or a non-empty list.

use nonempty::NonEmpty;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ComposePathsEntry {
    Single(String),
    List(Vec<String>),
}

pub fn deserialize_compose_paths<'de, D>(
    deserializer: D,
) -> Result<Option<NonEmpty<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<ComposePathsEntry> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(ComposePathsEntry::Single(path)) => Ok(Some(NonEmpty::new(path))),
        Some(ComposePathsEntry::List(paths)) => {
            let nonempty = NonEmpty::from_vec(paths).ok_or_else(|| {
                serde::de::Error::custom("at least one compose path is required")
            })?;
            Ok(Some(nonempty))
        }
    }
}
