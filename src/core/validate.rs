//! Pre-build validation of a single definition
//!
//! Runs once per definition before any backend call. A failure here fails
//! only that definition.

use super::definition::{BuildDefinition, Platform};
use crate::error::DefinitionError;

/// Fields a platform cannot build without
fn required_fields(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Switch | Platform::Ps4 => &["app_id"],
        Platform::XboxOne => &["version"],
        _ => &[],
    }
}

fn has_field(def: &BuildDefinition, field: &str) -> bool {
    let value = match field {
        "app_id" => def.extras.app_id.as_deref(),
        "version" => def.extras.version.as_deref(),
        _ => None,
    };
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Check that a definition can be handed to the backend
pub fn validate(def: &BuildDefinition) -> Result<(), DefinitionError> {
    if def.output_directory.trim().is_empty() {
        return Err(DefinitionError::EmptyOutputDirectory {
            name: def.name.clone(),
        });
    }

    if def.group() != def.platform.group() {
        return Err(DefinitionError::GroupMismatch {
            name: def.name.clone(),
            platform: def.platform,
            group: def.group(),
        });
    }

    if let Some(field) = required_fields(def.platform)
        .iter()
        .copied()
        .find(|field| !has_field(def, field))
    {
        return Err(DefinitionError::MissingPlatformField {
            name: def.name.clone(),
            platform: def.platform,
            field,
        });
    }

    Ok(())
}
