use validator::ValidationError;

use crate::features::reports::models::is_known_event;

/// Rejects any event tag outside the fixed vocabulary
/// - Valid: `["tunnel_vision", "need_finish_mission"]`, `[]`
/// - Invalid: `["Tunnel_Vision"]`, `["levitation"]`
#[allow(clippy::ptr_arg)]
pub fn validate_event_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    match tags.iter().find(|tag| !is_known_event(tag)) {
        None => Ok(()),
        Some(unknown) => {
            let mut error = ValidationError::new("unknown_event");
            error.message = Some(format!("'{}' is not an allowed event", unknown).into());
            error.add_param("value".into(), unknown);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_event_tags_valid() {
        assert!(validate_event_tags(&tags(&[])).is_ok());
        assert!(validate_event_tags(&tags(&["lights"])).is_ok());
        assert!(validate_event_tags(&tags(&["tunnel_vision", "need_finish_mission"])).is_ok());
        assert!(validate_event_tags(&tags(&["lights", "lights"])).is_ok());
    }

    #[test]
    fn test_event_tags_invalid() {
        assert!(validate_event_tags(&tags(&["levitation"])).is_err());
        assert!(validate_event_tags(&tags(&["Lights"])).is_err()); // case-sensitive
        assert!(validate_event_tags(&tags(&["light"])).is_err()); // singular is not a tag
        assert!(validate_event_tags(&tags(&["lights", ""])).is_err());
    }

    #[test]
    fn test_event_tags_error_names_offender() {
        let err = validate_event_tags(&tags(&["lights", "levitation"])).unwrap_err();
        assert_eq!(err.code, "unknown_event");
        assert!(err.message.unwrap().contains("levitation"));
    }
}
