use crate::error::{AppError, Result};

/// Reduce a model reply to its JSON payload.
///
/// Replies commonly arrive wrapped in a fenced code block, but fences are not
/// guaranteed and neither is their exact position: blank lines, prose before
/// or after the block, or a completely bare JSON object all occur. The
/// interior of the first fenced block is preferred; otherwise the span from
/// the first `{` to the last `}` is used.
pub fn extract_json(reply: &str) -> Result<&str> {
    let candidate = fenced_block(reply).unwrap_or(reply);

    let start = candidate.find('{');
    let end = candidate.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&candidate[start..=end]),
        _ => Err(AppError::Analysis(format!(
            "No JSON object found in model reply: {reply}"
        ))),
    }
}

/// Interior of the first ``` fenced block, if the reply contains one.
fn fenced_block(reply: &str) -> Option<&str> {
    let open = reply.find("```")?;
    // Skip the info string ("json") up to the end of the opening line.
    let body_start = reply[open..].find('\n').map(|i| open + i + 1)?;
    let close = reply[body_start..].find("```")?;
    Some(&reply[body_start..body_start + close])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_block() {
        let reply = "```json\n{\"root_cause\":\"X\"}\n```";
        assert_eq!(extract_json(reply).unwrap(), "{\"root_cause\":\"X\"}");
    }

    #[test]
    fn test_bare_fence_without_info_string() {
        let reply = "```\n{\"root_cause\":\"X\"}\n```";
        assert_eq!(extract_json(reply).unwrap(), "{\"root_cause\":\"X\"}");
    }

    #[test]
    fn test_unfenced_json() {
        let reply = "{\"root_cause\":\"X\"}";
        assert_eq!(extract_json(reply).unwrap(), "{\"root_cause\":\"X\"}");
    }

    #[test]
    fn test_blank_lines_around_fence() {
        let reply = "\n\n```json\n{\"root_cause\":\"X\"}\n```\n\n";
        assert_eq!(extract_json(reply).unwrap(), "{\"root_cause\":\"X\"}");
    }

    #[test]
    fn test_prose_around_bare_json() {
        let reply = "Here is the analysis:\n{\"root_cause\":\"X\"}\nHope that helps.";
        assert_eq!(extract_json(reply).unwrap(), "{\"root_cause\":\"X\"}");
    }

    #[test]
    fn test_multiline_json_in_fence() {
        let reply = "```json\n{\n  \"root_cause\": \"X\",\n  \"team_responsible\": \"Y\"\n}\n```";
        let json = extract_json(reply).unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["root_cause"], "X");
    }

    #[test]
    fn test_no_json_at_all() {
        let err = extract_json("I could not analyze this log.").unwrap_err();
        assert!(matches!(err, AppError::Analysis(_)));
    }

    #[test]
    fn test_empty_reply() {
        assert!(extract_json("").is_err());
    }
}
