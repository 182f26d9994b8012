/// Build the failure-analysis prompt with the console log embedded.
///
/// The log is tail-truncated to `max_log_bytes` before embedding: the prompt
/// itself tells the model the cause is usually in the last lines, so when the
/// log exceeds the budget the head is the part to drop.
pub fn failure_analysis_prompt(log_text: &str, max_log_bytes: usize) -> String {
    let log = tail_truncate(log_text, max_log_bytes);

    format!(
        r#"Analyze the following Jenkins log for a failed pipeline. We use Bazel and we code in Java with Vert.x, Go and React.
For test jobs, we use both unit tests and acceptance tests.
Identify the core issue, cause, and suggest a concise solution or next steps.
Focus on extracting the most critical error messages and context.
The cause is usually found in the last lines of the log.

Format your response as follows, using a JSON structure. Return a valid JSON, without any additional text or formatting.
For file names or paths, format with backticks "`".
---
"{{
    "root_cause": [Concise explanation of the root cause, e.g., "Maven build failed due to missing dependency", "Unit test failures", "Deployment timeout", "Disk space issue"],
    "team_responsible": [Team name, e.g., "mas-billing", "provision", "corporate-erp". The team is usually specified in the path, 2 levels after pkg directory. If the issue does not seem to be related to code, the "platform" team is responsible.],
    "suggested_solution": [Provide actionable steps to resolve the issue, e.g., "Check pom.xml for correct dependency", "Review unit test reports", "Increase deployment timeout", "Clean up disk space on agent"]
}}"
---

Here is the Jenkins log:
---
{log}
---"#
    )
}

/// Keep at most the final `max_bytes` bytes of `text`, cut on a UTF-8
/// character boundary.
fn tail_truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_log_verbatim() {
        let prompt = failure_analysis_prompt("ERROR: step failed at line 42", 1024);
        assert!(prompt.contains("ERROR: step failed at line 42"));
        assert!(prompt.contains("\"root_cause\""));
        assert!(prompt.contains("The cause is usually found in the last lines"));
    }

    #[test]
    fn test_short_log_untouched() {
        assert_eq!(tail_truncate("abc", 10), "abc");
        assert_eq!(tail_truncate("abc", 3), "abc");
    }

    #[test]
    fn test_tail_truncation_keeps_final_bytes() {
        let text = "0123456789";
        assert_eq!(tail_truncate(text, 4), "6789");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'é' is two bytes; a cut landing inside it must move forward.
        let text = "aégz";
        let tail = tail_truncate(text, 3);
        assert_eq!(tail, "gz");
    }
}
