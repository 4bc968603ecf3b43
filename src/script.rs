use crate::core::error::AssistError;
use crate::providers::process_response;

/// Pulls the Lisp source out of a model reply: code fences are removed and
/// everything outside the outermost parentheses is dropped.
pub fn extract_lisp(raw: &str) -> Result<String, AssistError> {
    let content = process_response(raw);
    match (content.find('('), content.rfind(')')) {
        (Some(start), Some(end)) if start < end => Ok(content[start..=end].to_string()),
        _ => Err(AssistError::Api(
            "response contains no parenthesised Lisp form".to_string(),
        )),
    }
}

/// Wraps a script body in a `CODE` command the CAD host can run, restoring
/// the object snap mode if the body errors out. The body is inserted verbatim
/// so multi-line string literals keep their exact contents.
pub fn wrap_command(body: &str) -> String {
    format!(
        "(defun *error* (msg)\n  (if old_osmode (setvar \"osmode\" old_osmode))\n  (princ))\n\
         (defun c:code ()\n  (setq old_osmode (getvar \"osmode\"))\n{}\n  (setvar \"osmode\" old_osmode)\n  (princ))\n",
        body.trim_end()
    )
}
