//! Plain-text report mirroring the response store.
//!
//! The report is regenerated in full on every submission, listing all
//! submissions in insertion order between fixed 40-character banner lines.

use crate::Submission;

const HEADER_BANNER: &str = "========================================";
const ENTRY_BANNER: &str = "----------------------------------------";

/// Render the full report for the given submissions.
pub fn render(submissions: &[Submission]) -> String {
    let mut out = String::new();
    out.push_str(HEADER_BANNER);
    out.push('\n');
    out.push_str("QUESTIONNAIRE RESPONSES\n");
    out.push_str(HEADER_BANNER);
    out.push_str("\n\n");

    for sub in submissions {
        out.push_str(ENTRY_BANNER);
        out.push('\n');
        out.push_str(&format!("{} ({})\n", sub.display_name, sub.username));
        out.push_str(ENTRY_BANNER);
        out.push('\n');
        for answer in &sub.answers {
            out.push_str(&format!("Q: {}\n", answer.question));
            out.push_str(&format!("A: {}\n", answer.answer));
        }
        out.push('\n');
    }

    out
}
