//! Extraction prompts for blood-test reports.
//!
//! The model is asked for JSON only; [`crate::extraction`] still tolerates
//! prose or code fences around the object.

/// System prompt shared by single- and multi-report extraction.
pub const SYSTEM_PROMPT: &str = r#"You are a medical assistant AI that reads blood test reports.

Reports may be in any language and may contain OCR noise. Translate parameter
names to English (for example Гемоглобин → Hemoglobin, ЛПНП → LDL,
Глюкоза → Glucose, СРБ → CRP) and keep values and units exactly as printed.

Respond ONLY with a JSON object. Do not add markdown or commentary."#;

/// Example single-report payload shown to the model.
pub const REPORT_EXAMPLE: &str = r#"{
  "parameters": [
    { "name": "Hemoglobin", "value": 13.2, "unit": "g/dL" }
  ],
  "summary": "Brief assessment of the medical situation (e.g. anemia, infection, normal)",
  "follow_up_advice": "Suggested follow-up timing"
}"#;

/// Example multi-report payload shown to the model.
pub const COLLECTION_EXAMPLE: &str = r#"{
  "reports": [
    {
      "file": "report1.txt",
      "report_date": "2025-03-04",
      "gender": "Female",
      "parameters": [
        { "name": "Hemoglobin", "value": 126, "unit": "g/L" }
      ],
      "summary": "Brief summary for this report",
      "general_health_score": 87.0
    }
  ],
  "overall_follow_up_advice": "Combined advice based on all reports"
}"#;

/// User prompt for one report.
pub fn make_report_prompt(report_text: &str) -> String {
    format!(
        r#"A user has provided a blood test report.

Tasks:
1. Extract blood analysis parameters with names, values, and units.
2. Assess the medical situation (e.g. anemia, infection, normal).
3. Suggest follow-up timing.

Respond in this JSON format:
{REPORT_EXAMPLE}

Report:
"{report_text}""#
    )
}

/// User prompt for several reports analysed together.
///
/// Each report is introduced by its file name so the model can echo it back
/// in the `file` field.
pub fn make_multi_report_prompt<S: AsRef<str>>(reports: &[(S, S)]) -> String {
    let blocks = reports
        .iter()
        .map(|(name, content)| format!("Report: {}\n{}", name.as_ref(), content.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"A user has provided multiple blood test reports. Each report is from a different day or individual.

Tasks:
1. For each report, extract:
   - Report date (YYYY-MM-DD if present, otherwise null)
   - Patient gender (Male, Female, Unknown)
   - Blood parameters with English names, original values, and units
2. For each report, provide a brief medical summary.
3. For each report, estimate a general health score (0-100).
4. At the end, provide ONE unified recommendation for follow-up or next steps, considering all the reports collectively.

Respond in this JSON format:
{COLLECTION_EXAMPLE}

Here are the reports:

{blocks}"#
    )
}
