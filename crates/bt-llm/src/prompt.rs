//! Prompt text for assessments and OCR.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use bt_core::ImportanceContext;
use bt_model::{BiomarkerReading, LabTest};

const IMPORTANT_MARKER: &str = "⚠️ ";
const PLAIN_MARKER: &str = "  ";

/// Reference range as shown to the model: `[low-high]`, `[≥low]`, `[≤high]`,
/// or nothing.
///
/// ```
/// use bt_llm::format_reference_range;
///
/// assert_eq!(format_reference_range(Some(3.5), Some(5.1)), "[3.5-5.1]");
/// assert_eq!(format_reference_range(Some(40.0), None), "[≥40]");
/// assert_eq!(format_reference_range(None, None), "");
/// ```
pub fn format_reference_range(low: Option<f64>, high: Option<f64>) -> String {
    match (low, high) {
        (Some(low), Some(high)) => format!("[{low}-{high}]"),
        (Some(low), None) => format!("[≥{low}]"),
        (None, Some(high)) => format!("[≤{high}]"),
        (None, None) => String::new(),
    }
}

fn reading_line(reading: &BiomarkerReading, important: bool) -> String {
    let marker = if important { IMPORTANT_MARKER } else { PLAIN_MARKER };
    let mut line = format!("{marker}{}: {}", reading.name, reading.value);
    for part in [
        reading.unit.clone().unwrap_or_default(),
        format_reference_range(reading.low, reading.high),
    ] {
        if !part.is_empty() {
            line.push(' ');
            line.push_str(&part);
        }
    }
    line
}

/// Prompt asking for a short assessment of `test`.
///
/// Readings keep column order; important ones carry a warning marker. The
/// history section lists each important biomarker that has prior values,
/// sorted by name, most recent value first.
pub fn build_assessment_prompt(test: &LabTest, context: &ImportanceContext, lookback: usize) -> String {
    let readings = test
        .biomarkers
        .iter()
        .map(|reading| reading_line(reading, context.is_important(&reading.name)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::new();
    let _ = write!(
        prompt,
        "You are a medical AI assistant analyzing blood test results. \
         Please provide a concise assessment of the following blood test.\n\
         \n\
         TEST DATE: {date}\n\
         LABORATORY: {lab}\n\
         \n\
         BIOMARKERS (⚠️ indicates biomarkers that are currently out of range \
         or were out of range in the previous {lookback} tests):\n\
         \n\
         {readings}\n",
        date = test.date,
        lab = test.lab,
    );

    if !context.history.is_empty() {
        let _ = write!(
            prompt,
            "\nHISTORICAL VALUES FOR IMPORTANT BIOMARKERS (previous {lookback} tests):\n"
        );
        for (name, points) in &context.history {
            let values = points
                .iter()
                .map(|point| format!("{}: {}", point.date, point.value))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(prompt, "- {name}: {values}");
        }
    }

    prompt.push_str(
        "\nPlease provide a brief medical assessment (2-4 paragraphs) that:\n\
         1. Highlights general trends (which biomarkers are improving, which are worsening)\n\
         2. Identifies any health concerns or areas that need attention\n\
         3. Notes any medically relevant patterns or relationships between biomarkers\n\
         4. Provides context about what these results might mean for overall health\n\
         \n\
         Focus on actionable insights and meaningful trends rather than simply \
         restating reference ranges.\n\
         Write in a clear, professional medical tone suitable for a patient \
         reviewing their results.",
    );
    prompt
}

fn json_list<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<&String> = items.into_iter().collect();
    serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
}

/// Prompt for extracting a report from page images.
///
/// `biomarker_names` fixes the spelling and order the model should follow;
/// `lab_names` (when any) are offered as canonical lab spellings.
pub fn build_ocr_prompt(biomarker_names: &[String], lab_names: &BTreeSet<String>) -> String {
    let mut prompt = String::from(
        "Please analyze these blood test result images and extract the lab name, date, \
         and all biomarker data.\n\
         \n\
         LABORATORY NAME AND DATE:\n\
         - Extract the laboratory/clinic name from the images\n\
         - Extract the date of the test (return in YYYY-MM-DD format if possible)\n",
    );

    if !lab_names.is_empty() {
        let _ = write!(
            prompt,
            "\nLABORATORY NAMES: I have an existing list of lab names in my spreadsheet. \
             If you can identify the lab name from the images, please choose from this \
             list if possible:\n\
             \n\
             {labs}\n\
             \n\
             If the lab name in the image closely matches one of these (even with slight \
             variations), use the EXACT name from the list above.\n\
             If it doesn't match any of these, use the lab name as written in the image.\n",
            labs = json_list(lab_names),
        );
    }

    let _ = write!(
        prompt,
        "\nBIOMARKERS: I have an existing spreadsheet with biomarker columns. You MUST \
         follow the exact order and spelling of these biomarker names:\n\
         \n\
         {names}\n",
        names = json_list(biomarker_names),
    );

    prompt.push_str(
        "\nFor each biomarker found in the images:\n\
         - If it matches one of the above names, use the EXACT spelling and capitalization from the list\n\
         - Extract the value (as a number, not string), unit, and reference ranges\n\
         - Return biomarkers in the SAME ORDER as the list above (only include biomarkers found in the images)\n\
         \n\
         If you find biomarkers that are NOT in the above list:\n\
         - Add them at the END of the results\n\
         - Follow the naming style/pattern of the existing biomarker names\n\
         - Use clear, consistent naming\n\
         \n\
         For each biomarker, extract:\n\
         - name: The name of the biomarker/test (exact spelling from list, or new name for unlisted biomarkers)\n\
         - value: The numerical result (as a number, not string)\n\
         - unit: The unit of measurement\n\
         - range_lower: The lower end of the reference/normal range if provided\n\
         - range_upper: The upper end of the reference/normal range if provided\n\
         \n\
         Return the data as a JSON object with this exact structure:\n\
         {\n\
         \x20   \"lab_name\": \"Laboratory Name\",\n\
         \x20   \"date\": \"YYYY-MM-DD\",\n\
         \x20   \"biomarkers\": [\n\
         \x20       {\n\
         \x20           \"name\": \"Biomarker Name\",\n\
         \x20           \"value\": 123.45,\n\
         \x20           \"unit\": \"mg/dL\",\n\
         \x20           \"range_lower\": 100,\n\
         \x20           \"range_upper\": 200\n\
         \x20       }\n\
         \x20   ]\n\
         }\n\
         \n\
         Important:\n\
         - Extract the lab name and date from the top of the blood test report\n\
         - Extract ALL biomarkers visible in the images\n\
         - Use null for missing fields\n\
         - Ensure values are numbers, not strings\n\
         - Maintain the order: known biomarkers first (in list order), new biomarkers at the end",
    );
    prompt
}
