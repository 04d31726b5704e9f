use super::contract::EntityLockContract;

/// Report skeleton headings. The verifier and downstream readers rely on them.
pub const REPORT_TITLE: &str = "# Detailed Diagnostic Report";
pub const SECTION_EXECUTIVE_SUMMARY: &str = "## 1. Executive Summary";
pub const SECTION_AREA_FINDINGS: &str = "## 2. Area-wise Inspection Findings";
pub const SECTION_THERMAL: &str = "## 3. Thermal Imaging Analysis";
pub const SECTION_RECOMMENDATIONS: &str = "## 4. Recommendations";
pub const SECTION_STATISTICS: &str = "## 5. Summary Statistics";

/// Generation instruction. `{area_count}`, `{thermal_count}` and `{json_data}`
/// are substituted; `{area_name}` and friends are shown to the model verbatim.
const DDR_GENERATION_PROMPT: &str = r#"You are a report formatter (NOT an analyzer).

You will receive VALIDATED structured JSON data:
- Inspection areas with observations
- Thermal readings (separate from areas)

Your ONLY job:
Format this data into a professional DDR report.

CRITICAL RULES (MEASURABLE):

1. **ENTITY LOCK RULE** (MEASURABLE):
   - Count of areas in final DDR = Count of areas in JSON input
   - This is: {area_count} areas
   - You are LOCKED to this number
   - Do NOT create, add, expand, merge, or derive new areas
   - Area explosion is a FAILURE condition

2. **THERMAL SEPARATION** (STRICT):
   - Thermal readings go in the SEPARATE "Thermal Imaging Analysis" section
   - There are {thermal_count} thermal readings
   - Do NOT merge thermal IDs into the area list
   - Do NOT treat image IDs as areas

3. **ROOT CAUSE HANDLING** (CONTROLLED):
   - Use the provided probable_root_cause from JSON
   - Do NOT add your own causes

4. **RECOMMENDATION CONSTRAINT** (EXPLICIT LINKING):
   - Exactly ONE action-oriented recommendation per area
   - Each recommendation must address that area's own observations
   - Do NOT generate generic maintenance advice

5. **HEADING FORMAT**:
   - Use "Area <number>:" ONLY in the per-area headings of section 2
   - Do NOT write "Area <number>:" anywhere else in the report

Report Structure:

# Detailed Diagnostic Report

## 1. Executive Summary

**Total Impacted Rooms:** {area_count}

**Critical Findings:**

Format as bullet points. Avoid repeating the room name in the description:
• [Area name] – [Brief description of issue]

Example:
• Hall – Skirting level dampness (NOT "Hall – Hall Skirting level dampness")

**Thermal Analysis Summary:**
- Total thermal images analyzed: {thermal_count}
- Temperature anomalies identified and documented for further investigation

---

## 2. Area-wise Inspection Findings

**Area 1: {area_name}**

**Observations:**
{negative_observations}

**Probable Root Cause:** Not Available

**Recommendation:** {recommendation}

---

## 3. Thermal Imaging Analysis

### Thermal Readings (SEPARATE - NOT IN AREAS)

**Image ID:** {image_id}
- Hotspot Temperature: {hotspot}
- Coldspot Temperature: {coldspot}
- Temperature Difference: {temperature_difference}
- Assessment: {interpretation}

---

## 4. Recommendations

Provide ONE comprehensive recommendation per area addressing all observed issues,
in natural, professional language.

**{area_name}**

**Recommended Action:**
Write clear, actionable steps to address the issues.

---

## 5. Summary Statistics

- Total Impacted Rooms: {area_count}
- Total Thermal Readings: {thermal_count}
- Recommendations Provided: {area_count}

---

VALIDATION CHECK BEFORE OUTPUT:
- Count the "Area <number>:" headings in your output
- Must equal {area_count}
- If not equal, YOU HAVE FAILED

**Input JSON:**
```json
{json_data}
```

Generate the DDR report now.
"#;

pub fn build_generation_prompt(contract: &EntityLockContract, json_data: &str) -> String {
    // json_data last so its content is never treated as a placeholder.
    DDR_GENERATION_PROMPT
        .replace("{area_count}", &contract.expected_area_count().to_string())
        .replace("{thermal_count}", &contract.expected_thermal_count().to_string())
        .replace("{json_data}", json_data)
}
